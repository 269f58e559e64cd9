//! Flow runtime — the single task that owns the navigator.
//!
//! Presenters send [`Intent`]s through a [`FlowHandle`] and watch
//! [`FlowSnapshot`]s. Account operations run as spawned tasks whose results come
//! back to this loop as completions, so every mutation happens on one task.
//! Leaving a step does not abort its task; the completion is dropped when it
//! arrives.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::navigator::{FlowNavigator, Transition};
use super::snapshot::FlowSnapshot;
use super::step::FlowStep;
use crate::account::{AccountRequest, AccountService};
use crate::config::FlowConfig;
use crate::error::{AccountError, FlowError, RuntimeError};
use crate::field::FieldName;
use crate::form::{SubmissionTicket, SubmitOutcome};
use crate::intent::Intent;

/// Result of an account operation, routed back to the runtime loop.
#[derive(Debug)]
struct Completion {
    ticket: SubmissionTicket,
    result: Result<(), AccountError>,
}

/// Owns a [`FlowNavigator`] and applies intents and completions to it in order.
pub struct FlowRuntime {
    navigator: FlowNavigator,
    service: Arc<dyn AccountService>,
    intents: mpsc::Receiver<Intent>,
    completions_tx: mpsc::UnboundedSender<Completion>,
    completions_rx: mpsc::UnboundedReceiver<Completion>,
    snapshots: watch::Sender<FlowSnapshot>,
}

impl FlowRuntime {
    /// Create a runtime on the welcome step and the handle that drives it.
    pub fn new(service: Arc<dyn AccountService>, config: &FlowConfig) -> (Self, FlowHandle) {
        let navigator = FlowNavigator::new();
        let (intent_tx, intents) = mpsc::channel(config.intent_buffer);
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(navigator.snapshot());

        let runtime = Self {
            navigator,
            service,
            intents,
            completions_tx,
            completions_rx,
            snapshots,
        };
        let handle = FlowHandle {
            intents: intent_tx,
            snapshots: snapshot_rx,
        };
        (runtime, handle)
    }

    /// Create a runtime and run it on a new task.
    pub fn spawn(service: Arc<dyn AccountService>, config: &FlowConfig) -> (FlowHandle, JoinHandle<()>) {
        let (runtime, handle) = Self::new(service, config);
        let join = tokio::spawn(runtime.run());
        (handle, join)
    }

    /// Process intents and completions until shut down or every handle is dropped.
    pub async fn run(mut self) {
        info!("Flow runtime started");
        loop {
            tokio::select! {
                intent = self.intents.recv() => {
                    match intent {
                        Some(Intent::Shutdown) | None => break,
                        Some(intent) => self.handle_intent(intent),
                    }
                }
                Some(completion) = self.completions_rx.recv() => {
                    self.handle_completion(completion);
                }
            }
            self.publish();
        }
        info!(step = %self.navigator.current_step(), "Flow runtime stopped");
    }

    fn handle_intent(&mut self, intent: Intent) {
        debug!(intent = intent.kind(), step = %self.navigator.current_step(), "Intent received");
        let result = match intent {
            Intent::SetField { field, value } => self.navigator.set_field(field, value),
            Intent::Focus { field } => self.navigator.focus(field),
            Intent::Blur => self.navigator.blur(),
            Intent::Submit => self.submit(),
            Intent::Back => {
                self.navigator.back();
                Ok(())
            }
            Intent::Choose { step } => self.navigator.choose(step),
            Intent::SelectRole { role } => self.navigator.select_role(&role).map(|_| ()),
            Intent::SignOut => self.navigator.sign_out(),
            Intent::Shutdown => Ok(()),
        };
        if let Err(e) = result {
            warn!(error = %e, step = %self.navigator.current_step(), "Intent rejected");
        }
    }

    fn submit(&mut self) -> Result<(), FlowError> {
        match self.navigator.submit()? {
            SubmitOutcome::Started { ticket, request } => self.dispatch(ticket, request),
            SubmitOutcome::Invalid(_) | SubmitOutcome::Ignored => {}
        }
        Ok(())
    }

    /// Run an account request on its own task and route the result back here.
    fn dispatch(&self, ticket: SubmissionTicket, request: AccountRequest) {
        let service = Arc::clone(&self.service);
        let tx = self.completions_tx.clone();
        tokio::spawn(async move {
            let result = request.dispatch(service.as_ref()).await;
            // Ok if the runtime has already stopped
            let _ = tx.send(Completion { ticket, result });
        });
    }

    fn handle_completion(&mut self, completion: Completion) {
        match self.navigator.complete(completion.ticket, completion.result) {
            Transition::Advanced { from, to } => {
                debug!(%from, %to, "Completion advanced the flow");
            }
            Transition::Stayed => {}
            Transition::Discarded => {
                debug!("Completion discarded");
            }
        }
    }

    fn publish(&self) {
        self.snapshots.send_replace(self.navigator.snapshot());
    }
}

/// Cloneable handle for sending intents to a running [`FlowRuntime`].
#[derive(Debug, Clone)]
pub struct FlowHandle {
    intents: mpsc::Sender<Intent>,
    snapshots: watch::Receiver<FlowSnapshot>,
}

impl FlowHandle {
    /// Deliver an intent to the runtime.
    pub async fn send(&self, intent: Intent) -> Result<(), RuntimeError> {
        self.intents.send(intent).await.map_err(|_| RuntimeError::Closed)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> FlowSnapshot {
        self.snapshots.borrow().clone()
    }

    /// A receiver that is notified after every mutation.
    pub fn subscribe(&self) -> watch::Receiver<FlowSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until a published snapshot satisfies `predicate`.
    pub async fn wait_for<F>(&self, predicate: F) -> Result<FlowSnapshot, RuntimeError>
    where
        F: FnMut(&FlowSnapshot) -> bool,
    {
        let mut rx = self.snapshots.clone();
        let snapshot = rx.wait_for(predicate).await.map_err(|_| RuntimeError::Closed)?;
        Ok(snapshot.clone())
    }

    pub async fn set_field(&self, field: FieldName, value: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Intent::SetField {
            field,
            value: value.into(),
        })
        .await
    }

    pub async fn submit(&self) -> Result<(), RuntimeError> {
        self.send(Intent::Submit).await
    }

    pub async fn back(&self) -> Result<(), RuntimeError> {
        self.send(Intent::Back).await
    }

    pub async fn choose(&self, step: FlowStep) -> Result<(), RuntimeError> {
        self.send(Intent::Choose { step }).await
    }

    pub async fn select_role(&self, role: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Intent::SelectRole { role: role.into() }).await
    }

    pub async fn sign_out(&self) -> Result<(), RuntimeError> {
        self.send(Intent::SignOut).await
    }

    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.send(Intent::Shutdown).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::account::SimulatedAccountService;
    use crate::form::SubmissionState;

    fn spawn_with_latency(latency: Duration) -> (FlowHandle, JoinHandle<()>) {
        let service: Arc<dyn AccountService> = Arc::new(SimulatedAccountService::new(latency));
        FlowRuntime::spawn(service, &FlowConfig::default())
    }

    #[tokio::test]
    async fn publishes_initial_snapshot() {
        let (handle, _join) = spawn_with_latency(Duration::ZERO);
        assert_eq!(handle.snapshot().step, FlowStep::Welcome);
    }

    #[tokio::test]
    async fn forgot_submit_advances_to_otp() {
        let (handle, _join) = spawn_with_latency(Duration::from_millis(10));
        handle.choose(FlowStep::Forgot).await.unwrap();
        handle.set_field(FieldName::Email, "user@example.com").await.unwrap();
        handle.submit().await.unwrap();

        let submitting = handle
            .wait_for(|s| s.submission == SubmissionState::Submitting || s.step == FlowStep::Otp)
            .await
            .unwrap();
        assert!(matches!(submitting.step, FlowStep::Forgot | FlowStep::Otp));

        let otp = handle.wait_for(|s| s.step == FlowStep::Otp).await.unwrap();
        assert_eq!(otp.field(FieldName::Code), Some(""));
        assert!(otp.can_go_back);
    }

    #[tokio::test]
    async fn rejected_intent_keeps_state() {
        let (handle, _join) = spawn_with_latency(Duration::ZERO);
        handle.select_role("student").await.unwrap();
        handle.choose(FlowStep::SignUp).await.unwrap();
        let snapshot = handle.wait_for(|s| s.step == FlowStep::SignUp).await.unwrap();
        assert_eq!(snapshot.role, None);
    }

    #[tokio::test]
    async fn shutdown_stops_runtime() {
        let (handle, join) = spawn_with_latency(Duration::ZERO);
        handle.shutdown().await.unwrap();
        join.await.unwrap();
        assert!(matches!(handle.submit().await, Err(RuntimeError::Closed)));
    }

    #[tokio::test]
    async fn dropping_handles_stops_runtime() {
        let (handle, join) = spawn_with_latency(Duration::ZERO);
        drop(handle);
        join.await.unwrap();
    }
}
