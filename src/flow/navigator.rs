//! Flow navigator — the only component allowed to change the active step.
//!
//! Navigation is a stack. Forward moves push a step (with a fresh form when the
//! step has fields); back pops it and discards its form. Forms lower in the
//! stack keep their values until they are popped or the user signs out.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::snapshot::FlowSnapshot;
use super::step::{FlowStep, Trigger};
use crate::error::{AccountError, FlowError};
use crate::field::FieldName;
use crate::form::{Resolution, StepForm, SubmissionTicket, SubmitOutcome};
use crate::role::Role;

/// Cap on retained navigation events.
const MAX_HISTORY: usize = 200;

/// A recorded step change.
#[derive(Debug, Clone, Serialize)]
pub struct NavigationEvent {
    pub from: FlowStep,
    pub to: FlowStep,
    pub trigger: Trigger,
    pub timestamp: DateTime<Utc>,
}

/// What a completion did to the flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The active step changed.
    Advanced { from: FlowStep, to: FlowStep },
    /// The flow stayed on the same step (the form may now be `Failed`).
    Stayed,
    /// The completion belonged to a form that is no longer active.
    Discarded,
}

#[derive(Debug, Clone)]
struct StackEntry {
    step: FlowStep,
    form: Option<StepForm>,
}

impl StackEntry {
    fn new(step: FlowStep) -> Self {
        Self {
            step,
            form: StepForm::new(step).ok(),
        }
    }
}

/// Owns the current step, the back-stack, and the forms of every step on it.
#[derive(Debug, Clone)]
pub struct FlowNavigator {
    stack: Vec<StackEntry>,
    role: Option<Role>,
    history: Vec<NavigationEvent>,
}

impl FlowNavigator {
    /// Start a fresh flow on the welcome step.
    pub fn new() -> Self {
        Self {
            stack: vec![StackEntry::new(FlowStep::Welcome)],
            role: None,
            history: Vec::new(),
        }
    }

    pub fn current_step(&self) -> FlowStep {
        self.top().step
    }

    /// Role chosen on the way to the dashboard, if any.
    pub fn role(&self) -> Option<Role> {
        self.role
    }

    /// Steps on the navigation stack, root first.
    pub fn path(&self) -> Vec<FlowStep> {
        self.stack.iter().map(|entry| entry.step).collect()
    }

    pub fn can_go_back(&self) -> bool {
        self.stack.len() > 1
    }

    pub fn history(&self) -> &[NavigationEvent] {
        &self.history
    }

    /// Form of the active step.
    pub fn active_form(&self) -> Option<&StepForm> {
        self.top().form.as_ref()
    }

    /// Form of the nearest stack entry for `step`, including inactive ones.
    pub fn form(&self, step: FlowStep) -> Option<&StepForm> {
        self.stack
            .iter()
            .rev()
            .find(|entry| entry.step == step)
            .and_then(|entry| entry.form.as_ref())
    }

    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) -> Result<(), FlowError> {
        self.active_form_mut()?.set_field(field, value)
    }

    pub fn focus(&mut self, field: FieldName) -> Result<(), FlowError> {
        self.active_form_mut()?.focus(field)
    }

    pub fn blur(&mut self) -> Result<(), FlowError> {
        self.active_form_mut()?.blur();
        Ok(())
    }

    /// Submit the active step's form.
    ///
    /// A `Started` outcome carries the account request the caller must run
    /// and later feed back through [`FlowNavigator::complete`].
    pub fn submit(&mut self) -> Result<SubmitOutcome, FlowError> {
        Ok(self.active_form_mut()?.submit())
    }

    /// Apply the completion of an account operation.
    ///
    /// Completions for forms that were popped or reset are dropped.
    pub fn complete(&mut self, ticket: SubmissionTicket, result: Result<(), AccountError>) -> Transition {
        let from = self.current_step();
        let Some(form) = self.top_mut().form.as_mut().filter(|f| f.id() == ticket.form_id()) else {
            debug!(step = %from, "Completion for an abandoned form discarded");
            return Transition::Discarded;
        };

        match form.resolve(ticket, result) {
            Resolution::Discarded => Transition::Discarded,
            Resolution::Failed => Transition::Stayed,
            Resolution::Succeeded => match from.next_on_success() {
                Some(to) => {
                    self.push(to, Trigger::Submitted);
                    Transition::Advanced { from, to }
                }
                None => Transition::Stayed,
            },
        }
    }

    /// Follow a user-chosen link or button to `target`.
    ///
    /// Refused while the active form is submitting: the completion is only
    /// applied to the top of the stack, so a covered form would never resolve.
    pub fn choose(&mut self, target: FlowStep) -> Result<(), FlowError> {
        let from = self.current_step();
        if !from.can_transition_to(target, Trigger::Choice) {
            return Err(FlowError::InvalidTransition { from, to: target });
        }
        if self.active_form().is_some_and(|f| f.submission().is_submitting()) {
            debug!(%from, to = %target, "Choice refused while submitting");
            return Err(FlowError::InvalidTransition { from, to: target });
        }
        self.push(target, Trigger::Choice);
        Ok(())
    }

    /// Return to the previous step. Returns `false` at the root.
    ///
    /// The popped step's form is discarded, including any submit in flight.
    pub fn back(&mut self) -> bool {
        if !self.can_go_back() {
            debug!("Back ignored at root step");
            return false;
        }
        let Some(popped) = self.stack.pop() else {
            return false;
        };
        if popped.step == FlowStep::Dashboard {
            self.role = None;
        }
        if popped.form.as_ref().is_some_and(|f| f.submission().is_submitting()) {
            info!(step = %popped.step, "Left step with a submission in flight");
        }
        let to = self.current_step();
        self.record(popped.step, to, Trigger::Back);
        true
    }

    /// Pick a role by identifier and enter the dashboard.
    pub fn select_role(&mut self, role_id: &str) -> Result<Role, FlowError> {
        let role = role_id.parse::<Role>().inspect_err(|e| {
            warn!(role_id, error = %e, "Rejected role selection");
        })?;
        self.select(role)?;
        Ok(role)
    }

    /// Enter the dashboard as `role`.
    pub fn select(&mut self, role: Role) -> Result<(), FlowError> {
        let from = self.current_step();
        if !from.can_transition_to(FlowStep::Dashboard, Trigger::RoleChosen) {
            return Err(FlowError::InvalidTransition {
                from,
                to: FlowStep::Dashboard,
            });
        }
        self.role = Some(role);
        self.push(FlowStep::Dashboard, Trigger::RoleChosen);
        Ok(())
    }

    /// Leave the dashboard and restart the flow with every form cleared.
    pub fn sign_out(&mut self) -> Result<(), FlowError> {
        let from = self.current_step();
        if !from.can_transition_to(FlowStep::Welcome, Trigger::SignOut) {
            return Err(FlowError::InvalidTransition {
                from,
                to: FlowStep::Welcome,
            });
        }
        self.stack = vec![StackEntry::new(FlowStep::Welcome)];
        self.role = None;
        self.record(from, FlowStep::Welcome, Trigger::SignOut);
        Ok(())
    }

    /// Snapshot of the active step for presenters.
    pub fn snapshot(&self) -> FlowSnapshot {
        FlowSnapshot::capture(
            self.current_step(),
            self.active_form(),
            self.role,
            self.can_go_back(),
        )
    }

    fn top(&self) -> &StackEntry {
        // The stack is never empty: it starts with Welcome and `back` keeps the root.
        &self.stack[self.stack.len() - 1]
    }

    fn top_mut(&mut self) -> &mut StackEntry {
        let last = self.stack.len() - 1;
        &mut self.stack[last]
    }

    fn active_form_mut(&mut self) -> Result<&mut StepForm, FlowError> {
        let entry = self.top_mut();
        let step = entry.step;
        entry.form.as_mut().ok_or(FlowError::NoForm { step })
    }

    fn push(&mut self, to: FlowStep, trigger: Trigger) {
        let from = self.current_step();
        self.stack.push(StackEntry::new(to));
        self.record(from, to, trigger);
    }

    fn record(&mut self, from: FlowStep, to: FlowStep, trigger: Trigger) {
        info!(%from, %to, ?trigger, "Flow step changed");
        self.history.push(NavigationEvent {
            from,
            to,
            trigger,
            timestamp: Utc::now(),
        });
        if self.history.len() > MAX_HISTORY {
            let drain_count = self.history.len() - MAX_HISTORY;
            self.history.drain(..drain_count);
        }
    }
}

impl Default for FlowNavigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::SubmissionState;

    /// Submit the active form and resolve it with `result`.
    fn submit_and_resolve(nav: &mut FlowNavigator, result: Result<(), AccountError>) -> Transition {
        match nav.submit().unwrap() {
            SubmitOutcome::Started { ticket, .. } => nav.complete(ticket, result),
            other => panic!("expected submission to start, got {other:?}"),
        }
    }

    fn fill(nav: &mut FlowNavigator, values: &[(FieldName, &str)]) {
        for (field, value) in values {
            nav.set_field(*field, *value).unwrap();
        }
    }

    #[test]
    fn starts_on_welcome() {
        let nav = FlowNavigator::new();
        assert_eq!(nav.current_step(), FlowStep::Welcome);
        assert!(!nav.can_go_back());
        assert!(nav.active_form().is_none());
        assert!(nav.history().is_empty());
    }

    #[test]
    fn sign_in_reaches_dashboard() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com"), (FieldName::Password, "abcdef")]);

        let transition = submit_and_resolve(&mut nav, Ok(()));
        assert_eq!(
            transition,
            Transition::Advanced {
                from: FlowStep::SignIn,
                to: FlowStep::Dashboard
            }
        );
        assert!(nav.current_step().is_terminal());
        assert_eq!(nav.role(), None);
    }

    #[test]
    fn reset_path_reaches_dashboard_with_role() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        nav.choose(FlowStep::Forgot).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com")]);
        submit_and_resolve(&mut nav, Ok(()));
        assert_eq!(nav.current_step(), FlowStep::Otp);

        fill(&mut nav, &[(FieldName::Code, "1234")]);
        submit_and_resolve(&mut nav, Ok(()));
        assert_eq!(nav.current_step(), FlowStep::Reset);

        fill(&mut nav, &[(FieldName::Password, "abcdef"), (FieldName::ConfirmPassword, "abcdef")]);
        let transition = submit_and_resolve(&mut nav, Ok(()));
        assert_eq!(
            transition,
            Transition::Advanced {
                from: FlowStep::Reset,
                to: FlowStep::RoleSelect
            }
        );

        assert_eq!(nav.select_role("donor").unwrap(), Role::Donor);
        assert_eq!(nav.current_step(), FlowStep::Dashboard);
        assert_eq!(nav.snapshot().role, Some(Role::Donor));
        assert_eq!(
            nav.path(),
            vec![
                FlowStep::Welcome,
                FlowStep::SignIn,
                FlowStep::Forgot,
                FlowStep::Otp,
                FlowStep::Reset,
                FlowStep::RoleSelect,
                FlowStep::Dashboard,
            ]
        );
    }

    #[test]
    fn back_from_otp_keeps_forgot_email() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::Forgot).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com")]);
        submit_and_resolve(&mut nav, Ok(()));
        fill(&mut nav, &[(FieldName::Code, "9999")]);

        assert!(nav.back());
        assert_eq!(nav.current_step(), FlowStep::Forgot);
        let snapshot = nav.snapshot();
        assert_eq!(snapshot.field(FieldName::Email), Some("user@example.com"));
        assert!(snapshot.errors.is_empty());
        assert_eq!(snapshot.submission, SubmissionState::Idle);
    }

    #[test]
    fn back_discards_popped_form() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        fill(&mut nav, &[(FieldName::Email, "gone@example.com")]);
        assert!(nav.back());
        nav.choose(FlowStep::SignIn).unwrap();
        assert_eq!(nav.snapshot().field(FieldName::Email), Some(""));
    }

    #[test]
    fn back_at_root_is_noop() {
        let mut nav = FlowNavigator::new();
        assert!(!nav.back());
        assert_eq!(nav.current_step(), FlowStep::Welcome);
    }

    #[test]
    fn validation_failure_does_not_advance() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignUp).unwrap();
        fill(
            &mut nav,
            &[
                (FieldName::Email, "user@example.com"),
                (FieldName::Password, "abcdef"),
                (FieldName::ConfirmPassword, "abcxyz"),
            ],
        );
        assert!(matches!(nav.submit().unwrap(), SubmitOutcome::Invalid(_)));
        assert_eq!(nav.current_step(), FlowStep::SignUp);
        assert_eq!(
            nav.snapshot().error(FieldName::ConfirmPassword),
            Some("Passwords do not match")
        );
    }

    #[test]
    fn failed_operation_stays_on_step() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::Forgot).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com")]);
        let transition = submit_and_resolve(
            &mut nav,
            Err(AccountError::Rejected {
                reason: "unknown address".to_string(),
            }),
        );
        assert_eq!(transition, Transition::Stayed);
        assert_eq!(nav.current_step(), FlowStep::Forgot);
        let snapshot = nav.snapshot();
        assert_eq!(snapshot.submission, SubmissionState::Failed);
        assert!(snapshot.submission_error.is_some());
        assert_eq!(snapshot.field(FieldName::Email), Some("user@example.com"));

        // Retrying succeeds and advances.
        submit_and_resolve(&mut nav, Ok(()));
        assert_eq!(nav.current_step(), FlowStep::Otp);
    }

    #[test]
    fn completion_after_back_is_discarded() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::Forgot).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com")]);
        submit_and_resolve(&mut nav, Ok(()));

        let SubmitOutcome::Started { ticket, .. } = nav.submit().unwrap() else {
            panic!("otp submit should start");
        };
        assert!(nav.back());
        assert_eq!(nav.complete(ticket, Ok(())), Transition::Discarded);
        assert_eq!(nav.current_step(), FlowStep::Forgot);
    }

    #[test]
    fn duplicate_completion_is_discarded() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com"), (FieldName::Password, "abcdef")]);
        let SubmitOutcome::Started { ticket, .. } = nav.submit().unwrap() else {
            panic!("sign-in submit should start");
        };
        assert_eq!(
            nav.complete(ticket, Ok(())),
            Transition::Advanced {
                from: FlowStep::SignIn,
                to: FlowStep::Dashboard,
            }
        );
        assert_eq!(nav.complete(ticket, Ok(())), Transition::Discarded);
    }

    #[test]
    fn choice_refused_while_submitting() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com"), (FieldName::Password, "abcdef")]);
        let SubmitOutcome::Started { ticket, .. } = nav.submit().unwrap() else {
            panic!("sign-in submit should start");
        };

        for target in [FlowStep::Forgot, FlowStep::SignUp] {
            assert_eq!(
                nav.choose(target),
                Err(FlowError::InvalidTransition {
                    from: FlowStep::SignIn,
                    to: target,
                })
            );
        }
        assert_eq!(nav.current_step(), FlowStep::SignIn);

        // The form still resolves, and links work again afterwards.
        assert_eq!(nav.complete(ticket, Err(AccountError::InvalidCode)), Transition::Stayed);
        assert_eq!(nav.active_form().unwrap().submission(), SubmissionState::Failed);
        nav.choose(FlowStep::Forgot).unwrap();
        assert!(nav.back());
        assert!(matches!(nav.submit().unwrap(), SubmitOutcome::Started { .. }));
    }

    #[test]
    fn sign_out_clears_every_form() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com"), (FieldName::Password, "abcdef")]);
        submit_and_resolve(&mut nav, Ok(()));

        nav.sign_out().unwrap();
        assert_eq!(nav.current_step(), FlowStep::Welcome);
        assert_eq!(nav.path(), vec![FlowStep::Welcome]);
        assert!(nav.form(FlowStep::SignIn).is_none());
        assert_eq!(nav.role(), None);

        nav.choose(FlowStep::SignIn).unwrap();
        assert_eq!(nav.snapshot().field(FieldName::Email), Some(""));
        assert_eq!(nav.snapshot().field(FieldName::Password), Some(""));
    }

    #[test]
    fn sign_out_outside_dashboard_is_rejected() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        assert_eq!(
            nav.sign_out().unwrap_err(),
            FlowError::InvalidTransition {
                from: FlowStep::SignIn,
                to: FlowStep::Welcome
            }
        );
        assert_eq!(nav.current_step(), FlowStep::SignIn);
    }

    #[test]
    fn invalid_role_fails_without_transition() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::Forgot).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com")]);
        submit_and_resolve(&mut nav, Ok(()));
        submit_and_resolve(&mut nav, Ok(()));
        fill(&mut nav, &[(FieldName::Password, "abcdef"), (FieldName::ConfirmPassword, "abcdef")]);
        submit_and_resolve(&mut nav, Ok(()));
        assert_eq!(nav.current_step(), FlowStep::RoleSelect);

        assert_eq!(
            nav.select_role("guest").unwrap_err(),
            FlowError::InvalidRole("guest".to_string())
        );
        assert_eq!(nav.current_step(), FlowStep::RoleSelect);
        assert_eq!(nav.role(), None);
    }

    #[test]
    fn role_selection_only_on_role_step() {
        let mut nav = FlowNavigator::new();
        assert!(matches!(
            nav.select(Role::Admin),
            Err(FlowError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn choose_rejects_non_adjacent_steps() {
        let mut nav = FlowNavigator::new();
        assert!(nav.choose(FlowStep::Otp).is_err());
        assert!(nav.choose(FlowStep::Dashboard).is_err());
        assert_eq!(nav.current_step(), FlowStep::Welcome);
    }

    #[test]
    fn form_intents_on_formless_step_fail() {
        let mut nav = FlowNavigator::new();
        assert_eq!(
            nav.set_field(FieldName::Email, "x").unwrap_err(),
            FlowError::NoForm {
                step: FlowStep::Welcome
            }
        );
        assert!(nav.submit().is_err());
        assert!(nav.blur().is_err());
    }

    #[test]
    fn back_from_dashboard_clears_role() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::Forgot).unwrap();
        fill(&mut nav, &[(FieldName::Email, "user@example.com")]);
        submit_and_resolve(&mut nav, Ok(()));
        submit_and_resolve(&mut nav, Ok(()));
        fill(&mut nav, &[(FieldName::Password, "abcdef"), (FieldName::ConfirmPassword, "abcdef")]);
        submit_and_resolve(&mut nav, Ok(()));
        nav.select(Role::Student).unwrap();

        assert!(nav.back());
        assert_eq!(nav.current_step(), FlowStep::RoleSelect);
        assert_eq!(nav.role(), None);
    }

    #[test]
    fn history_records_triggers_and_is_capped() {
        let mut nav = FlowNavigator::new();
        nav.choose(FlowStep::SignIn).unwrap();
        nav.back();
        let triggers: Vec<Trigger> = nav.history().iter().map(|e| e.trigger).collect();
        assert_eq!(triggers, vec![Trigger::Choice, Trigger::Back]);

        for _ in 0..150 {
            nav.choose(FlowStep::SignUp).unwrap();
            nav.back();
        }
        assert!(nav.history().len() <= MAX_HISTORY);
    }
}
