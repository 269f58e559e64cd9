//! Step form controller — one screen's fields, errors, focus, and submit cycle.

use std::collections::BTreeMap;

use secrecy::SecretString;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::state::SubmissionState;
use crate::account::{AccountRequest, Credentials};
use crate::error::{AccountError, FlowError};
use crate::field::FieldName;
use crate::flow::FlowStep;
use crate::validation::{ValidationErrors, validate_all};

/// Message shown when an account operation fails.
pub const GENERIC_SUBMISSION_ERROR: &str = "Something went wrong. Please try again.";

/// Identifies one in-flight submit of one form instance.
///
/// A completion carrying a ticket that no longer matches is discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubmissionTicket {
    form_id: Uuid,
    attempt_id: Uuid,
}

impl SubmissionTicket {
    /// The form instance this ticket was issued by.
    pub fn form_id(&self) -> Uuid {
        self.form_id
    }
}

/// Result of a submit intent.
#[derive(Debug, Clone)]
pub enum SubmitOutcome {
    /// Validation passed; the request must be run and resolved with `ticket`.
    Started {
        ticket: SubmissionTicket,
        request: AccountRequest,
    },
    /// At least one field failed; errors are stored on the form.
    Invalid(ValidationErrors),
    /// A submit is already in flight.
    Ignored,
}

/// Result of feeding an account operation's completion back to a form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// The operation succeeded; the flow should advance.
    Succeeded,
    /// The operation failed; the form is in `Failed`.
    Failed,
    /// The ticket was stale and the completion was dropped.
    Discarded,
}

/// Mutable state of one flow step's form.
#[derive(Debug, Clone)]
pub struct StepForm {
    id: Uuid,
    step: FlowStep,
    values: BTreeMap<FieldName, String>,
    errors: ValidationErrors,
    focus: Option<FieldName>,
    submission: SubmissionState,
    submission_error: Option<String>,
    in_flight: Option<SubmissionTicket>,
}

impl StepForm {
    /// Create an empty form for a step. Steps without fields have no form.
    pub fn new(step: FlowStep) -> Result<Self, FlowError> {
        if !step.has_form() {
            return Err(FlowError::NoForm { step });
        }
        let values = step
            .fields()
            .iter()
            .map(|field| (*field, String::new()))
            .collect();
        Ok(Self {
            id: Uuid::new_v4(),
            step,
            values,
            errors: ValidationErrors::new(),
            focus: None,
            submission: SubmissionState::Idle,
            submission_error: None,
            in_flight: None,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn step(&self) -> FlowStep {
        self.step
    }

    pub fn value(&self, field: FieldName) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn values(&self) -> &BTreeMap<FieldName, String> {
        &self.values
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn focus_state(&self) -> Option<FieldName> {
        self.focus
    }

    pub fn submission(&self) -> SubmissionState {
        self.submission
    }

    /// User-facing message for the last failed operation.
    pub fn submission_error(&self) -> Option<&str> {
        self.submission_error.as_deref()
    }

    /// Store a field value. Errors are left as they are until the next submit.
    pub fn set_field(&mut self, field: FieldName, value: impl Into<String>) -> Result<(), FlowError> {
        let slot = self
            .values
            .get_mut(&field)
            .ok_or(FlowError::UnknownField { step: self.step, field })?;
        *slot = value.into();
        Ok(())
    }

    pub fn focus(&mut self, field: FieldName) -> Result<(), FlowError> {
        if !self.values.contains_key(&field) {
            return Err(FlowError::UnknownField { step: self.step, field });
        }
        self.focus = Some(field);
        Ok(())
    }

    pub fn blur(&mut self) {
        self.focus = None;
    }

    /// Validate every field and, if all pass, start an account operation.
    pub fn submit(&mut self) -> SubmitOutcome {
        if self.submission.is_submitting() {
            debug!(step = %self.step, form_id = %self.id, "Submit ignored, already submitting");
            return SubmitOutcome::Ignored;
        }

        self.errors = validate_all(&self.values);
        if !self.errors.is_empty() {
            debug!(step = %self.step, failing = self.errors.len(), "Submit blocked by validation");
            return SubmitOutcome::Invalid(self.errors.clone());
        }

        let Some(request) = self.build_request() else {
            warn!(step = %self.step, "Step has no account operation");
            return SubmitOutcome::Ignored;
        };

        let ticket = SubmissionTicket {
            form_id: self.id,
            attempt_id: Uuid::new_v4(),
        };
        self.transition(SubmissionState::Submitting);
        self.submission_error = None;
        self.in_flight = Some(ticket);

        info!(
            step = %self.step,
            form_id = %self.id,
            operation = request.operation(),
            "Submission started"
        );

        SubmitOutcome::Started { ticket, request }
    }

    /// Apply the outcome of the operation started with `ticket`.
    pub fn resolve(&mut self, ticket: SubmissionTicket, result: Result<(), AccountError>) -> Resolution {
        if self.in_flight != Some(ticket) {
            debug!(step = %self.step, form_id = %self.id, "Stale completion discarded");
            return Resolution::Discarded;
        }
        self.in_flight = None;

        match result {
            Ok(()) => {
                self.transition(SubmissionState::Idle);
                info!(step = %self.step, form_id = %self.id, "Submission succeeded");
                Resolution::Succeeded
            }
            Err(e) => {
                self.transition(SubmissionState::Failed);
                self.submission_error = Some(GENERIC_SUBMISSION_ERROR.to_string());
                warn!(step = %self.step, form_id = %self.id, error = %e, "Submission failed");
                Resolution::Failed
            }
        }
    }

    fn transition(&mut self, target: SubmissionState) {
        if !self.submission.can_transition_to(target) {
            warn!(
                step = %self.step,
                from = %self.submission,
                to = %target,
                "Unexpected submission transition"
            );
        }
        self.submission = target;
    }

    fn field_text(&self, field: FieldName) -> String {
        self.values.get(&field).cloned().unwrap_or_default()
    }

    fn credentials(&self) -> Credentials {
        Credentials {
            email: self.field_text(FieldName::Email),
            password: SecretString::from(self.field_text(FieldName::Password)),
        }
    }

    fn build_request(&self) -> Option<AccountRequest> {
        let request = match self.step {
            FlowStep::SignIn => AccountRequest::SignIn(self.credentials()),
            FlowStep::SignUp => AccountRequest::SignUp(self.credentials()),
            FlowStep::Forgot => AccountRequest::RequestPasswordReset {
                email: self.field_text(FieldName::Email),
            },
            FlowStep::Otp => AccountRequest::VerifyOtp {
                code: self.field_text(FieldName::Code),
            },
            FlowStep::Reset => AccountRequest::ResetPassword {
                new_password: SecretString::from(self.field_text(FieldName::Password)),
            },
            FlowStep::Welcome | FlowStep::RoleSelect | FlowStep::Dashboard => return None,
        };
        Some(request)
    }
}
