//! Read-only view of the flow handed to presenters after every mutation.

use std::collections::BTreeMap;

use serde::Serialize;

use super::FlowStep;
use crate::field::FieldName;
use crate::form::{StepForm, SubmissionState};
use crate::role::Role;

/// Everything a presenter needs to render the active step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowSnapshot {
    pub step: FlowStep,
    pub fields: BTreeMap<FieldName, String>,
    pub errors: BTreeMap<FieldName, String>,
    pub focus: Option<FieldName>,
    pub submission: SubmissionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission_error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    pub can_go_back: bool,
}

impl FlowSnapshot {
    pub(crate) fn capture(
        step: FlowStep,
        form: Option<&StepForm>,
        role: Option<Role>,
        can_go_back: bool,
    ) -> Self {
        match form {
            Some(form) => Self {
                step,
                fields: form.values().clone(),
                errors: form.errors().to_messages(),
                focus: form.focus_state(),
                submission: form.submission(),
                submission_error: form.submission_error().map(str::to_string),
                role,
                can_go_back,
            },
            None => Self {
                step,
                fields: BTreeMap::new(),
                errors: BTreeMap::new(),
                focus: None,
                submission: SubmissionState::Idle,
                submission_error: None,
                role,
                can_go_back,
            },
        }
    }

    /// Value of a field on the active step, if it has one.
    pub fn field(&self, field: FieldName) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn error(&self, field: FieldName) -> Option<&str> {
        self.errors.get(&field).map(String::as_str)
    }
}

impl Default for FlowSnapshot {
    fn default() -> Self {
        Self::capture(FlowStep::Welcome, None, None, false)
    }
}
