//! Submission state machine for a single form.

use serde::{Deserialize, Serialize};

/// Where a form is in its submit cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionState {
    /// Nothing in flight.
    Idle,
    /// An account operation is running; further submits are ignored.
    Submitting,
    /// The last account operation failed. The user may resubmit.
    Failed,
}

impl SubmissionState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: SubmissionState) -> bool {
        use SubmissionState::*;
        matches!(
            (self, target),
            (Idle, Submitting) | (Failed, Submitting) | (Submitting, Idle) | (Submitting, Failed)
        )
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

impl Default for SubmissionState {
    fn default() -> Self {
        Self::Idle
    }
}

impl std::fmt::Display for SubmissionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Submitting => "submitting",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}
