//! Step form controllers.
//!
//! Each screen with inputs owns one `StepForm`. It holds the screen's field
//! values, validation errors, focus and submission state, and decides when an
//! account operation may start. It never changes the active step itself.

pub mod controller;
pub mod state;

pub use crate::field::FieldName;
pub use controller::{
    GENERIC_SUBMISSION_ERROR, Resolution, StepForm, SubmissionTicket, SubmitOutcome,
};
pub use state::SubmissionState;
