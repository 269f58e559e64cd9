//! Auth Flow — navigation and validation core for the onboarding client.

pub mod account;
pub mod config;
pub mod error;
pub mod field;
pub mod flow;
pub mod form;
pub mod intent;
pub mod role;
pub mod validation;

pub use account::{AccountRequest, AccountService, Credentials, SimulatedAccountService};
pub use config::FlowConfig;
pub use error::{AccountError, Error, FlowError, Result};
pub use field::{FieldKind, FieldName};
pub use flow::{FlowHandle, FlowNavigator, FlowRuntime, FlowSnapshot, FlowStep};
pub use form::{StepForm, SubmissionState, SubmitOutcome};
pub use intent::{Intent, IntentParser};
pub use role::Role;
pub use validation::{ValidationError, ValidationErrors, validate};
