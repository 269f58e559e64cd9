//! Onboarding flow — steps, navigation, snapshots, and the runtime actor.

pub mod navigator;
pub mod runtime;
pub mod snapshot;
pub mod step;

pub use navigator::{FlowNavigator, NavigationEvent, Transition};
pub use runtime::{FlowHandle, FlowRuntime};
pub use snapshot::FlowSnapshot;
pub use step::{FlowStep, Trigger};
