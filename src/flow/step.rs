//! Flow steps and the transitions allowed between them.

use serde::{Deserialize, Serialize};

use crate::field::FieldName;

/// One screen of the onboarding flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowStep {
    Welcome,
    SignIn,
    SignUp,
    Forgot,
    Otp,
    Reset,
    RoleSelect,
    Dashboard,
}

/// What caused a step change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Trigger {
    /// The user picked a destination (button or link).
    Choice,
    /// The step's form submitted successfully.
    Submitted,
    /// A role was picked on the role selection step.
    RoleChosen,
    /// Explicit sign-out from the dashboard.
    SignOut,
    /// Pop of the navigation stack.
    Back,
}

impl FlowStep {
    /// Check if a forward transition from `self` to `target` is valid for
    /// the given trigger. Back navigation is stack-based and not checked here.
    pub fn can_transition_to(&self, target: FlowStep, trigger: Trigger) -> bool {
        use FlowStep::*;
        use Trigger::*;
        matches!(
            (self, target, trigger),
            // User choices
            (Welcome, SignIn, Choice) | (Welcome, SignUp, Choice) |
            (Welcome, Forgot, Choice) | (SignIn, Forgot, Choice) |
            (SignIn, SignUp, Choice) | (SignUp, SignIn, Choice) |
            // Successful submits
            (SignIn, Dashboard, Submitted) | (SignUp, Dashboard, Submitted) |
            (Forgot, Otp, Submitted) | (Otp, Reset, Submitted) |
            (Reset, RoleSelect, Submitted) |
            // Role choice and sign-out
            (RoleSelect, Dashboard, RoleChosen) |
            (Dashboard, Welcome, SignOut)
        )
    }

    /// Where a successful submit on this step leads.
    pub fn next_on_success(&self) -> Option<FlowStep> {
        use FlowStep::*;
        match self {
            SignIn | SignUp => Some(Dashboard),
            Forgot => Some(Otp),
            Otp => Some(Reset),
            Reset => Some(RoleSelect),
            Welcome | RoleSelect | Dashboard => None,
        }
    }

    /// The form fields shown on this step, in display order.
    pub fn fields(&self) -> &'static [FieldName] {
        use FieldName::*;
        match self {
            Self::SignIn => &[Email, Password],
            Self::SignUp => &[Email, Password, ConfirmPassword],
            Self::Forgot => &[Email],
            Self::Otp => &[Code],
            Self::Reset => &[Password, ConfirmPassword],
            Self::Welcome | Self::RoleSelect | Self::Dashboard => &[],
        }
    }

    /// Whether this step owns a form controller.
    pub fn has_form(&self) -> bool {
        !self.fields().is_empty()
    }

    /// Whether this step ends the flow.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Dashboard)
    }

    /// Parse the wire/terminal spelling of a step.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "welcome" => Some(Self::Welcome),
            "sign_in" | "signin" => Some(Self::SignIn),
            "sign_up" | "signup" => Some(Self::SignUp),
            "forgot" => Some(Self::Forgot),
            "otp" => Some(Self::Otp),
            "reset" => Some(Self::Reset),
            "role_select" | "roles" => Some(Self::RoleSelect),
            "dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }
}

impl Default for FlowStep {
    fn default() -> Self {
        Self::Welcome
    }
}

impl std::fmt::Display for FlowStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Welcome => "welcome",
            Self::SignIn => "sign_in",
            Self::SignUp => "sign_up",
            Self::Forgot => "forgot",
            Self::Otp => "otp",
            Self::Reset => "reset",
            Self::RoleSelect => "role_select",
            Self::Dashboard => "dashboard",
        };
        write!(f, "{s}")
    }
}
