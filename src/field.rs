//! Form field names and the validation rule each one carries.

use serde::{Deserialize, Serialize};

/// A named input on one of the flow's forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FieldName {
    Email,
    Password,
    ConfirmPassword,
    /// One-time verification code on the OTP step.
    Code,
}

/// The validation rule applied to a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Email,
    Password,
    ConfirmPassword,
}

impl FieldName {
    /// The rule checked for this field on submit, if any.
    ///
    /// `Code` has no client-side rule; the account service judges it.
    pub fn kind(&self) -> Option<FieldKind> {
        match self {
            Self::Email => Some(FieldKind::Email),
            Self::Password => Some(FieldKind::Password),
            Self::ConfirmPassword => Some(FieldKind::ConfirmPassword),
            Self::Code => None,
        }
    }

    /// Parse the wire/terminal spelling of a field name, ignoring case.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            "confirmpassword" | "confirm_password" | "confirm" => Some(Self::ConfirmPassword),
            "code" | "otp" => Some(Self::Code),
            _ => None,
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Email => "email",
            Self::Password => "password",
            Self::ConfirmPassword => "confirmPassword",
            Self::Code => "code",
        };
        write!(f, "{s}")
    }
}
