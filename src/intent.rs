//! User intents delivered to the flow, and a parser for the terminal presenter.

use serde::{Deserialize, Serialize};

use crate::field::FieldName;
use crate::flow::FlowStep;

/// A user-triggered request to the flow core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Intent {
    SetField { field: FieldName, value: String },
    Focus { field: FieldName },
    Blur,
    Submit,
    Back,
    /// Follow a link or button to another step.
    Choose { step: FlowStep },
    /// Raw role identifier; validated by the navigator.
    SelectRole { role: String },
    SignOut,
    /// Stop the runtime.
    Shutdown,
}

impl Intent {
    /// Intent name for logs. Field values are never logged.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SetField { .. } => "set_field",
            Self::Focus { .. } => "focus",
            Self::Blur => "blur",
            Self::Submit => "submit",
            Self::Back => "back",
            Self::Choose { .. } => "choose",
            Self::SelectRole { .. } => "select_role",
            Self::SignOut => "sign_out",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Parses terminal input lines into intents.
pub struct IntentParser;

impl IntentParser {
    /// Parse one line. Returns `None` for unrecognised input.
    pub fn parse(line: &str) -> Option<Intent> {
        let trimmed = line.trim();
        let lower = trimmed.to_lowercase();

        match lower.as_str() {
            "submit" | "ok" => Some(Intent::Submit),
            "back" | "/back" => Some(Intent::Back),
            "blur" => Some(Intent::Blur),
            "signout" | "sign out" | "logout" => Some(Intent::SignOut),
            "quit" | "exit" | "/quit" => Some(Intent::Shutdown),
            _ => parse_with_args(trimmed),
        }
    }
}

/// `set <field> <value>`, `focus <field>`, `go <step>`, `role <id>`, or a
/// JSON-encoded intent.
fn parse_with_args(trimmed: &str) -> Option<Intent> {
    if trimmed.starts_with('{') {
        return serde_json::from_str(trimmed).ok();
    }

    let (command, rest) = trimmed.split_once(' ').unwrap_or((trimmed, ""));
    match command.to_lowercase().as_str() {
        "set" => {
            let (field, value) = rest.split_once(' ').unwrap_or((rest, ""));
            Some(Intent::SetField {
                field: FieldName::parse(field)?,
                value: value.to_string(),
            })
        }
        "focus" => Some(Intent::Focus {
            field: FieldName::parse(rest.trim())?,
        }),
        "go" => Some(Intent::Choose {
            step: FlowStep::parse(&rest.trim().to_lowercase())?,
        }),
        // The identifier is passed through untouched so unknown roles are
        // reported by the navigator.
        "role" => Some(Intent::SelectRole {
            role: rest.trim().to_string(),
        }),
        _ => None,
    }
}
