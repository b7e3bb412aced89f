use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Event, render};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionKind {
    Command,
    Broadcast,
    /// Kept so dispatch can report it; never executed.
    Unknown(String),
}

impl ActionKind {
    fn parse(s: &str) -> Self {
        match s {
            "command" => ActionKind::Command,
            "broadcast" => ActionKind::Broadcast,
            other => ActionKind::Unknown(other.to_string()),
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Command => write!(f, "command"),
            ActionKind::Broadcast => write!(f, "broadcast"),
            ActionKind::Unknown(t) => write!(f, "{}", t),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRule {
    pub kind: ActionKind,
    pub template: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum RuleParseError {
    #[error("malformed action rule: {0} (expected type:value)")]
    MissingSeparator(String),
}

impl ActionRule {
    /// Parses `type:template`, splitting on the first ':' and trimming both halves.
    pub fn parse(s: &str) -> Result<Self, RuleParseError> {
        let (kind, template) = s
            .split_once(':')
            .ok_or_else(|| RuleParseError::MissingSeparator(s.to_string()))?;
        Ok(Self {
            kind: ActionKind::parse(kind.trim()),
            template: template.trim().to_string(),
        })
    }

    pub fn render(&self, event: &Event) -> String {
        render(&self.template, event)
    }
}
