use std::fmt;

use serde::{Deserialize, Serialize};

pub type ItemIndex = usize;

/// Processing status of one work item. Only `Pending` is non-terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Succeeded,
    AlreadySatisfied,
    Failed,
    Error,
}

impl ItemStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, ItemStatus::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Pending => "pending",
            ItemStatus::Succeeded => "succeeded",
            ItemStatus::AlreadySatisfied => "already_satisfied",
            ItemStatus::Failed => "failed",
            ItemStatus::Error => "error",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One target of a batch run (a company or job URL) and what happened to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkItem {
    pub index: ItemIndex,
    pub target: String,
    pub status: ItemStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured payload produced by the action (e.g. extracted job listings).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

impl WorkItem {
    pub fn pending(index: ItemIndex, target: impl Into<String>) -> Self {
        Self {
            index,
            target: target.into(),
            status: ItemStatus::Pending,
            message: None,
            detail: None,
        }
    }

    pub(crate) fn record(&mut self, result: Result<ActionOutcome, String>) {
        match result {
            Ok(ActionOutcome::Succeeded { detail }) => {
                self.status = ItemStatus::Succeeded;
                self.detail = detail;
            }
            Ok(ActionOutcome::AlreadySatisfied) => {
                self.status = ItemStatus::AlreadySatisfied;
            }
            Ok(ActionOutcome::Failed { reason }) => {
                self.status = ItemStatus::Failed;
                self.message = Some(reason);
            }
            Err(message) => {
                self.status = ItemStatus::Error;
                self.message = Some(message);
            }
        }
    }
}

/// What a per-item action reports when it returns normally.
///
/// Errors raised by the action are not an outcome; the runner records them
/// as [`ItemStatus::Error`].
#[derive(Debug, Clone, PartialEq)]
pub enum ActionOutcome {
    Succeeded { detail: Option<serde_json::Value> },
    AlreadySatisfied,
    Failed { reason: String },
}

impl ActionOutcome {
    pub fn succeeded() -> Self {
        ActionOutcome::Succeeded { detail: None }
    }

    pub fn succeeded_with(detail: serde_json::Value) -> Self {
        ActionOutcome::Succeeded {
            detail: Some(detail),
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        ActionOutcome::Failed {
            reason: reason.into(),
        }
    }
}
