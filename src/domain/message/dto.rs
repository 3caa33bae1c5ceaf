use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::entity::problem_message::RecordStatus;
use crate::utils::AppError;

/// Status token supplied by the monitoring system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerStatus {
    /// `PROBLEM`: the monitored condition has started
    Opened,
    /// `OK`: the monitored condition has cleared
    Resolved,
}

impl TriggerStatus {
    pub const OPENED_TOKEN: &'static str = "PROBLEM";
    pub const RESOLVED_TOKEN: &'static str = "OK";

    pub fn as_token(&self) -> &'static str {
        match self {
            TriggerStatus::Opened => Self::OPENED_TOKEN,
            TriggerStatus::Resolved => Self::RESOLVED_TOKEN,
        }
    }
}

impl FromStr for TriggerStatus {
    type Err = AppError;

    /// Tokens are matched exactly; `ok` or `Problem` are rejected.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            Self::OPENED_TOKEN => Ok(TriggerStatus::Opened),
            Self::RESOLVED_TOKEN => Ok(TriggerStatus::Resolved),
            other => Err(AppError::validation_error(format!(
                "Unknown status: {} (expected '{}' or '{}')",
                other,
                Self::OPENED_TOKEN,
                Self::RESOLVED_TOKEN
            ))),
        }
    }
}

impl fmt::Display for TriggerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

/// One monitoring event, as handed to the correlator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub event_id: String,
    pub problem_key: String,
    pub message_text: String,
    pub status: TriggerStatus,
}

impl Invocation {
    pub fn new(
        event_id: impl Into<String>,
        problem_key: impl Into<String>,
        message_text: impl Into<String>,
        status: TriggerStatus,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            problem_key: problem_key.into(),
            message_text: message_text.into(),
            status,
        }
    }
}

/// Values written by an upsert; `id` and `timestamp` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub event_id: String,
    pub message_id: Option<i64>,
    pub problem_key: String,
    pub status: RecordStatus,
}

/// The record currently standing for a problem in the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMessage {
    pub event_id: String,
    pub message_id: i64,
}

/// Terminal result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Problem message posted and recorded as active.
    Sent { event_id: String, message_id: i64 },
    /// Problem message could not be posted; nothing was recorded.
    SendFailed { event_id: String },
    /// Original problem message removed from the channel.
    Deleted { problem_key: String, message_id: i64 },
    /// Original problem message could not be removed; records were still resolved.
    DeleteFailed { problem_key: String, message_id: i64 },
    /// No active message existed; a resolution notice was posted instead.
    ResolutionNoticeSent { problem_key: String, message_id: i64 },
    /// No active message existed and the resolution notice could not be posted.
    ResolutionNoticeFailed { problem_key: String },
    /// No active message existed and resolution notices are disabled.
    NoActiveMessage { problem_key: String },
}

impl Outcome {
    /// Whether the outbound action this outcome reports went through.
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            Outcome::SendFailed { .. }
                | Outcome::DeleteFailed { .. }
                | Outcome::ResolutionNoticeFailed { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Sent {
                event_id,
                message_id,
            } => write!(f, "Sent problem message {} for event {}", message_id, event_id),
            Outcome::SendFailed { event_id } => {
                write!(f, "Failed to send problem message for event {}", event_id)
            }
            Outcome::Deleted {
                problem_key,
                message_id,
            } => write!(
                f,
                "Deleted original problem message {} for problem {}",
                message_id, problem_key
            ),
            Outcome::DeleteFailed {
                problem_key,
                message_id,
            } => write!(
                f,
                "Failed to delete original problem message {} for problem {}",
                message_id, problem_key
            ),
            Outcome::ResolutionNoticeSent {
                problem_key,
                message_id,
            } => write!(
                f,
                "No active problem message found for {}, sent resolution notification {}",
                problem_key, message_id
            ),
            Outcome::ResolutionNoticeFailed { problem_key } => write!(
                f,
                "No active problem message found for {}, failed to send resolution notification",
                problem_key
            ),
            Outcome::NoActiveMessage { problem_key } => {
                write!(f, "No active problem message found for {}", problem_key)
            }
        }
    }
}
