//! Error types for stack monitoring.

use std::time::Duration;

use thiserror::Error;

use crate::api::ApiError;
use crate::models::StackStatus;
use crate::monitor::FailureReason;

pub type Result<T> = std::result::Result<T, MonitorError>;

/// Terminal failure of a monitoring run.
#[derive(Error, Debug)]
pub enum MonitorError {
    #[error("polling stack {stack} failed after {attempts} attempt(s): {source}")]
    PollFailure {
        stack: String,
        attempts: u32,
        last_status: Option<StackStatus>,
        #[source]
        source: ApiError,
    },

    #[error("stack {stack} {reason}{}", reason_suffix(.status_reason))]
    StackFailed {
        stack: String,
        reason: FailureReason,
        last_status: StackStatus,
        /// Reason attached to the most recent event that carried one
        status_reason: Option<String>,
        /// First failed resource, formatted as `LogicalId: reason`
        root_cause: Option<String>,
    },

    #[error("stack {stack} reported unknown status {status}")]
    UnknownStatus { stack: String, status: String },

    #[error("stack {stack} does not exist")]
    StackNotFound { stack: String },

    #[error("timed out after {}s waiting for stack {stack}", .elapsed.as_secs())]
    TimedOut {
        stack: String,
        elapsed: Duration,
        last_status: Option<StackStatus>,
    },

    #[error("monitoring of stack {stack} was cancelled")]
    Cancelled {
        stack: String,
        last_status: Option<StackStatus>,
    },
}

fn reason_suffix(status_reason: &Option<String>) -> String {
    match status_reason {
        Some(reason) if !reason.is_empty() => format!(": {reason}"),
        _ => String::new(),
    }
}

impl MonitorError {
    pub fn stack(&self) -> &str {
        match self {
            MonitorError::PollFailure { stack, .. }
            | MonitorError::StackFailed { stack, .. }
            | MonitorError::UnknownStatus { stack, .. }
            | MonitorError::StackNotFound { stack }
            | MonitorError::TimedOut { stack, .. }
            | MonitorError::Cancelled { stack, .. } => stack,
        }
    }

    /// Short classified reason, e.g. `rolled back` or `cancelled`.
    pub fn reason(&self) -> String {
        match self {
            MonitorError::PollFailure { .. } => "poll failure".to_string(),
            MonitorError::StackFailed { reason, .. } => reason.to_string(),
            MonitorError::UnknownStatus { .. } => "unknown status".to_string(),
            MonitorError::StackNotFound { .. } => "not found".to_string(),
            MonitorError::TimedOut { .. } => "timed out".to_string(),
            MonitorError::Cancelled { .. } => "cancelled".to_string(),
        }
    }

    /// Last stack status observed before the run ended, if any.
    pub fn last_status(&self) -> Option<StackStatus> {
        match self {
            MonitorError::PollFailure { last_status, .. }
            | MonitorError::TimedOut { last_status, .. }
            | MonitorError::Cancelled { last_status, .. } => last_status.clone(),
            MonitorError::StackFailed { last_status, .. } => Some(last_status.clone()),
            MonitorError::UnknownStatus { status, .. } => Some(StackStatus::from(status.as_str())),
            MonitorError::StackNotFound { .. } => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, MonitorError::Cancelled { .. })
    }
}
