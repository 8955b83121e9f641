use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::status::StackStatus;

/// Resource type the orchestration API uses for events about the stack itself.
pub const STACK_RESOURCE_TYPE: &str = "AWS::CloudFormation::Stack";

/// A single state-change event reported for a stack or one of its resources.
///
/// Events are immutable once observed; `event_id` is their identity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub logical_resource_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub physical_resource_id: Option<String>,
    pub resource_type: String,
    pub status: StackStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_reason: Option<String>,
}

/// How loudly an event should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EventSeverity {
    Info,
    Warning,
    Error,
}

impl StackEvent {
    pub fn new(
        event_id: impl Into<String>,
        timestamp: DateTime<Utc>,
        logical_resource_id: impl Into<String>,
        resource_type: impl Into<String>,
        status: StackStatus,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            timestamp,
            logical_resource_id: logical_resource_id.into(),
            physical_resource_id: None,
            resource_type: resource_type.into(),
            status,
            status_reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.status_reason = Some(reason.into());
        self
    }

    /// True when the event describes the stack itself rather than a resource in it.
    pub fn is_stack_event(&self) -> bool {
        self.resource_type == STACK_RESOURCE_TYPE
    }

    pub fn severity(&self) -> EventSeverity {
        let status = &self.status;
        if status.is_failed() {
            EventSeverity::Error
        } else if status.is_rollback()
            || !status.is_recognized()
            || *status == StackStatus::DeleteSkipped
        {
            EventSeverity::Warning
        } else {
            EventSeverity::Info
        }
    }

    /// One-line human summary, e.g. `CREATE_FAILED Bucket (AWS::S3::Bucket): Access denied`
    pub fn summary(&self) -> String {
        let mut line = format!(
            "{} {} ({})",
            self.status, self.logical_resource_id, self.resource_type
        );
        if let Some(reason) = self.status_reason.as_deref().filter(|r| !r.is_empty()) {
            line.push_str(": ");
            line.push_str(reason);
        }
        line
    }
}
