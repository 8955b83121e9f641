//! Orchestration API capability consumed by the monitor
//!
//! The monitor never talks to a cloud provider directly. It is handed
//! something implementing [`StackApi`] and only ever reads from it.

mod scripted;

pub use scripted::{ReplayScript, ScriptedApi, ScriptedError, ScriptedErrorKind, Step};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{StackEvent, StackStatus};

/// Errors reported by a [`StackApi`] implementation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("transient API error: {message}")]
    Transient { message: String },

    #[error("request throttled: {message}")]
    Throttled { message: String },

    #[error("request timed out")]
    Timeout,

    #[error("stack {stack} does not exist")]
    NotFound { stack: String },

    /// The API refused the request outright (bad credentials, validation error).
    #[error("request rejected: {message}")]
    Rejected { message: String },
}

impl ApiError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ApiError::Transient { .. } | ApiError::Throttled { .. } | ApiError::Timeout
        )
    }
}

/// Order in which an API returns events within and across pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventOrder {
    #[default]
    NewestFirst,
    OldestFirst,
}

/// One page of a stack's event history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventPage {
    pub events: Vec<StackEvent>,
    pub next_token: Option<String>,
}

/// Read-only view of the orchestration service.
pub trait StackApi: Send + Sync {
    /// Current status of the stack. Missing stacks yield [`ApiError::NotFound`].
    fn describe_stack(&self, stack_name: &str) -> Result<StackStatus, ApiError>;

    /// One page of recent events; pass the previous page's `next_token` to continue.
    fn list_stack_events(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> Result<EventPage, ApiError>;

    fn event_order(&self) -> EventOrder {
        EventOrder::NewestFirst
    }
}

impl<T: StackApi + ?Sized> StackApi for &T {
    fn describe_stack(&self, stack_name: &str) -> Result<StackStatus, ApiError> {
        (**self).describe_stack(stack_name)
    }

    fn list_stack_events(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> Result<EventPage, ApiError> {
        (**self).list_stack_events(stack_name, next_token)
    }

    fn event_order(&self) -> EventOrder {
        (**self).event_order()
    }
}
