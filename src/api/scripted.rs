//! Scripted, replayable [`StackApi`] implementation
//!
//! Plays back a recorded sequence of API responses. Used by the `replay`
//! command for dry runs and by tests to drive the monitor deterministically.

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use super::{ApiError, EventOrder, EventPage, StackApi};
use crate::models::{StackEvent, StackStatus};

/// A recorded deployment: one step per `describe_stack` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub stack_name: Option<String>,
    #[serde(default)]
    pub event_order: EventOrder,
    /// Split event listings into pages of this size
    #[serde(default)]
    pub page_size: Option<usize>,
    pub steps: Vec<Step>,
}

/// Response to a single `describe_stack` call.
///
/// Events are written oldest first; they are served in the script's
/// `event_order`. A step's events are the whole listing for that poll, so
/// repeating earlier events simulates the overlapping history a real API returns.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Fail {
        error: ScriptedError,
    },
    Status {
        status: StackStatus,
        #[serde(default)]
        events: Vec<StackEvent>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptedError {
    pub kind: ScriptedErrorKind,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ScriptedErrorKind {
    Transient,
    Throttled,
    Timeout,
    NotFound,
    Rejected,
}

impl Step {
    pub fn status(status: StackStatus, events: Vec<StackEvent>) -> Self {
        Step::Status { status, events }
    }

    pub fn error(kind: ScriptedErrorKind, message: impl Into<String>) -> Self {
        Step::Fail {
            error: ScriptedError {
                kind,
                message: message.into(),
            },
        }
    }
}

impl ScriptedError {
    fn to_api_error(&self, stack_name: &str) -> ApiError {
        let message = self.message.clone();
        match self.kind {
            ScriptedErrorKind::Transient => ApiError::Transient { message },
            ScriptedErrorKind::Throttled => ApiError::Throttled { message },
            ScriptedErrorKind::Timeout => ApiError::Timeout,
            ScriptedErrorKind::NotFound => ApiError::NotFound {
                stack: stack_name.to_string(),
            },
            ScriptedErrorKind::Rejected => ApiError::Rejected { message },
        }
    }
}

impl ReplayScript {
    pub fn from_yaml(content: &str) -> Result<Self> {
        let script: ReplayScript =
            serde_yaml::from_str(content).context("Failed to parse replay script")?;
        if script.steps.is_empty() {
            anyhow::bail!("Replay script has no steps");
        }
        if script.page_size == Some(0) {
            anyhow::bail!("Replay script page_size must be greater than zero");
        }
        Ok(script)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read replay script: {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid replay script: {}", path.display()))
    }
}

/// [`StackApi`] that answers from a [`ReplayScript`].
///
/// Each `describe_stack` call consumes one step; once the script is exhausted
/// the last step repeats. `list_stack_events` serves the events of the most
/// recent status step.
pub struct ScriptedApi {
    script: ReplayScript,
    cursor: Mutex<Cursor>,
    describe_calls: AtomicUsize,
    list_calls: AtomicUsize,
}

#[derive(Default)]
struct Cursor {
    next_step: usize,
    current_events: Vec<StackEvent>,
}

impl ScriptedApi {
    pub fn new(steps: Vec<Step>) -> Self {
        Self::from_script(ReplayScript {
            stack_name: None,
            event_order: EventOrder::default(),
            page_size: None,
            steps,
        })
    }

    pub fn from_script(script: ReplayScript) -> Self {
        Self {
            script,
            cursor: Mutex::new(Cursor::default()),
            describe_calls: AtomicUsize::new(0),
            list_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.script.page_size = Some(page_size.max(1));
        self
    }

    pub fn with_event_order(mut self, order: EventOrder) -> Self {
        self.script.event_order = order;
        self
    }

    pub fn script(&self) -> &ReplayScript {
        &self.script
    }

    pub fn describe_calls(&self) -> usize {
        self.describe_calls.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst)
    }

    fn lock_cursor(&self) -> std::sync::MutexGuard<'_, Cursor> {
        self.cursor.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current listing in serving order.
    fn served_events(&self) -> Vec<StackEvent> {
        let mut events = self.lock_cursor().current_events.clone();
        if self.script.event_order == EventOrder::NewestFirst {
            events.reverse();
        }
        events
    }
}

impl StackApi for ScriptedApi {
    fn describe_stack(&self, stack_name: &str) -> Result<StackStatus, ApiError> {
        self.describe_calls.fetch_add(1, Ordering::SeqCst);

        let mut cursor = self.lock_cursor();
        let last = self.script.steps.len().saturating_sub(1);
        let index = cursor.next_step.min(last);
        cursor.next_step = cursor.next_step.saturating_add(1);

        match self.script.steps.get(index) {
            Some(Step::Status { status, events }) => {
                cursor.current_events = events.clone();
                Ok(status.clone())
            }
            Some(Step::Fail { error }) => Err(error.to_api_error(stack_name)),
            None => Err(ApiError::NotFound {
                stack: stack_name.to_string(),
            }),
        }
    }

    fn list_stack_events(
        &self,
        _stack_name: &str,
        next_token: Option<&str>,
    ) -> Result<EventPage, ApiError> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);

        let events = self.served_events();
        let offset = match next_token {
            Some(token) => token.parse::<usize>().map_err(|_| ApiError::Rejected {
                message: format!("invalid next token: {token}"),
            })?,
            None => 0,
        };

        let page_size = self.script.page_size.unwrap_or(events.len().max(1));
        let end = offset.saturating_add(page_size).min(events.len());
        let page = events.get(offset..end).map(<[_]>::to_vec).unwrap_or_default();
        let next_token = (end < events.len()).then(|| end.to_string());

        Ok(EventPage {
            events: page,
            next_token,
        })
    }

    fn event_order(&self) -> EventOrder {
        self.script.event_order
    }
}
