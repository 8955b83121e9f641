//! Shared fixtures for integration tests

use std::collections::HashMap;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use stackwatch::api::{ApiError, EventPage, ScriptedApi, StackApi};
use stackwatch::logging::MemorySink;
use stackwatch::models::{StackEvent, StackStatus, STACK_RESOURCE_TYPE};
use stackwatch::monitor::{MonitorConfig, RetryPolicy};

/// Monitor config that polls as fast as possible
pub fn fast_config() -> MonitorConfig {
    MonitorConfig {
        poll_interval: Duration::from_millis(1),
        retry: RetryPolicy::new(5, Duration::from_millis(1), Duration::from_millis(2)),
        ..Default::default()
    }
}

/// Event on the stack itself at `12:00:00 + second`
pub fn stack_event(stack: &str, id: &str, second: u32, status: &str) -> StackEvent {
    StackEvent::new(
        id,
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(second as i64),
        stack,
        STACK_RESOURCE_TYPE,
        StackStatus::from(status),
    )
}

/// Event on a resource inside the stack at `12:00:00 + second`
pub fn resource_event(id: &str, second: u32, logical_id: &str, status: &str) -> StackEvent {
    StackEvent::new(
        id,
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap() + chrono::Duration::seconds(second as i64),
        logical_id,
        "AWS::Lambda::Function",
        StackStatus::from(status),
    )
}

/// Event ids in the order they reached the sink
pub fn logged_event_ids(sink: &MemorySink) -> Vec<String> {
    sink.with_field("event_id")
        .iter()
        .filter_map(|r| r.get("event_id").map(str::to_string))
        .collect()
}

/// Routes calls to a separate scripted API per stack name
#[derive(Default)]
pub struct MultiStackApi {
    stacks: HashMap<String, ScriptedApi>,
}

impl MultiStackApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stack(mut self, name: &str, api: ScriptedApi) -> Self {
        self.stacks.insert(name.to_string(), api);
        self
    }

    pub fn stack(&self, name: &str) -> &ScriptedApi {
        &self.stacks[name]
    }

    fn lookup(&self, name: &str) -> Result<&ScriptedApi, ApiError> {
        self.stacks.get(name).ok_or_else(|| ApiError::NotFound {
            stack: name.to_string(),
        })
    }
}

impl StackApi for MultiStackApi {
    fn describe_stack(&self, stack_name: &str) -> Result<StackStatus, ApiError> {
        self.lookup(stack_name)?.describe_stack(stack_name)
    }

    fn list_stack_events(
        &self,
        stack_name: &str,
        next_token: Option<&str>,
    ) -> Result<EventPage, ApiError> {
        self.lookup(stack_name)?
            .list_stack_events(stack_name, next_token)
    }
}
