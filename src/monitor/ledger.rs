//! Record of stack events already observed

use std::collections::HashSet;

use crate::models::StackEvent;

/// Append-only, in-memory record of observed events keyed by event id.
#[derive(Debug, Default)]
pub struct EventLedger {
    seen: HashSet<String>,
    events: Vec<StackEvent>,
}

impl EventLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the event if its id has not been seen. Returns whether it was new.
    pub fn record_if_new(&mut self, event: StackEvent) -> bool {
        if self.seen.contains(&event.event_id) {
            return false;
        }
        self.seen.insert(event.event_id.clone());
        self.events.push(event);
        true
    }

    pub fn contains(&self, event_id: &str) -> bool {
        self.seen.contains(event_id)
    }

    /// Every recorded event in the order it was first observed
    pub fn all_seen(&self) -> &[StackEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Status reason of the most recently observed event that has one.
    pub fn latest_reason(&self) -> Option<&str> {
        self.events
            .iter()
            .rev()
            .filter_map(|e| e.status_reason.as_deref())
            .find(|r| !r.is_empty())
    }

    /// The first failed resource, usually the root cause of a rollback.
    pub fn first_failure(&self) -> Option<&StackEvent> {
        self.events
            .iter()
            .find(|e| e.status.is_failed() && !e.is_stack_event())
    }

    pub fn into_events(self) -> Vec<StackEvent> {
        self.events
    }
}
