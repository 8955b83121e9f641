//! Fetching stack status and fresh events from the orchestration API

use std::time::{Duration, Instant};

use crate::api::{ApiError, EventOrder, StackApi};
use crate::cancel::CancelToken;
use crate::error::MonitorError;
use crate::logging::{Level, LogRecord, LogSink};
use crate::models::{StackEvent, StackStatus};

use super::ledger::EventLedger;
use super::retry::{with_retry, RetryError, RetryPolicy};

/// Result of one poll.
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot {
    /// `None` when the API reports that the stack does not exist
    pub status: Option<StackStatus>,
    /// Listed events in chronological order, possibly including ones already seen
    pub events: Vec<StackEvent>,
    /// API calls made, retries included
    pub attempts: u32,
}

/// Issues describe/list calls with bounded retry.
pub struct Poller<'a, A: StackApi + ?Sized> {
    api: &'a A,
    retry: &'a RetryPolicy,
    cancel: &'a CancelToken,
    sink: &'a dyn LogSink,
    max_pages: usize,
    started: Instant,
    timeout: Option<Duration>,
}

impl<'a, A: StackApi + ?Sized> Poller<'a, A> {
    pub fn new(
        api: &'a A,
        retry: &'a RetryPolicy,
        cancel: &'a CancelToken,
        sink: &'a dyn LogSink,
        max_pages: usize,
    ) -> Self {
        Self {
            api,
            retry,
            cancel,
            sink,
            max_pages: max_pages.max(1),
            started: Instant::now(),
            timeout: None,
        }
    }

    /// Stop retrying once `timeout` has passed since `started`.
    pub fn with_timeout(mut self, started: Instant, timeout: Option<Duration>) -> Self {
        self.started = started;
        self.timeout = timeout;
        self
    }

    /// Fetch the current status and recent events of `stack_name`.
    ///
    /// Event pages are followed until one contains an event the ledger already
    /// holds, the API has no more pages, or the page limit is hit.
    pub fn fetch_latest(
        &self,
        stack_name: &str,
        ledger: &EventLedger,
        last_status: Option<&StackStatus>,
    ) -> Result<PollSnapshot, MonitorError> {
        let mut attempts = 0;

        let status = match self.call(stack_name, last_status, "describe_stack", || {
            self.api.describe_stack(stack_name)
        }) {
            Ok((status, n)) => {
                attempts += n;
                Some(status)
            }
            Err(CallError::NotFound(n)) => {
                attempts += n;
                None
            }
            Err(CallError::Monitor(e)) => return Err(e),
        };

        let mut events = Vec::new();
        let mut next_token: Option<String> = None;
        for page_number in 1..=self.max_pages {
            let token = next_token.take();
            let page = match self.call(stack_name, last_status, "list_stack_events", || {
                self.api.list_stack_events(stack_name, token.as_deref())
            }) {
                Ok((page, n)) => {
                    attempts += n;
                    page
                }
                Err(CallError::NotFound(n)) => {
                    attempts += n;
                    break;
                }
                Err(CallError::Monitor(e)) => return Err(e),
            };

            let reached_known = page.events.iter().any(|e| ledger.contains(&e.event_id));
            events.extend(page.events);

            match page.next_token {
                Some(token) if !reached_known => {
                    if page_number == self.max_pages {
                        self.sink.record(
                            LogRecord::new(Level::Debug, "event page limit reached")
                                .field("stack", stack_name)
                                .field("pages", page_number),
                        );
                    }
                    next_token = Some(token);
                }
                _ => break,
            }
        }

        Ok(PollSnapshot {
            status,
            events: chronological(events, self.api.event_order()),
            attempts,
        })
    }

    fn call<T>(
        &self,
        stack_name: &str,
        last_status: Option<&StackStatus>,
        operation: &str,
        op: impl FnMut() -> Result<T, ApiError>,
    ) -> Result<(T, u32), CallError> {
        let deadline = self
            .timeout
            .and_then(|timeout| self.started.checked_add(timeout));
        match with_retry(
            self.retry,
            self.cancel,
            deadline,
            self.sink,
            operation,
            stack_name,
            op,
        ) {
            Ok(value) => Ok(value),
            Err(RetryError::Failed {
                attempts,
                source: ApiError::NotFound { .. },
            }) => Err(CallError::NotFound(attempts)),
            Err(RetryError::Failed { attempts, source }) => {
                Err(CallError::Monitor(MonitorError::PollFailure {
                    stack: stack_name.to_string(),
                    attempts,
                    last_status: last_status.cloned(),
                    source,
                }))
            }
            Err(RetryError::Cancelled) => Err(CallError::Monitor(MonitorError::Cancelled {
                stack: stack_name.to_string(),
                last_status: last_status.cloned(),
            })),
            Err(RetryError::TimedOut) => Err(CallError::Monitor(MonitorError::TimedOut {
                stack: stack_name.to_string(),
                elapsed: self.started.elapsed(),
                last_status: last_status.cloned(),
            })),
        }
    }
}

enum CallError {
    NotFound(u32),
    Monitor(MonitorError),
}

/// Normalize a listing to oldest-first.
///
/// Newest-first listings are reversed before the stable timestamp sort so that
/// events sharing a timestamp keep their causal order.
pub fn chronological(mut events: Vec<StackEvent>, order: EventOrder) -> Vec<StackEvent> {
    if order == EventOrder::NewestFirst {
        events.reverse();
    }
    events.sort_by_key(|e| e.timestamp);
    events
}
