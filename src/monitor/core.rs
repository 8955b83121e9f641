//! Core Monitor implementation

use std::sync::Arc;
use std::thread;

use crate::api::StackApi;
use crate::cancel::CancelToken;
use crate::error::{MonitorError, Result};
use crate::logging::{Level, LogRecord, LogSink, ScopedSink};
use crate::models::{Intent, StackEvent, StackStatus};

use super::classifier::{classify, FailureReason, Verdict};
use super::config::MonitorConfig;
use super::poller::Poller;
use super::session::{MonitorPhase, MonitorReport, MonitorSession};

/// Watches one stack until it reaches a terminal status.
///
/// A `Monitor` is consumed by [`Monitor::monitor`], so every instance settles
/// exactly once. Run several instances on separate threads to watch several
/// stacks; they share nothing but the sink and, optionally, the cancel token.
pub struct Monitor {
    config: MonitorConfig,
    sink: Arc<dyn LogSink>,
    cancel: CancelToken,
}

impl Monitor {
    pub fn new(config: MonitorConfig, sink: Arc<dyn LogSink>) -> Self {
        Self {
            config,
            sink,
            cancel: CancelToken::new(),
        }
    }

    /// Use `cancel` to interrupt this monitor from elsewhere.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Poll `stack_name` until it settles.
    ///
    /// Resolves with a report once the stack reaches the status the configured
    /// intent asked for; fails with a classified [`MonitorError`] otherwise.
    pub fn monitor<A: StackApi + ?Sized>(self, stack_name: &str, api: &A) -> Result<MonitorReport> {
        let mut session = MonitorSession::new(stack_name, self.config.poll_interval);
        session.transition(MonitorPhase::Polling);
        self.emit(
            &session,
            LogRecord::new(Level::Info, format!("Monitoring stack {stack_name}"))
                .field("intent", self.config.intent)
                .field("poll_interval_ms", self.config.poll_interval.as_millis()),
        );

        match self.run(&mut session, api) {
            Ok(final_status) => {
                session.transition(MonitorPhase::Resolved);
                self.emit(
                    &session,
                    LogRecord::new(
                        Level::Info,
                        format!("Stack {stack_name} reached {final_status}"),
                    )
                    .field("status", &final_status)
                    .field("polls", session.polls)
                    .field("events", session.ledger.len())
                    .field("phase", session.phase()),
                );
                Ok(session.into_report(final_status))
            }
            Err(e) => {
                session.transition(MonitorPhase::Rejected);
                let level = if e.is_cancelled() {
                    Level::Warn
                } else {
                    Level::Error
                };
                let mut record = LogRecord::new(level, e.to_string())
                    .field("reason", e.reason())
                    .field("polls", session.polls)
                    .field("phase", session.phase());
                if let Some(status) = e.last_status() {
                    record = record.field("last_status", status);
                }
                self.emit(&session, record);
                Err(e)
            }
        }
    }

    fn run<A: StackApi + ?Sized>(
        &self,
        session: &mut MonitorSession,
        api: &A,
    ) -> Result<StackStatus> {
        let scoped = ScopedSink::new(self.sink.as_ref())
            .with("stack", &session.stack_name)
            .with("run_id", session.run_id);
        let poller = Poller::new(
            api,
            &self.config.retry,
            &self.cancel,
            &scoped,
            self.config.max_event_pages,
        )
        .with_timeout(session.started(), self.config.timeout);

        loop {
            self.check_interrupted(session)?;

            let snapshot = poller.fetch_latest(
                &session.stack_name,
                &session.ledger,
                session.last_status.as_ref(),
            )?;
            // A response that arrives after shutdown was requested is not acted on
            if self.cancel.is_cancelled() {
                return Err(self.cancelled(session));
            }
            session.polls += 1;

            self.record_events(session, snapshot.events);

            let status = match snapshot.status {
                Some(status) => status,
                // Deleted stacks stop being describable by name
                None if self.config.intent == Intent::Delete => StackStatus::DeleteComplete,
                None => {
                    return Err(MonitorError::StackNotFound {
                        stack: session.stack_name.clone(),
                    })
                }
            };

            if session.last_status.as_ref() != Some(&status) {
                let mut record =
                    LogRecord::new(Level::Debug, "Stack status changed").field("status", &status);
                if let Some(previous) = &session.last_status {
                    record = record.field("previous", previous);
                }
                self.emit(session, record);
            }
            session.last_status = Some(status.clone());

            match classify(&status, self.config.intent) {
                Verdict::Continue => {}
                Verdict::Success => return Ok(status),
                Verdict::Failure(FailureReason::UnknownStatus(raw)) => {
                    self.emit(
                        session,
                        LogRecord::new(
                            Level::Warn,
                            format!("Unrecognized stack status {raw}, treating as failure"),
                        )
                        .field("status", &raw),
                    );
                    return Err(MonitorError::UnknownStatus {
                        stack: session.stack_name.clone(),
                        status: raw,
                    });
                }
                Verdict::Failure(reason) => return Err(self.stack_failed(session, reason, status)),
            }

            let mut wait = session.poll_interval;
            if let Some(timeout) = self.config.timeout {
                wait = wait.min(timeout.saturating_sub(session.elapsed()));
            }
            if self.cancel.wait(wait) {
                return Err(self.cancelled(session));
            }
        }
    }

    fn check_interrupted(&self, session: &MonitorSession) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(self.cancelled(session));
        }
        if let Some(timeout) = self.config.timeout {
            let elapsed = session.elapsed();
            if elapsed >= timeout {
                return Err(MonitorError::TimedOut {
                    stack: session.stack_name.clone(),
                    elapsed,
                    last_status: session.last_status.clone(),
                });
            }
        }
        Ok(())
    }

    /// Log every not-yet-seen event, oldest first, and remember it.
    fn record_events(&self, session: &mut MonitorSession, events: Vec<StackEvent>) {
        for event in events {
            if session.ledger.contains(&event.event_id) {
                continue;
            }

            let is_recent = self.config.since.map_or(true, |since| event.timestamp >= since);
            if is_recent {
                self.emit(session, event_record(&event));
            }
            session.ledger.record_if_new(event);
        }
    }

    fn stack_failed(
        &self,
        session: &MonitorSession,
        reason: FailureReason,
        status: StackStatus,
    ) -> MonitorError {
        let root_cause = session.ledger.first_failure().map(|e| {
            match e.status_reason.as_deref().filter(|r| !r.is_empty()) {
                Some(reason) => format!("{}: {reason}", e.logical_resource_id),
                None => e.logical_resource_id.clone(),
            }
        });

        MonitorError::StackFailed {
            stack: session.stack_name.clone(),
            reason,
            last_status: status,
            status_reason: session.ledger.latest_reason().map(str::to_string),
            root_cause,
        }
    }

    fn cancelled(&self, session: &MonitorSession) -> MonitorError {
        MonitorError::Cancelled {
            stack: session.stack_name.clone(),
            last_status: session.last_status.clone(),
        }
    }

    fn emit(&self, session: &MonitorSession, record: LogRecord) {
        self.sink.record(
            record
                .field("stack", &session.stack_name)
                .field("run_id", session.run_id),
        );
    }
}

fn event_record(event: &StackEvent) -> LogRecord {
    let mut record = LogRecord::new(event.severity().into(), event.summary())
        .field("event_id", &event.event_id)
        .field("timestamp", event.timestamp.to_rfc3339())
        .field("logical_resource_id", &event.logical_resource_id)
        .field("resource_type", &event.resource_type)
        .field("status", &event.status);
    if let Some(reason) = &event.status_reason {
        record = record.field("status_reason", reason);
    }
    record
}

/// Watch several stacks at once, one thread per stack.
///
/// Results come back in the order of `stack_names`. Every monitor gets its own
/// session and ledger; cancelling `cancel` stops all of them.
pub fn monitor_many<A: StackApi + ?Sized>(
    stack_names: &[String],
    api: &A,
    config: &MonitorConfig,
    sink: Arc<dyn LogSink>,
    cancel: &CancelToken,
) -> Vec<Result<MonitorReport>> {
    thread::scope(|scope| {
        let handles: Vec<_> = stack_names
            .iter()
            .map(|name| {
                let monitor = Monitor::new(config.clone(), Arc::clone(&sink))
                    .with_cancel_token(cancel.clone());
                scope.spawn(move || monitor.monitor(name, api))
            })
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .unwrap_or_else(|panic| std::panic::resume_unwind(panic))
            })
            .collect()
    })
}
