//! Per-run monitoring state

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{StackEvent, StackStatus};

use super::ledger::EventLedger;

/// Lifecycle of a single monitoring run.
///
/// `Idle` -> `Polling` -> `Resolved` | `Rejected`. Both outcomes are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorPhase {
    Idle,
    Polling,
    Resolved,
    Rejected,
}

impl MonitorPhase {
    pub fn is_settled(&self) -> bool {
        matches!(self, MonitorPhase::Resolved | MonitorPhase::Rejected)
    }
}

impl std::fmt::Display for MonitorPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MonitorPhase::Idle => write!(f, "idle"),
            MonitorPhase::Polling => write!(f, "polling"),
            MonitorPhase::Resolved => write!(f, "resolved"),
            MonitorPhase::Rejected => write!(f, "rejected"),
        }
    }
}

/// State owned by one monitoring run and dropped when it settles.
#[derive(Debug)]
pub struct MonitorSession {
    pub run_id: Uuid,
    pub stack_name: String,
    pub poll_interval: Duration,
    pub ledger: EventLedger,
    pub last_status: Option<StackStatus>,
    pub started_at: DateTime<Utc>,
    started: Instant,
    pub polls: u32,
    phase: MonitorPhase,
}

impl MonitorSession {
    pub fn new(stack_name: &str, poll_interval: Duration) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            stack_name: stack_name.to_string(),
            poll_interval,
            ledger: EventLedger::new(),
            last_status: None,
            started_at: Utc::now(),
            started: Instant::now(),
            polls: 0,
            phase: MonitorPhase::Idle,
        }
    }

    pub fn phase(&self) -> MonitorPhase {
        self.phase
    }

    /// Move to `next`. Settled phases are final; returns whether the move happened.
    pub fn transition(&mut self, next: MonitorPhase) -> bool {
        if self.phase.is_settled() || self.phase == next {
            return false;
        }
        self.phase = next;
        true
    }

    /// Monotonic start of the run
    pub fn started(&self) -> Instant {
        self.started
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Consume the session into the success report.
    pub fn into_report(self, final_status: StackStatus) -> MonitorReport {
        let elapsed = self.elapsed();
        MonitorReport {
            stack_name: self.stack_name,
            final_status,
            polls: self.polls,
            events: self.ledger.into_events(),
            started_at: self.started_at,
            elapsed,
        }
    }
}

/// Outcome of a monitoring run that reached the requested state.
#[derive(Debug, Clone)]
pub struct MonitorReport {
    pub stack_name: String,
    pub final_status: StackStatus,
    pub polls: u32,
    /// Every event observed during the run, in the order it was logged
    pub events: Vec<StackEvent>,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
}
