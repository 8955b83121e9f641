//! Deployment progress monitor
//!
//! Polls the orchestration API for a stack's status and events, logs every
//! event exactly once, and settles when the stack reaches a terminal status.

mod classifier;
mod config;
mod core;
mod ledger;
mod poller;
mod retry;
mod session;


pub use classifier::{classify, FailureReason, Verdict};
pub use config::{MonitorConfig, DEFAULT_MAX_EVENT_PAGES, DEFAULT_POLL_INTERVAL};
pub use self::core::{monitor_many, Monitor};
pub use ledger::EventLedger;
pub use poller::{chronological, PollSnapshot, Poller};
pub use retry::{calculate_backoff, RetryPolicy};
pub use session::{MonitorPhase, MonitorReport, MonitorSession};
