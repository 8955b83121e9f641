//! Monitor configuration

use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::models::Intent;

use super::retry::RetryPolicy;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
pub const DEFAULT_MAX_EVENT_PAGES: usize = 10;

/// Configuration for the monitor
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
    /// Operation the caller issued; decides which terminal statuses are success
    pub intent: Intent,
    pub retry: RetryPolicy,
    /// Give up after this long without reaching a terminal status
    pub timeout: Option<Duration>,
    /// Events older than this are recorded as seen but not logged
    pub since: Option<DateTime<Utc>>,
    /// Upper bound on event pages fetched per poll
    pub max_event_pages: usize,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            intent: Intent::default(),
            retry: RetryPolicy::default(),
            timeout: None,
            since: None,
            max_event_pages: DEFAULT_MAX_EVENT_PAGES,
        }
    }
}
