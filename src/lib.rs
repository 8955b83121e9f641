pub mod api;
pub mod cancel;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod monitor;

pub use api::{ApiError, EventOrder, EventPage, StackApi};
pub use cancel::CancelToken;
pub use error::MonitorError;
pub use logging::{Level, LogRecord, LogSink};
pub use models::{Intent, StackEvent, StackStatus};
pub use monitor::{Monitor, MonitorConfig, MonitorReport};
