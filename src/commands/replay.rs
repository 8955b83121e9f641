//! Replay command - runs the monitor against a recorded deployment

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use serde::Serialize;

use crate::api::{ReplayScript, ScriptedApi};
use crate::cancel::CancelToken;
use crate::config::FileConfig;
use crate::error::MonitorError;
use crate::logging::TracingSink;
use crate::models::Intent;
use crate::monitor::{Monitor, MonitorConfig, MonitorReport};

#[derive(Debug, Clone, Default)]
pub struct ReplayOptions {
    pub script: PathBuf,
    pub stack: Option<String>,
    pub intent: Option<Intent>,
    pub interval_ms: Option<u64>,
    pub timeout_secs: Option<u64>,
    pub max_attempts: Option<u32>,
    pub config: Option<PathBuf>,
    pub json: bool,
}

/// Machine-readable outcome printed with `--json`
#[derive(Debug, Serialize)]
struct Outcome {
    stack: String,
    success: bool,
    status: Option<String>,
    reason: Option<String>,
    polls: Option<u32>,
    events: Option<usize>,
    elapsed_ms: Option<u128>,
}

impl ReplayOptions {
    fn monitor_config(&self) -> Result<MonitorConfig> {
        let mut config = FileConfig::discover(self.config.as_deref())?.into_monitor_config()?;

        if let Some(intent) = self.intent {
            config.intent = intent;
        }
        if let Some(ms) = self.interval_ms {
            config.poll_interval = Duration::from_millis(ms);
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout = Some(Duration::from_secs(secs));
        }
        if let Some(attempts) = self.max_attempts {
            config.retry.max_attempts = attempts.max(1);
        }
        Ok(config)
    }
}

/// Execute the replay command
pub fn execute(options: ReplayOptions) -> Result<()> {
    let script = ReplayScript::load(&options.script)?;
    let stack_name = options
        .stack
        .clone()
        .or_else(|| script.stack_name.clone())
        .context("No stack name: pass --stack or set stack_name in the script")?;
    let config = options.monitor_config()?;

    let cancel = CancelToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || handler_token.cancel())
        .context("Failed to set Ctrl+C handler")?;

    if !options.json {
        println!(
            "{} Watching stack {} ({})",
            "→".cyan().bold(),
            stack_name.bold(),
            config.intent
        );
    }

    let api = ScriptedApi::from_script(script);
    let result = Monitor::new(config, Arc::new(TracingSink))
        .with_cancel_token(cancel)
        .monitor(&stack_name, &api);

    match result {
        Ok(report) => {
            if options.json {
                print_json(&success_outcome(&report))?;
            } else {
                print_success(&report);
            }
            Ok(())
        }
        Err(e) => {
            if options.json {
                print_json(&failure_outcome(&e))?;
            } else {
                print_failure(&e);
            }
            // The outcome is already reported; only the exit status is left
            std::process::exit(1);
        }
    }
}

fn success_outcome(report: &MonitorReport) -> Outcome {
    Outcome {
        stack: report.stack_name.clone(),
        success: true,
        status: Some(report.final_status.to_string()),
        reason: None,
        polls: Some(report.polls),
        events: Some(report.events.len()),
        elapsed_ms: Some(report.elapsed.as_millis()),
    }
}

fn failure_outcome(error: &MonitorError) -> Outcome {
    Outcome {
        stack: error.stack().to_string(),
        success: false,
        status: error.last_status().map(|s| s.to_string()),
        reason: Some(error.reason()),
        polls: None,
        events: None,
        elapsed_ms: None,
    }
}

fn print_json(outcome: &Outcome) -> Result<()> {
    let json = serde_json::to_string_pretty(outcome).context("Failed to serialize outcome")?;
    println!("{json}");
    Ok(())
}

fn print_success(report: &MonitorReport) {
    println!(
        "{} Stack {} reached {} ({} polls, {} events, {:.1}s)",
        "✓".green().bold(),
        report.stack_name.bold(),
        report.final_status.to_string().green(),
        report.polls,
        report.events.len(),
        report.elapsed.as_secs_f64()
    );
}

fn print_failure(error: &MonitorError) {
    let status = error
        .last_status()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    eprintln!(
        "{} Stack {} {} (last status {})",
        "✗".red().bold(),
        error.stack().bold(),
        error.reason().red(),
        status
    );
    if let MonitorError::StackFailed {
        root_cause: Some(cause),
        ..
    } = error
    {
        eprintln!("  {} {}", "root cause:".dimmed(), cause);
    }
}
