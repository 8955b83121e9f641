//! Independent monitors running side by side

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use stackwatch::api::{ScriptedApi, Step};
use stackwatch::cancel::CancelToken;
use stackwatch::logging::MemorySink;
use stackwatch::models::StackStatus;
use stackwatch::monitor::{monitor_many, MonitorConfig};

use super::helpers::{fast_config, stack_event, MultiStackApi};

#[test]
fn test_monitors_for_different_stacks_keep_separate_ledgers() {
    // Both stacks report an event with the same id; each monitor must log its own
    let api = MultiStackApi::new()
        .with_stack(
            "alpha",
            ScriptedApi::new(vec![
                Step::status(
                    StackStatus::CreateInProgress,
                    vec![stack_event("alpha", "shared", 0, "CREATE_IN_PROGRESS")],
                ),
                Step::status(
                    StackStatus::CreateComplete,
                    vec![
                        stack_event("alpha", "shared", 0, "CREATE_IN_PROGRESS"),
                        stack_event("alpha", "a2", 1, "CREATE_COMPLETE"),
                    ],
                ),
            ]),
        )
        .with_stack(
            "beta",
            ScriptedApi::new(vec![
                Step::status(
                    StackStatus::CreateInProgress,
                    vec![stack_event("beta", "shared", 0, "CREATE_IN_PROGRESS")],
                ),
                Step::status(
                    StackStatus::RollbackComplete,
                    vec![stack_event("beta", "b2", 1, "ROLLBACK_COMPLETE")],
                ),
            ]),
        );
    let sink = Arc::new(MemorySink::new());
    let stacks = vec!["alpha".to_string(), "beta".to_string()];

    let results = monitor_many(&stacks, &api, &fast_config(), sink.clone(), &CancelToken::new());

    assert_eq!(results.len(), 2);
    let alpha = results[0].as_ref().unwrap();
    assert_eq!(alpha.stack_name, "alpha");
    assert_eq!(alpha.events.len(), 2);

    let beta = results[1].as_ref().unwrap_err();
    assert_eq!(beta.stack(), "beta");
    assert_eq!(beta.reason(), "rolled back");

    let shared_logs = sink
        .with_field("event_id")
        .into_iter()
        .filter(|r| r.get("event_id") == Some("shared"))
        .count();
    assert_eq!(shared_logs, 2);
    assert_eq!(api.stack("alpha").describe_calls(), 2);
    assert_eq!(api.stack("beta").describe_calls(), 2);
}

#[test]
fn test_shared_cancel_token_stops_every_monitor() {
    let api = MultiStackApi::new()
        .with_stack(
            "one",
            ScriptedApi::new(vec![Step::status(StackStatus::CreateInProgress, vec![])]),
        )
        .with_stack(
            "two",
            ScriptedApi::new(vec![Step::status(StackStatus::UpdateInProgress, vec![])]),
        );
    let config = MonitorConfig {
        poll_interval: Duration::from_secs(60),
        ..fast_config()
    };
    let cancel = CancelToken::new();
    let remote = cancel.clone();
    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        remote.cancel();
    });

    let start = Instant::now();
    let stacks = vec!["one".to_string(), "two".to_string()];
    let results = monitor_many(&stacks, &api, &config, Arc::new(MemorySink::new()), &cancel);
    canceller.join().unwrap();

    assert!(start.elapsed() < Duration::from_secs(60));
    for result in &results {
        assert!(result.as_ref().unwrap_err().is_cancelled());
    }
}

#[test]
fn test_unknown_stack_in_batch_fails_alone() {
    let api = MultiStackApi::new().with_stack(
        "known",
        ScriptedApi::new(vec![Step::status(StackStatus::CreateComplete, vec![])]),
    );
    let stacks = vec!["known".to_string(), "ghost".to_string()];

    let results = monitor_many(
        &stacks,
        &api,
        &fast_config(),
        Arc::new(MemorySink::new()),
        &CancelToken::new(),
    );

    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().reason(), "not found");
}
