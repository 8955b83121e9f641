//! Replay command against recorded deployments

use anyhow::Result;
use serde_json::Value;

use super::helpers::*;

#[test]
fn test_successful_create_exits_zero() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write("create.yaml", SUCCESS_SCRIPT)?;

    let output = ws.run(&["replay", script.to_str().unwrap(), "--interval-ms", "1"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Watching stack web"));
    assert!(out.contains("Stack web reached CREATE_COMPLETE"));
    Ok(())
}

#[test]
fn test_rollback_exits_nonzero_with_root_cause() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write("rollback.yaml", ROLLBACK_SCRIPT)?;

    let output = ws.run(&["replay", script.to_str().unwrap(), "--interval-ms", "1"])?;

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("rolled back"), "stderr: {err}");
    assert!(err.contains("Queue: Access denied"), "stderr: {err}");
    Ok(())
}

#[test]
fn test_failure_is_reported_once() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write("rollback.yaml", ROLLBACK_SCRIPT)?;

    let output = ws.run(&["replay", script.to_str().unwrap(), "--interval-ms", "1"])?;

    assert_eq!(output.status.code(), Some(1));
    let err = stderr(&output);
    assert_eq!(err.matches("✗").count(), 1, "stderr: {err}");
    assert!(!err.contains("Error: "), "stderr: {err}");
    Ok(())
}

#[test]
fn test_json_outcome_on_stdout() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write("create.yaml", SUCCESS_SCRIPT)?;

    let output = ws.run(&[
        "replay",
        script.to_str().unwrap(),
        "--interval-ms",
        "1",
        "--json",
    ])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let outcome: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(outcome["stack"], "web");
    assert_eq!(outcome["success"], true);
    assert_eq!(outcome["status"], "CREATE_COMPLETE");
    assert_eq!(outcome["polls"], 3);
    assert_eq!(outcome["events"], 4);
    Ok(())
}

#[test]
fn test_json_failure_reports_reason() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write("rollback.yaml", ROLLBACK_SCRIPT)?;

    let output = ws.run(&[
        "replay",
        script.to_str().unwrap(),
        "--interval-ms",
        "1",
        "--json",
    ])?;

    assert!(!output.status.success());
    let outcome: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(outcome["success"], false);
    assert_eq!(outcome["status"], "ROLLBACK_COMPLETE");
    assert_eq!(outcome["reason"], "rolled back");
    Ok(())
}

#[test]
fn test_events_are_logged_to_stderr() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write("create.yaml", SUCCESS_SCRIPT)?;

    let output = ws.run(&[
        "replay",
        script.to_str().unwrap(),
        "--interval-ms",
        "1",
        "--json",
    ])?;

    let err = stderr(&output);
    for id in ["e1", "e2", "e3", "e4"] {
        assert_eq!(
            err.matches(&format!("event_id={id} ")).count(),
            1,
            "event {id} in: {err}"
        );
    }
    Ok(())
}

#[test]
fn test_delete_intent_from_flag() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write(
        "delete.yaml",
        r#"
stack_name: old
steps:
  - status: DELETE_IN_PROGRESS
    events: []
  - error:
      kind: not-found
      message: Stack with id old does not exist
"#,
    )?;

    let output = ws.run(&[
        "replay",
        script.to_str().unwrap(),
        "--intent",
        "delete",
        "--interval-ms",
        "1",
    ])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("reached DELETE_COMPLETE"));
    Ok(())
}

#[test]
fn test_missing_stack_name_is_an_error() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write(
        "anon.yaml",
        "steps:\n  - status: CREATE_COMPLETE\n    events: []\n",
    )?;

    let output = ws.run(&["replay", script.to_str().unwrap()])?;

    assert!(!output.status.success());
    assert!(stderr(&output).contains("No stack name"));

    let output = ws.run(&["replay", script.to_str().unwrap(), "--stack", "named"])?;
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    Ok(())
}

#[test]
fn test_config_file_in_working_directory_is_used() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write(
        "update.yaml",
        r#"
stack_name: api
steps:
  - status: UPDATE_IN_PROGRESS
    events: []
  - status: UPDATE_COMPLETE_CLEANUP_IN_PROGRESS
    events: []
  - status: UPDATE_COMPLETE
    events: []
"#,
    )?;
    ws.write(
        "stackwatch.toml",
        "[monitor]\npoll_interval_ms = 1\nintent = \"update\"\n",
    )?;

    let output = ws.run(&["replay", script.to_str().unwrap(), "--json"])?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let outcome: Value = serde_json::from_str(&stdout(&output))?;
    assert_eq!(outcome["status"], "UPDATE_COMPLETE");
    assert_eq!(outcome["polls"], 3);
    Ok(())
}

#[test]
fn test_invalid_config_is_rejected() -> Result<()> {
    let ws = Workspace::new()?;
    let script = ws.write("create.yaml", SUCCESS_SCRIPT)?;
    let config = ws.write("bad.toml", "[retry]\nmax_attempts = 0\n")?;

    let output = ws.run(&[
        "replay",
        script.to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ])?;

    assert!(!output.status.success());
    Ok(())
}
