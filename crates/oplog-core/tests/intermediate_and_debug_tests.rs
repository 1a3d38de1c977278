#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use std::sync::Arc;

use common::recording_sink;
use oplog_core::logging_facility::RecordingSink;
use oplog_core::{action, operation, Level};

#[test]
fn test_intermediate_yield_does_not_terminate() -> anyhow::Result<()> {
    let sink = recording_sink();
    let mut op = operation("batch_import")?.with("file", "a.csv")?.started(&sink);

    op.log_intermediate().yielding("rows", 500)?.log();
    op.log_intermediate()
        .yielding_all([("rows", 1000), ("skipped", 2)])?
        .log_warn();
    assert!(!op.is_terminated());

    op.succeed();

    let lines = sink.lines();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[1].text(), r#"operation="batch_import" file="a.csv" rows=500"#);
    assert_eq!(lines[2].level, Level::WARN);
    assert_eq!(
        lines[2].text(),
        r#"operation="batch_import" file="a.csv" rows=1000 skipped=2"#
    );
    assert_eq!(
        lines[3].text(),
        r#"operation="batch_import" outcome="success" file="a.csv""#
    );
    Ok(())
}

#[test]
fn test_intermediate_levels() -> anyhow::Result<()> {
    let sink = recording_sink();
    let mut op = operation("levels")?.initiate(&sink);

    op.log_intermediate().log_debug();
    op.log_intermediate().log_error();
    op.log_intermediate().log();
    op.succeed();

    let levels: Vec<Level> = sink.lines().iter().map(|l| l.level).collect();
    assert_eq!(levels, vec![Level::DEBUG, Level::ERROR, Level::INFO, Level::INFO]);
    Ok(())
}

#[test]
fn test_intermediate_after_termination_is_ignored() -> anyhow::Result<()> {
    let sink = recording_sink();
    let mut op = operation("finished")?.initiate(&sink);
    op.succeed();

    op.log_intermediate().yielding("late", 1)?.log();
    op.log_debug("late");

    assert_eq!(sink.lines().len(), 1);
    Ok(())
}

#[test]
fn test_intermediate_to_another_sink() -> anyhow::Result<()> {
    let primary = recording_sink();
    let audit = recording_sink();
    let mut op = operation("audited")?.initiate(&primary);

    op.log_intermediate().yielding("stage", "checked")?.log_to(&audit);
    op.succeed();

    assert_eq!(audit.texts(), vec![r#"operation="audited" stage="checked""#]);
    assert_eq!(primary.lines().len(), 1);
    Ok(())
}

#[test]
fn test_debug_message_with_extra_fields() -> anyhow::Result<()> {
    let sink = recording_sink();
    let mut op = operation("cache_lookup")?.with("key", "k-1")?.initiate(&sink);

    op.log_debug("cache miss");
    op.log_debug_with("retrying", [("attempt", 2)])?;
    op.succeed();

    let lines = sink.lines();
    assert_eq!(lines[0].level, Level::DEBUG);
    assert_eq!(
        lines[0].text(),
        r#"operation="cache_lookup" key="k-1" debugMessage="cache miss""#
    );
    assert_eq!(
        lines[1].text(),
        r#"operation="cache_lookup" key="k-1" debugMessage="retrying" attempt=2"#
    );
    Ok(())
}

#[test]
fn test_debug_lines_gated_by_level() -> anyhow::Result<()> {
    let sink = Arc::new(RecordingSink::with_max_level(Level::INFO));
    let mut op = operation("no_debug")?.initiate(&sink);

    op.log_debug("invisible");
    op.succeed();

    assert_eq!(sink.enabled_checks(Level::DEBUG), 1);
    assert_eq!(sink.count_at(Level::DEBUG), 0);
    assert_eq!(sink.lines().len(), 1);
    Ok(())
}

#[test]
fn test_action_intermediate_lines_carry_parent() -> anyhow::Result<()> {
    let sink = recording_sink();
    let correlator = common::fixed_correlator("request-9");
    let mut outer = operation("sync")?
        .correlated_by(correlator.clone())
        .initiate(&sink);
    let mut step = action("page")?
        .correlated_by(correlator)
        .initiate(&sink);

    step.log_intermediate().yielding("page", 1)?.log();
    step.succeed();
    outer.succeed();

    assert_eq!(sink.texts()[0], r#"action="page" page=1 operation="sync""#);
    Ok(())
}

#[test]
fn test_blank_intermediate_key_rejected() -> anyhow::Result<()> {
    let sink = recording_sink();
    let mut op = operation("bad_progress")?.initiate(&sink);

    assert!(op.log_intermediate().yielding("", 1).is_err());
    assert!(op.log_debug_with("msg", [(" ", 1)]).is_err());
    assert!(sink.lines().is_empty());

    op.succeed();
    Ok(())
}
