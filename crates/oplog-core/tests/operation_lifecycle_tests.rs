#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::recording_sink;
use oplog_core::logging_facility::RecordingSink;
use oplog_core::{operation, Level, LifecycleState, Value};
use std::sync::Arc;

#[test]
fn test_simple_success_writes_start_and_success_lines() -> anyhow::Result<()> {
    // GIVEN a sink with INFO enabled
    let sink = recording_sink();

    // WHEN an operation is started and succeeds
    let mut op = operation("simple_success")?.started(&sink);
    op.succeed();

    // THEN exactly two INFO lines are written, each after a level check
    assert_eq!(
        sink.texts(),
        vec![
            r#"operation="simple_success""#,
            r#"operation="simple_success" outcome="success""#,
        ]
    );
    assert_eq!(sink.count_at(Level::INFO), 2);
    assert_eq!(sink.enabled_checks(Level::INFO), 2);
    assert_eq!(op.state(), LifecycleState::Succeeded);
    Ok(())
}

#[test]
fn test_initiated_operation_only_writes_terminal_line() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("simple_success")?.initiate(&sink);
    op.succeed();

    assert_eq!(
        sink.texts(),
        vec![r#"operation="simple_success" outcome="success""#]
    );
    assert_eq!(sink.enabled_checks(Level::INFO), 1);
    Ok(())
}

#[test]
fn test_starting_parameters_render_in_insertion_order() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("ordered")?
        .with("x", 101)?
        .with("y", "bat")?
        .with("ok", true)?
        .with_all([("ratio", Value::from(0.5)), ("count", Value::from(3u8))])?
        .started(&sink);
    op.was_successful().yielding("total", 7)?.log();

    assert_eq!(
        sink.texts(),
        vec![
            r#"operation="ordered" x=101 y="bat" ok="true" ratio=0.5 count=3"#,
            r#"operation="ordered" outcome="success" x=101 y="bat" ok="true" ratio=0.5 count=3 total=7"#,
        ]
    );
    Ok(())
}

#[test]
fn test_repeated_key_keeps_first_position_and_latest_value() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("repeat")?
        .with("a", 1)?
        .with("b", 2)?
        .with("a", 3)?
        .initiate(&sink);
    op.succeed();

    assert_eq!(
        sink.texts(),
        vec![r#"operation="repeat" outcome="success" a=3 b=2"#]
    );
    Ok(())
}

#[test]
fn test_null_values_render_unquoted() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("allow_nulls")?
        .with("nullableInput", None::<String>)?
        .started(&sink);
    op.was_successful()
        .yielding("nullableResult", Value::Null)?
        .log();

    assert_eq!(
        sink.texts(),
        vec![
            r#"operation="allow_nulls" nullableInput=null"#,
            r#"operation="allow_nulls" outcome="success" nullableInput=null nullableResult=null"#,
        ]
    );
    assert_eq!(sink.count_at(Level::ERROR), 0);
    Ok(())
}

#[test]
fn test_quotes_in_text_are_escaped() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("quoting")?
        .with("title", r#"say "hi""#)?
        .initiate(&sink);
    op.succeed();

    assert_eq!(
        sink.texts(),
        vec![r#"operation="quoting" outcome="success" title="say \"hi\"""#]
    );
    Ok(())
}

#[test]
fn test_fluent_api_with_parameters_added_after_initiate() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("getUserSubscriptions")?.initiate(&sink);
    op.with("userId", "1234")?;
    op.was_successful()
        .yielding("activeSubscription", "S-12345")?
        .log();

    assert_eq!(
        sink.texts(),
        vec![
            r#"operation="getUserSubscriptions" outcome="success" userId="1234" activeSubscription="S-12345""#
        ]
    );
    Ok(())
}

#[test]
fn test_succeed_with_uses_result_key() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("lookup")?.initiate(&sink);
    op.succeed_with("found");

    assert_eq!(
        sink.texts(),
        vec![r#"operation="lookup" outcome="success" result="found""#]
    );
    Ok(())
}

#[test]
fn test_second_termination_is_a_silent_no_op() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("once")?.initiate(&sink);
    op.succeed();
    let checks_after_first = sink.enabled_checks(Level::INFO);

    op.succeed();
    op.fail();
    op.was_failure().with_message("late").log_info();

    assert_eq!(sink.lines().len(), 1);
    assert_eq!(sink.enabled_checks(Level::INFO), checks_after_first);
    assert_eq!(sink.enabled_checks(Level::ERROR), 0);
    assert_eq!(op.state(), LifecycleState::Succeeded);
    Ok(())
}

#[test]
fn test_disabled_level_skips_rendering_but_still_terminates() -> anyhow::Result<()> {
    let sink = Arc::new(RecordingSink::with_max_level(Level::WARN));

    let mut op = operation("quiet")?.with("a", 1)?.started(&sink);
    op.succeed();

    assert!(sink.lines().is_empty());
    assert_eq!(sink.enabled_checks(Level::INFO), 2);
    assert!(op.is_terminated());
    Ok(())
}

#[test]
fn test_success_can_be_logged_to_another_sink() -> anyhow::Result<()> {
    let primary = recording_sink();
    let secondary = recording_sink();

    let mut op = operation("redirected")?.started(&primary);
    op.was_successful().log_to(&secondary);

    assert_eq!(primary.texts(), vec![r#"operation="redirected""#]);
    assert_eq!(
        secondary.texts(),
        vec![r#"operation="redirected" outcome="success""#]
    );
    Ok(())
}

#[test]
fn test_blank_names_and_keys_are_rejected() {
    assert_eq!(
        operation("").unwrap_err().code(),
        "ERR_INVALID_ARGUMENT"
    );
    assert!(operation("ok").unwrap().with(" ", 1).is_err());
    assert!(operation("ok")
        .unwrap()
        .with_all([("a", 1), ("", 2)])
        .is_err());
}

#[test]
fn test_rejected_yield_key_leaves_record_open() -> anyhow::Result<()> {
    let sink = recording_sink();
    let mut op = operation("strict_keys")?.initiate(&sink);

    assert!(op.was_successful().yielding("", 1).is_err());
    assert!(sink.lines().is_empty());
    assert!(!op.is_terminated());

    op.succeed();
    assert_eq!(sink.lines().len(), 1);
    Ok(())
}

#[test]
fn test_builder_macro_collects_parameters() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = oplog_core::operation!("macro_built", user = "u-7", attempt = 2)?.started(&sink);
    op.succeed();

    assert_eq!(
        sink.texts()[0],
        r#"operation="macro_built" user="u-7" attempt=2"#
    );
    Ok(())
}

struct OrderRef(u32);

impl std::fmt::Display for OrderRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ORD-{:05}", self.0)
    }
}

#[test]
fn test_displayable_parameters_and_non_finite_floats_are_quoted() -> anyhow::Result<()> {
    let sink = recording_sink();

    let mut op = operation("price_order")?
        .with("order", Value::display(&OrderRef(42)))?
        .initiate(&sink);
    op.was_successful().yielding("discount", f64::NAN)?.log();

    assert_eq!(
        sink.texts(),
        vec![r#"operation="price_order" outcome="success" order="ORD-00042" discount="NaN""#]
    );
    Ok(())
}
