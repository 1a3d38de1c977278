#![allow(clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::Bang;
use oplog_core::logging_facility::test_capture::init_test_capture;
use oplog_core::{operation, Level, SinkHandle, TracingSink};

struct BillingService;

impl BillingService {
    fn charge(&self, amount: u32) -> oplog_core::Result<()> {
        let mut op = operation("charge")?
            .with("amount", amount)?
            .started(SinkHandle::for_actor(self));
        op.succeed();
        Ok(())
    }
}

#[test]
fn test_records_log_through_tracing_channel_of_actor() {
    let capture = init_test_capture();

    BillingService.charge(250).unwrap();

    let channel = std::any::type_name::<BillingService>();
    let events: Vec<_> = capture
        .events_for(channel)
        .into_iter()
        .filter(|e| e.message.as_deref().is_some_and(|m| m.starts_with(r#"operation="charge""#)))
        .collect();
    assert_eq!(events.len(), 2);
    assert!(events.iter().all(|e| e.level == Level::INFO));
    capture.assert_event_exists(channel, r#"operation="charge" amount=250"#);
    capture.assert_event_exists(channel, r#"operation="charge" outcome="success" amount=250"#);
}

#[test]
fn test_failure_cause_is_recorded_on_event() {
    let capture = init_test_capture();
    let channel = "tracing_sink_tests::failure_channel";

    let mut op = operation("tracing_failure")
        .unwrap()
        .initiate(TracingSink::new(channel));
    op.was_failure().throwing_exception(Bang).log();

    let events = capture.events_for(channel);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, Level::ERROR);
    assert_eq!(events[0].cause.as_deref(), Some("bang!"));
    assert!(events[0]
        .message
        .as_deref()
        .unwrap()
        .starts_with(r#"operation="tracing_failure" outcome="failure" errorMessage="bang!""#));
}

#[test]
fn test_json_record_through_tracing_is_one_event() {
    let capture = init_test_capture();
    let channel = "tracing_sink_tests::json_channel";

    let mut op = operation("tracing_json")
        .unwrap()
        .json_layout()
        .initiate(TracingSink::new(channel));
    op.succeed();

    let events = capture.events_for(channel);
    assert_eq!(events.len(), 1);
    let message = events[0].message.clone().unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&message).unwrap();
    assert_eq!(parsed["operation"], "tracing_json");
    assert_eq!(parsed["logLevel"], "INFO");
}

#[test]
fn test_channel_for_type() {
    let capture = init_test_capture();

    let mut op = operation("typed_channel")
        .unwrap()
        .initiate(SinkHandle::for_type::<BillingService>());
    op.succeed();

    let matching = capture.count_events(|e| {
        e.logger.as_deref() == Some(std::any::type_name::<BillingService>())
            && e.message.as_deref() == Some(r#"operation="typed_channel" outcome="success""#)
    });
    assert_eq!(matching, 1);
}
