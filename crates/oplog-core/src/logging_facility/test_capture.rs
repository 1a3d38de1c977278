//! Test capture tools for deterministic logging assertions
//!
//! - [`RecordingSink`] is an in-memory [`LogSink`] that records every line
//!   and every level check, for asserting exact sink interactions.
//! - [`init_test_capture`] installs a tracing layer that captures the events
//!   written by [`TracingSink`](crate::sink::TracingSink).

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tracing::field::Visit;
use tracing::{Level, Subscriber};
use tracing_subscriber::layer::{Context, SubscriberExt};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::sink::{Cause, LogLine, LogSink};

// ========== Recording sink ==========

/// A line written to a [`RecordingSink`]
#[derive(Clone, Debug, PartialEq)]
pub struct CapturedLine {
    pub level: Level,
    pub line: LogLine,
    /// Display form of the structured cause, if one was passed
    pub cause: Option<String>,
}

impl CapturedLine {
    pub fn text(&self) -> String {
        self.line.to_string()
    }
}

/// In-memory sink with configurable level gating
pub struct RecordingSink {
    max_level: Option<Level>,
    lines: Mutex<Vec<CapturedLine>>,
    checks: Mutex<HashMap<Level, usize>>,
}

impl RecordingSink {
    /// Every level enabled
    pub fn new() -> Self {
        Self::with_max_level(Level::TRACE)
    }

    /// Levels up to and including `max_level` enabled
    pub fn with_max_level(max_level: Level) -> Self {
        Self {
            max_level: Some(max_level),
            lines: Mutex::new(Vec::new()),
            checks: Mutex::new(HashMap::new()),
        }
    }

    /// Every level disabled
    pub fn disabled() -> Self {
        Self {
            max_level: None,
            ..Self::new()
        }
    }

    /// Get all captured lines
    pub fn lines(&self) -> Vec<CapturedLine> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    /// Rendered text of every captured line, in order
    pub fn texts(&self) -> Vec<String> {
        self.lines().iter().map(CapturedLine::text).collect()
    }

    /// Number of lines written at `level`
    pub fn count_at(&self, level: Level) -> usize {
        self.lines().iter().filter(|l| l.level == level).count()
    }

    /// Number of `is_enabled(level)` calls so far
    pub fn enabled_checks(&self, level: Level) -> usize {
        self.checks
            .lock()
            .map(|c| c.get(&level).copied().unwrap_or_default())
            .unwrap_or_default()
    }

    /// Assert that exactly this line was written at `level`
    ///
    /// # Panics
    ///
    /// Panics if no such line was captured
    pub fn assert_line(&self, level: Level, text: &str) {
        let lines = self.lines();
        let found = lines.iter().any(|l| l.level == level && l.text() == text);
        assert!(
            found,
            "Expected {} line {} not found in {} captured lines: {:#?}",
            level,
            text,
            lines.len(),
            lines.iter().map(CapturedLine::text).collect::<Vec<_>>()
        );
    }

    /// Clear lines and level-check counts
    pub fn clear(&self) {
        self.lines.lock().map(|mut l| l.clear()).ok();
        self.checks.lock().map(|mut c| c.clear()).ok();
    }
}

impl Default for RecordingSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogSink for RecordingSink {
    fn is_enabled(&self, level: Level) -> bool {
        self.checks
            .lock()
            .map(|mut c| *c.entry(level).or_default() += 1)
            .ok();
        self.max_level.is_some_and(|max| level <= max)
    }

    fn log(&self, level: Level, line: &LogLine, cause: Option<&Cause>) {
        let captured = CapturedLine {
            level,
            line: line.clone(),
            cause: cause.map(|c| c.to_string()),
        };
        self.lines
            .lock()
            .map(|mut lines| lines.push(captured))
            .ok();
    }
}

// ========== Tracing capture ==========

/// A tracing event written by [`TracingSink`](crate::sink::TracingSink)
#[derive(Clone, Debug)]
pub struct CapturedEvent {
    pub level: Level,
    pub logger: Option<String>,
    pub message: Option<String>,
    pub cause: Option<String>,
}

/// Picks out the fields the tracing sink writes; all arrive as `Display`
/// wrappers through `record_debug`.
#[derive(Default)]
struct SinkFieldVisitor {
    logger: Option<String>,
    message: Option<String>,
    cause: Option<String>,
}

impl Visit for SinkFieldVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        let slot = match field.name() {
            "logger" => &mut self.logger,
            "message" => &mut self.message,
            "cause" => &mut self.cause,
            _ => return,
        };
        *slot = Some(format!("{:?}", value));
    }
}

/// Test capture layer for collecting tracing events
pub struct TestCaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCaptureLayer {
    pub fn new() -> (Self, TestCapture) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let layer = Self {
            events: events.clone(),
        };
        let capture = TestCapture { events };
        (layer, capture)
    }
}

impl<S> Layer<S> for TestCaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = SinkFieldVisitor::default();
        event.record(&mut visitor);

        let captured = CapturedEvent {
            level: *metadata.level(),
            logger: visitor.logger,
            message: visitor.message,
            cause: visitor.cause,
        };

        self.events
            .lock()
            .map(|mut events| events.push(captured))
            .ok();
    }
}

/// Handle for accessing captured events in tests
#[derive(Clone)]
pub struct TestCapture {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl TestCapture {
    /// Get all captured events
    pub fn events(&self) -> Vec<CapturedEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    /// Events written through the sink channel `logger`
    pub fn events_for(&self, logger: &str) -> Vec<CapturedEvent> {
        self.events()
            .into_iter()
            .filter(|e| e.logger.as_deref() == Some(logger))
            .collect()
    }

    /// Assert that `logger` wrote exactly `message`
    ///
    /// # Panics
    ///
    /// Panics if the event is not found
    pub fn assert_event_exists(&self, logger: &str, message: &str) {
        let events = self.events_for(logger);
        let found = events
            .iter()
            .any(|e| e.message.as_deref() == Some(message));
        assert!(
            found,
            "Expected event logger={} message={} not found in {} captured events",
            logger,
            message,
            events.len()
        );
    }

    /// Count events matching a predicate
    pub fn count_events<F>(&self, predicate: F) -> usize
    where
        F: Fn(&CapturedEvent) -> bool,
    {
        self.events().iter().filter(|e| predicate(e)).count()
    }
}

use std::sync::OnceLock;

static GLOBAL_CAPTURE: OnceLock<TestCapture> = OnceLock::new();

/// Initialize test capture mode
///
/// Installs the capture layer as the global subscriber on first use and
/// returns the shared capture handle. Filter by a unique channel name to
/// keep concurrently running tests apart.
///
/// # Example
///
/// ```
/// use oplog_core::logging_facility::test_capture::init_test_capture;
/// use oplog_core::sink::{LogLine, LogSink, TracingSink};
///
/// let capture = init_test_capture();
/// let sink = TracingSink::new("doc_channel");
/// sink.info(&LogLine::Text("operation=\"doc\"".to_string()));
/// capture.assert_event_exists("doc_channel", "operation=\"doc\"");
/// ```
pub fn init_test_capture() -> TestCapture {
    GLOBAL_CAPTURE
        .get_or_init(|| {
            let (layer, capture) = TestCaptureLayer::new();
            tracing_subscriber::registry().with(layer).init();
            capture
        })
        .clone()
}
