//! Log sinks
//!
//! A sink receives fully rendered lines plus a severity level and an
//! optional structured cause. `SinkHandle` is what a record holds; it is
//! resolved either from a concrete sink or, for any other value, from a
//! tracing channel named after that value's type.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

pub use tracing::Level;

/// Structured cause handed to the sink alongside a failure line
pub type Cause = dyn std::error::Error + Send + Sync + 'static;

/// A fully rendered log line
#[derive(Debug, Clone, PartialEq)]
pub enum LogLine {
    /// Space-separated `key=value` fields
    Text(String),
    /// Flat, insertion-ordered JSON object
    Json(serde_json::Map<String, serde_json::Value>),
}

impl LogLine {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            LogLine::Text(text) => Some(text),
            LogLine::Json(_) => None,
        }
    }

    pub fn as_json(&self) -> Option<&serde_json::Map<String, serde_json::Value>> {
        match self {
            LogLine::Text(_) => None,
            LogLine::Json(map) => Some(map),
        }
    }
}

impl fmt::Display for LogLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLine::Text(text) => f.write_str(text),
            LogLine::Json(map) => {
                // A Map of Values always serialises
                let rendered = serde_json::to_string(map).map_err(|_| fmt::Error)?;
                f.write_str(&rendered)
            }
        }
    }
}

/// Destination for rendered lines
pub trait LogSink: Send + Sync {
    /// Whether lines at `level` would be written
    fn is_enabled(&self, level: Level) -> bool;

    /// Write one line
    fn log(&self, level: Level, line: &LogLine, cause: Option<&Cause>);

    fn info(&self, line: &LogLine) {
        self.log(Level::INFO, line, None);
    }

    fn warn(&self, line: &LogLine) {
        self.log(Level::WARN, line, None);
    }

    fn debug(&self, line: &LogLine) {
        self.log(Level::DEBUG, line, None);
    }

    fn error(&self, line: &LogLine, cause: Option<&Cause>) {
        self.log(Level::ERROR, line, cause);
    }
}

/// Sink that forwards lines as `tracing` events
///
/// Every event carries `logger = <channel>`; failures also carry
/// `cause = <error>`.
///
/// Events and level checks use this module's target (`oplog_core::sink`),
/// not the channel, because `tracing` targets are fixed at the callsite. A
/// subscriber filter therefore enables or disables a level for every channel
/// at once: filter on `oplog_core` (for example `RUST_LOG=oplog_core=info`),
/// and select individual channels by the `logger` field downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingSink {
    channel: String,
}

impl TracingSink {
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
        }
    }

    /// Channel named after `T`'s type name
    pub fn for_type<T: ?Sized>() -> Self {
        Self::new(std::any::type_name::<T>())
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }
}

macro_rules! emit_at {
    ($level:expr, $channel:expr, $line:expr, $cause:expr) => {
        match $cause {
            Some(cause) => tracing::event!($level, logger = %$channel, cause = %cause, "{}", $line),
            None => tracing::event!($level, logger = %$channel, "{}", $line),
        }
    };
}

impl LogSink for TracingSink {
    fn is_enabled(&self, level: Level) -> bool {
        match level {
            Level::ERROR => tracing::enabled!(Level::ERROR),
            Level::WARN => tracing::enabled!(Level::WARN),
            Level::INFO => tracing::enabled!(Level::INFO),
            Level::DEBUG => tracing::enabled!(Level::DEBUG),
            _ => tracing::enabled!(Level::TRACE),
        }
    }

    fn log(&self, level: Level, line: &LogLine, cause: Option<&Cause>) {
        let channel = self.channel.as_str();
        match level {
            Level::ERROR => emit_at!(Level::ERROR, channel, line, cause),
            Level::WARN => emit_at!(Level::WARN, channel, line, cause),
            Level::INFO => emit_at!(Level::INFO, channel, line, cause),
            Level::DEBUG => emit_at!(Level::DEBUG, channel, line, cause),
            _ => emit_at!(Level::TRACE, channel, line, cause),
        }
    }
}

/// Shared reference to the sink a record logs through
///
/// The record never owns or closes the underlying sink.
#[derive(Clone)]
pub struct SinkHandle(Arc<dyn LogSink>);

impl SinkHandle {
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self(sink)
    }

    /// Derive a tracing channel from the type of `actor`
    pub fn for_actor<T: ?Sized>(_actor: &T) -> Self {
        Self::for_type::<T>()
    }

    pub fn for_type<T: ?Sized>() -> Self {
        Self(Arc::new(TracingSink::for_type::<T>()))
    }
}

impl Deref for SinkHandle {
    type Target = dyn LogSink;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

impl fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SinkHandle")
    }
}

impl<S: LogSink + 'static> From<Arc<S>> for SinkHandle {
    fn from(sink: Arc<S>) -> Self {
        Self(sink)
    }
}

impl<S: LogSink + 'static> From<&Arc<S>> for SinkHandle {
    fn from(sink: &Arc<S>) -> Self {
        Self(sink.clone())
    }
}

impl From<TracingSink> for SinkHandle {
    fn from(sink: TracingSink) -> Self {
        Self(Arc::new(sink))
    }
}

impl From<&SinkHandle> for SinkHandle {
    fn from(handle: &SinkHandle) -> Self {
        handle.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct BillingService;

    #[test]
    fn test_channel_derived_from_type_name() {
        let sink = TracingSink::for_type::<BillingService>();
        assert!(sink.channel().ends_with("BillingService"));
    }

    #[test]
    fn test_level_checks_follow_module_target_not_channel() {
        use tracing_subscriber::layer::SubscriberExt;
        use tracing_subscriber::EnvFilter;

        let billing = TracingSink::new("billing");
        let audit = TracingSink::new("audit");

        let module_filter =
            tracing_subscriber::registry().with(EnvFilter::new("oplog_core::sink=warn"));
        tracing::subscriber::with_default(module_filter, || {
            for sink in [&billing, &audit] {
                assert!(sink.is_enabled(Level::WARN));
                assert!(!sink.is_enabled(Level::INFO));
            }
        });

        let channel_filter = tracing_subscriber::registry().with(EnvFilter::new("billing=trace"));
        tracing::subscriber::with_default(channel_filter, || {
            assert!(!billing.is_enabled(Level::ERROR));
        });
    }

    #[test]
    fn test_json_line_display_is_compact() {
        let mut map = serde_json::Map::new();
        map.insert("operation".to_string(), serde_json::json!("name"));
        map.insert("count".to_string(), serde_json::json!(3));
        let line = LogLine::Json(map);

        assert_eq!(line.to_string(), r#"{"operation":"name","count":3}"#);
        assert!(line.as_text().is_none());
    }

    #[test]
    fn test_text_line_display_is_verbatim() {
        let line = LogLine::Text("operation=\"x\"".to_string());
        assert_eq!(line.to_string(), "operation=\"x\"");
        assert_eq!(line.as_text(), Some("operation=\"x\""));
    }
}
