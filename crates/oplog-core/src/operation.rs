//! Operation and action records
//!
//! A record is built with a name and starting parameters, optionally
//! started (which writes the start line), and then terminated exactly once
//! through [`Yield`] or [`Failure`]. A record dropped before it terminated
//! writes a failure line on its own, so every record ends with one terminal
//! line.
//!
//! ```
//! use std::sync::Arc;
//! use oplog_core::logging_facility::test_capture::RecordingSink;
//! use oplog_core::Operation;
//!
//! # fn main() -> oplog_core::Result<()> {
//! let sink = Arc::new(RecordingSink::new());
//! let mut launch = Operation::operation("launch")?
//!     .with("probe", 27)?
//!     .with("target", "Mars")?
//!     .started(&sink);
//!
//! launch.was_successful().yielding("position", "[10.0,17.2,0.0]")?.log();
//!
//! assert_eq!(
//!     sink.texts()[1],
//!     r#"operation="launch" outcome="success" probe=27 target="Mars" position="[10.0,17.2,0.0]""#
//! );
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use tracing::Level;

use oplog_core_types::{Identity, Key, RecordId};

use crate::config::{AutoClosePolicy, OplogConfig};
use crate::correlator::Correlator;
use crate::errors::{require_non_blank, Result};
use crate::formatter::{Field, Layout, LogFormatter, RecordView};
use crate::outcome::{Failure, IntermediateYield, Thrown, Yield};
use crate::params::Parameters;
use crate::sink::{Cause, SinkHandle};
use crate::state::{Kind, LifecycleState, Outcome};
use crate::value::Value;

/// Create an operation builder
///
/// # Errors
///
/// `InvalidArgument` if `name` is empty.
pub fn operation(name: impl AsRef<str>) -> Result<OperationBuilder> {
    OperationBuilder::new(name.as_ref(), Kind::Operation)
}

/// Create an action builder
///
/// # Errors
///
/// `InvalidArgument` if `name` is empty.
pub fn action(name: impl AsRef<str>) -> Result<OperationBuilder> {
    OperationBuilder::new(name.as_ref(), Kind::Action)
}

/// Collects the name and starting parameters of a record
#[derive(Debug, Clone)]
pub struct OperationBuilder {
    name: String,
    kind: Kind,
    parameters: Parameters,
    layout: Layout,
    auto_close: AutoClosePolicy,
    correlator: Option<Arc<Correlator>>,
}

impl OperationBuilder {
    fn new(name: &str, kind: Kind) -> Result<Self> {
        require_non_blank("name", name)?;
        Ok(Self {
            name: name.to_string(),
            kind,
            parameters: Parameters::new(),
            layout: Layout::default(),
            auto_close: AutoClosePolicy::default(),
            correlator: None,
        })
    }

    /// Add a starting parameter
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the key is empty.
    pub fn with(mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<Self> {
        self.parameters.put(key, value)?;
        Ok(self)
    }

    /// Add starting parameters in iteration order
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any key is empty; no entry is added then.
    pub fn with_all<I, K, V>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.parameters.put_all(entries)?;
        Ok(self)
    }

    pub fn json_layout(self) -> Self {
        self.layout(Layout::Json)
    }

    pub fn layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn auto_close(mut self, policy: AutoClosePolicy) -> Self {
        self.auto_close = policy;
        self
    }

    /// Apply layout and auto-close policy from `config`
    pub fn configured(self, config: &OplogConfig) -> Self {
        self.layout(config.layout).auto_close(config.auto_close)
    }

    /// Correlate through `correlator` instead of the process-wide one
    pub fn correlated_by(mut self, correlator: Arc<Correlator>) -> Self {
        self.correlator = Some(correlator);
        self
    }

    /// Create the record without writing a start line
    ///
    /// Only the terminal line will be written.
    pub fn initiate(self, sink: impl Into<SinkHandle>) -> Operation {
        let correlator = self.correlator.unwrap_or_else(Correlator::global);
        let id = RecordId::new();
        let registration = match self.kind {
            Kind::Operation => correlator.register(id, &self.name),
            Kind::Action => None,
        };

        Operation {
            id,
            name: self.name,
            kind: self.kind,
            parameters: self.parameters,
            sink: sink.into(),
            formatter: LogFormatter::new(self.layout),
            state: LifecycleState::Constructed,
            auto_close: self.auto_close,
            correlator,
            registration,
        }
    }

    /// Create the record and write its start line at INFO
    pub fn started(self, sink: impl Into<SinkHandle>) -> Operation {
        let mut operation = self.initiate(sink);
        operation.start();
        operation
    }
}

/// A live operation or action record
///
/// Confine a record to one flow of control; independent records may run
/// concurrently.
#[derive(Debug)]
pub struct Operation {
    id: RecordId,
    name: String,
    kind: Kind,
    parameters: Parameters,
    sink: SinkHandle,
    formatter: LogFormatter,
    state: LifecycleState,
    auto_close: AutoClosePolicy,
    correlator: Arc<Correlator>,
    registration: Option<Identity>,
}

impl Operation {
    /// See [`operation`]
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `name` is empty.
    pub fn operation(name: impl AsRef<str>) -> Result<OperationBuilder> {
        operation(name)
    }

    /// See [`action`]
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `name` is empty.
    pub fn action(name: impl AsRef<str>) -> Result<OperationBuilder> {
        action(name)
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn layout(&self) -> Layout {
        self.formatter.layout()
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub fn is_terminated(&self) -> bool {
        self.state.is_terminal()
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Add a parameter to the record
    ///
    /// The key is always checked; once terminated the call is otherwise a
    /// no-op.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the key is empty.
    pub fn with(&mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<&mut Self> {
        let key = key.as_ref();
        require_non_blank("key", key)?;
        if self.state.accepts_parameters() {
            self.parameters.put(key, value)?;
        }
        Ok(self)
    }

    /// Add parameters in iteration order
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any key is empty; no entry is added then.
    pub fn with_all<I, K, V>(&mut self, entries: I) -> Result<&mut Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut staged = Parameters::new();
        staged.put_all(entries)?;
        if self.state.accepts_parameters() {
            for (key, value) in staged.iter() {
                self.parameters.put(key, value.clone())?;
            }
        }
        Ok(self)
    }

    /// Write the start line at INFO; a no-op unless freshly constructed
    pub fn start(&mut self) -> &mut Self {
        if let Some(next) = self.state.on_start() {
            self.state = next;
            self.emit(
                &self.sink,
                Level::INFO,
                |formatter, view| formatter.start_fields(view),
                None,
            );
        }
        self
    }

    /// Prepare the success line
    pub fn was_successful(&mut self) -> Yield<'_> {
        Yield::new(self)
    }

    /// Prepare the failure line
    pub fn was_failure(&mut self) -> Failure<'_> {
        Failure::new(self)
    }

    /// Log a line between start and termination
    pub fn log_intermediate(&self) -> IntermediateYield<'_> {
        IntermediateYield::new(self)
    }

    pub fn succeed(&mut self) {
        self.was_successful().log();
    }

    /// Succeed with `result=<result>` appended
    pub fn succeed_with(&mut self, result: impl Into<Value>) {
        self.was_successful().yielding_key(Key::Result, result).log();
    }

    pub fn fail(&mut self) {
        self.was_failure().log();
    }

    /// Fail with `result=<result>` among the failure details
    pub fn fail_with(&mut self, result: impl Into<Value>) {
        self.was_failure().detail_key(Key::Result, result).log();
    }

    /// Write a DEBUG line carrying `debugMessage=<message>`
    pub fn log_debug(&self, message: &str) {
        self.write_debug(message, &Parameters::new());
    }

    /// Write a DEBUG line carrying `debugMessage=<message>` and `entries`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any key is empty.
    pub fn log_debug_with<I, K, V>(&self, message: &str, entries: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        let mut extra = Parameters::new();
        extra.put_all(entries)?;
        self.write_debug(message, &extra);
        Ok(())
    }

    fn write_debug(&self, message: &str, extra: &Parameters) {
        if self.state.is_terminal() {
            return;
        }
        self.emit(
            &self.sink,
            Level::DEBUG,
            |formatter, view| formatter.debug_fields(view, message, extra),
            None,
        );
    }

    pub(crate) fn sink(&self) -> &SinkHandle {
        &self.sink
    }

    fn parent_operation(&self) -> Option<String> {
        match self.kind {
            Kind::Action => self.correlator.current_operation(),
            Kind::Operation => None,
        }
    }

    /// Build and write one line through the record's formatter
    pub(crate) fn emit<F>(&self, sink: &SinkHandle, level: Level, build: F, cause: Option<&Cause>)
    where
        F: FnOnce(&LogFormatter, &RecordView<'_>) -> Vec<Field>,
    {
        self.formatter.dispatch(
            sink,
            level,
            || {
                let parent = self.parent_operation();
                let view = RecordView {
                    kind: self.kind,
                    name: &self.name,
                    parameters: &self.parameters,
                    parent: parent.as_deref(),
                };
                build(&self.formatter, &view)
            },
            cause,
        );
    }

    /// Move to the terminal state for `outcome` and write its line
    ///
    /// Returns `false`, without touching any sink, if the record had
    /// already terminated.
    pub(crate) fn terminate<F>(
        &mut self,
        outcome: Outcome,
        level: Level,
        sink: Option<SinkHandle>,
        build: F,
        cause: Option<&Cause>,
    ) -> bool
    where
        F: FnOnce(&LogFormatter, &RecordView<'_>) -> Vec<Field>,
    {
        let Some(next) = self.state.on_terminate(outcome) else {
            tracing::trace!(record = %self.id, name = %self.name, "record already terminated");
            return false;
        };
        self.state = next;

        let sink = sink.unwrap_or_else(|| self.sink.clone());
        self.emit(&sink, level, build, cause);
        self.release();
        true
    }

    fn release(&mut self) {
        if let Some(identity) = self.registration.take() {
            self.correlator.release(&identity, self.id);
        }
    }
}

impl Drop for Operation {
    fn drop(&mut self) {
        if !self.state.is_terminal() {
            tracing::debug!(record = %self.id, name = %self.name, "auto-closing record");
            let thrown = Thrown::new(self.auto_close.failure());
            self.was_failure().throwing(thrown).log();
        }
        self.release();
    }
}
