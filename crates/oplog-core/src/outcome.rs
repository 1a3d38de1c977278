//! Outcome builders
//!
//! [`Yield`] and [`Failure`] collect outcome-specific parameters and then
//! write the record's single terminal line. [`IntermediateYield`] writes a
//! progress line without terminating the record.

use std::error::Error;
use std::sync::Arc;

use tracing::Level;

use oplog_core_types::Key;

use crate::errors::Result;
use crate::formatter::FailureView;
use crate::operation::Operation;
use crate::params::Parameters;
use crate::sink::{Cause, SinkHandle};
use crate::state::Outcome;
use crate::value::Value;

/// An error attached to a failure
///
/// Rendered as `<type name>: <message>` under `exception`, and forwarded
/// to the sink as the structured cause.
///
/// Errors already erased into a `Box<dyn Error + Send + Sync>` convert with
/// `From`; an `anyhow::Error` converts into that box first.
#[derive(Clone)]
pub struct Thrown {
    description: String,
    error: Arc<Cause>,
}

impl Thrown {
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self::labelled(std::any::type_name::<E>(), Arc::new(error))
    }

    /// Attach a type-erased error
    ///
    /// The concrete type is unknown here, so the box's own type name is the
    /// label.
    pub fn from_boxed(error: Box<Cause>) -> Self {
        Self::labelled(std::any::type_name::<Box<Cause>>(), Arc::from(error))
    }

    fn labelled(type_name: &str, error: Arc<Cause>) -> Self {
        let message = error.to_string();
        let description = if message.is_empty() {
            type_name.to_string()
        } else {
            format!("{}: {}", type_name, message)
        };
        Self { description, error }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn message(&self) -> String {
        self.error.to_string()
    }

    pub fn error(&self) -> &Cause {
        self.error.as_ref()
    }
}

impl From<Box<Cause>> for Thrown {
    fn from(error: Box<Cause>) -> Self {
        Self::from_boxed(error)
    }
}

impl std::fmt::Debug for Thrown {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Thrown").field(&self.description).finish()
    }
}

/// Success parameters awaiting the terminal line
#[must_use = "nothing is logged until `log` is called"]
pub struct Yield<'a> {
    operation: &'a mut Operation,
    parameters: Parameters,
}

impl<'a> Yield<'a> {
    pub(crate) fn new(operation: &'a mut Operation) -> Self {
        Self {
            operation,
            parameters: Parameters::new(),
        }
    }

    /// Add a result field
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the key is empty.
    pub fn yielding(mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<Self> {
        self.parameters.put(key, value)?;
        Ok(self)
    }

    /// Add result fields in iteration order
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any key is empty; no entry is added then.
    pub fn yielding_all<I, K, V>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.parameters.put_all(entries)?;
        Ok(self)
    }

    pub(crate) fn yielding_key(mut self, key: Key, value: impl Into<Value>) -> Self {
        self.parameters.put_key(key, value);
        self
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Write the success line at INFO to the record's sink
    pub fn log(self) {
        self.finish(None);
    }

    /// Write the success line at INFO to another sink
    pub fn log_to(self, sink: impl Into<SinkHandle>) {
        self.finish(Some(sink.into()));
    }

    fn finish(self, sink: Option<SinkHandle>) {
        let Yield {
            operation,
            parameters,
        } = self;
        operation.terminate(
            Outcome::Success,
            Outcome::Success.level(),
            sink,
            |formatter, view| formatter.success_fields(view, &parameters),
            None,
        );
    }
}

/// Failure details awaiting the terminal line
#[must_use = "nothing is logged until `log` is called"]
pub struct Failure<'a> {
    operation: &'a mut Operation,
    message: Option<String>,
    thrown: Option<Thrown>,
    details: Parameters,
}

impl<'a> Failure<'a> {
    pub(crate) fn new(operation: &'a mut Operation) -> Self {
        Self {
            operation,
            message: None,
            thrown: None,
            details: Parameters::new(),
        }
    }

    /// Attach `error`; its message becomes `errorMessage` unless one is set
    pub fn throwing_exception<E>(self, error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        self.throwing(Thrown::new(error))
    }

    /// Attach a prepared or type-erased error
    pub fn throwing(mut self, thrown: impl Into<Thrown>) -> Self {
        let thrown = thrown.into();
        if self.message.is_none() {
            self.message = Some(thrown.message());
        }
        self.thrown = Some(thrown);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Use `error`'s message without attaching the error itself
    pub fn with_message_of<E: Error + ?Sized>(self, error: &E) -> Self {
        self.with_message(error.to_string())
    }

    /// Add a detail field, rendered before `exception`
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if the key is empty.
    pub fn with_detail(mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<Self> {
        self.details.put(key, value)?;
        Ok(self)
    }

    /// Add detail fields in iteration order
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if any key is empty; no entry is added then.
    pub fn with_details<I, K, V>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.details.put_all(entries)?;
        Ok(self)
    }

    pub(crate) fn detail_key(mut self, key: Key, value: impl Into<Value>) -> Self {
        self.details.put_key(key, value);
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn thrown(&self) -> Option<&Thrown> {
        self.thrown.as_ref()
    }

    /// Write the failure line at ERROR to the record's sink
    pub fn log(self) {
        self.finish(Level::ERROR, None);
    }

    /// Write the failure line at ERROR to another sink
    pub fn log_to(self, sink: impl Into<SinkHandle>) {
        self.finish(Level::ERROR, Some(sink.into()));
    }

    /// Write the failure line at INFO, for expected failures
    pub fn log_info(self) {
        self.finish(Level::INFO, None);
    }

    fn finish(self, level: Level, sink: Option<SinkHandle>) {
        let Failure {
            operation,
            message,
            thrown,
            details,
        } = self;
        operation.terminate(
            Outcome::Failure,
            level,
            sink,
            |formatter, view| {
                formatter.failure_fields(
                    view,
                    &FailureView {
                        message: message.as_deref(),
                        details: &details,
                        exception: thrown.as_ref().map(Thrown::description),
                    },
                )
            },
            thrown.as_ref().map(Thrown::error),
        );
    }
}

/// Progress line for a record that has not terminated yet
#[must_use = "nothing is logged until one of the `log` methods is called"]
pub struct IntermediateYield<'a> {
    operation: &'a Operation,
    parameters: Parameters,
}

impl<'a> IntermediateYield<'a> {
    pub(crate) fn new(operation: &'a Operation) -> Self {
        Self {
            operation,
            parameters: Parameters::new(),
        }
    }

    /// # Errors
    ///
    /// `InvalidArgument` if the key is empty.
    pub fn yielding(mut self, key: impl AsRef<str>, value: impl Into<Value>) -> Result<Self> {
        self.parameters.put(key, value)?;
        Ok(self)
    }

    /// # Errors
    ///
    /// `InvalidArgument` if any key is empty; no entry is added then.
    pub fn yielding_all<I, K, V>(mut self, entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<Value>,
    {
        self.parameters.put_all(entries)?;
        Ok(self)
    }

    pub fn log(self) {
        self.write(Level::INFO, None);
    }

    pub fn log_to(self, sink: impl Into<SinkHandle>) {
        self.write(Level::INFO, Some(sink.into()));
    }

    pub fn log_debug(self) {
        self.write(Level::DEBUG, None);
    }

    pub fn log_warn(self) {
        self.write(Level::WARN, None);
    }

    pub fn log_error(self) {
        self.write(Level::ERROR, None);
    }

    fn write(self, level: Level, sink: Option<SinkHandle>) {
        if self.operation.is_terminated() {
            return;
        }
        let sink = sink.unwrap_or_else(|| self.operation.sink().clone());
        let parameters = &self.parameters;
        self.operation.emit(
            &sink,
            level,
            |formatter, view| formatter.intermediate_fields(view, parameters),
            None,
        );
    }
}
