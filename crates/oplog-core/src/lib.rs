//! Oplog Core - Structured operation logging
//!
//! This crate records the lifecycle of a unit of work (an *operation*, or a
//! nested *action*) as one or two structured log lines:
//! - An optional start line with the starting parameters
//! - Exactly one terminal line with the outcome (success or failure),
//!   result fields, failure details and the attached error
//! - Lines rendered as `key=value` text or as a flat JSON object
//! - Actions tagged with the name of the enclosing operation via an
//!   identity correlator
//! - Records dropped without a terminal line auto-close as failures

pub mod config;
pub mod correlator;
pub mod errors;
pub mod formatter;
pub mod logging_facility;
pub mod operation;
pub mod outcome;
pub mod params;
pub mod sink;
pub mod state;
pub mod value;

// Re-export commonly used types
pub use config::{AutoClosePolicy, OplogConfig};
pub use correlator::Correlator;
pub use errors::{AutoClosedFailure, ErrorKind, OplogError, Result};
pub use formatter::{Field, Layout, LogFormatter};
pub use operation::{action, operation, Operation, OperationBuilder};
pub use outcome::{Failure, IntermediateYield, Thrown, Yield};
pub use params::{ParameterSnapshot, Parameters};
pub use sink::{Level, LogLine, LogSink, SinkHandle, TracingSink};
pub use state::{Kind, LifecycleState, Outcome};
pub use value::Value;

pub use oplog_core_types::{Identity, Key, RecordId};
