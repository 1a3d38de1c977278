//! Logging facility for oplog
//!
//! This module provides:
//! - Single initialization point for the tracing backend via `init(profile)`
//! - Builder macros (`operation!`, `action!`)
//! - Test capture tools for deterministic assertions
//!
//! # Usage
//!
//! ```rust
//! use oplog_core::logging_facility::{init, Profile};
//!
//! // Initialize once at application startup
//! init(Profile::Development);
//! ```

pub mod init;
pub mod macros;
pub mod test_capture;

pub use init::{init, Profile};
pub use test_capture::{init_test_capture, CapturedEvent, CapturedLine, RecordingSink, TestCapture};
