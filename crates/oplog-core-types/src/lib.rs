//! Core types shared across oplog facilities
//!
//! This crate provides the vocabulary used by the operation lifecycle and
//! its log-line rendering:
//!
//! - **Correlation types**: RecordId, Identity
//! - **Well-known keys**: Key
//! - **Schema constants**: Canonical field keys, outcome names, auto-close messages

pub mod correlation;
pub mod key;
pub mod schema;

pub use correlation::{Identity, RecordId};
pub use key::Key;
