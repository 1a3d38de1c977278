use thiserror::Error;

use oplog_core_types::schema::{MSG_AUTO_CLOSED, MSG_AUTO_CLOSED_STRICT};

/// Result type alias using OplogError
pub type Result<T> = std::result::Result<T, OplogError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers and tests can match
/// on without depending on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A key, name or other argument was empty or otherwise unusable
    InvalidArgument,
    /// A record was dropped before a terminal line was logged
    AutoClosed,
    /// A line could not be rendered in the requested layout
    Serialization,
    /// Configuration could not be parsed or contained an unknown value
    InvalidConfig,
}

impl ErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::InvalidArgument => "ERR_INVALID_ARGUMENT",
            ErrorKind::AutoClosed => "ERR_AUTO_CLOSED",
            ErrorKind::Serialization => "ERR_SERIALIZATION",
            ErrorKind::InvalidConfig => "ERR_INVALID_CONFIG",
        }
    }
}

/// Errors surfaced to callers of the oplog API
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum OplogError {
    /// Rejected synchronously, before any sink interaction
    #[error("Invalid argument '{argument}': {reason}")]
    InvalidArgument {
        argument: &'static str,
        reason: String,
    },

    /// JSON rendering failed; absorbed by the formatter
    #[error("Unable to serialise log line: {reason}")]
    Serialization { reason: String },

    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl OplogError {
    pub(crate) fn invalid_argument(argument: &'static str, reason: impl Into<String>) -> Self {
        OplogError::InvalidArgument {
            argument,
            reason: reason.into(),
        }
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        match self {
            OplogError::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            OplogError::Serialization { .. } => ErrorKind::Serialization,
            OplogError::InvalidConfig { .. } => ErrorKind::InvalidConfig,
        }
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind().code()
    }
}

/// Rejects empty or whitespace-only names and keys
pub(crate) fn require_non_blank(argument: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OplogError::invalid_argument(
            argument,
            "must not be empty",
        ));
    }
    Ok(())
}

// ========== End Error Facility ==========

/// Synthetic failure attached to a record dropped before it terminated
///
/// Never returned to the caller; it is only rendered into the `exception`
/// field and handed to the sink as the structured cause.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct AutoClosedFailure {
    message: &'static str,
}

impl AutoClosedFailure {
    pub(crate) fn lenient() -> Self {
        Self {
            message: MSG_AUTO_CLOSED,
        }
    }

    pub(crate) fn strict() -> Self {
        Self {
            message: MSG_AUTO_CLOSED_STRICT,
        }
    }

    pub fn message(&self) -> &'static str {
        self.message
    }

    pub fn kind(&self) -> ErrorKind {
        ErrorKind::AutoClosed
    }
}
