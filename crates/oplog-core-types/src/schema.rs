//! Canonical schema constants for rendered log lines
//!
//! These constants ensure every lifecycle transition renders the same field
//! names, whichever layout is in use.

// Record identity fields
pub const FIELD_OPERATION: &str = "operation";
pub const FIELD_ACTION: &str = "action";

// Outcome fields
pub const FIELD_OUTCOME: &str = "outcome";
pub const FIELD_ERROR_MESSAGE: &str = "errorMessage";
pub const FIELD_EXCEPTION: &str = "exception";

// Fields injected by the JSON layout
pub const FIELD_LOG_LEVEL: &str = "logLevel";
pub const FIELD_TIME: &str = "time";

// Well-known parameter keys
pub const FIELD_RESULT: &str = "result";
pub const FIELD_DEBUG_MESSAGE: &str = "debugMessage";
pub const FIELD_USER_ID: &str = "userId";
pub const FIELD_USER_EMAIL: &str = "email";

// Canonical outcome values
pub const OUTCOME_SUCCESS: &str = "success";
pub const OUTCOME_FAILURE: &str = "failure";

// Messages attached to records dropped before a terminal line
pub const MSG_AUTO_CLOSED: &str = "operation auto-closed";
pub const MSG_AUTO_CLOSED_STRICT: &str =
    "Programmer error: operation auto-closed before was_successful() or was_failure() called.";
