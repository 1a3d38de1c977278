//! Well-known parameter keys
//!
//! A `Key` can be passed anywhere a string parameter key is accepted, so the
//! common domain fields are always spelled the same way.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    UserId,
    UserEmail,
    Result,
    DebugMessage,
    Operation,
}

impl Key {
    /// The rendered field name for this key
    pub fn as_str(&self) -> &'static str {
        match self {
            Key::UserId => schema::FIELD_USER_ID,
            Key::UserEmail => schema::FIELD_USER_EMAIL,
            Key::Result => schema::FIELD_RESULT,
            Key::DebugMessage => schema::FIELD_DEBUG_MESSAGE,
            Key::Operation => schema::FIELD_OPERATION,
        }
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
