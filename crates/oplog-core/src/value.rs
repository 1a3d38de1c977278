//! Parameter values and their log-safe rendering
//!
//! Numbers render bare, null renders as the literal `null`, and everything
//! else renders as a double-quoted string with inner quotes escaped. Numbers
//! are recognised by type only: a numeric-looking string is still quoted.
//! Non-finite floats (`NaN`, `inf`, `-inf`) are not numbers a reader can
//! parse back, so they are quoted too.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::errors::{OplogError, Result};

/// A single parameter value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
    Text(String),
    /// Structured JSON; embedded as-is in the JSON layout
    Json(serde_json::Value),
}

impl Value {
    /// Capture any displayable value as quoted text
    pub fn display(value: &impl fmt::Display) -> Self {
        Value::Text(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null | Value::Json(serde_json::Value::Null))
    }

    /// Render for the key=value layout
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Int(n) => n.to_string(),
            Value::UInt(n) => n.to_string(),
            Value::Float(f) if !f.is_finite() => quote(&f.to_string()),
            Value::Float(f) => f.to_string(),
            Value::Bool(b) => quote(&b.to_string()),
            Value::Text(s) => quote(s),
            Value::Json(json) => match json {
                serde_json::Value::Null => "null".to_string(),
                serde_json::Value::Number(n) => n.to_string(),
                serde_json::Value::String(s) => quote(s),
                other => quote(&other.to_string()),
            },
        }
    }

    /// Convert for the JSON layout
    ///
    /// Fails for non-finite floats, which JSON cannot represent.
    pub fn to_json(&self) -> Result<serde_json::Value> {
        Ok(match self {
            Value::Null => serde_json::Value::Null,
            Value::Int(n) => serde_json::Value::from(*n),
            Value::UInt(n) => serde_json::Value::from(*n),
            Value::Float(f) => serde_json::Number::from_f64(*f)
                .map(serde_json::Value::Number)
                .ok_or_else(|| OplogError::Serialization {
                    reason: format!("{} is not a JSON number", f),
                })?,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Text(s) => serde_json::Value::String(s.clone()),
            Value::Json(json) => json.clone(),
        })
    }
}

fn quote(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\\\""))
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

macro_rules! value_from_int {
    ($variant:ident, $target:ty: $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                fn from(n: $t) -> Self {
                    Value::$variant(n as $target)
                }
            }
        )+
    };
}

value_from_int!(Int, i64: i8, i16, i32, i64, isize);
value_from_int!(UInt, u64: u8, u16, u32, u64, usize);

impl From<f32> for Value {
    fn from(f: f32) -> Self {
        Value::Float(f64::from(f))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<char> for Value {
    fn from(c: char) -> Self {
        Value::Text(c.to_string())
    }
}

impl From<Uuid> for Value {
    fn from(id: Uuid) -> Self {
        Value::Text(id.to_string())
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Text(t.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::Json(json)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}
