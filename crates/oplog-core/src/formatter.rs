//! Log line assembly and rendering
//!
//! Field order for each transition:
//!
//! - start: `kind=name, *start`
//! - success: `kind=name, outcome, *start, *yield`
//! - failure: `kind=name, outcome, errorMessage, *start, *detail, exception?`
//! - intermediate: `kind=name, *start, *intermediate`
//! - debug: `kind=name, *start, debugMessage, *extra`
//!
//! An action nested in an active operation gets `operation=<parent>`
//! appended last.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use oplog_core_types::schema::{
    FIELD_DEBUG_MESSAGE, FIELD_ERROR_MESSAGE, FIELD_EXCEPTION, FIELD_LOG_LEVEL, FIELD_OPERATION,
    FIELD_OUTCOME, FIELD_TIME,
};

use crate::errors::{OplogError, Result};
use crate::params::Parameters;
use crate::sink::{Cause, Level, LogLine, SinkHandle};
use crate::state::{Kind, Outcome};
use crate::value::Value;

/// Rendering mode of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    KeyValue,
    Json,
}

impl std::str::FromStr for Layout {
    type Err = OplogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "key_value" | "keyvalue" | "text" => Ok(Layout::KeyValue),
            "json" => Ok(Layout::Json),
            other => Err(OplogError::InvalidConfig {
                reason: format!("unknown layout '{}'", other),
            }),
        }
    }
}

/// One named field of a rendered line
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub value: Value,
}

impl Field {
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// What the formatter needs to know about a record
#[derive(Debug, Clone, Copy)]
pub struct RecordView<'a> {
    pub kind: Kind,
    pub name: &'a str,
    pub parameters: &'a Parameters,
    /// Enclosing operation's name, for actions only
    pub parent: Option<&'a str>,
}

/// Failure-specific parts of a terminal line
#[derive(Debug, Clone, Copy)]
pub struct FailureView<'a> {
    pub message: Option<&'a str>,
    pub details: &'a Parameters,
    pub exception: Option<&'a str>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LogFormatter {
    layout: Layout,
}

impl LogFormatter {
    pub fn new(layout: Layout) -> Self {
        Self { layout }
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn start_fields(&self, record: &RecordView<'_>) -> Vec<Field> {
        let mut fields = vec![identity_field(record)];
        push_parameters(&mut fields, record.parameters);
        push_parent(&mut fields, record);
        fields
    }

    pub fn success_fields(&self, record: &RecordView<'_>, yielded: &Parameters) -> Vec<Field> {
        let mut fields = vec![
            identity_field(record),
            Field::new(FIELD_OUTCOME, Outcome::Success.as_str()),
        ];
        push_parameters(&mut fields, record.parameters);
        push_parameters(&mut fields, yielded);
        push_parent(&mut fields, record);
        fields
    }

    pub fn failure_fields(&self, record: &RecordView<'_>, failure: &FailureView<'_>) -> Vec<Field> {
        let mut fields = vec![
            identity_field(record),
            Field::new(FIELD_OUTCOME, Outcome::Failure.as_str()),
            Field::new(FIELD_ERROR_MESSAGE, failure.message),
        ];
        push_parameters(&mut fields, record.parameters);
        push_parameters(&mut fields, failure.details);
        if let Some(exception) = failure.exception {
            fields.push(Field::new(FIELD_EXCEPTION, exception));
        }
        push_parent(&mut fields, record);
        fields
    }

    pub fn intermediate_fields(
        &self,
        record: &RecordView<'_>,
        intermediate: &Parameters,
    ) -> Vec<Field> {
        let mut fields = vec![identity_field(record)];
        push_parameters(&mut fields, record.parameters);
        push_parameters(&mut fields, intermediate);
        push_parent(&mut fields, record);
        fields
    }

    pub fn debug_fields(
        &self,
        record: &RecordView<'_>,
        message: &str,
        extra: &Parameters,
    ) -> Vec<Field> {
        let mut fields = vec![identity_field(record)];
        push_parameters(&mut fields, record.parameters);
        fields.push(Field::new(FIELD_DEBUG_MESSAGE, message));
        push_parameters(&mut fields, extra);
        push_parent(&mut fields, record);
        fields
    }

    /// Render `fields` in this formatter's layout
    ///
    /// # Errors
    ///
    /// `Serialization` if a value cannot be represented in JSON.
    pub fn render(&self, level: Level, fields: &[Field]) -> Result<LogLine> {
        match self.layout {
            Layout::KeyValue => Ok(LogLine::Text(render_key_value(fields))),
            Layout::Json => render_json(level, fields).map(LogLine::Json),
        }
    }

    /// Gate on the sink's level, then build, render and write one line
    ///
    /// `fields` is only evaluated when the level is enabled. A rendering
    /// failure is never propagated: an INFO diagnostic is written instead.
    pub fn dispatch<F>(&self, sink: &SinkHandle, level: Level, fields: F, cause: Option<&Cause>)
    where
        F: FnOnce() -> Vec<Field>,
    {
        if !sink.is_enabled(level) {
            return;
        }
        let fields = fields();
        match self.render(level, &fields) {
            Ok(line) => sink.log(level, &line, cause),
            Err(err) => degrade(sink, &fields, &err),
        }
    }
}

fn identity_field(record: &RecordView<'_>) -> Field {
    Field::new(record.kind.field_name(), record.name)
}

fn push_parameters(fields: &mut Vec<Field>, parameters: &Parameters) {
    fields.extend(
        parameters
            .iter()
            .map(|(name, value)| Field::new(name, value.clone())),
    );
}

fn push_parent(fields: &mut Vec<Field>, record: &RecordView<'_>) {
    if let (Kind::Action, Some(parent)) = (record.kind, record.parent) {
        fields.push(Field::new(FIELD_OPERATION, parent));
    }
}

/// `name=value` pairs joined by single spaces
pub fn render_key_value(fields: &[Field]) -> String {
    fields
        .iter()
        .map(|field| format!("{}={}", field.name, field.value.render()))
        .collect::<Vec<_>>()
        .join(" ")
}

fn render_json(level: Level, fields: &[Field]) -> Result<serde_json::Map<String, serde_json::Value>> {
    let mut map = serde_json::Map::new();
    for field in fields {
        map.insert(field.name.clone(), field.value.to_json()?);
    }
    map.insert(
        FIELD_LOG_LEVEL.to_string(),
        serde_json::Value::String(level.to_string()),
    );
    map.insert(
        FIELD_TIME.to_string(),
        serde_json::Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
    );
    Ok(map)
}

fn degrade(sink: &SinkHandle, fields: &[Field], err: &OplogError) {
    if !sink.is_enabled(Level::INFO) {
        return;
    }
    let mut diagnostic: Vec<Field> = fields.iter().take(1).cloned().collect();
    diagnostic.push(Field::new(FIELD_ERROR_MESSAGE, err.to_string()));
    sink.info(&LogLine::Text(render_key_value(&diagnostic)));
}
