//! Builder macros
//!
//! Shorthand for building a record with its starting parameters in one go.

/// Build an operation with starting parameters
///
/// Expands to a `Result<OperationBuilder>`.
///
/// # Example
///
/// ```
/// # use oplog_core::operation;
/// # use std::sync::Arc;
/// # use oplog_core::logging_facility::RecordingSink;
/// # fn main() -> oplog_core::Result<()> {
/// let sink = Arc::new(RecordingSink::new());
/// let mut op = operation!("create_user", user_id = "u-1", attempt = 2)?.started(&sink);
/// op.succeed();
/// assert_eq!(sink.texts()[0], r#"operation="create_user" user_id="u-1" attempt=2"#);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! operation {
    ($name:expr) => {
        $crate::operation::operation($name)
    };
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        (|| -> $crate::Result<$crate::OperationBuilder> {
            let builder = $crate::operation::operation($name)?;
            $(let builder = builder.with(stringify!($key), $value)?;)+
            Ok(builder)
        })()
    };
}

/// Build an action with starting parameters
///
/// Expands to a `Result<OperationBuilder>`.
///
/// # Example
///
/// ```
/// # use oplog_core::action;
/// # use std::sync::Arc;
/// # use oplog_core::logging_facility::RecordingSink;
/// # fn main() -> oplog_core::Result<()> {
/// let sink = Arc::new(RecordingSink::new());
/// let mut step = action!("fetch_page", page = 3)?.started(&sink);
/// step.succeed();
/// assert_eq!(sink.texts()[1], r#"action="fetch_page" outcome="success" page=3"#);
/// # Ok(())
/// # }
/// ```
#[macro_export]
macro_rules! action {
    ($name:expr) => {
        $crate::operation::action($name)
    };
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        (|| -> $crate::Result<$crate::OperationBuilder> {
            let builder = $crate::operation::action($name)?;
            $(let builder = builder.with(stringify!($key), $value)?;)+
            Ok(builder)
        })()
    };
}
