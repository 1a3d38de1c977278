//! Writes a few records through the development tracing subscriber
//!
//! ```text
//! cargo run -p oplog-core --example demo
//! ```

use oplog_core::logging_facility::{init, Profile};
use oplog_core::{operation, SinkHandle};
use uuid::Uuid;

#[derive(Debug, Clone, thiserror::Error)]
#[error("attempt to divide by zero")]
struct DivideByZero;

struct Demo;

impl Demo {
    fn divide(&self, a: i64, b: i64) -> Result<i64, DivideByZero> {
        a.checked_div(b).ok_or(DivideByZero)
    }

    fn run(&self) -> oplog_core::Result<()> {
        let sink = SinkHandle::for_actor(self);

        // start line with the starting conditions
        let mut op = operation("operation")?
            .with("argument", Uuid::now_v7())?
            .started(&sink);

        // terminal line only
        let mut result_op = operation("resultOperation")?
            .with("argument", Uuid::now_v7())?
            .initiate(&sink);

        let mut json_op = operation("Operation that outputs in JSON format")?
            .json_layout()
            .with("argument", Uuid::now_v7())?
            .started(&sink);

        match self.divide(1, 0) {
            Ok(quotient) => {
                op.was_successful().yielding("result", quotient)?.log();
                result_op.was_successful().yielding("result", quotient)?.log();
                json_op.was_successful().yielding("result", quotient)?.log();
            }
            Err(err) => {
                op.was_failure().throwing_exception(err.clone()).log();
                result_op.was_failure().throwing_exception(err.clone()).log();
                json_op.was_failure().throwing_exception(err).log();
            }
        }

        // dropped without a terminal call
        let _forgotten = operation("forgotten")?.with("argument", 42)?.started(&sink);
        Ok(())
    }
}

fn main() -> oplog_core::Result<()> {
    init(Profile::Development);
    Demo.run()
}
