//! Lifecycle state machine
//!
//! ```text
//! Constructed --start--> Started
//! Constructed | Started --terminate--> Succeeded | Failed
//! ```
//!
//! `Succeeded` and `Failed` are terminal and absorb every further
//! transition.

use tracing::Level;

use oplog_core_types::schema::{FIELD_ACTION, FIELD_OPERATION, OUTCOME_FAILURE, OUTCOME_SUCCESS};

/// Whether a record is a top-level operation or a nested action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Operation,
    Action,
}

impl Kind {
    /// Field name the record's own name is rendered under
    pub fn field_name(&self) -> &'static str {
        match self {
            Kind::Operation => FIELD_OPERATION,
            Kind::Action => FIELD_ACTION,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Success => OUTCOME_SUCCESS,
            Outcome::Failure => OUTCOME_FAILURE,
        }
    }

    /// Level the terminal line is written at by default
    pub fn level(&self) -> Level {
        match self {
            Outcome::Success => Level::INFO,
            Outcome::Failure => Level::ERROR,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LifecycleState {
    #[default]
    Constructed,
    Started,
    Succeeded,
    Failed,
}

impl LifecycleState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LifecycleState::Succeeded | LifecycleState::Failed)
    }

    /// Parameters may only be added before a terminal state
    pub fn accepts_parameters(&self) -> bool {
        !self.is_terminal()
    }

    /// Next state for `start`, or `None` if the call is a no-op
    pub fn on_start(&self) -> Option<LifecycleState> {
        match self {
            LifecycleState::Constructed => Some(LifecycleState::Started),
            _ => None,
        }
    }

    /// Next state for a terminal line, or `None` if already terminated
    pub fn on_terminate(&self, outcome: Outcome) -> Option<LifecycleState> {
        if self.is_terminal() {
            return None;
        }
        Some(match outcome {
            Outcome::Success => LifecycleState::Succeeded,
            Outcome::Failure => LifecycleState::Failed,
        })
    }
}
