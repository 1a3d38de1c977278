//! Configuration
//!
//! Loaded from a TOML document or from `OPLOG_*` environment variables.
//! Every field has a default, so an empty document is valid.
//!
//! ```toml
//! layout = "json"
//! auto_close = "strict"
//! profile = "production"
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{AutoClosedFailure, OplogError, Result};
use crate::formatter::Layout;
use crate::logging_facility::{init, Profile};

pub const ENV_LAYOUT: &str = "OPLOG_LAYOUT";
pub const ENV_AUTO_CLOSE: &str = "OPLOG_AUTO_CLOSE";
pub const ENV_PROFILE: &str = "OPLOG_PROFILE";

/// Message used when a record is dropped before it terminated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AutoClosePolicy {
    /// `operation auto-closed`
    #[default]
    Lenient,
    /// A programmer-error message naming the missing calls
    Strict,
}

impl AutoClosePolicy {
    pub fn failure(&self) -> AutoClosedFailure {
        match self {
            AutoClosePolicy::Lenient => AutoClosedFailure::lenient(),
            AutoClosePolicy::Strict => AutoClosedFailure::strict(),
        }
    }
}

impl std::str::FromStr for AutoClosePolicy {
    type Err = OplogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lenient" => Ok(AutoClosePolicy::Lenient),
            "strict" => Ok(AutoClosePolicy::Strict),
            other => Err(OplogError::InvalidConfig {
                reason: format!("unknown auto-close policy '{}'", other),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OplogConfig {
    pub layout: Layout,
    pub auto_close: AutoClosePolicy,
    pub profile: Profile,
}

impl OplogConfig {
    /// Parse a TOML document
    ///
    /// # Errors
    ///
    /// `InvalidConfig` on malformed TOML, unknown fields or unknown values.
    pub fn from_toml_str(source: &str) -> Result<Self> {
        toml::from_str(source).map_err(|e| OplogError::InvalidConfig {
            reason: e.to_string(),
        })
    }

    /// Read `OPLOG_LAYOUT`, `OPLOG_AUTO_CLOSE` and `OPLOG_PROFILE`
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a variable is set to an unknown value.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`OplogConfig::from_env`], reading variables through `lookup`
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if a variable is set to an unknown value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(layout) = lookup(ENV_LAYOUT) {
            config.layout = layout.parse()?;
        }
        if let Some(policy) = lookup(ENV_AUTO_CLOSE) {
            config.auto_close = policy.parse()?;
        }
        if let Some(profile) = lookup(ENV_PROFILE) {
            config.profile = profile.parse()?;
        }
        Ok(config)
    }

    /// Install the tracing subscriber for this config's profile
    pub fn init_logging(&self) {
        init(self.profile);
    }
}
