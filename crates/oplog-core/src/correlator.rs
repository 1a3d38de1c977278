//! Identity correlation between operations and nested actions
//!
//! The host application supplies a `get_identity` function once (a trace or
//! request id, for instance). Each live operation registers its name under
//! the current identity; an action rendering under the same identity picks
//! up the innermost registered name as its `operation` field.
//!
//! Without a supplier the current thread's id is the identity.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, RwLock};

use oplog_core_types::{Identity, RecordId};

/// Supplies the identity for the current flow of control
pub type IdentityFn = dyn Fn() -> Option<String> + Send + Sync;

pub struct Correlator {
    identity: RwLock<Arc<IdentityFn>>,
    active: Mutex<HashMap<Identity, Vec<(RecordId, String)>>>,
}

static GLOBAL: OnceLock<Arc<Correlator>> = OnceLock::new();

fn thread_identity() -> Option<String> {
    Some(format!("{:?}", std::thread::current().id()))
}

impl Correlator {
    pub fn new() -> Self {
        let supplier: Arc<IdentityFn> = Arc::new(thread_identity);
        Self {
            identity: RwLock::new(supplier),
            active: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_identity<F>(identity: F) -> Self
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        let correlator = Self::new();
        correlator.set_identity(identity);
        correlator
    }

    /// Process-wide correlator used by records that were not given one
    pub fn global() -> Arc<Correlator> {
        GLOBAL.get_or_init(|| Arc::new(Correlator::new())).clone()
    }

    /// Replace the identity supplier
    pub fn set_identity<F>(&self, identity: F)
    where
        F: Fn() -> Option<String> + Send + Sync + 'static,
    {
        let supplier: Arc<IdentityFn> = Arc::new(identity);
        if let Ok(mut slot) = self.identity.write() {
            *slot = supplier;
        }
    }

    /// Identity of the current flow of control, if any
    pub fn identity(&self) -> Option<Identity> {
        let supplier = self.identity.read().ok()?.clone();
        supplier().map(Identity::from_string)
    }

    /// Name of the innermost live operation under the current identity
    pub fn current_operation(&self) -> Option<String> {
        let identity = self.identity()?;
        self.active
            .lock()
            .ok()?
            .get(&identity)
            .and_then(|stack| stack.last())
            .map(|(_, name)| name.clone())
    }

    /// Register `name` under the current identity
    ///
    /// Returns the identity used, so the same entry can be released later
    /// even if the supplier's answer has changed by then.
    pub(crate) fn register(&self, id: RecordId, name: &str) -> Option<Identity> {
        let identity = self.identity()?;
        let mut active = self.active.lock().ok()?;
        active
            .entry(identity.clone())
            .or_default()
            .push((id, name.to_string()));
        Some(identity)
    }

    /// Remove exactly the entry `id` registered under `identity`
    pub(crate) fn release(&self, identity: &Identity, id: RecordId) {
        if let Ok(mut active) = self.active.lock() {
            if let Some(stack) = active.get_mut(identity) {
                stack.retain(|(entry, _)| *entry != id);
                if stack.is_empty() {
                    active.remove(identity);
                }
            }
        }
    }

    /// Number of identities with at least one live operation
    pub fn active_identities(&self) -> usize {
        self.active.lock().map(|a| a.len()).unwrap_or_default()
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Correlator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Correlator")
            .field("active_identities", &self.active_identities())
            .finish()
    }
}
