use std::sync::Arc;

use oplog_core::logging_facility::RecordingSink;
use oplog_core::Correlator;

/// Create a sink with every level enabled
#[allow(dead_code)]
pub fn recording_sink() -> Arc<RecordingSink> {
    Arc::new(RecordingSink::new())
}

/// Correlator whose identity is fixed, so records from any thread share it
#[allow(dead_code)]
pub fn fixed_correlator(identity: &str) -> Arc<Correlator> {
    let identity = identity.to_string();
    Arc::new(Correlator::with_identity(move || Some(identity.clone())))
}

/// Expected `exception` field for an error of type `E`
#[allow(dead_code)]
pub fn exception_of<E>(message: &str) -> String {
    format!("{}: {}", std::any::type_name::<E>(), message)
}

#[derive(Debug, thiserror::Error)]
#[error("bang!")]
#[allow(dead_code)]
pub struct Bang;

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
#[allow(dead_code)]
pub struct Puncture(pub String);
