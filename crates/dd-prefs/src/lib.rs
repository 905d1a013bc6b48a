//! dd-prefs: canonical preference document format and local persistence.
//!
//! One JSON document per account holds the selected dataset, playback
//! controls, drawn boundaries, and the derived-metric history, wrapped in a
//! `{deviceId, updatedAt, schemaVersion}` envelope. Decoding is lenient:
//! fields default individually and invalid entries are dropped, never
//! failing the whole load.

pub mod decode;
pub mod hash;
pub mod migrate;
pub mod schema;
pub mod store;

pub use decode::doc_from_value;
pub use hash::content_hash;
pub use migrate::{LATEST_VERSION, migrate_to_latest};
pub use schema::*;
pub use store::{FileReplica, LocalReplica, MemoryReplica};

pub type PrefsResult<T> = Result<T, PrefsError>;

#[derive(thiserror::Error, Debug)]
pub enum PrefsError {
    #[error("Migration error: {what}")]
    Migration { what: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Decode a persisted payload leniently and migrate it to the latest schema.
pub fn decode_document(payload: &str) -> PrefsResult<PreferenceDoc> {
    let value: serde_json::Value = serde_json::from_str(payload)?;
    migrate_to_latest(doc_from_value(value))
}

/// Encode a document for persistence.
pub fn encode_document(doc: &PreferenceDoc) -> PrefsResult<String> {
    Ok(serde_json::to_string_pretty(doc)?)
}
