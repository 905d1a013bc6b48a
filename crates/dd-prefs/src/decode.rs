//! Lenient decoding of persisted preference payloads.
//!
//! Persisted documents come from older client versions and foreign devices,
//! so decoding never fails on unknown or missing keys: scalars fall back to
//! their defaults and list entries that do not decode are dropped one by
//! one. Only an unparseable payload is an error, handled by the caller.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::schema::{PreferenceDoc, default_playback_speed};
use dd_core::{DatasetId, DeviceId};

/// Build a document from an arbitrary JSON value, field by field.
pub fn doc_from_value(value: Value) -> PreferenceDoc {
    let Some(obj) = value.as_object() else {
        return PreferenceDoc {
            schema_version: 0,
            ..PreferenceDoc::default()
        };
    };

    PreferenceDoc {
        schema_version: field(obj.get("schemaVersion")).unwrap_or(0),
        device_id: field::<String>(obj.get("deviceId"))
            .map(DeviceId::new)
            .unwrap_or_default(),
        updated_at: field(obj.get("updatedAt")).unwrap_or(crate::schema::epoch()),
        selected_dataset_id: field::<String>(obj.get("selectedDatasetId")).map(DatasetId::new),
        playback_speed: field(obj.get("playbackSpeed")).unwrap_or(default_playback_speed()),
        manual_mode_flag: field(obj.get("manualModeFlag")).unwrap_or(false),
        boundaries: lenient_entries(obj.get("boundaries")),
        metadata_selection: field(obj.get("metadataSelection")),
        history: lenient_entries(obj.get("history")),
    }
}

fn field<T: DeserializeOwned>(value: Option<&Value>) -> Option<T> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

/// Decode each array element independently, dropping failures.
fn lenient_entries<T: DeserializeOwned>(value: Option<&Value>) -> Vec<T> {
    match value.and_then(Value::as_array) {
        Some(entries) => entries
            .iter()
            .filter_map(|e| serde_json::from_value(e.clone()).ok())
            .collect(),
        None => Vec::new(),
    }
}
