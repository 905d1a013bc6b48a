//! Schema migration framework.

use crate::PrefsError;
use crate::schema::{PreferenceDoc, default_playback_speed};

pub const LATEST_VERSION: u32 = 2;

/// Playback speed band the UI exposes.
const PLAYBACK_MIN: f64 = 0.25;
const PLAYBACK_MAX: f64 = 16.0;

pub fn migrate_to_latest(mut doc: PreferenceDoc) -> Result<PreferenceDoc, PrefsError> {
    while doc.schema_version < LATEST_VERSION {
        doc = migrate_one_version(doc)?;
    }
    if doc.schema_version > LATEST_VERSION {
        return Err(PrefsError::Migration {
            what: format!("document version {} is newer than supported", doc.schema_version),
        });
    }
    Ok(doc)
}

fn migrate_one_version(doc: PreferenceDoc) -> Result<PreferenceDoc, PrefsError> {
    match doc.schema_version {
        0 => Ok(migrate_v0_to_v1(doc)),
        1 => Ok(migrate_v1_to_v2(doc)),
        v => Err(PrefsError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// v0 documents predate the envelope: selections were stored as empty
/// strings instead of being absent, and playback speed was unclamped.
fn migrate_v0_to_v1(mut doc: PreferenceDoc) -> PreferenceDoc {
    if doc
        .selected_dataset_id
        .as_ref()
        .is_some_and(|d| d.is_empty())
    {
        doc.selected_dataset_id = None;
    }
    if doc
        .metadata_selection
        .as_ref()
        .is_some_and(|m| m.is_empty())
    {
        doc.metadata_selection = None;
    }
    if !doc.playback_speed.is_finite() || doc.playback_speed <= 0.0 {
        doc.playback_speed = default_playback_speed();
    } else {
        doc.playback_speed = doc.playback_speed.clamp(PLAYBACK_MIN, PLAYBACK_MAX);
    }
    doc.schema_version = 1;
    doc
}

/// v1 documents accumulated entries the engine ignores anyway: boundaries
/// that fail shape invariants and history points carrying no metric.
fn migrate_v1_to_v2(mut doc: PreferenceDoc) -> PreferenceDoc {
    doc.boundaries.retain(|def| def.to_runtime().is_some());
    doc.history.retain(|point| !point.is_empty());
    doc.schema_version = 2;
    doc
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{BoundaryDef, PointDef, ShapeDef};
    use chrono::Utc;
    use dd_core::DatasetId;
    use dd_history::HistoryPoint;

    #[test]
    fn migrate_latest_is_noop() {
        let doc = PreferenceDoc::default();
        assert_eq!(doc.schema_version, LATEST_VERSION);
        let migrated = migrate_to_latest(doc.clone()).unwrap();
        assert_eq!(migrated, doc);
    }

    #[test]
    fn newer_than_latest_is_rejected() {
        let doc = PreferenceDoc {
            schema_version: LATEST_VERSION + 1,
            ..PreferenceDoc::default()
        };
        assert!(migrate_to_latest(doc).is_err());
    }

    #[test]
    fn v0_normalizes_empty_selections_and_speed() {
        let doc = PreferenceDoc {
            schema_version: 0,
            selected_dataset_id: Some(DatasetId::new("")),
            metadata_selection: Some(String::new()),
            playback_speed: 0.0,
            ..PreferenceDoc::default()
        };
        let migrated = migrate_to_latest(doc).unwrap();
        assert_eq!(migrated.schema_version, LATEST_VERSION);
        assert!(migrated.selected_dataset_id.is_none());
        assert!(migrated.metadata_selection.is_none());
        assert_eq!(migrated.playback_speed, 1.0);
    }

    #[test]
    fn v0_clamps_excessive_speed() {
        let doc = PreferenceDoc {
            schema_version: 0,
            playback_speed: 1000.0,
            ..PreferenceDoc::default()
        };
        let migrated = migrate_to_latest(doc).unwrap();
        assert_eq!(migrated.playback_speed, PLAYBACK_MAX);
    }

    #[test]
    fn v1_drops_invalid_boundaries_and_empty_history() {
        let good = BoundaryDef {
            id: "good".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Circle {
                center: PointDef { x: 0.0, y: 0.0 },
                radius: 2.0,
            },
        };
        let bad = BoundaryDef {
            id: "bad".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Circle {
                center: PointDef { x: 0.0, y: 0.0 },
                radius: -1.0,
            },
        };
        let doc = PreferenceDoc {
            schema_version: 1,
            boundaries: vec![good.clone(), bad],
            history: vec![HistoryPoint {
                timestamp: Utc::now(),
                anomaly_percentage: None,
                wear_score: None,
                throughput_per_minute: None,
            }],
            ..PreferenceDoc::default()
        };
        let migrated = migrate_to_latest(doc).unwrap();
        assert_eq!(migrated.boundaries, vec![good]);
        assert!(migrated.history.is_empty());
    }
}
