//! Preference document schema definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use dd_core::{BoundaryId, DatasetId, DeviceId};
use dd_geom::{Boundary, Point, Shape, validate::validate_shape};
use dd_history::HistoryPoint;

use crate::migrate::LATEST_VERSION;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PreferenceDoc {
    #[serde(default)]
    pub schema_version: u32,
    #[serde(default)]
    pub device_id: DeviceId,
    #[serde(default = "epoch")]
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_dataset_id: Option<DatasetId>,
    #[serde(default = "default_playback_speed")]
    pub playback_speed: f64,
    #[serde(default)]
    pub manual_mode_flag: bool,
    #[serde(default)]
    pub boundaries: Vec<BoundaryDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata_selection: Option<String>,
    #[serde(default)]
    pub history: Vec<HistoryPoint>,
}

pub(crate) fn default_playback_speed() -> f64 {
    1.0
}

pub(crate) fn epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

impl Default for PreferenceDoc {
    fn default() -> Self {
        Self {
            schema_version: LATEST_VERSION,
            device_id: DeviceId::new(""),
            updated_at: DateTime::<Utc>::UNIX_EPOCH,
            selected_dataset_id: None,
            playback_speed: default_playback_speed(),
            manual_mode_flag: false,
            boundaries: Vec::new(),
            metadata_selection: None,
            history: Vec::new(),
        }
    }
}

impl PreferenceDoc {
    /// A fresh document for a device that has no persisted state yet.
    pub fn new_for_device(device_id: DeviceId) -> Self {
        Self {
            device_id,
            ..Self::default()
        }
    }

    /// Runtime boundaries for one dataset, in priority order, dropping
    /// entries that fail shape invariants.
    pub fn boundaries_for(&self, dataset_id: &DatasetId) -> Vec<Boundary> {
        self.boundaries
            .iter()
            .filter(|def| def.dataset_id == dataset_id.as_str())
            .filter_map(BoundaryDef::to_runtime)
            .collect()
    }

    /// Replace the persisted boundaries of one dataset, keeping other
    /// datasets' entries and their relative order.
    pub fn set_boundaries_for(&mut self, dataset_id: &DatasetId, boundaries: &[Boundary]) {
        self.boundaries
            .retain(|def| def.dataset_id != dataset_id.as_str());
        self.boundaries
            .extend(boundaries.iter().map(BoundaryDef::from_runtime));
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct PointDef {
    pub x: f64,
    pub y: f64,
}

impl From<Point> for PointDef {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

impl From<PointDef> for Point {
    fn from(p: PointDef) -> Self {
        Point::new(p.x, p.y)
    }
}

/// Persisted boundary entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BoundaryDef {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub dataset_id: String,
    #[serde(flatten)]
    pub shape: ShapeDef,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ShapeDef {
    Rectangle {
        coordinates: Vec<[f64; 2]>,
    },
    Circle {
        center: PointDef,
        radius: f64,
    },
    #[serde(rename_all = "camelCase")]
    Oval {
        center: PointDef,
        radius_x: f64,
        radius_y: f64,
    },
    Polygon {
        coordinates: Vec<[f64; 2]>,
    },
}

impl BoundaryDef {
    /// Convert to a runtime boundary, or None when required fields are
    /// missing or shape invariants fail.
    pub fn to_runtime(&self) -> Option<Boundary> {
        if self.id.is_empty() || self.dataset_id.is_empty() {
            return None;
        }
        let shape = match &self.shape {
            ShapeDef::Rectangle { coordinates } => {
                let [ax, ay] = *coordinates.first()?;
                let [bx, by] = *coordinates.get(1)?;
                Shape::Rectangle {
                    corner_a: Point::new(ax, ay),
                    corner_b: Point::new(bx, by),
                }
            }
            ShapeDef::Circle { center, radius } => Shape::Circle {
                center: (*center).into(),
                radius: *radius,
            },
            ShapeDef::Oval {
                center,
                radius_x,
                radius_y,
            } => Shape::Oval {
                center: (*center).into(),
                radius_x: *radius_x,
                radius_y: *radius_y,
            },
            ShapeDef::Polygon { coordinates } => Shape::Polygon {
                vertices: coordinates
                    .iter()
                    .map(|&[x, y]| Point::new(x, y))
                    .collect(),
            },
        };
        validate_shape(&shape).ok()?;
        Some(Boundary {
            id: BoundaryId::new(self.id.clone()),
            dataset_id: DatasetId::new(self.dataset_id.clone()),
            shape,
        })
    }

    pub fn from_runtime(boundary: &Boundary) -> Self {
        let shape = match &boundary.shape {
            Shape::Rectangle { corner_a, corner_b } => ShapeDef::Rectangle {
                coordinates: vec![[corner_a.x, corner_a.y], [corner_b.x, corner_b.y]],
            },
            Shape::Circle { center, radius } => ShapeDef::Circle {
                center: (*center).into(),
                radius: *radius,
            },
            Shape::Oval {
                center,
                radius_x,
                radius_y,
            } => ShapeDef::Oval {
                center: (*center).into(),
                radius_x: *radius_x,
                radius_y: *radius_y,
            },
            Shape::Polygon { vertices } => ShapeDef::Polygon {
                coordinates: vertices.iter().map(|v| [v.x, v.y]).collect(),
            },
        };
        Self {
            id: boundary.id.to_string(),
            dataset_id: boundary.dataset_id.to_string(),
            shape,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_wire_format() {
        let def = BoundaryDef {
            id: "b1".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Oval {
                center: PointDef { x: 1.0, y: 2.0 },
                radius_x: 3.0,
                radius_y: 4.0,
            },
        };
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "oval");
        assert_eq!(json["datasetId"], "d1");
        assert_eq!(json["center"]["x"], 1.0);
        assert_eq!(json["radiusX"], 3.0);
        assert_eq!(json["radiusY"], 4.0);

        let back: BoundaryDef = serde_json::from_value(json).unwrap();
        assert_eq!(back, def);
    }

    #[test]
    fn polygon_coordinates_are_pairs() {
        let def = BoundaryDef {
            id: "p1".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Polygon {
                coordinates: vec![[0.0, 0.0], [10.0, 0.0], [5.0, 10.0]],
            },
        };
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "polygon");
        assert_eq!(json["coordinates"][2][1], 10.0);
    }

    #[test]
    fn runtime_roundtrip() {
        let def = BoundaryDef {
            id: "b1".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Circle {
                center: PointDef { x: 0.0, y: 0.0 },
                radius: 5.0,
            },
        };
        let runtime = def.to_runtime().unwrap();
        assert_eq!(BoundaryDef::from_runtime(&runtime), def);
    }

    #[test]
    fn invalid_defs_do_not_convert() {
        // missing dataset id
        let def = BoundaryDef {
            id: "b1".to_string(),
            dataset_id: String::new(),
            shape: ShapeDef::Circle {
                center: PointDef { x: 0.0, y: 0.0 },
                radius: 5.0,
            },
        };
        assert!(def.to_runtime().is_none());

        // non-positive radius
        let def = BoundaryDef {
            id: "b1".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Circle {
                center: PointDef { x: 0.0, y: 0.0 },
                radius: 0.0,
            },
        };
        assert!(def.to_runtime().is_none());

        // two-vertex polygon
        let def = BoundaryDef {
            id: "p1".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Polygon {
                coordinates: vec![[0.0, 0.0], [1.0, 1.0]],
            },
        };
        assert!(def.to_runtime().is_none());

        // rectangle with a single corner
        let def = BoundaryDef {
            id: "r1".to_string(),
            dataset_id: "d1".to_string(),
            shape: ShapeDef::Rectangle {
                coordinates: vec![[0.0, 0.0]],
            },
        };
        assert!(def.to_runtime().is_none());
    }

    #[test]
    fn set_boundaries_for_keeps_other_datasets() {
        let mut doc = PreferenceDoc::default();
        let other = BoundaryDef {
            id: "keep".to_string(),
            dataset_id: "d2".to_string(),
            shape: ShapeDef::Circle {
                center: PointDef { x: 0.0, y: 0.0 },
                radius: 1.0,
            },
        };
        doc.boundaries.push(other.clone());

        let ds = DatasetId::new("d1");
        let replacement = Boundary {
            id: BoundaryId::new("new"),
            dataset_id: ds.clone(),
            shape: Shape::Circle {
                center: Point::new(0.0, 0.0),
                radius: 2.0,
            },
        };
        doc.set_boundaries_for(&ds, &[replacement]);

        assert_eq!(doc.boundaries.len(), 2);
        assert!(doc.boundaries.contains(&other));
        assert_eq!(doc.boundaries_for(&ds).len(), 1);
    }
}
