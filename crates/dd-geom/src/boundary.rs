//! Per-dataset boundary collections.
//!
//! Each dataset owns an ordered list of boundaries; list order is match
//! priority for the classifier (strict first-in-list-wins, overlapping
//! boundaries have no further tie-break).

use std::collections::BTreeMap;

use dd_core::{BoundaryId, DatasetId};

use crate::selection::{Selection, ShapeKind, build_shape};
use crate::shape::Shape;

/// One user-drawn normal region.
#[derive(Debug, Clone, PartialEq)]
pub struct Boundary {
    pub id: BoundaryId,
    pub dataset_id: DatasetId,
    pub shape: Shape,
}

impl Boundary {
    /// Build a boundary from a selection gesture, assigning a fresh id.
    /// Returns None when the gesture cannot produce a valid shape.
    pub fn build(dataset_id: DatasetId, selection: &Selection, kind: ShapeKind) -> Option<Self> {
        let shape = build_shape(selection, kind)?;
        Some(Self {
            id: BoundaryId::random(),
            dataset_id,
            shape,
        })
    }
}

/// Whether a new boundary replaces the dataset's set or joins it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// Every new boundary replaces the set (singleton).
    #[default]
    Single,
    /// New boundaries append after existing ones.
    Multi,
}

/// All boundaries, keyed by dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoundarySet {
    by_dataset: BTreeMap<DatasetId, Vec<Boundary>>,
}

impl BoundarySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boundaries for one dataset in priority order.
    pub fn for_dataset(&self, dataset_id: &DatasetId) -> &[Boundary] {
        self.by_dataset
            .get(dataset_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn insert(&mut self, boundary: Boundary, mode: BoundaryMode) {
        let list = self.by_dataset.entry(boundary.dataset_id.clone()).or_default();
        match mode {
            BoundaryMode::Single => {
                list.clear();
                list.push(boundary);
            }
            BoundaryMode::Multi => list.push(boundary),
        }
    }

    /// Remove one boundary by id. Returns whether anything was removed.
    pub fn remove(&mut self, dataset_id: &DatasetId, id: &BoundaryId) -> bool {
        let Some(list) = self.by_dataset.get_mut(dataset_id) else {
            return false;
        };
        let before = list.len();
        list.retain(|b| &b.id != id);
        let removed = list.len() != before;
        if list.is_empty() {
            self.by_dataset.remove(dataset_id);
        }
        removed
    }

    pub fn clear_dataset(&mut self, dataset_id: &DatasetId) {
        self.by_dataset.remove(dataset_id);
    }

    pub fn clear(&mut self) {
        self.by_dataset.clear();
    }

    pub fn len(&self) -> usize {
        self.by_dataset.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_dataset.is_empty()
    }

    /// All boundaries across datasets, dataset order then priority order.
    pub fn iter(&self) -> impl Iterator<Item = &Boundary> {
        self.by_dataset.values().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Point;

    fn boundary(dataset: &str, x: f64) -> Boundary {
        Boundary {
            id: BoundaryId::random(),
            dataset_id: DatasetId::new(dataset),
            shape: Shape::Circle {
                center: Point::new(x, 0.0),
                radius: 1.0,
            },
        }
    }

    #[test]
    fn single_mode_replaces() {
        let mut set = BoundarySet::new();
        let ds = DatasetId::new("d1");
        set.insert(boundary("d1", 1.0), BoundaryMode::Single);
        set.insert(boundary("d1", 2.0), BoundaryMode::Single);
        assert_eq!(set.for_dataset(&ds).len(), 1);
        match &set.for_dataset(&ds)[0].shape {
            Shape::Circle { center, .. } => assert_eq!(center.x, 2.0),
            other => panic!("unexpected shape {other:?}"),
        }
    }

    #[test]
    fn multi_mode_appends_in_priority_order() {
        let mut set = BoundarySet::new();
        let ds = DatasetId::new("d1");
        set.insert(boundary("d1", 1.0), BoundaryMode::Multi);
        set.insert(boundary("d1", 2.0), BoundaryMode::Multi);
        let list = set.for_dataset(&ds);
        assert_eq!(list.len(), 2);
        match (&list[0].shape, &list[1].shape) {
            (Shape::Circle { center: a, .. }, Shape::Circle { center: b, .. }) => {
                assert_eq!((a.x, b.x), (1.0, 2.0));
            }
            other => panic!("unexpected shapes {other:?}"),
        }
    }

    #[test]
    fn datasets_are_independent() {
        let mut set = BoundarySet::new();
        set.insert(boundary("d1", 1.0), BoundaryMode::Single);
        set.insert(boundary("d2", 2.0), BoundaryMode::Single);
        assert_eq!(set.for_dataset(&DatasetId::new("d1")).len(), 1);
        assert_eq!(set.for_dataset(&DatasetId::new("d2")).len(), 1);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn remove_by_id() {
        let mut set = BoundarySet::new();
        let ds = DatasetId::new("d1");
        let b = boundary("d1", 1.0);
        let id = b.id.clone();
        set.insert(b, BoundaryMode::Multi);
        set.insert(boundary("d1", 2.0), BoundaryMode::Multi);

        assert!(set.remove(&ds, &id));
        assert!(!set.remove(&ds, &id));
        assert_eq!(set.for_dataset(&ds).len(), 1);
    }

    #[test]
    fn clear_all_and_per_dataset() {
        let mut set = BoundarySet::new();
        set.insert(boundary("d1", 1.0), BoundaryMode::Multi);
        set.insert(boundary("d2", 2.0), BoundaryMode::Multi);

        set.clear_dataset(&DatasetId::new("d1"));
        assert!(set.for_dataset(&DatasetId::new("d1")).is_empty());
        assert!(!set.is_empty());

        set.clear();
        assert!(set.is_empty());
    }
}
