//! dd-geom: normal-region geometry for driftdeck.
//!
//! Users draw boundaries (rectangle, circle, oval, polygon) marking the
//! "normal operating area" of a sensor chart. This crate holds the pure
//! point-in-shape predicates, boundary construction from raw selection
//! input, and the per-dataset boundary collections the classifier walks.

pub mod boundary;
pub mod selection;
pub mod shape;
pub mod validate;

pub use boundary::{Boundary, BoundaryMode, BoundarySet};
pub use selection::{Selection, ShapeKind, build_shape};
pub use shape::{Point, Shape};
pub use validate::{BoundaryValidationError, validate_boundaries};
