//! Boundary validation logic.
//!
//! Construction via [`crate::build_shape`] cannot produce an invalid shape,
//! but boundaries also arrive from decoded preference documents. The loader
//! drops entries that fail these checks rather than failing the whole load.

use std::collections::HashSet;

use crate::boundary::Boundary;
use crate::shape::Shape;

#[derive(thiserror::Error, Debug)]
pub enum BoundaryValidationError {
    #[error("Duplicate boundary id: {id}")]
    DuplicateId { id: String },

    #[error("Boundary {id} has an empty id or dataset id")]
    MissingIdentity { id: String },

    #[error("Boundary {id}: {reason}")]
    InvalidShape { id: String, reason: &'static str },
}

/// Check one boundary's shape invariants.
pub fn validate_shape(shape: &Shape) -> Result<(), &'static str> {
    match shape {
        Shape::Rectangle { corner_a, corner_b } => {
            for v in [corner_a.x, corner_a.y, corner_b.x, corner_b.y] {
                if !v.is_finite() {
                    return Err("non-finite rectangle corner");
                }
            }
            Ok(())
        }
        Shape::Circle { center, radius } => {
            if !center.x.is_finite() || !center.y.is_finite() || !radius.is_finite() {
                return Err("non-finite circle parameter");
            }
            if *radius <= 0.0 {
                return Err("circle radius must be positive");
            }
            Ok(())
        }
        Shape::Oval {
            center,
            radius_x,
            radius_y,
        } => {
            if !center.x.is_finite()
                || !center.y.is_finite()
                || !radius_x.is_finite()
                || !radius_y.is_finite()
            {
                return Err("non-finite oval parameter");
            }
            if *radius_x <= 0.0 || *radius_y <= 0.0 {
                return Err("oval radii must be positive");
            }
            Ok(())
        }
        Shape::Polygon { vertices } => {
            if vertices.len() < 3 {
                return Err("polygon needs at least three vertices");
            }
            if vertices.iter().any(|v| !v.x.is_finite() || !v.y.is_finite()) {
                return Err("non-finite polygon vertex");
            }
            Ok(())
        }
    }
}

/// Validate a priority-ordered boundary list: identities present, ids
/// unique, shape invariants hold.
pub fn validate_boundaries(boundaries: &[Boundary]) -> Result<(), BoundaryValidationError> {
    let mut seen = HashSet::new();
    for boundary in boundaries {
        if boundary.id.is_empty() || boundary.dataset_id.is_empty() {
            return Err(BoundaryValidationError::MissingIdentity {
                id: boundary.id.to_string(),
            });
        }
        if !seen.insert(&boundary.id) {
            return Err(BoundaryValidationError::DuplicateId {
                id: boundary.id.to_string(),
            });
        }
        validate_shape(&boundary.shape).map_err(|reason| {
            BoundaryValidationError::InvalidShape {
                id: boundary.id.to_string(),
                reason,
            }
        })?;
    }
    Ok(())
}
