//! Boundary construction from raw selection input.
//!
//! The frontend hands over the pointer trail captured while the user dragged
//! or clicked out a region. Box-style shapes are derived from the trail's
//! bounding box; polygons use the clicked vertices directly.

use crate::shape::{Point, Shape};

/// Which shape the user asked to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Oval,
    Polygon,
}

/// Raw pointer trail for one selection gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    points: Vec<Point>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_points(points: Vec<Point>) -> Self {
        Self { points }
    }

    pub fn push(&mut self, p: Point) {
        self.points.push(p);
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Min/max corners of the trail, or None for an empty trail.
    pub fn bounding_box(&self) -> Option<(Point, Point)> {
        let first = self.points.first()?;
        let mut min = *first;
        let mut max = *first;
        for p in &self.points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Some((min, max))
    }

    /// Vertices with consecutive duplicates collapsed. The trail repeats
    /// points while the pointer rests, which must not count as extra
    /// polygon vertices.
    pub fn effective_vertices(&self) -> Vec<Point> {
        let mut out: Vec<Point> = Vec::with_capacity(self.points.len());
        for p in &self.points {
            if out.last() != Some(p) {
                out.push(*p);
            }
        }
        out
    }
}

/// Build a shape from a selection gesture.
///
/// Returns None when the gesture cannot produce a valid shape: a polygon
/// with fewer than three effective vertices, or a box gesture whose
/// bounding box is too flat to yield positive radii.
pub fn build_shape(selection: &Selection, kind: ShapeKind) -> Option<Shape> {
    match kind {
        ShapeKind::Rectangle => {
            let (min, max) = selection.bounding_box()?;
            Some(Shape::Rectangle {
                corner_a: min,
                corner_b: max,
            })
        }
        ShapeKind::Circle => {
            let (min, max) = selection.bounding_box()?;
            let center = midpoint(min, max);
            // half the smaller bounding-box dimension
            let radius = ((max.x - min.x) / 2.0).min((max.y - min.y) / 2.0);
            if radius <= 0.0 {
                return None;
            }
            Some(Shape::Circle { center, radius })
        }
        ShapeKind::Oval => {
            let (min, max) = selection.bounding_box()?;
            let center = midpoint(min, max);
            let radius_x = (max.x - min.x) / 2.0;
            let radius_y = (max.y - min.y) / 2.0;
            if radius_x <= 0.0 || radius_y <= 0.0 {
                return None;
            }
            Some(Shape::Oval {
                center,
                radius_x,
                radius_y,
            })
        }
        ShapeKind::Polygon => {
            let vertices = selection.effective_vertices();
            if vertices.len() < 3 {
                return None;
            }
            Some(Shape::Polygon { vertices })
        }
    }
}

fn midpoint(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drag(points: &[(f64, f64)]) -> Selection {
        Selection::from_points(points.iter().map(|&(x, y)| Point::new(x, y)).collect())
    }

    #[test]
    fn rectangle_from_drag_is_bounding_box() {
        let sel = drag(&[(2.0, 8.0), (6.0, 3.0), (4.0, 5.0)]);
        let shape = build_shape(&sel, ShapeKind::Rectangle).unwrap();
        assert_eq!(
            shape,
            Shape::Rectangle {
                corner_a: Point::new(2.0, 3.0),
                corner_b: Point::new(6.0, 8.0),
            }
        );
    }

    #[test]
    fn circle_radius_is_half_smaller_dimension() {
        let sel = drag(&[(0.0, 0.0), (10.0, 4.0)]);
        let shape = build_shape(&sel, ShapeKind::Circle).unwrap();
        assert_eq!(
            shape,
            Shape::Circle {
                center: Point::new(5.0, 2.0),
                radius: 2.0,
            }
        );
    }

    #[test]
    fn oval_radii_are_independent() {
        let sel = drag(&[(0.0, 0.0), (10.0, 4.0)]);
        let shape = build_shape(&sel, ShapeKind::Oval).unwrap();
        assert_eq!(
            shape,
            Shape::Oval {
                center: Point::new(5.0, 2.0),
                radius_x: 5.0,
                radius_y: 2.0,
            }
        );
    }

    #[test]
    fn flat_drag_rejected_for_round_shapes() {
        let sel = drag(&[(0.0, 3.0), (10.0, 3.0)]);
        assert!(build_shape(&sel, ShapeKind::Circle).is_none());
        assert!(build_shape(&sel, ShapeKind::Oval).is_none());
        // a flat rectangle is still a (degenerate) rectangle
        assert!(build_shape(&sel, ShapeKind::Rectangle).is_some());
    }

    #[test]
    fn polygon_needs_three_effective_vertices() {
        // resting pointer repeats a vertex; it must not count twice
        let sel = drag(&[(0.0, 0.0), (0.0, 0.0), (5.0, 5.0)]);
        assert!(build_shape(&sel, ShapeKind::Polygon).is_none());

        let sel = drag(&[(0.0, 0.0), (0.0, 0.0), (5.0, 5.0), (10.0, 0.0)]);
        let shape = build_shape(&sel, ShapeKind::Polygon).unwrap();
        match shape {
            Shape::Polygon { vertices } => assert_eq!(vertices.len(), 3),
            other => panic!("expected polygon, got {other:?}"),
        }
    }

    #[test]
    fn empty_selection_builds_nothing() {
        let sel = Selection::new();
        assert!(build_shape(&sel, ShapeKind::Rectangle).is_none());
        assert!(build_shape(&sel, ShapeKind::Polygon).is_none());
    }
}
