//! Coordinate series with parallel metadata columns.

use std::collections::BTreeMap;

use dd_core::{CoreError, CoreResult};
use dd_geom::Point;

/// Ordered, append-only sequence of (x, y) pairs with optional named
/// per-point metadata columns.
///
/// Invariant: every column, including xs and ys, has the same length at all
/// times. `from_parts` checks it; mutation goes through [`crate::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoordinateSeries {
    xs: Vec<f64>,
    ys: Vec<f64>,
    meta: BTreeMap<String, Vec<f64>>,
}

impl CoordinateSeries {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_xy(xs: Vec<f64>, ys: Vec<f64>) -> CoreResult<Self> {
        Self::from_parts(xs, ys, BTreeMap::new())
    }

    pub fn from_parts(
        xs: Vec<f64>,
        ys: Vec<f64>,
        meta: BTreeMap<String, Vec<f64>>,
    ) -> CoreResult<Self> {
        if ys.len() != xs.len() {
            return Err(CoreError::LengthMismatch {
                what: "ys",
                expected: xs.len(),
                got: ys.len(),
            });
        }
        for column in meta.values() {
            if column.len() != xs.len() {
                return Err(CoreError::LengthMismatch {
                    what: "metadata column",
                    expected: xs.len(),
                    got: column.len(),
                });
            }
        }
        Ok(Self { xs, ys, meta })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn point(&self, index: usize) -> Option<Point> {
        Some(Point::new(*self.xs.get(index)?, *self.ys.get(index)?))
    }

    pub fn points(&self) -> impl Iterator<Item = Point> + '_ {
        self.xs
            .iter()
            .zip(&self.ys)
            .map(|(&x, &y)| Point::new(x, y))
    }

    pub fn meta_column(&self, name: &str) -> Option<&[f64]> {
        self.meta.get(name).map(Vec::as_slice)
    }

    pub fn meta_names(&self) -> impl Iterator<Item = &str> {
        self.meta.keys().map(String::as_str)
    }

    pub(crate) fn meta(&self) -> &BTreeMap<String, Vec<f64>> {
        &self.meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_parts_checks_lengths() {
        assert!(CoordinateSeries::from_xy(vec![1.0, 2.0], vec![1.0]).is_err());

        let mut meta = BTreeMap::new();
        meta.insert("temp".to_string(), vec![20.0]);
        assert!(CoordinateSeries::from_parts(vec![1.0, 2.0], vec![1.0, 2.0], meta).is_err());
    }

    #[test]
    fn points_zip_in_order() {
        let series = CoordinateSeries::from_xy(vec![1.0, 2.0], vec![3.0, 4.0]).unwrap();
        let points: Vec<_> = series.points().collect();
        assert_eq!(points, vec![Point::new(1.0, 3.0), Point::new(2.0, 4.0)]);
        assert_eq!(series.point(1), Some(Point::new(2.0, 4.0)));
        assert_eq!(series.point(2), None);
    }

    #[test]
    fn meta_column_lookup() {
        let mut meta = BTreeMap::new();
        meta.insert("temp".to_string(), vec![20.0, 21.0]);
        let series =
            CoordinateSeries::from_parts(vec![1.0, 2.0], vec![3.0, 4.0], meta).unwrap();
        assert_eq!(series.meta_column("temp"), Some(&[20.0, 21.0][..]));
        assert_eq!(series.meta_column("missing"), None);
    }
}
