//! Normal/anomalous classification against user-drawn boundaries.

use dd_core::clamp_percentage;
use dd_geom::Boundary;

use crate::series::CoordinateSeries;

/// Derived partition of a series. Not persisted; recomputed on each tick.
///
/// `latest` tags the most recently streamed points for the glow highlight.
/// It is orthogonal to the normal/anomalous partition: a latest point is
/// still in exactly one of the two.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub normal: Vec<usize>,
    pub anomalous: Vec<usize>,
    pub latest: Vec<usize>,
}

impl Classification {
    pub fn summary(&self) -> ClassificationSummary {
        let total = self.normal.len() + self.anomalous.len();
        let anomaly_percentage = if total == 0 {
            0.0
        } else {
            clamp_percentage(self.anomalous.len() as f64 / total as f64 * 100.0)
        };
        ClassificationSummary {
            total,
            normal: self.normal.len(),
            anomalous: self.anomalous.len(),
            anomaly_percentage,
        }
    }
}

/// Counts for stat tiles and the history series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassificationSummary {
    pub total: usize,
    pub normal: usize,
    pub anomalous: usize,
    pub anomaly_percentage: f64,
}

/// Partition every point of `series` by the priority-ordered boundary list.
///
/// A point is normal when the first boundary containing it exists (strict
/// first-in-list-wins; overlapping boundaries have no further tie-break) and
/// anomalous otherwise. With no boundaries, every point is anomalous. The
/// last `latest_window` points by arrival order are additionally tagged
/// latest.
pub fn classify(
    series: &CoordinateSeries,
    boundaries: &[Boundary],
    latest_window: usize,
) -> Classification {
    let mut result = Classification::default();

    for (index, point) in series.points().enumerate() {
        if boundaries.iter().any(|b| b.shape.contains(point)) {
            result.normal.push(index);
        } else {
            result.anomalous.push(index);
        }
    }

    let len = series.len();
    let start = len.saturating_sub(latest_window);
    result.latest = (start..len).collect();

    result
}

/// Index of the first boundary containing `point`, in priority order.
pub fn matching_boundary(boundaries: &[Boundary], point: dd_geom::Point) -> Option<usize> {
    boundaries.iter().position(|b| b.shape.contains(point))
}
