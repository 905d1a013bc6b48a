//! History point storage.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Oldest entries are evicted once the window holds this many points.
pub const DEFAULT_HISTORY_CAP: usize = 10_000;

/// One derived-metric sample. All metrics are optional; a tick records
/// whatever was computable at the time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryPoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anomaly_percentage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wear_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub throughput_per_minute: Option<f64>,
}

impl HistoryPoint {
    pub fn is_empty(&self) -> bool {
        self.anomaly_percentage.is_none()
            && self.wear_score.is_none()
            && self.throughput_per_minute.is_none()
    }
}

/// Metrics computed on one tick, before stamping.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MetricSample {
    pub anomaly_percentage: Option<f64>,
    pub wear_score: Option<f64>,
    pub throughput_per_minute: Option<f64>,
}

/// Capped FIFO window of history points.
#[derive(Debug, Clone, PartialEq)]
pub struct HistorySeries {
    cap: usize,
    points: VecDeque<HistoryPoint>,
}

impl Default for HistorySeries {
    fn default() -> Self {
        Self::with_cap(DEFAULT_HISTORY_CAP)
    }
}

impl HistorySeries {
    pub fn with_cap(cap: usize) -> Self {
        Self {
            cap: cap.max(1),
            points: VecDeque::new(),
        }
    }

    /// Rebuild from persisted points, keeping only the newest `cap` entries.
    pub fn from_points(cap: usize, points: Vec<HistoryPoint>) -> Self {
        let mut series = Self::with_cap(cap);
        for point in points {
            series.push(point);
        }
        series
    }

    pub fn push(&mut self, point: HistoryPoint) {
        if self.points.len() == self.cap {
            self.points.pop_front();
        }
        self.points.push_back(point);
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn latest(&self) -> Option<&HistoryPoint> {
        self.points.back()
    }

    pub fn oldest(&self) -> Option<&HistoryPoint> {
        self.points.front()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryPoint> {
        self.points.iter()
    }

    pub fn to_vec(&self) -> Vec<HistoryPoint> {
        self.points.iter().cloned().collect()
    }
}

/// Appends stamped samples into the bounded series.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryAggregator {
    series: HistorySeries,
}

impl HistoryAggregator {
    pub fn new(series: HistorySeries) -> Self {
        Self { series }
    }

    pub fn with_cap(cap: usize) -> Self {
        Self {
            series: HistorySeries::with_cap(cap),
        }
    }

    /// Stamp and append one tick's metrics. Returns the appended point.
    pub fn observe(&mut self, timestamp: DateTime<Utc>, sample: MetricSample) -> HistoryPoint {
        let point = HistoryPoint {
            timestamp,
            anomaly_percentage: sample.anomaly_percentage,
            wear_score: sample.wear_score,
            throughput_per_minute: sample.throughput_per_minute,
        };
        self.series.push(point.clone());
        point
    }

    pub fn series(&self) -> &HistorySeries {
        &self.series
    }

    /// Replace the series, e.g. after a remote snapshot was applied.
    pub fn replace(&mut self, series: HistorySeries) {
        self.series = series;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn point(secs: i64) -> HistoryPoint {
        HistoryPoint {
            timestamp: Utc.timestamp_opt(secs, 0).unwrap(),
            anomaly_percentage: Some(secs as f64),
            wear_score: None,
            throughput_per_minute: None,
        }
    }

    #[test]
    fn cap_evicts_oldest() {
        let mut series = HistorySeries::with_cap(3);
        for secs in 0..4 {
            series.push(point(secs));
        }
        assert_eq!(series.len(), 3);
        assert_eq!(series.oldest().unwrap().timestamp, point(1).timestamp);
        assert_eq!(series.latest().unwrap().timestamp, point(3).timestamp);
    }

    #[test]
    fn from_points_keeps_newest() {
        let series = HistorySeries::from_points(2, vec![point(0), point(1), point(2)]);
        assert_eq!(series.len(), 2);
        assert_eq!(series.oldest().unwrap().timestamp, point(1).timestamp);
    }

    #[test]
    fn aggregator_stamps_samples() {
        let mut agg = HistoryAggregator::with_cap(10);
        let appended = agg.observe(
            point(5).timestamp,
            MetricSample {
                anomaly_percentage: Some(12.5),
                wear_score: Some(0.3),
                throughput_per_minute: None,
            },
        );
        assert_eq!(appended.anomaly_percentage, Some(12.5));
        assert_eq!(agg.series().len(), 1);
        assert_eq!(agg.series().latest(), Some(&appended));
    }

    #[test]
    fn point_roundtrips_camel_case() {
        let p = HistoryPoint {
            timestamp: Utc.timestamp_opt(60, 0).unwrap(),
            anomaly_percentage: Some(50.0),
            wear_score: None,
            throughput_per_minute: Some(120.0),
        };
        let json = serde_json::to_value(&p).unwrap();
        assert!(json.get("anomalyPercentage").is_some());
        assert!(json.get("wearScore").is_none());
        assert!(json.get("throughputPerMinute").is_some());

        let back: HistoryPoint = serde_json::from_value(json).unwrap();
        assert_eq!(back, p);
    }
}
