//! Streaming-status contract returned by the ingest service.

use serde::{Deserialize, Serialize};

/// Progress report for one dataset's coordinate stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamStatus {
    pub total_points: u64,
    pub streamed_points: u64,
    pub progress_percentage: f64,
    pub is_active: bool,
    /// How many trailing points the chart should glow-highlight.
    pub latest_glow_count: usize,
    /// Free-form phase label from the service ("streaming", "complete", ...).
    #[serde(default)]
    pub status: String,
}

impl StreamStatus {
    /// An inactive, empty stream; the session starts from this.
    pub fn idle() -> Self {
        Self {
            total_points: 0,
            streamed_points: 0,
            progress_percentage: 0.0,
            is_active: false,
            latest_glow_count: 0,
            status: String::new(),
        }
    }
}
