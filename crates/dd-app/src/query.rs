//! Read-side summaries for the UI projection.

use dd_core::{Clock, DatasetId};
use dd_history::HistoryPoint;
use dd_prefs::LocalReplica;
use dd_sync::{RemoteReplica, SyncState};

use crate::api::{CoordinateApi, StatusApi};
use crate::session::DashboardSession;

/// Snapshot of everything a stat-tile row needs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub dataset: Option<DatasetId>,
    pub sync_state: SyncState,
    pub has_conflict: bool,
    pub total_points: usize,
    pub normal_points: usize,
    pub anomalous_points: usize,
    pub anomaly_percentage: f64,
    pub latest_points: usize,
    pub stream_active: bool,
    pub progress_percentage: f64,
    pub history_len: usize,
}

pub fn session_summary<L, R, CA, SA, K>(
    session: &DashboardSession<L, R, CA, SA, K>,
) -> SessionSummary
where
    L: LocalReplica,
    R: RemoteReplica,
    CA: CoordinateApi,
    SA: StatusApi,
    K: Clock + Clone,
{
    let summary = session.classification().summary();
    let status = session.stream_status();
    SessionSummary {
        dataset: session.selected_dataset().cloned(),
        sync_state: session.sync_state(),
        has_conflict: session.conflict().is_some(),
        total_points: summary.total,
        normal_points: summary.normal,
        anomalous_points: summary.anomalous,
        anomaly_percentage: summary.anomaly_percentage,
        latest_points: session.classification().latest.len(),
        stream_active: status.is_active,
        progress_percentage: status.progress_percentage,
        history_len: session.history().len(),
    }
}

/// The newest `count` history points, oldest first.
pub fn history_tail<L, R, CA, SA, K>(
    session: &DashboardSession<L, R, CA, SA, K>,
    count: usize,
) -> Vec<HistoryPoint>
where
    L: LocalReplica,
    R: RemoteReplica,
    CA: CoordinateApi,
    SA: StatusApi,
    K: Clock + Clone,
{
    let series = session.history();
    let skip = series.len().saturating_sub(count);
    series.iter().skip(skip).cloned().collect()
}
