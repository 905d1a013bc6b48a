//! Tick-driven dashboard session.
//!
//! Single-threaded cooperative scheduling: the frontend calls [`DashboardSession::tick`]
//! from its event loop and the session fires whichever of its clocks are
//! due, in a fixed order (preference poll, status/coordinate poll, debounced
//! write-back). Local mutations apply synchronously and are immediately
//! visible; remote reconciliation is eventually consistent, bounded by the
//! adaptive poll interval.

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use dd_core::{BoundaryId, Clock, DatasetId, DeviceId, ensure_finite};
use dd_geom::{Boundary, BoundaryMode, BoundarySet, Selection, ShapeKind, validate_boundaries};
use dd_history::{HistoryAggregator, HistorySeries, MetricSample};
use dd_prefs::{LocalReplica, PreferenceDoc};
use dd_stream::{Classification, CoordinateSeries, StreamStatus, classify, merge};
use dd_sync::{
    AdaptivePollClock, ChangeEvent, ConflictResolution, PollBand, ReconcilerOptions,
    RemoteReplica, SyncOutcome, SyncReconciler, SyncState,
};

use crate::api::{CoordinateApi, StatusApi};
use crate::error::{SessionError, SessionResult};

/// Session tuning; defaults match the production dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub reconciler: ReconcilerOptions,
    pub preference_poll: PollBand,
    pub status_poll: PollBand,
    /// Glow window when the status service does not provide one.
    pub default_latest_window: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reconciler: ReconcilerOptions::default(),
            preference_poll: PollBand::preference(),
            status_poll: PollBand::status(),
            default_latest_window: 12,
        }
    }
}

/// What one tick did, for the UI projection.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TickReport {
    pub preference_polled: bool,
    pub status_polled: bool,
    pub stream_updated: bool,
    pub applied_remote: bool,
    pub conflict_raised: bool,
    pub published: bool,
    pub publish_failed: bool,
}

/// One open dashboard for one account on one device.
pub struct DashboardSession<L, R, CA, SA, K>
where
    L: LocalReplica,
    R: RemoteReplica,
    CA: CoordinateApi,
    SA: StatusApi,
    K: Clock + Clone,
{
    reconciler: SyncReconciler<L, K>,
    remote: R,
    coords: CA,
    status_api: SA,
    clock: K,
    config: SessionConfig,

    boundary_mode: BoundaryMode,
    boundaries: BoundarySet,
    series: CoordinateSeries,
    classification: Classification,
    history: HistoryAggregator,
    last_status: StreamStatus,
    last_throughput_sample: Option<(DateTime<Utc>, u64)>,

    preference_poll: AdaptivePollClock,
    status_poll: AdaptivePollClock,
}

impl<L, R, CA, SA, K> DashboardSession<L, R, CA, SA, K>
where
    L: LocalReplica,
    R: RemoteReplica,
    CA: CoordinateApi,
    SA: StatusApi,
    K: Clock + Clone,
{
    pub fn new(
        local: L,
        remote: R,
        coords: CA,
        status_api: SA,
        clock: K,
        device_id: DeviceId,
        config: SessionConfig,
    ) -> SessionResult<Self> {
        let reconciler =
            SyncReconciler::new(local, clock.clone(), device_id, config.reconciler)?;
        let now = clock.now();
        let mut session = Self {
            reconciler,
            remote,
            coords,
            status_api,
            clock,
            config,
            boundary_mode: BoundaryMode::default(),
            boundaries: BoundarySet::new(),
            series: CoordinateSeries::new(),
            classification: Classification::default(),
            history: HistoryAggregator::with_cap(config.reconciler.history_cap),
            last_status: StreamStatus::idle(),
            last_throughput_sample: None,
            preference_poll: AdaptivePollClock::new(config.preference_poll, now),
            status_poll: AdaptivePollClock::new(config.status_poll, now),
        };
        session.materialize_from_working();
        Ok(session)
    }

    // ----- UI projection -----

    pub fn sync_state(&self) -> SyncState {
        self.reconciler.state()
    }

    pub fn preferences(&self) -> &PreferenceDoc {
        self.reconciler.working()
    }

    /// The retained foreign snapshot while a conflict awaits resolution.
    pub fn conflict(&self) -> Option<&PreferenceDoc> {
        self.reconciler.pending_remote()
    }

    pub fn selected_dataset(&self) -> Option<&DatasetId> {
        self.reconciler.working().selected_dataset_id.as_ref()
    }

    pub fn series(&self) -> &CoordinateSeries {
        &self.series
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn history(&self) -> &HistorySeries {
        self.history.series()
    }

    pub fn stream_status(&self) -> &StreamStatus {
        &self.last_status
    }

    pub fn active_boundaries(&self) -> &[Boundary] {
        match self.selected_dataset() {
            Some(dataset) => self.boundaries.for_dataset(dataset),
            None => &[],
        }
    }

    // ----- local mutations -----

    /// Switch datasets. Pending timers for the outgoing dataset are cleared
    /// so no stale write or classification targets it.
    pub fn select_dataset(&mut self, dataset: Option<DatasetId>) -> SessionResult<()> {
        self.reconciler.cancel_pending();
        self.reset_stream_state();
        self.reconciler.apply(ChangeEvent::SelectDataset(dataset))?;
        self.reclassify();
        Ok(())
    }

    pub fn set_playback_speed(&mut self, speed: f64) -> SessionResult<()> {
        let speed = ensure_finite(speed, "playback speed")?;
        self.reconciler.apply(ChangeEvent::SetPlaybackSpeed(speed))?;
        Ok(())
    }

    pub fn set_manual_mode(&mut self, enabled: bool) -> SessionResult<()> {
        self.reconciler.apply(ChangeEvent::SetManualMode(enabled))?;
        Ok(())
    }

    pub fn set_metadata_selection(&mut self, selection: Option<String>) -> SessionResult<()> {
        self.reconciler
            .apply(ChangeEvent::SetMetadataSelection(selection))?;
        Ok(())
    }

    /// Session-local toggle: whether new boundaries replace or join the set.
    pub fn set_boundary_mode(&mut self, mode: BoundaryMode) {
        self.boundary_mode = mode;
    }

    /// Build a boundary from a selection gesture on the active dataset.
    /// Returns the new boundary's id, or None for a gesture that cannot
    /// produce a valid shape.
    pub fn draw_boundary(
        &mut self,
        selection: &Selection,
        kind: ShapeKind,
    ) -> SessionResult<Option<BoundaryId>> {
        let dataset = self.require_dataset()?;
        let Some(boundary) = Boundary::build(dataset.clone(), selection, kind) else {
            return Ok(None);
        };
        let id = boundary.id.clone();
        self.boundaries.insert(boundary, self.boundary_mode);
        self.publish_boundaries(&dataset)?;
        Ok(Some(id))
    }

    /// Remove one boundary from the active dataset.
    pub fn remove_boundary(&mut self, id: &BoundaryId) -> SessionResult<bool> {
        let dataset = self.require_dataset()?;
        let removed = self.boundaries.remove(&dataset, id);
        if removed {
            self.publish_boundaries(&dataset)?;
        }
        Ok(removed)
    }

    /// Clear every boundary of the active dataset.
    pub fn clear_boundaries(&mut self) -> SessionResult<()> {
        let dataset = self.require_dataset()?;
        self.boundaries.clear_dataset(&dataset);
        self.publish_boundaries(&dataset)?;
        Ok(())
    }

    /// Apply the user's decision for a raised conflict.
    pub fn resolve_conflict(
        &mut self,
        resolution: ConflictResolution,
    ) -> SessionResult<SyncOutcome> {
        let outcome = self.reconciler.resolve_conflict(resolution)?;
        if outcome == SyncOutcome::AppliedRemote {
            self.materialize_from_working();
        }
        Ok(outcome)
    }

    // ----- scheduling -----

    /// Run everything that is due. Call from the frontend event loop.
    pub fn tick(&mut self) -> SessionResult<TickReport> {
        let now = self.clock.now();
        let mut report = TickReport::default();

        if self.preference_poll.fire_due(now) {
            report.preference_polled = true;
            self.poll_preferences(&mut report)?;
        }

        if self.status_poll.fire_due(now) {
            if let Some(dataset) = self.selected_dataset().cloned() {
                report.status_polled = true;
                self.poll_stream(&dataset, now, &mut report)?;
            }
        }

        if self.reconciler.writeback_due(now) {
            self.run_writeback(now, &mut report)?;
        }

        Ok(report)
    }

    /// Cancel every pending timer; no further writes leave this session.
    /// Unpublished edits remain in the durable local replica.
    pub fn teardown(&mut self) {
        self.reconciler.cancel_pending();
        self.preference_poll.cancel();
        self.status_poll.cancel();
    }

    // ----- internals -----

    fn poll_preferences(&mut self, report: &mut TickReport) -> SessionResult<()> {
        match self.remote.fetch() {
            Ok(fetched) => {
                match self.reconciler.ingest_remote(fetched)? {
                    SyncOutcome::AppliedRemote => {
                        self.materialize_from_working();
                        report.applied_remote = true;
                    }
                    SyncOutcome::ConflictRaised => report.conflict_raised = true,
                    _ => {}
                }
            }
            Err(err) => {
                // transient: previous state stands until the next poll
                debug!(%err, "preference poll failed");
            }
        }
        Ok(())
    }

    fn poll_stream(
        &mut self,
        dataset: &DatasetId,
        now: DateTime<Utc>,
        report: &mut TickReport,
    ) -> SessionResult<()> {
        let status = match self.status_api.fetch(dataset) {
            Ok(status) => status,
            Err(err) => {
                debug!(%err, "status poll failed");
                return Ok(());
            }
        };

        self.preference_poll.set_active(status.is_active, now);
        self.status_poll.set_active(status.is_active, now);

        match self.coords.fetch(dataset) {
            Ok(batch) => match batch.into_series() {
                Ok(incoming) => {
                    let merged = merge(&self.series, &incoming);
                    if merged.len() != self.series.len() {
                        self.series = merged;
                        report.stream_updated = true;
                    }
                }
                Err(err) => warn!(%err, "dropping misaligned coordinate batch"),
            },
            Err(err) => debug!(%err, "coordinate fetch failed"),
        }

        self.last_status = status;
        self.reclassify();

        if self.last_status.is_active {
            self.record_metrics(now)?;
        }

        Ok(())
    }

    /// Derived-metric tick: anomaly share of the whole series, wear as the
    /// anomalous share of the latest window, and streaming throughput from
    /// the status deltas.
    fn record_metrics(&mut self, now: DateTime<Utc>) -> SessionResult<()> {
        let summary = self.classification.summary();
        let sample = MetricSample {
            anomaly_percentage: (summary.total > 0).then_some(summary.anomaly_percentage),
            wear_score: self.wear_score(),
            throughput_per_minute: self.throughput_per_minute(now),
        };
        self.last_throughput_sample = Some((now, self.last_status.streamed_points));

        if sample == MetricSample::default() {
            return Ok(());
        }
        let point = self.history.observe(now, sample);
        self.reconciler.apply(ChangeEvent::AppendHistory(point))?;
        Ok(())
    }

    fn wear_score(&self) -> Option<f64> {
        let window = self.classification.latest.len();
        if window == 0 {
            return None;
        }
        let start = *self.classification.latest.first()?;
        let first_in_window = self
            .classification
            .anomalous
            .partition_point(|&index| index < start);
        let anomalous_in_window = self.classification.anomalous.len() - first_in_window;
        Some(anomalous_in_window as f64 / window as f64)
    }

    fn throughput_per_minute(&self, now: DateTime<Utc>) -> Option<f64> {
        let (prev_at, prev_count) = self.last_throughput_sample?;
        let streamed = self.last_status.streamed_points;
        if streamed < prev_count {
            // stream reset; skip this interval
            return None;
        }
        let minutes = (now - prev_at).num_milliseconds() as f64 / 60_000.0;
        if minutes <= 0.0 {
            return None;
        }
        Some((streamed - prev_count) as f64 / minutes)
    }

    fn run_writeback(&mut self, now: DateTime<Utc>, report: &mut TickReport) -> SessionResult<()> {
        // Read-then-merge-then-write: re-fetch the latest remote document
        // before publishing so unrelated foreign updates are reconciled
        // first. Best effort only; there is no version check, and two rapid
        // writes from different devices inside the same debounce window can
        // still clobber each other.
        match self.remote.fetch() {
            Ok(fetched) => match self.reconciler.ingest_remote(fetched)? {
                SyncOutcome::AppliedRemote => {
                    self.materialize_from_working();
                    report.applied_remote = true;
                }
                SyncOutcome::ConflictRaised => report.conflict_raised = true,
                _ => {}
            },
            Err(err) => debug!(%err, "pre-publish fetch failed"),
        }

        let Some(doc) = self.reconciler.take_writeback(now) else {
            return Ok(());
        };
        match self.remote.publish(&doc) {
            Ok(server_updated_at) => {
                self.reconciler.writeback_succeeded(server_updated_at)?;
                report.published = true;
            }
            Err(err) => {
                warn!(%err, "publish failed");
                self.reconciler.writeback_failed(now);
                report.publish_failed = true;
            }
        }
        Ok(())
    }

    fn require_dataset(&self) -> SessionResult<DatasetId> {
        self.selected_dataset()
            .cloned()
            .ok_or(SessionError::NoDatasetSelected)
    }

    fn publish_boundaries(&mut self, dataset: &DatasetId) -> SessionResult<()> {
        let boundaries = self.boundaries.for_dataset(dataset).to_vec();
        self.reconciler.apply(ChangeEvent::ReplaceBoundaries {
            dataset_id: dataset.clone(),
            boundaries,
        })?;
        self.reclassify();
        Ok(())
    }

    fn latest_window(&self) -> usize {
        if self.last_status.latest_glow_count > 0 {
            self.last_status.latest_glow_count
        } else {
            self.config.default_latest_window
        }
    }

    fn reclassify(&mut self) {
        let window = self.latest_window();
        let classification = match self.selected_dataset() {
            Some(dataset) => {
                classify(&self.series, self.boundaries.for_dataset(dataset), window)
            }
            None => Classification::default(),
        };
        self.classification = classification;
    }

    /// Rebuild runtime state from the working document, e.g. after a remote
    /// snapshot was applied.
    fn materialize_from_working(&mut self) {
        let doc = self.reconciler.working().clone();

        let mut runtime: Vec<Boundary> = doc
            .boundaries
            .iter()
            .filter_map(dd_prefs::BoundaryDef::to_runtime)
            .collect();
        if let Err(err) = validate_boundaries(&runtime) {
            // persisted documents can carry colliding ids; first entry wins
            warn!(%err, "dropping duplicate boundary entries");
            let mut seen = std::collections::HashSet::new();
            runtime.retain(|b| seen.insert(b.id.clone()));
        }
        let mut boundaries = BoundarySet::new();
        for boundary in runtime {
            boundaries.insert(boundary, BoundaryMode::Multi);
        }
        self.boundaries = boundaries;

        self.history = HistoryAggregator::new(HistorySeries::from_points(
            self.config.reconciler.history_cap,
            doc.history.clone(),
        ));

        self.reset_stream_state();
        self.reclassify();
    }

    fn reset_stream_state(&mut self) {
        self.series = CoordinateSeries::new();
        self.classification = Classification::default();
        self.last_status = StreamStatus::idle();
        self.last_throughput_sample = None;
        self.status_poll.reset(self.clock.now());
    }
}
