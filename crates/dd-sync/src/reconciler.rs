//! Replica reconciliation state machine.
//!
//! The reconciler owns the local working snapshot and its durable replica.
//! Local mutations arrive as [`ChangeEvent`]s, remote polls as
//! [`crate::RemoteDoc`]s; every ingest returns a [`SyncOutcome`] for the UI
//! projection. Divergence is resolved by the envelope's timestamp and
//! device identity: a foreign, newer remote auto-applies while the local
//! side has nothing unpublished, and otherwise raises a conflict that only
//! an explicit user decision clears.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, warn};

use dd_core::{Clock, DatasetId, DeviceId};
use dd_geom::Boundary;
use dd_history::{DEFAULT_HISTORY_CAP, HistoryPoint};
use dd_prefs::{LocalReplica, PreferenceDoc, content_hash};

use crate::clocks::DebounceClock;
use crate::replica::RemoteDoc;
use crate::{SyncError, SyncResult};

/// Reconciliation states.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No pending local edits.
    Clean,
    /// Local edits await publish.
    Dirty,
    /// Divergence needs a user decision.
    Conflict,
}

/// What one reconciler step meant, for the UI projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    NoChange,
    /// A local mutation was recorded and scheduled for publish.
    LocalEdited,
    /// Our own publish came back from the server.
    Echo,
    /// A foreign but older remote snapshot was ignored.
    IgnoredStale,
    /// A foreign, newer remote snapshot was applied into local state.
    AppliedRemote,
    /// Divergence detected; both snapshots retained.
    ConflictRaised,
    /// The user discarded the remote snapshot; local republishes.
    KeptLocal,
    /// A write-back reached the server.
    Published,
    /// A write-back failed; it retries on the next debounce fire.
    PublishFailed,
}

/// User decision for a raised conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    KeepLocal,
    ApplyRemote,
}

/// One local mutation of the preference document.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    SelectDataset(Option<DatasetId>),
    SetPlaybackSpeed(f64),
    SetManualMode(bool),
    SetMetadataSelection(Option<String>),
    /// Replace one dataset's boundary list (priority order preserved).
    ReplaceBoundaries {
        dataset_id: DatasetId,
        boundaries: Vec<Boundary>,
    },
    AppendHistory(HistoryPoint),
}

/// Tuning knobs; defaults match the production dashboard.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReconcilerOptions {
    pub debounce_delay: Duration,
    pub history_cap: usize,
}

impl Default for ReconcilerOptions {
    fn default() -> Self {
        Self {
            debounce_delay: DebounceClock::default_delay(),
            history_cap: DEFAULT_HISTORY_CAP,
        }
    }
}

/// Explicit reconciler instance owning its injected collaborators.
pub struct SyncReconciler<L: LocalReplica, C: Clock> {
    local: L,
    clock: C,
    device_id: DeviceId,
    state: SyncState,
    working: PreferenceDoc,
    pending_remote: Option<PreferenceDoc>,
    debounce: DebounceClock,
    history_cap: usize,
    /// Edits not yet handed to a publish attempt.
    edits_pending: bool,
    inflight_hash: Option<String>,
    last_published_hash: Option<String>,
    last_server_updated_at: Option<DateTime<Utc>>,
}

impl<L: LocalReplica, C: Clock> SyncReconciler<L, C> {
    /// Load the working snapshot from the local replica (or start fresh for
    /// this device) and begin in Clean.
    pub fn new(
        local: L,
        clock: C,
        device_id: DeviceId,
        options: ReconcilerOptions,
    ) -> SyncResult<Self> {
        let working = local
            .load()?
            .unwrap_or_else(|| PreferenceDoc::new_for_device(device_id.clone()));
        Ok(Self {
            local,
            clock,
            device_id,
            state: SyncState::Clean,
            working,
            pending_remote: None,
            debounce: DebounceClock::new(options.debounce_delay),
            history_cap: options.history_cap.max(1),
            edits_pending: false,
            inflight_hash: None,
            last_published_hash: None,
            last_server_updated_at: None,
        })
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn working(&self) -> &PreferenceDoc {
        &self.working
    }

    pub fn device_id(&self) -> &DeviceId {
        &self.device_id
    }

    /// The retained foreign snapshot while in Conflict.
    pub fn pending_remote(&self) -> Option<&PreferenceDoc> {
        self.pending_remote.as_ref()
    }

    pub fn last_server_updated_at(&self) -> Option<DateTime<Utc>> {
        self.last_server_updated_at
    }

    /// Record a local mutation: stamp, persist locally, schedule the
    /// debounced write-back. A mutation during Conflict abandons the
    /// retained remote snapshot in favor of the edited local one.
    pub fn apply(&mut self, event: ChangeEvent) -> SyncResult<SyncOutcome> {
        if self.state == SyncState::Conflict {
            warn!("local edit during conflict discards the pending remote snapshot");
            self.pending_remote = None;
        }

        apply_event(&mut self.working, event, self.history_cap);

        let now = self.clock.now();
        self.working.updated_at = now;
        self.working.device_id = self.device_id.clone();
        self.local.store(&self.working)?;
        self.debounce.arm(now);
        self.edits_pending = true;
        self.transition(SyncState::Dirty);
        Ok(SyncOutcome::LocalEdited)
    }

    /// Fold a remote poll result into local state.
    pub fn ingest_remote(&mut self, fetched: Option<RemoteDoc>) -> SyncResult<SyncOutcome> {
        let Some(remote) = fetched else {
            return Ok(SyncOutcome::NoChange);
        };

        if remote.doc.device_id == self.device_id {
            // our own publish coming back
            self.last_server_updated_at = Some(remote.server_updated_at);
            if self.state == SyncState::Dirty && !self.edits_pending && !self.debounce.is_armed()
            {
                self.transition(SyncState::Clean);
            }
            return Ok(SyncOutcome::Echo);
        }

        if remote.doc.updated_at <= self.working.updated_at {
            debug!(
                remote = %remote.doc.updated_at,
                local = %self.working.updated_at,
                "ignoring stale foreign snapshot"
            );
            return Ok(SyncOutcome::IgnoredStale);
        }

        match self.state {
            SyncState::Clean => {
                self.working = remote.doc;
                self.local.store(&self.working)?;
                self.last_server_updated_at = Some(remote.server_updated_at);
                debug!("applied newer foreign snapshot");
                Ok(SyncOutcome::AppliedRemote)
            }
            SyncState::Dirty => {
                self.pending_remote = Some(remote.doc);
                self.transition(SyncState::Conflict);
                warn!("foreign snapshot diverged from unpublished local edits");
                Ok(SyncOutcome::ConflictRaised)
            }
            SyncState::Conflict => {
                // keep the newest foreign snapshot for the resolution dialog
                self.pending_remote = Some(remote.doc);
                Ok(SyncOutcome::ConflictRaised)
            }
        }
    }

    /// Apply the user's conflict decision.
    pub fn resolve_conflict(
        &mut self,
        resolution: ConflictResolution,
    ) -> SyncResult<SyncOutcome> {
        if self.state != SyncState::Conflict {
            return Err(SyncError::NoConflict);
        }
        let remote = self.pending_remote.take().ok_or(SyncError::NoConflict)?;

        match resolution {
            ConflictResolution::ApplyRemote => {
                self.working = remote;
                self.local.store(&self.working)?;
                self.edits_pending = false;
                self.debounce.cancel();
                self.transition(SyncState::Clean);
                Ok(SyncOutcome::AppliedRemote)
            }
            ConflictResolution::KeepLocal => {
                // restamp so the republished snapshot wins the timestamp race
                let now = self.clock.now();
                self.working.updated_at = now;
                self.working.device_id = self.device_id.clone();
                self.local.store(&self.working)?;
                self.edits_pending = true;
                self.debounce.arm(now);
                self.transition(SyncState::Dirty);
                Ok(SyncOutcome::KeptLocal)
            }
        }
    }

    /// Whether the debounced write-back should run now.
    pub fn writeback_due(&self, now: DateTime<Utc>) -> bool {
        self.state == SyncState::Dirty && self.debounce.would_fire(now)
    }

    /// Take the snapshot to publish, disarming the debounce. Returns None
    /// when nothing publishable is pending; a content-identical snapshot
    /// clears Dirty without a publish.
    pub fn take_writeback(&mut self, now: DateTime<Utc>) -> Option<PreferenceDoc> {
        if self.state != SyncState::Dirty {
            // a fire raised while not Dirty is stale; drop it
            self.debounce.fire_due(now);
            return None;
        }
        if !self.debounce.fire_due(now) {
            return None;
        }

        let hash = content_hash(&self.working);
        if self.last_published_hash.as_ref() == Some(&hash) {
            debug!("suppressing no-op publish");
            self.edits_pending = false;
            self.transition(SyncState::Clean);
            return None;
        }

        self.inflight_hash = Some(hash);
        self.edits_pending = false;
        Some(self.working.clone())
    }

    /// The publish reached the server.
    pub fn writeback_succeeded(
        &mut self,
        server_updated_at: DateTime<Utc>,
    ) -> SyncResult<SyncOutcome> {
        self.last_published_hash = self.inflight_hash.take();
        self.last_server_updated_at = Some(server_updated_at);

        if self.state == SyncState::Dirty && !self.edits_pending {
            self.working.updated_at = server_updated_at;
            self.local.store(&self.working)?;
            self.transition(SyncState::Clean);
        }
        Ok(SyncOutcome::Published)
    }

    /// The publish failed; the local replica already holds the edits and the
    /// debounce retries.
    pub fn writeback_failed(&mut self, now: DateTime<Utc>) -> SyncOutcome {
        warn!("preference publish failed; retrying after debounce");
        self.edits_pending = true;
        self.inflight_hash = None;
        self.debounce.arm(now);
        SyncOutcome::PublishFailed
    }

    /// Drop any scheduled write-back; used on dataset switch and teardown so
    /// no stale write targets a no-longer-active context. Unpublished edits
    /// stay in the durable local replica.
    pub fn cancel_pending(&mut self) {
        self.debounce.cancel();
    }

    fn transition(&mut self, to: SyncState) {
        if self.state != to {
            debug!(from = ?self.state, to = ?to, "sync state transition");
            self.state = to;
        }
    }
}

fn apply_event(doc: &mut PreferenceDoc, event: ChangeEvent, history_cap: usize) {
    match event {
        ChangeEvent::SelectDataset(id) => doc.selected_dataset_id = id,
        ChangeEvent::SetPlaybackSpeed(speed) => doc.playback_speed = speed,
        ChangeEvent::SetManualMode(flag) => doc.manual_mode_flag = flag,
        ChangeEvent::SetMetadataSelection(selection) => doc.metadata_selection = selection,
        ChangeEvent::ReplaceBoundaries {
            dataset_id,
            boundaries,
        } => doc.set_boundaries_for(&dataset_id, &boundaries),
        ChangeEvent::AppendHistory(point) => {
            doc.history.push(point);
            if doc.history.len() > history_cap {
                let excess = doc.history.len() - history_cap;
                doc.history.drain(..excess);
            }
        }
    }
}
