//! dd-sync: replica reconciliation for the preference document.
//!
//! Two copies of the same logical state exist: the device-local durable
//! cache and the shared server-held document. Local edits publish through a
//! debounced write-behind path; remote polls flow back through an explicit
//! state machine that auto-applies safe updates and raises a conflict when
//! both sides diverged.

pub mod clocks;
pub mod reconciler;
pub mod replica;

pub use clocks::{AdaptivePollClock, DebounceClock, PollBand};
pub use reconciler::{
    ChangeEvent, ConflictResolution, ReconcilerOptions, SyncOutcome, SyncReconciler, SyncState,
};
pub use replica::{InMemoryRemote, RemoteDoc, RemoteReplica};

pub type SyncResult<T> = Result<T, SyncError>;

#[derive(thiserror::Error, Debug)]
pub enum SyncError {
    #[error("No conflict to resolve")]
    NoConflict,

    #[error("Preferences error: {0}")]
    Prefs(#[from] dd_prefs::PrefsError),

    #[error("Remote transport error: {what}")]
    Transport { what: String },
}
