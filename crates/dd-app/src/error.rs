//! Error types for the dd-app service layer.

/// Session error wrapping the backend crates' errors behind one interface
/// for the embedding frontend.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid input: {0}")]
    Input(#[from] dd_core::CoreError),

    #[error("Sync error: {0}")]
    Sync(#[from] dd_sync::SyncError),

    #[error("Preferences error: {0}")]
    Prefs(#[from] dd_prefs::PrefsError),

    #[error("No dataset selected")]
    NoDatasetSelected,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for dd-app operations.
pub type SessionResult<T> = Result<T, SessionError>;
