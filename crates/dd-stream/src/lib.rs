//! dd-stream: incremental coordinate stream handling for driftdeck.
//!
//! The ingest service streams dataset coordinates in growing batches. This
//! crate folds fresh batches into a monotonically growing series (detecting
//! stream resets), classifies points against the user's normal-region
//! boundaries, and carries the streaming-status contract types.

pub mod classify;
pub mod merge;
pub mod series;
pub mod status;

pub use classify::{Classification, ClassificationSummary, classify};
pub use merge::merge;
pub use series::CoordinateSeries;
pub use status::StreamStatus;
