//! dd-core: stable foundation for driftdeck.
//!
//! Contains:
//! - ids (string-backed identifiers that cross the preference document wire)
//! - numeric (Real + tolerances + float helpers)
//! - clock (injectable time capability for deterministic timers)
//! - error (shared error types)

pub mod clock;
pub mod error;
pub mod ids;
pub mod numeric;

// Re-exports: nice ergonomics for downstream crates
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, CoreResult};
pub use ids::*;
pub use numeric::*;
