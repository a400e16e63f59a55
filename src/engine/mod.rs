//! Correlation engine components
//!
//! # Overview
//!
//! - **OccupancyResolver**: who is inside a selection of areas
//! - **SessionPairer**: entry/exit sessions and previous-entry / next-exit search
//! - **ViolationDetector**: double-entry and orphan-exit passback anomalies
//! - **AccessLifecycle**: client add, enable, disable and re-enable eligibility
//! - **EventExporter**: raw and de-duplicated event export
//! - **Clock**: source of "now" for time-relative decisions
//!
//! Components hold only configuration. Every operation reads through the
//! [`UnitOfWork`](crate::store::UnitOfWork) it is handed, so the result is a
//! pure function of that snapshot.

pub mod clock;
pub mod error;
pub mod export;
pub mod lifecycle;
pub mod occupancy;
pub mod sessions;
pub mod violations;

// Re-export all public types for convenience
pub use clock::*;
pub use error::*;
pub use export::*;
pub use lifecycle::*;
pub use occupancy::*;
pub use sessions::*;
pub use violations::*;
