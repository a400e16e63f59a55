//! Badge-swipe events and the records derived from them
//!
//! # Overview
//!
//! - **Event**: an immutable IN/OUT swipe, totally ordered by `(timestamp, id)`
//! - **EventQuery**: time range plus optional client and area filters
//! - **Timeline**: events grouped into chronologically sorted (client, area) lanes
//! - **Session / Occupant / BadgeInArea / ViolationRecord**: derived views
//!
//! # Usage Example
//!
//! ```rust
//! use physical_access_engine::events::*;
//! use physical_access_engine::types::*;
//! use chrono::{TimeZone, Utc};
//!
//! let entry = Event::new(
//!     EventId(1),
//!     ClientId(42),
//!     AreaId(1),
//!     Direction::In,
//!     Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
//! );
//!
//! let timeline = Timeline::from_events(vec![entry.clone()]);
//! assert_eq!(timeline.lane(&entry.lane()).len(), 1);
//! ```

pub mod derived;
pub mod event;
pub mod timeline;

// Re-export all public types for convenience
pub use derived::*;
pub use event::*;
pub use timeline::*;
