//! Core types and identifiers for the physical access engine
//!
//! This module contains fundamental types, identifiers, and configuration structures
//! used throughout the engine.
//!
//! # Overview
//!
//! - **Identifiers**: integer newtypes for clients, badges, cards, areas and events
//! - **Enums**: swipe direction, access status, violation kinds and policies
//! - **Cutoffs**: date and date-time bounds for range queries
//! - **Configuration**: engine configuration with validation and CLI support
//!
//! # Usage Example
//!
//! ```rust
//! use physical_access_engine::types::*;
//!
//! let client = ClientId(42);
//! assert_eq!(client.to_string(), "CLIENT_42");
//! assert!(ClientId(0).as_filter().is_none());
//!
//! let window: TimeRange = TimeRange::new(
//!     "2024-01-01".parse::<Cutoff>().unwrap(),
//!     "2024-01-31".parse::<Cutoff>().unwrap(),
//! );
//! assert!(!window.is_inverted());
//!
//! let config = EngineConfig::default();
//! assert_eq!(config.default_reenable_days, 30);
//! ```

pub mod config;
pub mod cutoff;
pub mod enums;
pub mod identifiers;

// Re-export all public types for convenience
pub use config::*;
pub use cutoff::*;
pub use enums::*;
pub use identifiers::*;
