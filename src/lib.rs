//! Physical Access Engine
//!
//! Correlates a raw stream of badge-swipe events (entries and exits across lab
//! areas) into occupancy, paired entry/exit sessions and passback anomalies,
//! and manages the access lifecycle of badge holders.
//!
//! # Overview
//!
//! The engine reads through a data-access contract ([`store::DataAccess`] and
//! [`store::UnitOfWork`]) so any store can sit behind it. Each service call
//! works on one consistent snapshot, so results are pure functions of the
//! event history.
//!
//! ## Key Features
//!
//! - **Occupancy**: who is inside an area alias now, or as of any instant
//! - **Session Pairing**: entry/exit sessions and nearest previous-entry / next-exit search
//! - **Passback Detection**: double entries and orphan exits per client and area
//! - **Access Lifecycle**: add, enable and disable clients; re-enable eligibility
//! - **Event Export**: raw and de-duplicated event streams
//!
//! ## Quick Start
//!
//! ```rust
//! use physical_access_engine::prelude::*;
//! use chrono::{TimeZone, Utc};
//!
//! let store = InMemoryStore::new();
//! let bay = store.add_area("Cleanroom Bay 1", Some("cleanroom"));
//! let entered = Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap();
//! store.record_event(ClientId(42), bay, Direction::In, entered);
//!
//! let service = PhysicalAccessService::new(store, &EngineConfig::default());
//! let inside = service.currently_in("cleanroom")?;
//! assert_eq!(inside[0].client_id, ClientId(42));
//! # Ok::<(), EngineError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: identifiers, enums, cutoffs and configuration
//! - [`client`]: clients, badges and cards
//! - [`area`]: areas and alias resolution
//! - [`events`]: swipe events, timelines and derived records
//! - [`store`]: the data-access contract and the in-memory store
//! - [`engine`]: occupancy, sessions, violations, lifecycle and export
//! - [`service`]: the [`PhysicalAccessService`] facade
//! - [`output`]: JSON-lines and CSV result writers
//! - [`logging`]: tracing subscriber setup
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐    ┌─────────────┐    ┌─────────────┐
//! │   Types     │    │   Client    │    │    Area     │
//! │             │◄───┤ Badge       │    │ Selector    │
//! │ Identifiers │    │ Card        │    │             │
//! │ Cutoffs     │    └─────────────┘    └─────────────┘
//! │ Config      │           ▲                  ▲
//! └─────────────┘           │                  │
//!        ▲           ┌─────────────┐    ┌─────────────┐
//!        │           │   Store     │◄───┤   Engine    │
//! ┌─────────────┐    │ DataAccess  │    │ Occupancy   │
//! │   Events    │◄───┤ UnitOfWork  │    │ Sessions    │
//! │ Timeline    │    │ InMemory    │    │ Violations  │
//! └─────────────┘    └─────────────┘    └─────────────┘
//!                                              ▲
//!                                       ┌─────────────┐
//!                                       │   Service   │
//!                                       └─────────────┘
//! ```
#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod area;
pub mod client;
pub mod engine;
pub mod events;
pub mod logging;
pub mod output;
pub mod service;
pub mod store;
pub mod types;

// Core types and identifiers
pub use types::{
    AccessStatus, AreaId, BadgeId, CardId, ClientId, ConfigValidationError, Cutoff, Direction,
    EngineConfig, EventId, NeverDisabledPolicy, OutputFormat, TimeRange, ViolationKind,
};

// Records
pub use area::{Area, AreaSelector};
pub use client::{Badge, Card, Client, NewClient};
pub use events::{BadgeInArea, Event, EventQuery, Occupant, Session, Timeline, ViolationRecord};

// Engine and service
pub use engine::{Clock, EngineError, EngineResult, FixedClock, SystemClock};
pub use logging::LoggingConfig;
pub use service::PhysicalAccessService;
pub use store::{DataAccess, InMemoryStore, StoreError, UnitOfWork};

/// Commonly used items in one import
pub mod prelude {
    pub use crate::engine::{Clock, EngineError, EngineResult, FixedClock, SystemClock};
    pub use crate::events::{Event, Occupant, Session, ViolationRecord};
    pub use crate::service::PhysicalAccessService;
    pub use crate::store::{DataAccess, Dataset, InMemoryStore, UnitOfWork};
    pub use crate::types::{
        AreaId, ClientId, Cutoff, Direction, EngineConfig, EventId, TimeRange, ViolationKind,
    };
    pub use crate::client::NewClient;
}
