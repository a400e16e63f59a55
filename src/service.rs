//! Service facade over the correlation engine
//!
//! [`PhysicalAccessService`] owns the store handle, the engine configuration,
//! a clock and the per-client write locks. Every call acquires exactly one
//! unit of work. Reads drop it when done; writes commit it, and any early
//! return drops it uncommitted so nothing staged leaks into the store.
//!
//! # Usage Example
//!
//! ```rust
//! use physical_access_engine::prelude::*;
//!
//! let store = InMemoryStore::new();
//! store.add_area("Cleanroom Bay 1", Some("cleanroom"));
//!
//! let service = PhysicalAccessService::new(store, &EngineConfig::default());
//! assert_eq!(service.api_name(), "physical-access-api");
//! assert!(service.currently_in("cleanroom").unwrap().is_empty());
//! ```

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::area::Area;
use crate::client::{Badge, Card, NewClient};
use crate::engine::{
    AccessLifecycle, Clock, EngineResult, EventExporter, OccupancyResolver, SessionPairer,
    SystemClock, ViolationDetector,
};
use crate::events::{BadgeInArea, Event, EventQuery, Occupant, Session, ViolationRecord};
use crate::store::DataAccess;
use crate::types::{AreaId, ClientId, Cutoff, EngineConfig, EventId, TimeRange};

/// Name reported by [`PhysicalAccessService::api_name`]
pub const API_NAME: &str = "physical-access-api";

/// Per-client write serialization; different clients never contend
#[derive(Debug, Default)]
struct ClientLocks {
    locks: Mutex<HashMap<ClientId, Arc<Mutex<()>>>>,
}

impl ClientLocks {
    /// Run `write` while holding the lock for `client_id`.
    ///
    /// The entry is removed again once no other writer holds or waits on it.
    fn serialize<T>(&self, client_id: ClientId, write: impl FnOnce() -> T) -> T {
        let lock = Arc::clone(self.locks.lock().entry(client_id).or_default());
        let result = {
            let _held = lock.lock();
            write()
        };

        let mut locks = self.locks.lock();
        drop(lock);
        if locks.get(&client_id).is_some_and(|entry| Arc::strong_count(entry) == 1) {
            locks.remove(&client_id);
        }
        result
    }

    fn tracked(&self) -> usize {
        self.locks.lock().len()
    }
}

/// The physical access API
pub struct PhysicalAccessService<D: DataAccess> {
    store: D,
    clock: Arc<dyn Clock>,
    occupancy: OccupancyResolver,
    sessions: SessionPairer,
    violations: ViolationDetector,
    lifecycle: AccessLifecycle,
    exporter: EventExporter,
    default_reenable_days: i64,
    client_locks: ClientLocks,
}

impl<D: DataAccess> fmt::Debug for PhysicalAccessService<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicalAccessService")
            .field("now", &self.clock.now())
            .field("occupancy", &self.occupancy)
            .field("violations", &self.violations)
            .field("lifecycle", &self.lifecycle)
            .finish_non_exhaustive()
    }
}

impl<D: DataAccess> PhysicalAccessService<D> {
    /// Create a service reading the system clock
    pub fn new(store: D, config: &EngineConfig) -> Self {
        Self::with_clock(store, config, Arc::new(SystemClock))
    }

    /// Create a service reading `clock`
    pub fn with_clock(store: D, config: &EngineConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            clock,
            occupancy: OccupancyResolver::new(config.occupancy_requires_active_card),
            sessions: SessionPairer::new(),
            violations: ViolationDetector::new(
                config.violation_look_behind,
                config.violation_look_ahead,
            ),
            lifecycle: AccessLifecycle::new(config.never_disabled_policy),
            exporter: EventExporter::new(),
            default_reenable_days: config.default_reenable_days,
            client_locks: ClientLocks::default(),
        }
    }

    /// The underlying store handle
    pub fn store(&self) -> &D {
        &self.store
    }

    /// Re-enable window used when the caller gives none
    pub fn default_reenable_days(&self) -> i64 {
        self.default_reenable_days
    }

    /// Name of this API
    pub fn api_name(&self) -> &'static str {
        API_NAME
    }

    /// Badges, for one client or (zero) all clients
    #[instrument(skip(self))]
    pub fn get_badges(&self, client_id: ClientId) -> EngineResult<Vec<Badge>> {
        let unit = self.store.start()?;
        Ok(unit.badges(client_id.as_filter())?)
    }

    /// Cards, for one client or (zero) all clients
    #[instrument(skip(self))]
    pub fn get_cards(&self, client_id: ClientId) -> EngineResult<Vec<Card>> {
        let unit = self.store.start()?;
        Ok(unit.cards(client_id.as_filter())?)
    }

    /// Cards active now whose expiration falls on or before `cutoff`
    #[instrument(skip(self, cutoff))]
    pub fn get_expiring_cards(&self, cutoff: impl Into<Cutoff>) -> EngineResult<Vec<Card>> {
        let cutoff = cutoff.into();
        let now = self.clock.now();
        let unit = self.store.start()?;

        let mut cards: Vec<Card> =
            unit.cards(None)?.into_iter().filter(|card| card.expires_by(now, &cutoff)).collect();
        cards.sort_by_key(|card| (card.expire_on, card.id));

        debug!(cutoff = %cutoff, cards = cards.len(), "Found expiring cards");
        Ok(cards)
    }

    /// Every area
    #[instrument(skip(self))]
    pub fn get_areas(&self) -> EngineResult<Vec<Area>> {
        let unit = self.store.start()?;
        Ok(unit.areas()?)
    }

    /// Clients inside the areas `alias` resolves to, as of now
    pub fn currently_in(&self, alias: &str) -> EngineResult<Vec<Occupant>> {
        self.currently_in_at(alias, self.clock.now())
    }

    /// Clients inside the areas `alias` resolves to, as of `as_of`
    #[instrument(skip(self, as_of))]
    pub fn currently_in_at(&self, alias: &str, as_of: impl Into<Cutoff>) -> EngineResult<Vec<Occupant>> {
        let unit = self.store.start()?;
        self.occupancy.currently_in(unit.as_ref(), alias, &as_of.into())
    }

    /// Current occupants joined with their badge and area
    #[instrument(skip(self))]
    pub fn badge_in_areas(&self, alias: &str) -> EngineResult<Vec<BadgeInArea>> {
        let as_of = Cutoff::At(self.clock.now());
        let unit = self.store.start()?;
        self.occupancy.badge_in_areas(unit.as_ref(), alias, &as_of)
    }

    /// Prepared (de-duplicated) events; zero ids mean all
    #[instrument(skip(self, start, end))]
    pub fn get_events(
        &self,
        start: impl Into<Cutoff>,
        end: impl Into<Cutoff>,
        client_id: ClientId,
        area_id: AreaId,
    ) -> EngineResult<Vec<Event>> {
        let query = self.query(start, end, client_id, area_id);
        let unit = self.store.start()?;
        self.exporter.prepare_events(unit.as_ref(), &query)
    }

    /// Stored events, untransformed; zero ids mean all
    #[instrument(skip(self, start, end))]
    pub fn get_raw_events(
        &self,
        start: impl Into<Cutoff>,
        end: impl Into<Cutoff>,
        client_id: ClientId,
        area_id: AreaId,
    ) -> EngineResult<Vec<Event>> {
        let query = self.query(start, end, client_id, area_id);
        let unit = self.store.start()?;
        self.exporter.raw_events(unit.as_ref(), &query)
    }

    /// Reconstructed sessions; zero ids mean all
    #[instrument(skip(self, start, end))]
    pub fn get_sessions(
        &self,
        start: impl Into<Cutoff>,
        end: impl Into<Cutoff>,
        client_id: ClientId,
        area_id: AreaId,
    ) -> EngineResult<Vec<Session>> {
        let query = self.query(start, end, client_id, area_id);
        let unit = self.store.start()?;
        self.sessions.sessions(unit.as_ref(), &query)
    }

    /// Nearest earlier entry in the lane of `event_id`, no earlier than `start`
    #[instrument(skip(self, start))]
    pub fn find_previous_in(&self, event_id: EventId, start: impl Into<Cutoff>) -> EngineResult<Option<Event>> {
        let unit = self.store.start()?;
        self.sessions.find_previous_in(unit.as_ref(), event_id, &start.into())
    }

    /// Nearest later exit in the lane of `event_id`, no later than `end`
    #[instrument(skip(self, end))]
    pub fn find_next_out(&self, event_id: EventId, end: impl Into<Cutoff>) -> EngineResult<Option<Event>> {
        let unit = self.store.start()?;
        self.sessions.find_next_out(unit.as_ref(), event_id, &end.into())
    }

    /// Whether the client may be re-enabled, access having lapsed at most `days` ago
    #[instrument(skip(self))]
    pub fn allow_reenable(&self, client_id: ClientId, days: i64) -> EngineResult<bool> {
        let now = self.clock.now();
        let unit = self.store.start()?;
        self.lifecycle.allow_reenable(unit.as_ref(), client_id, days, now)
    }

    /// Clients with a passback anomaly in the window
    #[instrument(skip(self, start, end))]
    pub fn get_passback_violations(
        &self,
        start: impl Into<Cutoff>,
        end: impl Into<Cutoff>,
    ) -> EngineResult<BTreeSet<ClientId>> {
        let range = self.range(start, end);
        let unit = self.store.start()?;
        self.violations.find_passback_violations(unit.as_ref(), &range)
    }

    /// Full passback anomaly records in the window
    #[instrument(skip(self, start, end))]
    pub fn get_violations(
        &self,
        start: impl Into<Cutoff>,
        end: impl Into<Cutoff>,
    ) -> EngineResult<Vec<ViolationRecord>> {
        let range = self.range(start, end);
        let unit = self.store.start()?;
        self.violations.violations(unit.as_ref(), &range)
    }

    /// Add an enabled client and issue its badge
    #[instrument(skip(self, request), fields(client = %request.client_id))]
    pub fn add_client(&self, request: NewClient) -> EngineResult<ClientId> {
        self.client_locks.serialize(request.client_id, || -> EngineResult<ClientId> {
            let now = self.clock.now();
            let mut unit = self.store.start()?;
            let client_id = self.lifecycle.add_client(unit.as_mut(), request, now)?;
            unit.commit()?;
            Ok(client_id)
        })
    }

    /// Enable access, optionally with a new expiration
    #[instrument(skip(self))]
    pub fn enable_access(
        &self,
        client_id: ClientId,
        expiration: Option<DateTime<Utc>>,
    ) -> EngineResult<ClientId> {
        self.client_locks.serialize(client_id, || -> EngineResult<ClientId> {
            let now = self.clock.now();
            let mut unit = self.store.start()?;
            self.lifecycle.enable_access(unit.as_mut(), client_id, expiration, now)?;
            unit.commit()?;
            Ok(client_id)
        })
    }

    /// Disable access, effective at `expiration` or now
    #[instrument(skip(self))]
    pub fn disable_access(
        &self,
        client_id: ClientId,
        expiration: Option<DateTime<Utc>>,
    ) -> EngineResult<ClientId> {
        self.client_locks.serialize(client_id, || -> EngineResult<ClientId> {
            let now = self.clock.now();
            let mut unit = self.store.start()?;
            self.lifecycle.disable_access(unit.as_mut(), client_id, expiration, now)?;
            unit.commit()?;
            Ok(client_id)
        })
    }

    fn range(&self, start: impl Into<Cutoff>, end: impl Into<Cutoff>) -> TimeRange {
        let range = TimeRange::new(start, end);
        if range.is_inverted() {
            warn!(range = %range, "Range ends before it starts, nothing will match");
        }
        range
    }

    fn query(
        &self,
        start: impl Into<Cutoff>,
        end: impl Into<Cutoff>,
        client_id: ClientId,
        area_id: AreaId,
    ) -> EventQuery {
        EventQuery::new(self.range(start, end)).for_client(client_id).in_area(area_id)
    }
}
