//! In-memory store backed by a [`Dataset`]
//!
//! Readers take an `Arc` snapshot of the dataset, so a unit of work sees a
//! consistent view for its whole lifetime while other units commit. Writes
//! are staged inside the unit of work and applied under the write lock on
//! commit, last write wins.

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::atomic::{AtomicI32, AtomicI64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{DataAccess, Dataset, StoreError, StoreResult, UnitOfWork};
use crate::area::Area;
use crate::client::{Badge, Card, Client};
use crate::events::{sort_chronologically, Event, EventQuery, Lane};
use crate::types::{AreaId, BadgeId, CardId, ClientId, Cutoff, Direction, EventId};

/// Reference store keeping every record in memory
#[derive(Debug)]
pub struct InMemoryStore {
    data: RwLock<Arc<Dataset>>,
    next_event_id: AtomicI64,
    next_badge_id: AtomicI32,
    next_card_id: AtomicI32,
    next_area_id: AtomicI32,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            data: RwLock::new(Arc::new(Dataset::default())),
            next_event_id: AtomicI64::new(1),
            next_badge_id: AtomicI32::new(1),
            next_card_id: AtomicI32::new(1),
            next_area_id: AtomicI32::new(1),
        }
    }

    /// Create a store holding `dataset`
    pub fn from_dataset(dataset: Dataset) -> StoreResult<Self> {
        dataset.validate()?;

        let next_event_id = dataset.events.iter().map(|e| e.id.0).max().unwrap_or(0) + 1;
        let next_badge_id = dataset.badges.iter().map(|b| b.id.0).max().unwrap_or(0) + 1;
        let next_card_id = dataset.cards.iter().map(|c| c.id.0).max().unwrap_or(0) + 1;
        let next_area_id = dataset.areas.iter().map(|a| a.id.0).max().unwrap_or(0) + 1;

        Ok(Self {
            data: RwLock::new(Arc::new(dataset)),
            next_event_id: AtomicI64::new(next_event_id),
            next_badge_id: AtomicI32::new(next_badge_id),
            next_card_id: AtomicI32::new(next_card_id),
            next_area_id: AtomicI32::new(next_area_id),
        })
    }

    /// Load a store from a JSON dataset file
    pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        Self::from_dataset(Dataset::load(path)?)
    }

    /// Save the current contents to a JSON dataset file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        self.snapshot().save(path)
    }

    /// Current contents
    pub fn snapshot(&self) -> Arc<Dataset> {
        Arc::clone(&self.data.read())
    }

    /// Register an area
    pub fn add_area(&self, name: impl Into<String>, group: Option<&str>) -> AreaId {
        let mut guard = self.data.write();
        let id = AreaId(self.next_area_id.fetch_add(1, Ordering::SeqCst));
        Arc::make_mut(&mut guard).areas.push(Area::new(id, name, group));
        id
    }

    /// Issue a card on the badge of `client_id`
    pub fn add_card(
        &self,
        client_id: ClientId,
        number: impl Into<String>,
        expire_on: DateTime<Utc>,
    ) -> StoreResult<CardId> {
        let mut guard = self.data.write();
        let badge_id = guard
            .badges
            .iter()
            .find(|badge| badge.client_id == client_id)
            .map(|badge| badge.id)
            .ok_or_else(|| StoreError::constraint(format!("{} has no badge", client_id)))?;

        let id = CardId(self.next_card_id.fetch_add(1, Ordering::SeqCst));
        Arc::make_mut(&mut guard).cards.push(Card {
            id,
            badge_id,
            client_id,
            number: number.into(),
            expire_on,
        });
        Ok(id)
    }

    /// Ingest a swipe, assigning the next event identifier
    pub fn record_event(
        &self,
        client_id: ClientId,
        area_id: AreaId,
        direction: Direction,
        timestamp: DateTime<Utc>,
    ) -> EventId {
        let mut guard = self.data.write();
        let id = EventId(self.next_event_id.fetch_add(1, Ordering::SeqCst));
        Arc::make_mut(&mut guard)
            .events
            .push(Event::new(id, client_id, area_id, direction, timestamp));
        id
    }
}

impl DataAccess for InMemoryStore {
    fn start(&self) -> StoreResult<Box<dyn UnitOfWork + '_>> {
        let unit = MemoryUnitOfWork {
            store: self,
            id: Uuid::new_v4(),
            snapshot: self.snapshot(),
            staged_clients: BTreeMap::new(),
            inserted_clients: BTreeSet::new(),
            staged_badges: Vec::new(),
            committed: false,
        };
        debug!(unit_of_work = %unit.id, "Started unit of work");
        Ok(Box::new(unit))
    }
}

/// Unit of work over an [`InMemoryStore`] snapshot
#[derive(Debug)]
pub struct MemoryUnitOfWork<'a> {
    store: &'a InMemoryStore,
    id: Uuid,
    snapshot: Arc<Dataset>,
    staged_clients: BTreeMap<ClientId, Client>,
    inserted_clients: BTreeSet<ClientId>,
    staged_badges: Vec<Badge>,
    committed: bool,
}

impl MemoryUnitOfWork<'_> {
    fn lane_events(&self, lane: Lane) -> impl Iterator<Item = &Event> {
        self.snapshot.events.iter().filter(move |event| event.lane() == lane)
    }

    fn has_staged_writes(&self) -> bool {
        !self.staged_clients.is_empty() || !self.staged_badges.is_empty()
    }
}

impl UnitOfWork for MemoryUnitOfWork<'_> {
    fn id(&self) -> Uuid {
        self.id
    }

    fn events(&self, query: &EventQuery) -> StoreResult<Vec<Event>> {
        let mut events: Vec<Event> =
            self.snapshot.events.iter().filter(|event| query.matches(event)).cloned().collect();
        sort_chronologically(&mut events);
        Ok(events)
    }

    fn event(&self, id: EventId) -> StoreResult<Option<Event>> {
        Ok(self.snapshot.events.iter().find(|event| event.id == id).cloned())
    }

    fn last_event_before(&self, lane: Lane, before: DateTime<Utc>) -> StoreResult<Option<Event>> {
        Ok(self
            .lane_events(lane)
            .filter(|event| event.timestamp < before)
            .max_by(|a, b| Event::chronological(a, b))
            .cloned())
    }

    fn first_event_after(&self, lane: Lane, after: &Cutoff) -> StoreResult<Option<Event>> {
        Ok(self
            .lane_events(lane)
            .filter(|event| !after.admits_until(event.timestamp))
            .min_by(|a, b| Event::chronological(a, b))
            .cloned())
    }

    fn clients(&self, client: Option<ClientId>) -> StoreResult<Vec<Client>> {
        let mut merged: BTreeMap<ClientId, Client> = self
            .snapshot
            .clients
            .iter()
            .map(|client| (client.id, client.clone()))
            .collect();
        for (id, staged) in &self.staged_clients {
            merged.insert(*id, staged.clone());
        }

        Ok(merged
            .into_values()
            .filter(|record| client.map_or(true, |id| record.id == id))
            .collect())
    }

    fn badges(&self, client: Option<ClientId>) -> StoreResult<Vec<Badge>> {
        let mut badges: Vec<Badge> = self
            .snapshot
            .badges
            .iter()
            .chain(self.staged_badges.iter())
            .filter(|badge| client.map_or(true, |id| badge.client_id == id))
            .cloned()
            .collect();
        badges.sort_by_key(|badge| badge.id);
        Ok(badges)
    }

    fn cards(&self, client: Option<ClientId>) -> StoreResult<Vec<Card>> {
        let mut cards: Vec<Card> = self
            .snapshot
            .cards
            .iter()
            .filter(|card| client.map_or(true, |id| card.client_id == id))
            .cloned()
            .collect();
        cards.sort_by_key(|card| card.id);
        Ok(cards)
    }

    fn areas(&self) -> StoreResult<Vec<Area>> {
        let mut areas = self.snapshot.areas.clone();
        areas.sort_by_key(|area| area.id);
        Ok(areas)
    }

    fn insert_client(&mut self, client: Client, issued_on: DateTime<Utc>) -> StoreResult<Badge> {
        if self.client(client.id)?.is_some() {
            return Err(StoreError::constraint(format!("{} already exists", client.id)));
        }

        let badge = Badge::new(
            BadgeId(self.store.next_badge_id.fetch_add(1, Ordering::SeqCst)),
            client.id,
            issued_on,
        );
        self.inserted_clients.insert(client.id);
        self.staged_clients.insert(client.id, client);
        self.staged_badges.push(badge.clone());
        Ok(badge)
    }

    fn update_client(&mut self, client: &Client) -> StoreResult<()> {
        if self.client(client.id)?.is_none() {
            return Err(StoreError::constraint(format!("{} does not exist", client.id)));
        }
        self.staged_clients.insert(client.id, client.clone());
        Ok(())
    }

    fn commit(mut self: Box<Self>) -> StoreResult<()> {
        if !self.has_staged_writes() {
            self.committed = true;
            return Ok(());
        }

        let mut guard = self.store.data.write();

        // Inserts were checked against this unit's snapshot; re-check against
        // the live data in case another unit committed the same client first.
        for id in &self.inserted_clients {
            if guard.clients.iter().any(|client| client.id == *id) {
                return Err(StoreError::constraint(format!("{} already exists", id)));
            }
        }

        let data = Arc::make_mut(&mut guard);
        let staged_clients = std::mem::take(&mut self.staged_clients);
        let staged_count = staged_clients.len();
        for (id, client) in staged_clients {
            match data.clients.iter_mut().find(|existing| existing.id == id) {
                Some(existing) => *existing = client,
                None => data.clients.push(client),
            }
        }
        data.badges.append(&mut self.staged_badges);

        self.committed = true;
        info!(unit_of_work = %self.id, clients = staged_count, "Committed unit of work");
        Ok(())
    }
}

impl Drop for MemoryUnitOfWork<'_> {
    fn drop(&mut self) {
        if !self.committed && self.has_staged_writes() {
            warn!(
                unit_of_work = %self.id,
                clients = self.staged_clients.len(),
                "Discarding uncommitted writes"
            );
        } else {
            debug!(unit_of_work = %self.id, "Released unit of work");
        }
    }
}
