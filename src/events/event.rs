//! Badge-swipe events and event queries
//!
//! Events are immutable once recorded. They are totally ordered by
//! `(timestamp, id)`: identifiers are assigned monotonically at ingestion, so
//! equal timestamps break ties in insertion order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::types::{AreaId, ClientId, Direction, EventId, TimeRange};

/// A recorded badge swipe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier
    pub id: EventId,
    /// Client whose badge was swiped
    pub client_id: ClientId,
    /// Area the reader guards
    pub area_id: AreaId,
    /// Entry or exit
    pub direction: Direction,
    /// When the swipe happened
    pub timestamp: DateTime<Utc>,
}

impl Event {
    /// Create a new event
    pub fn new(
        id: EventId,
        client_id: ClientId,
        area_id: AreaId,
        direction: Direction,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self { id, client_id, area_id, direction, timestamp }
    }

    /// Position of the event in the global order
    pub fn order_key(&self) -> (DateTime<Utc>, EventId) {
        (self.timestamp, self.id)
    }

    /// Compare two events chronologically
    pub fn chronological(a: &Event, b: &Event) -> Ordering {
        a.order_key().cmp(&b.order_key())
    }

    /// Check if this event comes strictly before `other`
    pub fn precedes(&self, other: &Event) -> bool {
        self.order_key() < other.order_key()
    }

    /// The (client, area) lane this event belongs to
    pub fn lane(&self) -> Lane {
        Lane { client_id: self.client_id, area_id: self.area_id }
    }

    /// Check if the event is an entry
    pub fn is_entry(&self) -> bool {
        self.direction == Direction::In
    }

    /// Check if the event is an exit
    pub fn is_exit(&self) -> bool {
        self.direction == Direction::Out
    }

    /// Fields that make two rows duplicates for import purposes
    pub fn duplicate_key(&self) -> (ClientId, AreaId, Direction, DateTime<Utc>) {
        (self.client_id, self.area_id, self.direction, self.timestamp)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} @ {}",
            self.id,
            self.client_id,
            self.direction,
            self.area_id,
            self.timestamp.to_rfc3339()
        )
    }
}

/// Sort events into chronological `(timestamp, id)` order
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(Event::chronological);
}

/// A (client, area) pair: the unit over which sessions are reconstructed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Lane {
    /// Client
    pub client_id: ClientId,
    /// Area
    pub area_id: AreaId,
}

impl Lane {
    /// Create a new lane
    pub fn new(client_id: ClientId, area_id: AreaId) -> Self {
        Self { client_id, area_id }
    }
}

impl fmt::Display for Lane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.client_id, self.area_id)
    }
}

/// Selection of events by time range, client and area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventQuery {
    /// Time window
    pub range: TimeRange,
    /// Client filter (`None` for all)
    pub client: Option<ClientId>,
    /// Area filter (`None` for all)
    pub area: Option<AreaId>,
}

impl EventQuery {
    /// Query every event in `range`
    pub fn new(range: TimeRange) -> Self {
        Self { range, client: None, area: None }
    }

    /// Restrict to one client; zero keeps every client
    pub fn for_client(mut self, client: ClientId) -> Self {
        self.client = client.as_filter();
        self
    }

    /// Restrict to one area; zero keeps every area
    pub fn in_area(mut self, area: AreaId) -> Self {
        self.area = area.as_filter();
        self
    }

    /// Check if `event` is selected by this query
    pub fn matches(&self, event: &Event) -> bool {
        self.range.contains(event.timestamp)
            && self.client.map_or(true, |client| client == event.client_id)
            && self.area.map_or(true, |area| area == event.area_id)
    }
}
