//! Data-access contract consumed by the engine
//!
//! The persistent store (a relational database in production) sits behind two
//! traits:
//!
//! - [`DataAccess`]: the long-lived store handle injected into the service.
//!   It hands out one unit of work per engine call.
//! - [`UnitOfWork`]: a consistent snapshot of the store for the duration of
//!   one call, with staged writes that only become visible on
//!   [`UnitOfWork::commit`]. Dropping a unit of work without committing
//!   discards its writes.
//!
//! [`InMemoryStore`] is a reference implementation backed by a JSON
//! [`Dataset`].

pub mod dataset;
pub mod error;
pub mod memory;

pub use dataset::*;
pub use error::*;
pub use memory::*;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::area::Area;
use crate::client::{Badge, Card, Client};
use crate::events::{Event, EventQuery, Lane};
use crate::types::{ClientId, Cutoff, EventId};

/// Store handle injected into the engine service
pub trait DataAccess: Send + Sync {
    /// Acquire a unit of work over a consistent snapshot
    fn start(&self) -> StoreResult<Box<dyn UnitOfWork + '_>>;
}

/// Snapshot and transaction handle for one engine call
pub trait UnitOfWork {
    /// Correlation identifier for logging
    fn id(&self) -> Uuid;

    /// Events selected by `query`, in `(timestamp, id)` order
    fn events(&self, query: &EventQuery) -> StoreResult<Vec<Event>>;

    /// A single event by identifier
    fn event(&self, id: EventId) -> StoreResult<Option<Event>>;

    /// Latest event of `lane` with a timestamp strictly before `before`
    fn last_event_before(&self, lane: Lane, before: DateTime<Utc>) -> StoreResult<Option<Event>>;

    /// Earliest event of `lane` past the `after` cutoff
    fn first_event_after(&self, lane: Lane, after: &Cutoff) -> StoreResult<Option<Event>>;

    /// Clients, optionally restricted to one
    fn clients(&self, client: Option<ClientId>) -> StoreResult<Vec<Client>>;

    /// Badges, optionally restricted to one client
    fn badges(&self, client: Option<ClientId>) -> StoreResult<Vec<Badge>>;

    /// Cards, optionally restricted to one client
    fn cards(&self, client: Option<ClientId>) -> StoreResult<Vec<Card>>;

    /// All areas
    fn areas(&self) -> StoreResult<Vec<Area>>;

    /// Stage a new client together with its badge
    fn insert_client(&mut self, client: Client, issued_on: DateTime<Utc>) -> StoreResult<Badge>;

    /// Stage an update of an existing client
    fn update_client(&mut self, client: &Client) -> StoreResult<()>;

    /// Make staged writes visible
    fn commit(self: Box<Self>) -> StoreResult<()>;

    /// A single client by identifier
    fn client(&self, id: ClientId) -> StoreResult<Option<Client>> {
        Ok(self.clients(Some(id))?.into_iter().next())
    }
}
