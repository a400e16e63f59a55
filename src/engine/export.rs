//! Event export
//!
//! Raw export hands back stored events untouched in `(timestamp, id)` order.
//! Prepared export additionally drops rows that repeat the same client, area,
//! direction and timestamp, keeping the lowest identifier. Open sessions are
//! exported as they are; no exit is synthesized.

use std::collections::HashSet;
use tracing::debug;

use super::EngineResult;
use crate::events::{Event, EventQuery};
use crate::store::UnitOfWork;

/// Prepares events for export
#[derive(Debug, Clone, Copy, Default)]
pub struct EventExporter;

impl EventExporter {
    /// Create a new exporter
    pub fn new() -> Self {
        Self
    }

    /// Stored events selected by `query`, otherwise untransformed
    pub fn raw_events(&self, unit: &dyn UnitOfWork, query: &EventQuery) -> EngineResult<Vec<Event>> {
        let events = unit.events(query)?;
        debug!(range = %query.range, events = events.len(), "Exported raw events");
        Ok(events)
    }

    /// Events selected by `query` with duplicate rows removed
    pub fn prepare_events(&self, unit: &dyn UnitOfWork, query: &EventQuery) -> EngineResult<Vec<Event>> {
        let raw = unit.events(query)?;
        let raw_count = raw.len();
        let prepared = deduplicate(raw);

        debug!(
            range = %query.range,
            events = prepared.len(),
            duplicates = raw_count - prepared.len(),
            "Prepared events"
        );
        Ok(prepared)
    }
}

/// Drop duplicate rows from chronologically sorted events.
///
/// Duplicates share a timestamp, so the first one seen has the lowest id.
pub fn deduplicate(events: Vec<Event>) -> Vec<Event> {
    let mut seen = HashSet::new();
    events.into_iter().filter(|event| seen.insert(event.duplicate_key())).collect()
}
