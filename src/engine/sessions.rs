//! Session pairing and nearest-neighbour search
//!
//! Sessions are reconstructed per (client, area) lane from chronologically
//! sorted events. An entry opens a session and the next exit closes it. An
//! entry arriving while a session is open leaves that session unterminated
//! and opens a new one. An exit with nothing open produces no session.

use tracing::debug;

use super::{EngineError, EngineResult};
use crate::events::{Event, EventQuery, Session, Timeline};
use crate::store::UnitOfWork;
use crate::types::{Cutoff, EventId, TimeRange};

/// Pairs entries with exits
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionPairer;

impl SessionPairer {
    /// Create a new session pairer
    pub fn new() -> Self {
        Self
    }

    /// Latest entry of the reference event's lane ordered strictly before it,
    /// no earlier than `start`
    pub fn find_previous_in(
        &self,
        unit: &dyn UnitOfWork,
        event_id: EventId,
        start: &Cutoff,
    ) -> EngineResult<Option<Event>> {
        let reference = reference_event(unit, event_id)?;

        let range = TimeRange::new(*start, reference.timestamp);
        let lane = lane_events(unit, &reference, range)?;
        let found = previous_in(&lane, &reference);

        debug!(
            reference = %reference.id,
            found = ?found.as_ref().map(|e| e.id),
            "Searched previous entry"
        );
        Ok(found)
    }

    /// Earliest exit of the reference event's lane ordered strictly after it,
    /// no later than `end`
    pub fn find_next_out(
        &self,
        unit: &dyn UnitOfWork,
        event_id: EventId,
        end: &Cutoff,
    ) -> EngineResult<Option<Event>> {
        let reference = reference_event(unit, event_id)?;

        let range = TimeRange::new(reference.timestamp, *end);
        let lane = lane_events(unit, &reference, range)?;
        let found = next_out(&lane, &reference);

        debug!(
            reference = %reference.id,
            found = ?found.as_ref().map(|e| e.id),
            "Searched next exit"
        );
        Ok(found)
    }

    /// Sessions reconstructed from the events selected by `query`, ordered by
    /// their entry event
    pub fn sessions(&self, unit: &dyn UnitOfWork, query: &EventQuery) -> EngineResult<Vec<Session>> {
        let timeline = Timeline::from_events(unit.events(query)?);

        let mut sessions: Vec<Session> =
            timeline.lanes().flat_map(|(_, events)| pair_sessions(events)).collect();
        sessions.sort_by(|a, b| Event::chronological(&a.entry, &b.entry));

        debug!(
            range = %query.range,
            lanes = timeline.lane_count(),
            sessions = sessions.len(),
            "Reconstructed sessions"
        );
        Ok(sessions)
    }
}

fn reference_event(unit: &dyn UnitOfWork, event_id: EventId) -> EngineResult<Event> {
    unit.event(event_id)?
        .ok_or_else(|| EngineError::validation(format!("Unknown reference event {}", event_id)))
}

fn lane_events(unit: &dyn UnitOfWork, reference: &Event, range: TimeRange) -> EngineResult<Vec<Event>> {
    let query = EventQuery::new(range).for_client(reference.client_id).in_area(reference.area_id);
    Ok(unit.events(&query)?)
}

/// Latest entry in `lane` ordered strictly before `reference`
pub fn previous_in(lane: &[Event], reference: &Event) -> Option<Event> {
    lane.iter()
        .filter(|event| event.is_entry() && event.precedes(reference))
        .max_by(|a, b| Event::chronological(a, b))
        .cloned()
}

/// Earliest exit in `lane` ordered strictly after `reference`
pub fn next_out(lane: &[Event], reference: &Event) -> Option<Event> {
    lane.iter()
        .filter(|event| event.is_exit() && reference.precedes(event))
        .min_by(|a, b| Event::chronological(a, b))
        .cloned()
}

/// Pair the chronologically sorted events of one lane into sessions
pub fn pair_sessions(lane: &[Event]) -> Vec<Session> {
    let mut sessions = Vec::new();
    let mut open: Option<Session> = None;

    for event in lane {
        if event.is_entry() {
            if let Some(unterminated) = open.take() {
                sessions.push(unterminated);
            }
            open = Some(Session::open(event.clone()));
        } else if let Some(mut session) = open.take() {
            session.exit = Some(event.clone());
            sessions.push(session);
        }
    }

    sessions.extend(open);
    sessions
}
