//! Chronological per-lane view of an event set
//!
//! The session pairer, occupancy resolver and violation detector all work on
//! the same view: events grouped by (client, area) and sorted by
//! `(timestamp, id)` within each group.

use std::collections::BTreeMap;

use super::{sort_chronologically, Event, Lane};

/// Events grouped into chronologically sorted lanes
#[derive(Debug, Clone, Default)]
pub struct Timeline {
    lanes: BTreeMap<Lane, Vec<Event>>,
}

impl Timeline {
    /// Build a timeline from an arbitrary event set
    pub fn from_events(events: impl IntoIterator<Item = Event>) -> Self {
        let mut lanes: BTreeMap<Lane, Vec<Event>> = BTreeMap::new();
        for event in events {
            lanes.entry(event.lane()).or_default().push(event);
        }
        for lane in lanes.values_mut() {
            sort_chronologically(lane);
        }
        Self { lanes }
    }

    /// Iterate over lanes in (client, area) order
    pub fn lanes(&self) -> impl Iterator<Item = (&Lane, &[Event])> {
        self.lanes.iter().map(|(lane, events)| (lane, events.as_slice()))
    }

    /// Events of one lane, empty if the lane has none
    pub fn lane(&self, lane: &Lane) -> &[Event] {
        self.lanes.get(lane).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Chronologically last event of every lane
    pub fn last_events(&self) -> impl Iterator<Item = &Event> {
        self.lanes.values().filter_map(|events| events.last())
    }

    /// Number of lanes
    pub fn lane_count(&self) -> usize {
        self.lanes.len()
    }

    /// Total number of events
    pub fn event_count(&self) -> usize {
        self.lanes.values().map(Vec::len).sum()
    }

    /// Check if the timeline holds no events
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AreaId, ClientId, Direction, EventId};
    use chrono::{TimeZone, Utc};

    fn event(id: i64, client: i32, area: i32, direction: Direction, minute: u32) -> Event {
        Event::new(
            EventId(id),
            ClientId(client),
            AreaId(area),
            direction,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, minute, 0).unwrap(),
        )
    }

    #[test]
    fn test_groups_and_sorts_lanes() {
        let timeline = Timeline::from_events(vec![
            event(4, 1, 1, Direction::Out, 30),
            event(2, 2, 1, Direction::In, 5),
            event(1, 1, 1, Direction::In, 0),
            event(3, 1, 2, Direction::In, 10),
        ]);

        assert_eq!(timeline.lane_count(), 3);
        assert_eq!(timeline.event_count(), 4);

        let lane = timeline.lane(&Lane::new(ClientId(1), AreaId(1)));
        assert_eq!(lane.iter().map(|e| e.id).collect::<Vec<_>>(), vec![EventId(1), EventId(4)]);

        let last: Vec<_> = timeline.last_events().map(|e| e.id).collect();
        assert_eq!(last, vec![EventId(4), EventId(3), EventId(2)]);
    }

    #[test]
    fn test_missing_lane_is_empty() {
        let timeline = Timeline::from_events(Vec::new());
        assert!(timeline.is_empty());
        assert!(timeline.lane(&Lane::new(ClientId(1), AreaId(1))).is_empty());
    }
}
