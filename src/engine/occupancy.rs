//! Occupancy resolution
//!
//! A client occupies an area exactly when the chronologically last event of
//! its (client, area) lane, among events up to the as-of cutoff, is an entry.
//! One pass over the lanes, last write wins.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

use super::EngineResult;
use crate::area::AreaSelector;
use crate::events::{BadgeInArea, EventQuery, Occupant, Timeline};
use crate::store::UnitOfWork;
use crate::types::{ClientId, Cutoff, TimeRange};

/// Resolves who is inside a selection of areas
#[derive(Debug, Clone, Copy, Default)]
pub struct OccupancyResolver {
    requires_active_card: bool,
}

impl OccupancyResolver {
    /// Create a resolver.
    ///
    /// With `requires_active_card` set, occupants holding no card unexpired at
    /// the as-of instant are left out.
    pub fn new(requires_active_card: bool) -> Self {
        Self { requires_active_card }
    }

    /// Clients inside the areas `alias` resolves to, as of `as_of`
    pub fn currently_in(
        &self,
        unit: &dyn UnitOfWork,
        alias: &str,
        as_of: &Cutoff,
    ) -> EngineResult<Vec<Occupant>> {
        let selector = AreaSelector::resolve(alias, &unit.areas()?)?;

        let history = TimeRange::new(DateTime::<Utc>::MIN_UTC, *as_of);
        let events = unit
            .events(&EventQuery::new(history))?
            .into_iter()
            .filter(|event| selector.contains(event.area_id));
        let timeline = Timeline::from_events(events);

        let mut occupants = occupants(&timeline);

        if self.requires_active_card {
            let instant = as_of.end_instant();
            let carded: HashSet<ClientId> = unit
                .cards(None)?
                .into_iter()
                .filter(|card| card.is_active_at(instant))
                .map(|card| card.client_id)
                .collect();
            occupants.retain(|occupant| carded.contains(&occupant.client_id));
        }

        debug!(
            alias = selector.alias(),
            areas = selector.len(),
            lanes = timeline.lane_count(),
            occupants = occupants.len(),
            "Resolved occupancy"
        );
        Ok(occupants)
    }

    /// Occupants joined with their badge and area, one row per occupant
    pub fn badge_in_areas(
        &self,
        unit: &dyn UnitOfWork,
        alias: &str,
        as_of: &Cutoff,
    ) -> EngineResult<Vec<BadgeInArea>> {
        let occupants = self.currently_in(unit, alias, as_of)?;

        let badges: BTreeMap<_, _> =
            unit.badges(None)?.into_iter().map(|badge| (badge.client_id, badge)).collect();
        let names: BTreeMap<_, _> = unit
            .clients(None)?
            .into_iter()
            .map(|client| (client.id, client.display_name()))
            .collect();
        let areas: BTreeMap<_, _> =
            unit.areas()?.into_iter().map(|area| (area.id, area.name)).collect();

        let mut rows = Vec::with_capacity(occupants.len());
        for occupant in occupants {
            let Some(badge) = badges.get(&occupant.client_id) else {
                warn!(client = %occupant.client_id, "Occupant has no badge, skipping");
                continue;
            };
            rows.push(BadgeInArea {
                badge_id: badge.id,
                client_id: occupant.client_id,
                client_name: names.get(&occupant.client_id).cloned().unwrap_or_default(),
                area_id: occupant.area_id,
                area_name: areas.get(&occupant.area_id).cloned().unwrap_or_default(),
                entered_at: occupant.entered_at,
            });
        }
        Ok(rows)
    }
}

/// Occupants of a timeline, ordered by (area, entered_at, client)
pub fn occupants(timeline: &Timeline) -> Vec<Occupant> {
    let mut occupants: Vec<Occupant> = timeline
        .last_events()
        .filter(|event| event.is_entry())
        .map(|event| Occupant {
            client_id: event.client_id,
            area_id: event.area_id,
            entered_at: event.timestamp,
            entry_event: event.id,
        })
        .collect();
    occupants.sort_by_key(|o| (o.area_id, o.entered_at, o.client_id));
    occupants
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::area::Area;
    use crate::client::{Badge, Card, Client};
    use crate::store::{DataAccess, Dataset, InMemoryStore};
    use crate::events::Event;
    use crate::types::{AreaId, BadgeId, CardId, Direction, EventId};
    use chrono::{Duration, TimeZone};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn event(id: i64, client: i32, area: i32, direction: Direction, ts: DateTime<Utc>) -> Event {
        Event::new(EventId(id), ClientId(client), AreaId(area), direction, ts)
    }

    fn store() -> InMemoryStore {
        let dataset = Dataset {
            clients: vec![
                Client::new(ClientId(42), "jdoe", "Jane", "Doe"),
                Client::new(ClientId(7), "rroe", "Rick", "Roe"),
            ],
            badges: vec![
                Badge::new(BadgeId(1), ClientId(42), at(0, 0)),
                Badge::new(BadgeId(2), ClientId(7), at(0, 0)),
            ],
            cards: vec![Card {
                id: CardId(1),
                badge_id: BadgeId(1),
                client_id: ClientId(42),
                number: "0042-01".to_string(),
                expire_on: at(0, 0) + Duration::days(30),
            }],
            areas: vec![
                Area::new(AreaId(1), "Bay 1", Some("cleanroom")),
                Area::new(AreaId(2), "ROBIN", Some("robin")),
            ],
            events: vec![
                event(1, 42, 1, Direction::In, at(9, 0)),
                event(2, 7, 1, Direction::In, at(9, 5)),
                event(3, 7, 2, Direction::In, at(9, 10)),
                event(4, 7, 1, Direction::Out, at(10, 0)),
            ],
        };
        InMemoryStore::from_dataset(dataset).unwrap()
    }

    #[test]
    fn test_last_event_decides_occupancy() {
        let store = store();
        let unit = store.start().unwrap();
        let resolver = OccupancyResolver::default();

        let inside = resolver.currently_in(unit.as_ref(), "cleanroom", &Cutoff::At(at(12, 0))).unwrap();
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].client_id, ClientId(42));
        assert_eq!(inside[0].entry_event, EventId(1));

        let earlier = resolver.currently_in(unit.as_ref(), "cleanroom", &Cutoff::At(at(9, 30))).unwrap();
        let clients: Vec<_> = earlier.iter().map(|o| o.client_id).collect();
        assert_eq!(clients, vec![ClientId(42), ClientId(7)]);
    }

    #[test]
    fn test_all_alias_spans_areas() {
        let store = store();
        let unit = store.start().unwrap();
        let inside = OccupancyResolver::default()
            .currently_in(unit.as_ref(), "all", &Cutoff::At(at(12, 0)))
            .unwrap();

        let pairs: Vec<_> = inside.iter().map(|o| (o.area_id, o.client_id)).collect();
        assert_eq!(pairs, vec![(AreaId(1), ClientId(42)), (AreaId(2), ClientId(7))]);
    }

    #[test]
    fn test_unknown_alias_is_validation_error() {
        let store = store();
        let unit = store.start().unwrap();
        let result =
            OccupancyResolver::default().currently_in(unit.as_ref(), "bogus", &Cutoff::At(at(12, 0)));
        assert!(matches!(result, Err(crate::engine::EngineError::Validation(_))));
    }

    #[test]
    fn test_active_card_requirement() {
        let store = store();
        let unit = store.start().unwrap();
        let inside = OccupancyResolver::new(true)
            .currently_in(unit.as_ref(), "all", &Cutoff::At(at(12, 0)))
            .unwrap();

        // Client 7 holds no card
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].client_id, ClientId(42));
    }

    #[test]
    fn test_badge_in_areas_joins_records() {
        let store = store();
        let unit = store.start().unwrap();
        let rows = OccupancyResolver::default()
            .badge_in_areas(unit.as_ref(), "all", &Cutoff::At(at(12, 0)))
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].badge_id, BadgeId(1));
        assert_eq!(rows[0].client_name, "Doe, Jane");
        assert_eq!(rows[0].area_name, "Bay 1");
        assert_eq!(rows[1].area_name, "ROBIN");
    }

    #[test]
    fn test_occupants_from_timeline() {
        let timeline = Timeline::from_events(vec![
            event(1, 1, 1, Direction::In, at(9, 0)),
            event(2, 1, 1, Direction::Out, at(9, 0)),
            event(3, 2, 1, Direction::Out, at(9, 0)),
            event(4, 2, 1, Direction::In, at(9, 0)),
        ]);

        // Same timestamp: identifier order decides the last event
        let inside = occupants(&timeline);
        assert_eq!(inside.len(), 1);
        assert_eq!(inside[0].client_id, ClientId(2));
    }
}
