//! Properties of occupancy, session search, export and violation detection
//!
//! Each test builds a small event history in the in-memory store and checks a
//! property that must hold for any history.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use physical_access_engine::prelude::*;
use std::sync::Arc;

fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
}

fn day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
}

fn service_at(store: InMemoryStore, now: DateTime<Utc>) -> PhysicalAccessService<InMemoryStore> {
    PhysicalAccessService::with_clock(store, &EngineConfig::default(), Arc::new(FixedClock::new(now)))
}

/// Swipes for three clients across two areas, including same-instant ties
fn busy_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    let bay = store.add_area("Bay 1", Some("cleanroom"));
    let robin = store.add_area("ROBIN", Some("robin"));

    let swipes = [
        (1, bay, Direction::In, at(8, 0)),
        (2, bay, Direction::In, at(8, 5)),
        (1, robin, Direction::In, at(8, 30)),
        (1, bay, Direction::Out, at(9, 0)),
        (3, robin, Direction::In, at(9, 0)),
        (3, robin, Direction::Out, at(9, 0)),
        (2, bay, Direction::Out, at(10, 0)),
        (2, bay, Direction::In, at(10, 0)),
        (3, robin, Direction::In, at(11, 0)),
        (1, robin, Direction::Out, at(12, 0)),
    ];
    for (client, area, direction, ts) in swipes {
        store.record_event(ClientId(client), area, direction, ts);
    }
    store
}

/// Every reported occupant's last lane event before the instant is an entry
#[test]
fn test_occupants_last_event_is_entry() {
    let service = service_at(busy_store(), at(23, 0));

    for hour in 7..14 {
        let instant = at(hour, 0);
        let occupants = service.currently_in_at("all", instant).unwrap();
        let history = service
            .get_raw_events(DateTime::<Utc>::MIN_UTC, instant, ClientId(0), AreaId(0))
            .unwrap();

        for occupant in &occupants {
            let last = history
                .iter()
                .filter(|e| e.client_id == occupant.client_id && e.area_id == occupant.area_id)
                .last()
                .expect("occupant has history");
            assert_eq!(last.direction, Direction::In, "occupant {:?} at {}", occupant, instant);
            assert_eq!(last.id, occupant.entry_event);
        }

        // And every lane whose last event is an entry is reported
        let mut lanes: Vec<_> = history.iter().map(|e| (e.client_id, e.area_id)).collect();
        lanes.sort();
        lanes.dedup();
        for (client, area) in lanes {
            let last = history.iter().filter(|e| e.client_id == client && e.area_id == area).last();
            let inside = occupants.iter().any(|o| o.client_id == client && o.area_id == area);
            assert_eq!(last.map(|e| e.direction == Direction::In), Some(inside));
        }
    }
}

/// Same-instant swipes resolve by identifier
#[test]
fn test_same_instant_swipes_resolve_by_identifier() {
    let service = service_at(busy_store(), at(10, 30));
    let inside = service.currently_in("cleanroom").unwrap();

    // Client 2 swiped OUT then IN at 10:00; the later identifier wins
    assert_eq!(inside.len(), 1);
    assert_eq!(inside[0].client_id, ClientId(2));
}

/// Previous-in and next-out undo each other on a clean pair
#[test]
fn test_previous_in_and_next_out_are_inverse() {
    let store = InMemoryStore::new();
    let area = store.add_area("Bay 1", Some("cleanroom"));
    let entry = store.record_event(ClientId(42), area, Direction::In, at(9, 0));
    let exit = store.record_event(ClientId(42), area, Direction::Out, at(9, 45));
    let service = service_at(store, at(12, 0));

    let found_exit = service.find_next_out(entry, at(9, 46)).unwrap().unwrap();
    assert_eq!(found_exit.id, exit);

    let found_entry = service.find_previous_in(exit, at(8, 59)).unwrap().unwrap();
    assert_eq!(found_entry.id, entry);
}

/// Searching from an unknown event is a validation error
#[test]
fn test_search_from_unknown_event() {
    let service = service_at(busy_store(), at(12, 0));
    assert!(matches!(
        service.find_next_out(EventId(999), day()),
        Err(EngineError::Validation(_))
    ));
}

/// Raw export is stable and prepared export has no duplicate rows
#[test]
fn test_export_idempotence_and_deduplication() {
    let store = busy_store();
    let bay = AreaId(1);
    store.record_event(ClientId(1), bay, Direction::In, at(8, 0));
    let service = service_at(store, at(23, 0));

    let first = service.get_raw_events(day(), day(), ClientId(0), AreaId(0)).unwrap();
    let second = service.get_raw_events(day(), day(), ClientId(0), AreaId(0)).unwrap();
    assert_eq!(first, second);
    assert!(first.windows(2).all(|pair| pair[0].precedes(&pair[1])));

    let prepared = service.get_events(day(), day(), ClientId(0), AreaId(0)).unwrap();
    assert_eq!(prepared.len(), first.len() - 1);
    for (i, a) in prepared.iter().enumerate() {
        for b in &prepared[i + 1..] {
            assert_ne!(
                (a.client_id, a.area_id, a.direction, a.timestamp),
                (b.client_id, b.area_id, b.direction, b.timestamp)
            );
        }
    }
}

/// Consecutive entries are a double entry; alternating swipes are clean
#[test]
fn test_double_entry_versus_clean_alternation() {
    let store = InMemoryStore::new();
    let area = store.add_area("Bay 1", None);
    store.record_event(ClientId(1), area, Direction::In, at(9, 0));
    store.record_event(ClientId(1), area, Direction::In, at(9, 5));
    store.record_event(ClientId(2), area, Direction::In, at(9, 0));
    store.record_event(ClientId(2), area, Direction::Out, at(9, 30));
    store.record_event(ClientId(2), area, Direction::In, at(10, 0));
    store.record_event(ClientId(2), area, Direction::Out, at(10, 30));
    let service = service_at(store, at(12, 0));

    let clients = service.get_passback_violations(day(), day()).unwrap();
    assert_eq!(clients.into_iter().collect::<Vec<_>>(), vec![ClientId(1)]);

    let records = service.get_violations(day(), day()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ViolationKind::DoubleEntry);
    assert_eq!(records[0].offending.timestamp, at(9, 5));
}

/// A stay that started before the window is not an orphan exit
#[test]
fn test_window_boundary_look_behind() {
    let store = InMemoryStore::new();
    let area = store.add_area("Bay 1", None);
    store.record_event(ClientId(1), area, Direction::In, at(0, 0) - Duration::hours(2));
    store.record_event(ClientId(1), area, Direction::Out, at(7, 0));

    let relaxed = service_at(store, at(12, 0));
    assert!(relaxed.get_passback_violations(day(), day()).unwrap().is_empty());

    let mut config = EngineConfig::default();
    config.violation_look_behind = false;
    let strict = PhysicalAccessService::with_clock(
        InMemoryStore::from_dataset((*relaxed.store().snapshot()).clone()).unwrap(),
        &config,
        Arc::new(FixedClock::new(at(12, 0))),
    );
    let records = strict.get_violations(day(), day()).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, ViolationKind::OrphanExit);
}

fn disabled_client_service(disabled_days_ago: i64) -> PhysicalAccessService<InMemoryStore> {
    let now = at(12, 0);
    let service = service_at(InMemoryStore::new(), now);
    service
        .add_client(NewClient {
            client_id: ClientId(42),
            user_name: "jdoe".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            expire_on: None,
        })
        .unwrap();
    service.disable_access(ClientId(42), Some(now - Duration::days(disabled_days_ago))).unwrap();
    service
}

/// Re-enable is allowed ten days after disabling with a thirty day window
#[test]
fn test_reenable_allowed_within_window() {
    let service = disabled_client_service(10);
    assert!(service.allow_reenable(ClientId(42), 30).unwrap());
}

/// Re-enable is refused forty days after disabling with a thirty day window
#[test]
fn test_reenable_refused_outside_window() {
    let service = disabled_client_service(40);
    assert!(!service.allow_reenable(ClientId(42), 30).unwrap());
}
