//! Passback violation detection
//!
//! Each (client, area) lane of the window is scanned in chronological order,
//! extended by one recorded event on either side of the window when
//! look-around is enabled:
//!
//! - **double-entry**: an entry immediately followed by another entry
//! - **orphan-exit**: an exit whose immediate predecessor is not an entry
//!
//! Only anomalies whose offending event lies inside the window are reported,
//! except that an in-window entry followed by a look-ahead entry is reported
//! against the look-ahead event.

use std::collections::BTreeSet;
use tracing::{debug, info};

use super::EngineResult;
use crate::events::{Event, EventQuery, Timeline, ViolationRecord};
use crate::store::UnitOfWork;
use crate::types::{ClientId, TimeRange, ViolationKind};

/// Finds passback anomalies in a time window
#[derive(Debug, Clone, Copy)]
pub struct ViolationDetector {
    look_behind: bool,
    look_ahead: bool,
}

impl Default for ViolationDetector {
    fn default() -> Self {
        Self { look_behind: true, look_ahead: true }
    }
}

impl ViolationDetector {
    /// Create a detector with the given look-around
    pub fn new(look_behind: bool, look_ahead: bool) -> Self {
        Self { look_behind, look_ahead }
    }

    /// Every violation in `range`, ordered by offending event
    pub fn violations(&self, unit: &dyn UnitOfWork, range: &TimeRange) -> EngineResult<Vec<ViolationRecord>> {
        let timeline = Timeline::from_events(unit.events(&EventQuery::new(*range))?);

        let mut records = Vec::new();
        for (lane, window) in timeline.lanes() {
            let before = if self.look_behind {
                unit.last_event_before(*lane, range.start.lower_bound())?
            } else {
                None
            };
            let after =
                if self.look_ahead { unit.first_event_after(*lane, &range.end)? } else { None };
            records.extend(scan_lane(before.as_ref(), window, after.as_ref()));
        }
        records.sort_by(|a, b| Event::chronological(&a.offending, &b.offending));

        debug!(range = %range, lanes = timeline.lane_count(), "Scanned lanes for passback");
        if !records.is_empty() {
            info!(range = %range, violations = records.len(), "Detected passback violations");
        }
        Ok(records)
    }

    /// Clients with at least one violation in `range`
    pub fn find_passback_violations(
        &self,
        unit: &dyn UnitOfWork,
        range: &TimeRange,
    ) -> EngineResult<BTreeSet<ClientId>> {
        Ok(self.violations(unit, range)?.into_iter().map(|record| record.client_id).collect())
    }
}

/// Scan one lane's window, with optional neighbours outside it
pub fn scan_lane(before: Option<&Event>, window: &[Event], after: Option<&Event>) -> Vec<ViolationRecord> {
    let mut records = Vec::new();
    let mut predecessor = before;

    for event in window {
        let entered = predecessor.is_some_and(Event::is_entry);
        if event.is_entry() && entered {
            records.push(record(ViolationKind::DoubleEntry, predecessor, event));
        } else if event.is_exit() && !entered {
            records.push(record(ViolationKind::OrphanExit, predecessor, event));
        }
        predecessor = Some(event);
    }

    if let (Some(last), Some(next)) = (window.last(), after) {
        if last.is_entry() && next.is_entry() {
            records.push(record(ViolationKind::DoubleEntry, Some(last), next));
        }
    }

    records
}

fn record(kind: ViolationKind, preceding: Option<&Event>, offending: &Event) -> ViolationRecord {
    ViolationRecord {
        client_id: offending.client_id,
        area_id: offending.area_id,
        kind,
        preceding: preceding.cloned(),
        offending: offending.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{DataAccess, InMemoryStore};
    use crate::types::{AreaId, Cutoff, Direction, EventId};
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0).unwrap()
    }

    fn lane(directions: &[Direction]) -> Vec<Event> {
        directions
            .iter()
            .enumerate()
            .map(|(i, direction)| {
                Event::new(EventId(i as i64 + 1), ClientId(42), AreaId(1), *direction, at(9, i as u32))
            })
            .collect()
    }

    fn kinds(records: &[ViolationRecord]) -> Vec<ViolationKind> {
        records.iter().map(|r| r.kind).collect()
    }

    #[test]
    fn test_double_entry() {
        use Direction::*;
        let records = scan_lane(None, &lane(&[In, In]), None);
        assert_eq!(kinds(&records), vec![ViolationKind::DoubleEntry]);
        assert_eq!(records[0].offending.id, EventId(2));
        assert_eq!(records[0].preceding.as_ref().map(|e| e.id), Some(EventId(1)));
    }

    #[test]
    fn test_clean_sequence_has_no_violations() {
        use Direction::*;
        assert!(scan_lane(None, &lane(&[In, Out, In, Out]), None).is_empty());
    }

    #[test]
    fn test_orphan_exits() {
        use Direction::*;
        let records = scan_lane(None, &lane(&[Out, In, Out, Out]), None);
        assert_eq!(kinds(&records), vec![ViolationKind::OrphanExit, ViolationKind::OrphanExit]);
        assert!(records[0].preceding.is_none());
        assert_eq!(records[1].offending.id, EventId(4));
    }

    #[test]
    fn test_look_behind_resolves_leading_exit() {
        use Direction::*;
        let history = lane(&[In, Out]);
        let records = scan_lane(Some(&history[0]), &history[1..], None);
        assert!(records.is_empty());
    }

    #[test]
    fn test_look_ahead_reports_trailing_entry() {
        use Direction::*;
        let history = lane(&[In, In]);
        let records = scan_lane(None, &history[..1], Some(&history[1]));
        assert_eq!(kinds(&records), vec![ViolationKind::DoubleEntry]);
        assert_eq!(records[0].offending.id, EventId(2));
    }

    fn store() -> InMemoryStore {
        let store = InMemoryStore::new();
        let area = store.add_area("Bay 1", None);
        // Entry the evening before, exit in the morning
        store.record_event(ClientId(42), area, Direction::In, at(0, 0) - chrono::Duration::hours(3));
        store.record_event(ClientId(42), area, Direction::Out, at(8, 0));
        store.record_event(ClientId(7), area, Direction::In, at(9, 0));
        store.record_event(ClientId(7), area, Direction::In, at(9, 1));
        store
    }

    #[test]
    fn test_window_with_look_around() {
        let store = store();
        let unit = store.start().unwrap();
        let day = at(0, 0).date_naive();
        let range = TimeRange::new(day, day);

        let clients = ViolationDetector::default().find_passback_violations(unit.as_ref(), &range).unwrap();
        assert_eq!(clients.into_iter().collect::<Vec<_>>(), vec![ClientId(7)]);
    }

    #[test]
    fn test_strict_window_flags_leading_exit() {
        let store = store();
        let unit = store.start().unwrap();
        let day = at(0, 0).date_naive();
        let range = TimeRange::new(day, day);

        let records = ViolationDetector::new(false, false).violations(unit.as_ref(), &range).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, ViolationKind::OrphanExit);
        assert_eq!(records[0].client_id, ClientId(42));
        assert_eq!(records[1].kind, ViolationKind::DoubleEntry);
    }

    #[test]
    fn test_look_ahead_beyond_window() {
        let store = InMemoryStore::new();
        let area = store.add_area("Bay 1", None);
        store.record_event(ClientId(42), area, Direction::In, at(9, 0));
        store.record_event(ClientId(42), area, Direction::In, at(11, 0));
        let unit = store.start().unwrap();

        let range = TimeRange::new(at(8, 0), Cutoff::At(at(10, 0)));
        let records = ViolationDetector::default().violations(unit.as_ref(), &range).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].offending.id, EventId(2));

        let strict = ViolationDetector::new(true, false).violations(unit.as_ref(), &range).unwrap();
        assert!(strict.is_empty());
    }
}
