//! Records derived from the event history
//!
//! None of these are persisted; they are recomputed from a store snapshot on
//! every query.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Event;
use crate::types::{AreaId, BadgeId, ClientId, EventId, ViolationKind};

/// An IN event and, once observed, the OUT that closes it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Client
    pub client_id: ClientId,
    /// Area
    pub area_id: AreaId,
    /// Entry event
    pub entry: Event,
    /// Exit event, `None` while the session is open
    pub exit: Option<Event>,
}

impl Session {
    /// Open a session from an entry event
    pub fn open(entry: Event) -> Self {
        Self { client_id: entry.client_id, area_id: entry.area_id, entry, exit: None }
    }

    /// Check if no exit has been observed
    pub fn is_open(&self) -> bool {
        self.exit.is_none()
    }

    /// Time spent inside, for closed sessions
    pub fn duration(&self) -> Option<Duration> {
        self.exit.as_ref().map(|exit| exit.timestamp - self.entry.timestamp)
    }
}

/// One client present in one area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Occupant {
    /// Client inside
    pub client_id: ClientId,
    /// Area occupied
    pub area_id: AreaId,
    /// Timestamp of the entry that opened the stay
    pub entered_at: DateTime<Utc>,
    /// The entry event itself
    pub entry_event: EventId,
}

/// An occupant joined with the badge and area it refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeInArea {
    /// Badge of the occupant
    pub badge_id: BadgeId,
    /// Client owning the badge
    pub client_id: ClientId,
    /// "Last, First" of the client
    pub client_name: String,
    /// Area occupied
    pub area_id: AreaId,
    /// Name of the area
    pub area_name: String,
    /// Timestamp of the entry that opened the stay
    pub entered_at: DateTime<Utc>,
}

/// A passback anomaly found in a client's lane
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// Client whose badge was involved
    pub client_id: ClientId,
    /// Area of the anomaly
    pub area_id: AreaId,
    /// Anomaly kind
    pub kind: ViolationKind,
    /// Event immediately before the offending one, when recorded
    pub preceding: Option<Event>,
    /// The swipe that makes the sequence anomalous
    pub offending: Event,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;
    use chrono::TimeZone;

    #[test]
    fn test_session_duration() {
        let entry = Event::new(
            EventId(1),
            ClientId(42),
            AreaId(1),
            Direction::In,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 0, 0).unwrap(),
        );
        let exit = Event::new(
            EventId(2),
            ClientId(42),
            AreaId(1),
            Direction::Out,
            Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).unwrap(),
        );

        let mut session = Session::open(entry);
        assert!(session.is_open());
        assert!(session.duration().is_none());

        session.exit = Some(exit);
        assert!(!session.is_open());
        assert_eq!(session.duration(), Some(Duration::minutes(30)));
    }
}
