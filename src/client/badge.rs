//! Badges and the cards issued on them

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{BadgeId, CardId, ClientId, Cutoff};

/// The access credential record of one client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    /// Badge identifier
    pub id: BadgeId,
    /// Owning client (one badge per client)
    pub client_id: ClientId,
    /// When the badge was issued
    pub issued_on: DateTime<Utc>,
}

impl Badge {
    /// Create a new badge
    pub fn new(id: BadgeId, client_id: ClientId, issued_on: DateTime<Utc>) -> Self {
        Self { id, client_id, issued_on }
    }
}

/// A physical card held on a badge.
///
/// A badge accumulates cards over time through replacements and renewals; only
/// cards that have not expired grant access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    /// Card identifier
    pub id: CardId,
    /// Badge the card belongs to
    pub badge_id: BadgeId,
    /// Client owning the badge
    pub client_id: ClientId,
    /// Number printed on / encoded in the card
    pub number: String,
    /// Instant the card stops granting access
    pub expire_on: DateTime<Utc>,
}

impl Card {
    /// Check if the card grants access at `at`
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        at < self.expire_on
    }

    /// Check if the card is still active at `now` but lapses on or before `cutoff`
    pub fn expires_by(&self, now: DateTime<Utc>, cutoff: &Cutoff) -> bool {
        self.is_active_at(now) && cutoff.admits_until(self.expire_on)
    }
}
