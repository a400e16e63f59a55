//! Client records and access status transitions

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AccessStatus, ClientId};

/// A badge holder known to the physical access system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Identifier assigned by the directory system
    pub id: ClientId,
    /// Login name, unique across clients
    pub user_name: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Whether access is currently enabled
    pub status: AccessStatus,
    /// Instant after which access is revoked even while enabled.
    ///
    /// Disabling a client records the effective revocation instant here.
    pub expire_on: Option<DateTime<Utc>>,
}

impl Client {
    /// Create an enabled client with no expiration
    pub fn new(
        id: ClientId,
        user_name: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id,
            user_name: user_name.into(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            status: AccessStatus::Enabled,
            expire_on: None,
        }
    }

    /// "Last, First" as shown on access rosters
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }

    /// Check if the client is marked enabled
    pub fn is_enabled(&self) -> bool {
        self.status == AccessStatus::Enabled
    }

    /// Check if the client holds access at `at`
    pub fn has_access_at(&self, at: DateTime<Utc>) -> bool {
        self.is_enabled() && self.expire_on.map_or(true, |expire_on| at < expire_on)
    }

    /// Enable access.
    ///
    /// A given expiration replaces the recorded one. Without one, a future
    /// expiration is kept and a past one is cleared so the client is not
    /// enabled into an already-lapsed window.
    pub fn enable(&mut self, expiration: Option<DateTime<Utc>>, now: DateTime<Utc>) {
        self.status = AccessStatus::Enabled;
        self.expire_on = match expiration {
            Some(expire_on) => Some(expire_on),
            None => self.expire_on.filter(|expire_on| *expire_on > now),
        };
    }

    /// Disable access, effective at `effective`
    pub fn disable(&mut self, effective: DateTime<Utc>) {
        self.status = AccessStatus::Disabled;
        self.expire_on = Some(effective);
    }
}

/// Data required to add a client to the physical access system
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClient {
    /// Identifier assigned by the directory system
    pub client_id: ClientId,
    /// Login name
    pub user_name: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// Optional access expiration
    #[serde(default)]
    pub expire_on: Option<DateTime<Utc>>,
}

impl NewClient {
    /// Names of required identity fields that are missing or blank
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.client_id.is_unset() {
            missing.push("client_id");
        }
        if self.user_name.trim().is_empty() {
            missing.push("user_name");
        }
        if self.first_name.trim().is_empty() {
            missing.push("first_name");
        }
        if self.last_name.trim().is_empty() {
            missing.push("last_name");
        }
        missing
    }

    /// Build the client record this request creates
    pub fn into_client(self) -> Client {
        let mut client = Client::new(
            self.client_id,
            self.user_name.trim(),
            self.first_name.trim(),
            self.last_name.trim(),
        );
        client.expire_on = self.expire_on;
        client
    }
}
