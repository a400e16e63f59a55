//! Access lifecycle management
//!
//! Adds clients and moves them between enabled and disabled, recording the
//! expiration that re-enable eligibility is later judged against. Writes are
//! staged on the caller's unit of work; the caller commits.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::{EngineError, EngineResult};
use crate::client::{Client, NewClient};
use crate::store::UnitOfWork;
use crate::types::{ClientId, NeverDisabledPolicy};

const SECONDS_PER_DAY: i64 = 86_400;

/// Client add / enable / disable and re-enable eligibility
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLifecycle {
    never_disabled: NeverDisabledPolicy,
}

impl AccessLifecycle {
    /// Create a lifecycle manager.
    ///
    /// `never_disabled` answers re-enable eligibility for clients with no
    /// recorded expiration.
    pub fn new(never_disabled: NeverDisabledPolicy) -> Self {
        Self { never_disabled }
    }

    /// Add an enabled client and issue its badge
    pub fn add_client(
        &self,
        unit: &mut dyn UnitOfWork,
        request: NewClient,
        now: DateTime<Utc>,
    ) -> EngineResult<ClientId> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(EngineError::validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )));
        }

        if unit.client(request.client_id)?.is_some() {
            return Err(EngineError::conflict(format!("{} already exists", request.client_id)));
        }

        let user_name = request.user_name.trim().to_lowercase();
        if unit.clients(None)?.iter().any(|c| c.user_name.to_lowercase() == user_name) {
            return Err(EngineError::conflict(format!(
                "User name {} is already taken",
                request.user_name.trim()
            )));
        }

        let client = request.into_client();
        let client_id = client.id;
        let badge = unit.insert_client(client, now)?;

        info!(client = %client_id, badge = %badge.id, "Added client");
        Ok(client_id)
    }

    /// Enable access, optionally setting a new expiration
    pub fn enable_access(
        &self,
        unit: &mut dyn UnitOfWork,
        client_id: ClientId,
        expiration: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EngineResult<ClientId> {
        let mut client = existing(unit, client_id)?;
        client.enable(expiration, now);
        unit.update_client(&client)?;

        info!(client = %client_id, expire_on = ?client.expire_on, "Enabled access");
        Ok(client_id)
    }

    /// Disable access, effective at `expiration` or now
    pub fn disable_access(
        &self,
        unit: &mut dyn UnitOfWork,
        client_id: ClientId,
        expiration: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> EngineResult<ClientId> {
        let mut client = existing(unit, client_id)?;
        client.disable(expiration.unwrap_or(now));
        unit.update_client(&client)?;

        info!(client = %client_id, expire_on = ?client.expire_on, "Disabled access");
        Ok(client_id)
    }

    /// Whether the client's access lapsed no more than `days` days before `now`
    pub fn allow_reenable(
        &self,
        unit: &dyn UnitOfWork,
        client_id: ClientId,
        days: i64,
        now: DateTime<Utc>,
    ) -> EngineResult<bool> {
        if days < 0 {
            return Err(EngineError::validation(format!("days must not be negative, got {}", days)));
        }
        let client = existing(unit, client_id)?;

        let allowed = match client.expire_on {
            Some(expire_on) => {
                (now - expire_on).num_seconds() <= days.saturating_mul(SECONDS_PER_DAY)
            }
            None => self.never_disabled == NeverDisabledPolicy::Allow,
        };

        debug!(
            client = %client_id,
            days,
            expire_on = ?client.expire_on,
            allowed,
            "Checked re-enable eligibility"
        );
        Ok(allowed)
    }
}

fn existing(unit: &dyn UnitOfWork, client_id: ClientId) -> EngineResult<Client> {
    unit.client(client_id)?.ok_or_else(|| EngineError::not_found("Client", client_id))
}
