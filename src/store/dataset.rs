//! Serialized form of the in-memory store

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

use super::{StoreError, StoreResult};
use crate::area::Area;
use crate::client::{Badge, Card, Client};
use crate::events::Event;

/// Every record held by the in-memory store
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Clients
    #[serde(default)]
    pub clients: Vec<Client>,
    /// Badges, one per client
    #[serde(default)]
    pub badges: Vec<Badge>,
    /// Cards held on badges
    #[serde(default)]
    pub cards: Vec<Card>,
    /// Lab areas
    #[serde(default)]
    pub areas: Vec<Area>,
    /// Recorded swipe events
    #[serde(default)]
    pub events: Vec<Event>,
}

impl Dataset {
    /// Load a dataset from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let dataset: Dataset = serde_json::from_str(&content)?;
        dataset.validate()?;

        info!(
            path = %path.display(),
            clients = dataset.clients.len(),
            areas = dataset.areas.len(),
            events = dataset.events.len(),
            "Loaded dataset"
        );
        Ok(dataset)
    }

    /// Save the dataset to a JSON file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> StoreResult<()> {
        let path = path.as_ref();
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        debug!(path = %path.display(), "Saved dataset");
        Ok(())
    }

    /// Check identity and ownership constraints
    pub fn validate(&self) -> StoreResult<()> {
        unique("client", self.clients.iter().map(|c| c.id.0 as i64))?;
        unique("user name", self.clients.iter().map(|c| c.user_name.to_lowercase()))?;
        unique("badge", self.badges.iter().map(|b| b.id.0 as i64))?;
        unique("badge owner", self.badges.iter().map(|b| b.client_id.0 as i64))?;
        unique("card", self.cards.iter().map(|c| c.id.0 as i64))?;
        unique("area", self.areas.iter().map(|a| a.id.0 as i64))?;
        unique("event", self.events.iter().map(|e| e.id.0))?;

        for card in &self.cards {
            let owned = self
                .badges
                .iter()
                .any(|badge| badge.id == card.badge_id && badge.client_id == card.client_id);
            if !owned {
                return Err(StoreError::constraint(format!(
                    "{} refers to {} which is not the badge of {}",
                    card.id, card.badge_id, card.client_id
                )));
            }
        }

        Ok(())
    }
}

fn unique<T: std::hash::Hash + Eq + std::fmt::Debug>(
    what: &str,
    values: impl Iterator<Item = T>,
) -> StoreResult<()> {
    let mut seen = HashSet::new();
    for value in values {
        if !seen.insert(value) {
            return Err(StoreError::constraint(format!("duplicate {} in dataset", what)));
        }
    }
    Ok(())
}
