//! Lab area records

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::AreaId;

/// Alias that matches every area
pub const ALL_AREAS: &str = "all";

/// A lab area guarded by badge readers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    /// Area identifier
    pub id: AreaId,
    /// Human-readable name
    pub name: String,
    /// Named group the area belongs to (e.g. "cleanroom", "robin")
    #[serde(default)]
    pub group: Option<String>,
}

impl Area {
    /// Create a new area
    pub fn new(id: AreaId, name: impl Into<String>, group: Option<&str>) -> Self {
        Self { id, name: name.into(), group: group.map(str::to_string) }
    }

    /// Check if the area is selected by `alias`.
    ///
    /// `all` matches every area; any other alias matches the area's group or
    /// its own name, ignoring case.
    pub fn matches_alias(&self, alias: &str) -> bool {
        let alias = alias.trim();
        alias.eq_ignore_ascii_case(ALL_AREAS)
            || self.name.eq_ignore_ascii_case(alias)
            || self.group.as_deref().is_some_and(|group| group.eq_ignore_ascii_case(alias))
    }
}

impl fmt::Display for Area {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.group {
            Some(group) => write!(f, "{} ({}, {})", self.name, self.id, group),
            None => write!(f, "{} ({})", self.name, self.id),
        }
    }
}
