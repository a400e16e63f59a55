//! Resolution of area aliases to concrete area sets

use serde::Serialize;
use std::collections::BTreeSet;

use super::Area;
use crate::types::AreaId;

/// Errors raised while resolving an area alias
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// Alias was blank
    #[error("Area alias must not be empty")]
    EmptyAlias,

    /// Alias matched no area
    #[error("Unknown area alias: {0}")]
    UnknownAlias(String),
}

/// The concrete, non-empty set of areas an alias resolves to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AreaSelector {
    alias: String,
    areas: BTreeSet<AreaId>,
}

impl AreaSelector {
    /// Resolve `alias` against the known areas
    pub fn resolve(alias: &str, areas: &[Area]) -> Result<Self, SelectorError> {
        let trimmed = alias.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::EmptyAlias);
        }

        let matched: BTreeSet<AreaId> = areas
            .iter()
            .filter(|area| area.matches_alias(trimmed))
            .map(|area| area.id)
            .collect();

        if matched.is_empty() {
            return Err(SelectorError::UnknownAlias(trimmed.to_string()));
        }

        Ok(Self { alias: trimmed.to_lowercase(), areas: matched })
    }

    /// The alias this selector was resolved from (lowercased)
    pub fn alias(&self) -> &str {
        &self.alias
    }

    /// Check if `area` is part of the selection
    pub fn contains(&self, area: AreaId) -> bool {
        self.areas.contains(&area)
    }

    /// Selected areas in identifier order
    pub fn area_ids(&self) -> impl Iterator<Item = AreaId> + '_ {
        self.areas.iter().copied()
    }

    /// Number of selected areas
    pub fn len(&self) -> usize {
        self.areas.len()
    }

    /// Always false: a resolved selector is never empty
    pub fn is_empty(&self) -> bool {
        self.areas.is_empty()
    }
}
