//! Enumeration types for the physical access engine
//!
//! This module contains the swipe direction, client access status, violation
//! kinds, re-enable policy and output formats used throughout the engine.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a badge swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    /// Entering an area
    In,
    /// Leaving an area
    Out,
}

impl Direction {
    /// The opposite direction
    pub fn opposite(self) -> Self {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => write!(f, "IN"),
            Direction::Out => write!(f, "OUT"),
        }
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "in" | "entry" | "enter" => Ok(Direction::In),
            "out" | "exit" | "leave" => Ok(Direction::Out),
            _ => Err(format!("Unknown direction: {}", s)),
        }
    }
}

/// Access status of a client record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessStatus {
    /// Access is granted (subject to expiration)
    Enabled,
    /// Access has been revoked
    Disabled,
}

impl fmt::Display for AccessStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessStatus::Enabled => write!(f, "Enabled"),
            AccessStatus::Disabled => write!(f, "Disabled"),
        }
    }
}

/// Kinds of passback anomaly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ViolationKind {
    /// Two consecutive entries with no exit in between
    DoubleEntry,
    /// An exit with no matching entry
    OrphanExit,
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViolationKind::DoubleEntry => write!(f, "double-entry"),
            ViolationKind::OrphanExit => write!(f, "orphan-exit"),
        }
    }
}

impl FromStr for ViolationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "double-entry" | "doubleentry" | "double entry" => Ok(ViolationKind::DoubleEntry),
            "orphan-exit" | "orphanexit" | "orphan exit" => Ok(ViolationKind::OrphanExit),
            _ => Err(format!("Unknown violation kind: {}", s)),
        }
    }
}

/// Re-enable decision for a client that has no expiration on record
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeverDisabledPolicy {
    /// Treat the client as always eligible
    #[default]
    Allow,
    /// Require an explicit enable before the client counts as eligible
    Deny,
}

impl fmt::Display for NeverDisabledPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeverDisabledPolicy::Allow => write!(f, "allow"),
            NeverDisabledPolicy::Deny => write!(f, "deny"),
        }
    }
}

impl FromStr for NeverDisabledPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "allow" | "allowed" | "true" => Ok(NeverDisabledPolicy::Allow),
            "deny" | "denied" | "false" => Ok(NeverDisabledPolicy::Deny),
            _ => Err(format!("Unknown never-disabled policy: {}", s)),
        }
    }
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutputFormat {
    /// One JSON document per line
    Json,
    /// CSV format for tabular data
    Csv,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "JSON"),
            OutputFormat::Csv => write!(f, "CSV"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" | "jsonl" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}
