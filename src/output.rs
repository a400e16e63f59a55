//! Command result output
//!
//! Results are written one record per line, either as JSON documents or as
//! CSV rows under a header line.

use serde::Serialize;
use std::io::{self, Write};

use crate::area::Area;
use crate::client::{Badge, Card};
use crate::events::{BadgeInArea, Event, Occupant, Session, ViolationRecord};
use crate::types::{ClientId, OutputFormat};

/// A record with a flat CSV representation
pub trait Tabular {
    /// Column names
    fn header() -> &'static [&'static str];

    /// Cell values, in header order
    fn row(&self) -> Vec<String>;
}

/// Write `records` to `writer` in `format`
pub fn write_records<W, T>(writer: &mut W, format: OutputFormat, records: &[T]) -> io::Result<()>
where
    W: Write,
    T: Serialize + Tabular,
{
    match format {
        OutputFormat::Json => {
            for record in records {
                serde_json::to_writer(&mut *writer, record)?;
                writeln!(writer)?;
            }
        }
        OutputFormat::Csv => {
            writeln!(writer, "{}", T::header().join(","))?;
            for record in records {
                let cells: Vec<String> = record.row().iter().map(|cell| escape(cell)).collect();
                writeln!(writer, "{}", cells.join(","))?;
            }
        }
    }
    writer.flush()
}

/// Quote a CSV cell when it contains a separator, quote or line break
fn escape(cell: &str) -> String {
    if cell.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

impl Tabular for Event {
    fn header() -> &'static [&'static str] {
        &["id", "client_id", "area_id", "direction", "timestamp"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.0.to_string(),
            self.client_id.0.to_string(),
            self.area_id.0.to_string(),
            self.direction.to_string(),
            self.timestamp.to_rfc3339(),
        ]
    }
}

impl Tabular for Option<Event> {
    fn header() -> &'static [&'static str] {
        Event::header()
    }

    fn row(&self) -> Vec<String> {
        match self {
            Some(event) => event.row(),
            None => vec![String::new(); Event::header().len()],
        }
    }
}

impl Tabular for Occupant {
    fn header() -> &'static [&'static str] {
        &["client_id", "area_id", "entered_at", "entry_event"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.client_id.0.to_string(),
            self.area_id.0.to_string(),
            self.entered_at.to_rfc3339(),
            self.entry_event.0.to_string(),
        ]
    }
}

impl Tabular for BadgeInArea {
    fn header() -> &'static [&'static str] {
        &["badge_id", "client_id", "client_name", "area_id", "area_name", "entered_at"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.badge_id.0.to_string(),
            self.client_id.0.to_string(),
            self.client_name.clone(),
            self.area_id.0.to_string(),
            self.area_name.clone(),
            self.entered_at.to_rfc3339(),
        ]
    }
}

impl Tabular for Session {
    fn header() -> &'static [&'static str] {
        &["client_id", "area_id", "entry_event", "entered_at", "exit_event", "exited_at"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.client_id.0.to_string(),
            self.area_id.0.to_string(),
            self.entry.id.0.to_string(),
            self.entry.timestamp.to_rfc3339(),
            optional(self.exit.as_ref().map(|e| e.id.0)),
            optional(self.exit.as_ref().map(|e| e.timestamp.to_rfc3339())),
        ]
    }
}

impl Tabular for ViolationRecord {
    fn header() -> &'static [&'static str] {
        &["client_id", "area_id", "kind", "preceding_event", "offending_event", "timestamp"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.client_id.0.to_string(),
            self.area_id.0.to_string(),
            self.kind.to_string(),
            optional(self.preceding.as_ref().map(|e| e.id.0)),
            self.offending.id.0.to_string(),
            self.offending.timestamp.to_rfc3339(),
        ]
    }
}

impl Tabular for Badge {
    fn header() -> &'static [&'static str] {
        &["id", "client_id", "issued_on"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.0.to_string(), self.client_id.0.to_string(), self.issued_on.to_rfc3339()]
    }
}

impl Tabular for Card {
    fn header() -> &'static [&'static str] {
        &["id", "badge_id", "client_id", "number", "expire_on"]
    }

    fn row(&self) -> Vec<String> {
        vec![
            self.id.0.to_string(),
            self.badge_id.0.to_string(),
            self.client_id.0.to_string(),
            self.number.clone(),
            self.expire_on.to_rfc3339(),
        ]
    }
}

impl Tabular for Area {
    fn header() -> &'static [&'static str] {
        &["id", "name", "group"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.id.0.to_string(), self.name.clone(), self.group.clone().unwrap_or_default()]
    }
}

impl Tabular for ClientId {
    fn header() -> &'static [&'static str] {
        &["client_id"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.0.to_string()]
    }
}

impl Tabular for bool {
    fn header() -> &'static [&'static str] {
        &["allowed"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.to_string()]
    }
}

impl Tabular for String {
    fn header() -> &'static [&'static str] {
        &["value"]
    }

    fn row(&self) -> Vec<String> {
        vec![self.clone()]
    }
}
