//! Identifier types for the physical access engine
//!
//! Every record kept by the data-access layer is keyed by an integer identity
//! column. These newtypes keep client, badge, card, area and event identifiers
//! from being mixed up, and carry the "zero means all" filter convention used by
//! every query operation.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Wire form accepted when deserializing an identifier: a bare integer or the
/// prefixed display form (`CLIENT_42`).
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident($inner:ty) => $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
        pub struct $name(pub $inner);

        impl $name {
            /// Prefix used by the display form
            pub const PREFIX: &'static str = $prefix;

            /// Interpret this identifier as a query filter.
            ///
            /// Zero (or any non-positive value) means "no filter".
            pub fn as_filter(self) -> Option<Self> {
                if self.0 > 0 {
                    Some(self)
                } else {
                    None
                }
            }

            /// Whether this identifier is the "all" placeholder
            pub fn is_unset(self) -> bool {
                self.0 <= 0
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let trimmed = s.trim();
                let digits = trimmed.strip_prefix($prefix).unwrap_or(trimmed);
                digits
                    .parse::<$inner>()
                    .map(Self)
                    .map_err(|e| format!("Invalid {}: '{}' ({})", stringify!($name), s, e))
            }
        }

        impl Serialize for $name {
            fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
            where
                S: Serializer,
            {
                self.0.serialize(serializer)
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
            where
                D: Deserializer<'de>,
            {
                match RawId::deserialize(deserializer)? {
                    RawId::Number(n) => <$inner>::try_from(n)
                        .map(Self)
                        .map_err(serde::de::Error::custom),
                    RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
                }
            }
        }
    };
}

integer_id! {
    /// Identifier of a client (badge holder), assigned by the directory system
    ClientId(i32) => "CLIENT_"
}

integer_id! {
    /// Identifier of a badge. One badge per client.
    BadgeId(i32) => "BADGE_"
}

integer_id! {
    /// Identifier of a physical card held on a badge
    CardId(i32) => "CARD_"
}

integer_id! {
    /// Identifier of a lab area
    AreaId(i32) => "AREA_"
}

integer_id! {
    /// Identifier of a recorded swipe event.
    ///
    /// Assigned monotonically at ingestion, so it breaks timestamp ties in
    /// insertion order.
    EventId(i64) => "EVENT_"
}
