//! Supplies and their holders.
//!
//! Water is the only kind with time semantics: when handed to a person it
//! carries the allocation instant and expires once the TTL has strictly
//! elapsed. Water stocked at a location never expires.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{LocationId, PersonId, SupplyId};

/// Default lifetime of person-held water.
pub const WATER_TTL_HOURS: i64 = 24;

/// The default water TTL as a duration.
#[must_use]
pub fn default_water_ttl() -> Duration {
    Duration::hours(WATER_TTL_HOURS)
}

/// Where a supply is currently held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Holder {
    /// Allocated directly to a person.
    Person(PersonId),
    /// Stocked at a location.
    Location(LocationId),
}

impl fmt::Display for Holder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Person(id) => write!(f, "{id}"),
            Self::Location(id) => write!(f, "{id}"),
        }
    }
}

/// Type of supply, dispatched from the stored type tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupplyKind {
    /// A blanket.
    Blanket,
    /// A cot; comments hold its room/grid placement.
    Cot,
    /// A personal belonging; comments hold its description.
    PersonalItem,
    /// Drinking water.
    Water {
        /// When the water was handed to a person, if it is person-held.
        allocated_at: Option<DateTime<Utc>>,
    },
    /// Any other stored type tag.
    Generic(String),
}

impl SupplyKind {
    /// Map a stored type tag to a kind (case-insensitive).
    #[must_use]
    pub fn from_type_tag(tag: &str) -> Self {
        match tag.trim().to_lowercase().as_str() {
            "blanket" => Self::Blanket,
            "cot" => Self::Cot,
            "personal item" => Self::PersonalItem,
            "water" => Self::Water { allocated_at: None },
            _ => Self::Generic(tag.to_string()),
        }
    }

    /// The tag this kind is stored under.
    #[must_use]
    pub fn type_tag(&self) -> &str {
        match self {
            Self::Blanket => "blanket",
            Self::Cot => "cot",
            Self::PersonalItem => "personal item",
            Self::Water { .. } => "water",
            Self::Generic(tag) => tag,
        }
    }

    /// Whether this is water.
    #[must_use]
    pub fn is_water(&self) -> bool {
        matches!(self, Self::Water { .. })
    }
}

/// A supply item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supply {
    /// Row id.
    pub id: SupplyId,
    /// What it is.
    pub kind: SupplyKind,
    /// Free text: cot placement, item description, or notes.
    pub comments: Option<String>,
}

impl Supply {
    /// Create a supply.
    #[must_use]
    pub fn new(id: SupplyId, kind: SupplyKind, comments: Option<String>) -> Self {
        Self { id, kind, comments }
    }

    /// Build a supply from its stored type tag and comments.
    #[must_use]
    pub fn from_row(id: SupplyId, type_tag: &str, comments: Option<String>) -> Self {
        Self::new(id, SupplyKind::from_type_tag(type_tag), comments)
    }

    /// When this water was handed to a person (`None` for other kinds).
    #[must_use]
    pub fn allocated_at(&self) -> Option<DateTime<Utc>> {
        match self.kind {
            SupplyKind::Water { allocated_at } => allocated_at,
            _ => None,
        }
    }

    /// Set or clear the water allocation stamp. No effect on other kinds.
    pub fn set_allocated_at(&mut self, at: Option<DateTime<Utc>>) {
        if let SupplyKind::Water { allocated_at } = &mut self.kind {
            *allocated_at = at;
        }
    }

    /// Whether this is person-held water past its TTL at `now`.
    ///
    /// Exactly at `allocated_at + ttl` the water is still good.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        self.allocated_at().is_some_and(|at| now > at + ttl)
    }

    /// [`Self::is_expired_at`] against the wall clock and the default TTL.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now(), default_water_ttl())
    }
}
