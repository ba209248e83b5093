//! Core identifier and time types for the relief registry.
//!
//! Ids are the integer primary keys handed out by the relational store, so
//! they are only meaningful once a row has been written.

use std::fmt;
use std::time::{Duration, Instant};

use chrono::{DateTime, DurationRound, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($label, " #{}"), self.0)
            }
        }
    };
}

row_id!(
    /// Identifier of a registered person (victim, inquirer, or both).
    PersonId,
    "person"
);
row_id!(
    /// Identifier of a shelter or other location.
    LocationId,
    "location"
);
row_id!(
    /// Identifier of a single supply item.
    SupplyId,
    "supply"
);
row_id!(
    /// Identifier of an inquiry about a missing person.
    InquiryId,
    "inquiry"
);
row_id!(
    /// Identifier of a medical record.
    MedicalRecordId,
    "medical record"
);
row_id!(
    /// Identifier of a family group.
    FamilyGroupId,
    "family group"
);

/// Kind of entity an id refers to, used in error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// A person.
    Person,
    /// A location.
    Location,
    /// A supply.
    Supply,
    /// An inquiry.
    Inquiry,
    /// A medical record.
    MedicalRecord,
    /// A family group.
    FamilyGroup,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Person => "person",
            Self::Location => "location",
            Self::Supply => "supply",
            Self::Inquiry => "inquiry",
            Self::MedicalRecord => "medical record",
            Self::FamilyGroup => "family group",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Deadlines
// ---------------------------------------------------------------------------

/// Upper bound on how long a single persistence call may run.
///
/// `Deadline::none()` never expires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Deadline(Option<Instant>);

impl Deadline {
    /// A deadline that never expires.
    #[must_use]
    pub const fn none() -> Self {
        Self(None)
    }

    /// A deadline `budget` from now.
    #[must_use]
    pub fn after(budget: Duration) -> Self {
        Self(Instant::now().checked_add(budget))
    }

    /// A deadline at a fixed instant.
    #[must_use]
    pub const fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    /// The instant this deadline expires, if any.
    #[must_use]
    pub fn instant(self) -> Option<Instant> {
        self.0
    }

    /// Whether the deadline has already passed.
    #[must_use]
    pub fn is_expired(self) -> bool {
        self.0.is_some_and(|at| Instant::now() >= at)
    }

    /// Time left before expiry (`None` when unbounded).
    #[must_use]
    pub fn remaining(self) -> Option<Duration> {
        self.0.map(|at| at.saturating_duration_since(Instant::now()))
    }
}

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

/// Wall-clock time and deadline for one operation.
///
/// Passing `now` explicitly keeps expiry decisions reproducible. `now` is
/// truncated to whole microseconds, the precision storage keeps.
#[derive(Debug, Clone, Copy)]
pub struct OpContext {
    /// The time the operation is considered to happen at.
    pub now: DateTime<Utc>,
    /// Bound on every persistence call made by the operation.
    pub deadline: Deadline,
}

impl OpContext {
    /// Context at the current wall-clock time with the given deadline.
    #[must_use]
    pub fn now(deadline: Deadline) -> Self {
        Self {
            now: to_micros(Utc::now()),
            deadline,
        }
    }

    /// Context at a fixed time with no deadline.
    #[must_use]
    pub fn at(now: DateTime<Utc>) -> Self {
        Self {
            now: to_micros(now),
            deadline: Deadline::none(),
        }
    }
}

fn to_micros(at: DateTime<Utc>) -> DateTime<Utc> {
    at.duration_trunc(chrono::Duration::microseconds(1))
        .unwrap_or(at)
}
