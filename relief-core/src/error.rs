//! Error types for the relief registry core.

use thiserror::Error;

use crate::model::Holder;
use crate::types::{EntityKind, PersonId, SupplyId};

/// Top-level error type for all registry operations.
#[derive(Error, Debug)]
pub enum ReliefError {
    /// An id passed to a lookup does not exist in the loaded graph.
    #[error("Unknown {kind} id {id}")]
    InvalidReference {
        /// What kind of entity was looked up.
        kind: EntityKind,
        /// The raw id that failed to resolve.
        id: i64,
    },

    /// Storage assigned an id the loaded graph already uses.
    #[error("{kind} id {id} already exists")]
    DuplicateId {
        /// What kind of entity was created.
        kind: EntityKind,
        /// The colliding id.
        id: i64,
    },

    /// A date string is malformed or out of the accepted range.
    #[error("Invalid date '{value}': {reason}")]
    InvalidDate {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The supply already has a holder.
    #[error("{supply} is already allocated to {holder}")]
    AlreadyAllocated {
        /// The supply being allocated.
        supply: SupplyId,
        /// Its current holder.
        holder: Holder,
    },

    /// The person does not reside where the supply is stocked.
    #[error("{person} does not reside at the location holding {supply}")]
    LocationMismatch {
        /// The supply being allocated.
        supply: SupplyId,
        /// The intended recipient.
        person: PersonId,
    },

    /// A water-only operation was attempted on another kind of supply.
    #[error("{supply} is a {kind}, not water")]
    NotWater {
        /// The offending supply.
        supply: SupplyId,
        /// Its actual type tag.
        kind: String,
    },

    /// The persistence round-trip failed.
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] rusqlite::Error),

    /// A persistence call ran past its deadline.
    #[error("Storage call '{operation}' timed out")]
    Timeout {
        /// Which gateway operation was cut off.
        operation: &'static str,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ReliefError {
    /// Shorthand for [`ReliefError::InvalidReference`].
    #[must_use]
    pub fn unknown(kind: EntityKind, id: i64) -> Self {
        Self::InvalidReference { kind, id }
    }

    /// Shorthand for [`ReliefError::InvalidDate`].
    #[must_use]
    pub fn invalid_date(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDate {
            value: value.into(),
            reason: reason.into(),
        }
    }
}

impl From<rusqlite::Error> for ReliefError {
    fn from(err: rusqlite::Error) -> Self {
        Self::StorageUnavailable(err)
    }
}

/// Convenience Result type alias.
pub type Result<T> = std::result::Result<T, ReliefError>;
