//! Locations: shelters housing victims and stocking supplies.

use serde::{Deserialize, Serialize};

use crate::types::{LocationId, PersonId, SupplyId};

/// A physical location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Row id.
    pub id: LocationId,
    /// Display name.
    pub name: String,
    /// Street address.
    pub address: String,
    occupants: Vec<PersonId>,
    supplies: Vec<SupplyId>,
}

impl Location {
    /// Create an empty location.
    #[must_use]
    pub fn new(id: LocationId, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            address: address.into(),
            occupants: Vec::new(),
            supplies: Vec::new(),
        }
    }

    /// Add an occupant. Returns `false` if already present.
    pub fn add_occupant(&mut self, person: PersonId) -> bool {
        if self.occupants.contains(&person) {
            return false;
        }
        self.occupants.push(person);
        true
    }

    /// Remove an occupant. Returns whether it was present.
    pub fn remove_occupant(&mut self, person: PersonId) -> bool {
        let before = self.occupants.len();
        self.occupants.retain(|p| *p != person);
        self.occupants.len() != before
    }

    /// Stock a supply here. Returns `false` if already present.
    pub fn add_supply(&mut self, supply: SupplyId) -> bool {
        if self.supplies.contains(&supply) {
            return false;
        }
        self.supplies.push(supply);
        true
    }

    /// Remove a stocked supply. Returns whether it was present.
    pub fn remove_supply(&mut self, supply: SupplyId) -> bool {
        let before = self.supplies.len();
        self.supplies.retain(|s| *s != supply);
        self.supplies.len() != before
    }

    /// Occupants in arrival order.
    #[must_use]
    pub fn occupants(&self) -> &[PersonId] {
        &self.occupants
    }

    /// Stocked supplies in arrival order.
    #[must_use]
    pub fn supplies(&self) -> &[SupplyId] {
        &self.supplies
    }

    /// Whether `person` lives here.
    #[must_use]
    pub fn houses(&self, person: PersonId) -> bool {
        self.occupants.contains(&person)
    }

    /// Whether `supply` is stocked here.
    #[must_use]
    pub fn stocks(&self, supply: SupplyId) -> bool {
        self.supplies.contains(&supply)
    }
}
