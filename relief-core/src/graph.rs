//! The in-memory entity graph.
//!
//! [`ReliefGraph`] is the canonical store of every loaded entity. Reads hand
//! out owned copies; structural changes go through the mutation methods
//! below, which keep both sides of every relation in step:
//!
//! - occupancy: `Location::occupants` only
//! - allocation: `holders` plus `Location::supplies` or `Person::allocated_supplies`
//! - family membership: `FamilyGroup::members` plus `Person::family_group`
//!
//! The graph does no I/O. Callers persist first and mutate second.

use std::collections::BTreeMap;

use crate::error::{ReliefError, Result};
use crate::model::inquiry::InquiryView;
use crate::model::{
    FamilyGroup, Holder, Inquiry, InquirerRef, Location, MedicalRecord, Person, PersonEdit,
    Supply, SupplyKind,
};
use crate::types::{
    EntityKind, FamilyGroupId, InquiryId, LocationId, MedicalRecordId, PersonId, SupplyId,
};

/// One line of the supply overview.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplyStatus {
    /// The supply.
    pub supply: Supply,
    /// Its holder, if allocated.
    pub holder: Option<Holder>,
    /// Holder display name: person full name or location name.
    pub holder_name: Option<String>,
}

/// Entity counts, for logging and reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphCounts {
    /// Persons.
    pub persons: usize,
    /// Locations.
    pub locations: usize,
    /// Supplies.
    pub supplies: usize,
    /// Inquiries.
    pub inquiries: usize,
    /// Medical records.
    pub medical_records: usize,
    /// Family groups.
    pub family_groups: usize,
    /// Allocated supplies.
    pub allocations: usize,
}

/// The loaded registry.
#[derive(Debug, Clone, Default)]
pub struct ReliefGraph {
    persons: BTreeMap<PersonId, Person>,
    locations: BTreeMap<LocationId, Location>,
    supplies: BTreeMap<SupplyId, Supply>,
    inquiries: BTreeMap<InquiryId, Inquiry>,
    medical_records: BTreeMap<MedicalRecordId, MedicalRecord>,
    family_groups: BTreeMap<FamilyGroupId, FamilyGroup>,
    holders: BTreeMap<SupplyId, Holder>,
}

impl ReliefGraph {
    /// An empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Registration
    // ------------------------------------------------------------------

    /// Add or replace a person record. Relations are not touched.
    pub fn insert_person(&mut self, person: Person) {
        self.persons.insert(person.id, person);
    }

    /// Add or replace a location record.
    pub fn insert_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }

    /// Add or replace a supply record.
    pub fn insert_supply(&mut self, supply: Supply) {
        self.supplies.insert(supply.id, supply);
    }

    /// Add or replace an inquiry.
    pub fn insert_inquiry(&mut self, inquiry: Inquiry) {
        self.inquiries.insert(inquiry.id, inquiry);
    }

    /// Add or replace a medical record.
    pub fn insert_medical_record(&mut self, record: MedicalRecord) {
        self.medical_records.insert(record.id, record);
    }

    /// Add a family group unless one with the same id exists.
    ///
    /// Returns whether the group was added.
    pub fn insert_family_group(&mut self, group: FamilyGroup) -> bool {
        if self.family_groups.contains_key(&group.id) {
            return false;
        }
        self.family_groups.insert(group.id, group);
        true
    }

    // ------------------------------------------------------------------
    // Copy-out reads
    // ------------------------------------------------------------------

    /// A copy of one person.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn person(&self, id: PersonId) -> Result<Person> {
        self.person_ref(id).cloned()
    }

    /// A copy of one location.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn location(&self, id: LocationId) -> Result<Location> {
        self.location_ref(id).cloned()
    }

    /// A copy of one supply.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn supply(&self, id: SupplyId) -> Result<Supply> {
        self.supply_ref(id).cloned()
    }

    /// A copy of one inquiry.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn inquiry(&self, id: InquiryId) -> Result<Inquiry> {
        self.inquiries
            .get(&id)
            .cloned()
            .ok_or_else(|| ReliefError::unknown(EntityKind::Inquiry, id.0))
    }

    /// A copy of one medical record.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn medical_record(&self, id: MedicalRecordId) -> Result<MedicalRecord> {
        self.medical_records
            .get(&id)
            .cloned()
            .ok_or_else(|| ReliefError::unknown(EntityKind::MedicalRecord, id.0))
    }

    /// A copy of one family group.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn family_group(&self, id: FamilyGroupId) -> Result<FamilyGroup> {
        self.family_groups
            .get(&id)
            .cloned()
            .ok_or_else(|| ReliefError::unknown(EntityKind::FamilyGroup, id.0))
    }

    /// Copies of all persons, ordered by id.
    #[must_use]
    pub fn persons(&self) -> Vec<Person> {
        self.persons.values().cloned().collect()
    }

    /// Copies of all locations, ordered by id.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.locations.values().cloned().collect()
    }

    /// Copies of all supplies, ordered by id.
    #[must_use]
    pub fn supplies(&self) -> Vec<Supply> {
        self.supplies.values().cloned().collect()
    }

    /// Copies of all inquiries, ordered by id.
    #[must_use]
    pub fn inquiries(&self) -> Vec<Inquiry> {
        self.inquiries.values().cloned().collect()
    }

    /// Copies of all medical records, ordered by id.
    #[must_use]
    pub fn medical_records(&self) -> Vec<MedicalRecord> {
        self.medical_records.values().cloned().collect()
    }

    /// Copies of all family groups, ordered by id.
    #[must_use]
    pub fn family_groups(&self) -> Vec<FamilyGroup> {
        self.family_groups.values().cloned().collect()
    }

    /// Whether a person id is loaded.
    #[must_use]
    pub fn contains_person(&self, id: PersonId) -> bool {
        self.persons.contains_key(&id)
    }

    /// Whether a location id is loaded.
    #[must_use]
    pub fn contains_location(&self, id: LocationId) -> bool {
        self.locations.contains_key(&id)
    }

    /// Whether a supply id is loaded.
    #[must_use]
    pub fn contains_supply(&self, id: SupplyId) -> bool {
        self.supplies.contains_key(&id)
    }

    /// Whether a family group id is loaded.
    #[must_use]
    pub fn contains_family_group(&self, id: FamilyGroupId) -> bool {
        self.family_groups.contains_key(&id)
    }

    /// Current holder of a supply.
    #[must_use]
    pub fn holder_of(&self, supply: SupplyId) -> Option<Holder> {
        self.holders.get(&supply).copied()
    }

    /// Every location `person` occupies, ordered by id.
    #[must_use]
    pub fn locations_of(&self, person: PersonId) -> Vec<LocationId> {
        self.locations
            .values()
            .filter(|l| l.houses(person))
            .map(|l| l.id)
            .collect()
    }

    /// Person-held water allocations as `(supply, person)` pairs.
    #[must_use]
    pub fn person_held_water(&self) -> Vec<(Supply, PersonId)> {
        self.holders
            .iter()
            .filter_map(|(supply_id, holder)| match holder {
                Holder::Person(person) => self
                    .supplies
                    .get(supply_id)
                    .filter(|s| s.kind.is_water())
                    .map(|s| (s.clone(), *person)),
                Holder::Location(_) => None,
            })
            .collect()
    }

    /// Entity counts.
    #[must_use]
    pub fn counts(&self) -> GraphCounts {
        GraphCounts {
            persons: self.persons.len(),
            locations: self.locations.len(),
            supplies: self.supplies.len(),
            inquiries: self.inquiries.len(),
            medical_records: self.medical_records.len(),
            family_groups: self.family_groups.len(),
            allocations: self.holders.len(),
        }
    }

    /// Every supply with its holder, the "view supplies" listing.
    #[must_use]
    pub fn supply_overview(&self) -> Vec<SupplyStatus> {
        self.supplies
            .values()
            .map(|supply| {
                let holder = self.holder_of(supply.id);
                let holder_name = holder.and_then(|h| match h {
                    Holder::Person(p) => self.persons.get(&p).map(Person::full_name),
                    Holder::Location(l) => self.locations.get(&l).map(|loc| loc.name.clone()),
                });
                SupplyStatus {
                    supply: supply.clone(),
                    holder,
                    holder_name,
                }
            })
            .collect()
    }

    /// Resolve an inquiry for display.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if the inquiry, its registered
    /// inquirer, or the sought person is not loaded.
    pub fn inquiry_view(&self, id: InquiryId) -> Result<InquiryView> {
        let inquiry = self
            .inquiries
            .get(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Inquiry, id.0))?;
        let inquirer_name = match inquiry.inquirer {
            InquirerRef::Registered(p) => self.person_ref(p)?.full_name(),
            InquirerRef::Untracked => "External".to_string(),
        };
        let seeking_name = self.person_ref(inquiry.seeking)?.full_name();
        Ok(InquiryView {
            id,
            inquirer_name,
            seeking_name,
            message: inquiry.message.clone(),
        })
    }

    // ------------------------------------------------------------------
    // Occupancy
    // ------------------------------------------------------------------

    /// House `person` at `location`. Returns `false` if already housed there.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids.
    pub fn add_occupant(&mut self, location: LocationId, person: PersonId) -> Result<bool> {
        self.person_ref(person)?;
        Ok(self.location_mut(location)?.add_occupant(person))
    }

    /// Remove `person` from `location`. Returns whether they were housed there.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids.
    pub fn remove_occupant(&mut self, location: LocationId, person: PersonId) -> Result<bool> {
        self.person_ref(person)?;
        Ok(self.location_mut(location)?.remove_occupant(person))
    }

    /// Move `person` to `location`, leaving every other location.
    ///
    /// Returns the locations they left.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids; nothing changes.
    pub fn move_occupant(&mut self, person: PersonId, location: LocationId) -> Result<Vec<LocationId>> {
        self.person_ref(person)?;
        self.location_ref(location)?;
        let mut left = Vec::new();
        for loc in self.locations.values_mut() {
            if loc.id != location && loc.remove_occupant(person) {
                left.push(loc.id);
            }
        }
        self.location_mut(location)?.add_occupant(person);
        Ok(left)
    }

    // ------------------------------------------------------------------
    // Allocation bookkeeping
    // ------------------------------------------------------------------

    /// Point `supply` at a new holder (or none), keeping location stock and
    /// person lists in step. Returns the previous holder.
    ///
    /// Exclusivity is the caller's concern; this only records the outcome.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids; nothing changes.
    pub fn set_holder(&mut self, supply: SupplyId, holder: Option<Holder>) -> Result<Option<Holder>> {
        self.supply_ref(supply)?;
        match holder {
            Some(Holder::Person(p)) => {
                self.person_ref(p)?;
            }
            Some(Holder::Location(l)) => {
                self.location_ref(l)?;
            }
            None => {}
        }

        let previous = self.holders.remove(&supply);
        match previous {
            Some(Holder::Person(p)) => {
                if let Some(person) = self.persons.get_mut(&p) {
                    person.allocated_supplies.retain(|s| *s != supply);
                }
            }
            Some(Holder::Location(l)) => {
                if let Some(loc) = self.locations.get_mut(&l) {
                    loc.remove_supply(supply);
                }
            }
            None => {}
        }

        match holder {
            Some(Holder::Person(p)) => {
                if let Some(person) = self.persons.get_mut(&p) {
                    if !person.allocated_supplies.contains(&supply) {
                        person.allocated_supplies.push(supply);
                    }
                }
            }
            Some(Holder::Location(l)) => {
                if let Some(loc) = self.locations.get_mut(&l) {
                    loc.add_supply(supply);
                }
            }
            None => {}
        }
        if let Some(h) = holder {
            self.holders.insert(supply, h);
        }
        Ok(previous)
    }

    /// Set or clear the water allocation stamp of a supply.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn stamp_water(
        &mut self,
        supply: SupplyId,
        at: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Result<()> {
        self.supply_mut(supply)?.set_allocated_at(at);
        Ok(())
    }

    /// Change a supply's type tag and comments. A water allocation stamp
    /// survives only if the supply stays water.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn update_supply(
        &mut self,
        id: SupplyId,
        type_tag: &str,
        comments: Option<String>,
    ) -> Result<()> {
        let supply = self.supply_mut(id)?;
        let stamp = supply.allocated_at();
        supply.kind = SupplyKind::from_type_tag(type_tag);
        supply.set_allocated_at(stamp);
        supply.comments = comments;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Family groups
    // ------------------------------------------------------------------

    /// Add a member to a group. `None` is a no-op.
    ///
    /// A person already in another group is moved: removal from the old
    /// group and addition to this one happen together.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids; nothing changes.
    pub fn add_family_member(&mut self, group: FamilyGroupId, person: Option<PersonId>) -> Result<bool> {
        self.family_ref(group)?;
        let Some(person) = person else {
            return Ok(false);
        };
        let current = self.person_ref(person)?.family_group;
        if current == Some(group) {
            return Ok(false);
        }
        if let Some(old) = current {
            if let Some(old_group) = self.family_groups.get_mut(&old) {
                old_group.remove_member(person);
            }
        }
        if let Some(g) = self.family_groups.get_mut(&group) {
            g.add_member(Some(person));
        }
        if let Some(p) = self.persons.get_mut(&person) {
            p.family_group = Some(group);
        }
        Ok(true)
    }

    /// Remove a member from a group. Returns whether they were a member.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids.
    pub fn remove_family_member(&mut self, group: FamilyGroupId, person: PersonId) -> Result<bool> {
        self.person_ref(person)?;
        let removed = self
            .family_groups
            .get_mut(&group)
            .ok_or_else(|| ReliefError::unknown(EntityKind::FamilyGroup, group.0))?
            .remove_member(person);
        if let Some(p) = self.persons.get_mut(&person) {
            if p.family_group == Some(group) {
                p.family_group = None;
            }
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Persons and inquiries
    // ------------------------------------------------------------------

    /// Apply field edits to a person.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn edit_person(&mut self, id: PersonId, edit: &PersonEdit) -> Result<()> {
        let person = self
            .persons
            .get_mut(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Person, id.0))?;
        edit.apply(person);
        Ok(())
    }

    /// Give a person the inquirer role with `message` as their latest inquiry.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn record_inquiry_by(&mut self, id: PersonId, message: &str) -> Result<()> {
        self.persons
            .get_mut(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Person, id.0))?
            .record_inquiry(message);
        Ok(())
    }

    /// Replace an inquiry's message, mirroring it onto a registered inquirer.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn set_inquiry_message(&mut self, id: InquiryId, message: &str) -> Result<()> {
        let inquiry = self
            .inquiries
            .get_mut(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Inquiry, id.0))?;
        inquiry.message = message.to_string();
        if let InquirerRef::Registered(p) = inquiry.inquirer {
            if let Some(person) = self.persons.get_mut(&p) {
                person.record_inquiry(message);
            }
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internal lookups
    // ------------------------------------------------------------------

    pub(crate) fn person_ref(&self, id: PersonId) -> Result<&Person> {
        self.persons
            .get(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Person, id.0))
    }

    pub(crate) fn location_ref(&self, id: LocationId) -> Result<&Location> {
        self.locations
            .get(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Location, id.0))
    }

    pub(crate) fn supply_ref(&self, id: SupplyId) -> Result<&Supply> {
        self.supplies
            .get(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Supply, id.0))
    }

    fn family_ref(&self, id: FamilyGroupId) -> Result<&FamilyGroup> {
        self.family_groups
            .get(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::FamilyGroup, id.0))
    }

    fn location_mut(&mut self, id: LocationId) -> Result<&mut Location> {
        self.locations
            .get_mut(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Location, id.0))
    }

    fn supply_mut(&mut self, id: SupplyId) -> Result<&mut Supply> {
        self.supplies
            .get_mut(&id)
            .ok_or_else(|| ReliefError::unknown(EntityKind::Supply, id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> ReliefGraph {
        let mut g = ReliefGraph::new();
        g.insert_person(Person::new(PersonId(1), "Ana", "Diaz", "555-0100").with_victim("Flood"));
        g.insert_person(Person::new(PersonId(2), "Ben", "Okafor", "555-0101").with_victim("Flood"));
        g.insert_location(Location::new(LocationId(1), "Shelter A", "1 Main St"));
        g.insert_location(Location::new(LocationId(2), "Shelter B", "9 Elm St"));
        g.insert_supply(Supply::from_row(SupplyId(1), "blanket", None));
        g.insert_family_group(FamilyGroup::new(FamilyGroupId(1), "Diaz"));
        g.insert_family_group(FamilyGroup::new(FamilyGroupId(2), "Okafor"));
        g
    }

    #[test]
    fn reads_are_independent_copies() {
        let g = graph();
        let mut persons = g.persons();
        persons[0].first_name = "Mallory".into();
        persons.clear();
        assert_eq!(g.person(PersonId(1)).expect("loaded").first_name, "Ana");
        let mut loc = g.location(LocationId(1)).expect("loaded");
        loc.add_occupant(PersonId(2));
        assert!(g.location(LocationId(1)).expect("loaded").occupants().is_empty());
    }

    #[test]
    fn unknown_ids_are_invalid_references() {
        let g = graph();
        assert!(matches!(
            g.person(PersonId(99)),
            Err(ReliefError::InvalidReference { kind: EntityKind::Person, id: 99 })
        ));
        assert!(g.supply(SupplyId(42)).is_err());
    }

    #[test]
    fn move_occupant_leaves_other_locations() {
        let mut g = graph();
        g.add_occupant(LocationId(1), PersonId(1)).expect("add");
        let left = g.move_occupant(PersonId(1), LocationId(2)).expect("move");
        assert_eq!(left, vec![LocationId(1)]);
        assert_eq!(g.locations_of(PersonId(1)), vec![LocationId(2)]);
    }

    #[test]
    fn set_holder_keeps_both_sides_in_step() {
        let mut g = graph();
        g.set_holder(SupplyId(1), Some(Holder::Location(LocationId(1)))).expect("stock");
        assert!(g.location(LocationId(1)).expect("loc").stocks(SupplyId(1)));

        let prev = g.set_holder(SupplyId(1), Some(Holder::Person(PersonId(1)))).expect("hand out");
        assert_eq!(prev, Some(Holder::Location(LocationId(1))));
        assert!(!g.location(LocationId(1)).expect("loc").stocks(SupplyId(1)));
        assert!(g.person(PersonId(1)).expect("person").holds(SupplyId(1)));

        g.set_holder(SupplyId(1), None).expect("release");
        assert!(g.holder_of(SupplyId(1)).is_none());
        assert!(!g.person(PersonId(1)).expect("person").holds(SupplyId(1)));
    }

    #[test]
    fn set_holder_rejects_unknown_target_without_change() {
        let mut g = graph();
        g.set_holder(SupplyId(1), Some(Holder::Location(LocationId(1)))).expect("stock");
        assert!(g.set_holder(SupplyId(1), Some(Holder::Person(PersonId(9)))).is_err());
        assert_eq!(g.holder_of(SupplyId(1)), Some(Holder::Location(LocationId(1))));
    }

    #[test]
    fn family_move_is_remove_then_add() {
        let mut g = graph();
        assert!(g.add_family_member(FamilyGroupId(1), Some(PersonId(1))).expect("add"));
        assert!(g.add_family_member(FamilyGroupId(2), Some(PersonId(1))).expect("move"));
        assert_eq!(g.family_group(FamilyGroupId(1)).expect("g1").size(), 0);
        assert_eq!(g.family_group(FamilyGroupId(2)).expect("g2").size(), 1);
        assert_eq!(
            g.person(PersonId(1)).expect("person").family_group,
            Some(FamilyGroupId(2))
        );
        assert!(!g.add_family_member(FamilyGroupId(2), None).expect("none"));
        assert!(g.remove_family_member(FamilyGroupId(2), PersonId(1)).expect("remove"));
        assert!(g.person(PersonId(1)).expect("person").family_group.is_none());
    }

    #[test]
    fn inquiry_view_requires_sought_person() {
        let mut g = graph();
        g.insert_inquiry(Inquiry::new(InquiryId(1), InquirerRef::Untracked, "seeking John", PersonId(77)));
        assert!(g.inquiry_view(InquiryId(1)).is_err());
        g.insert_person(Person::new(PersonId(77), "John", "Doe", "555-0177"));
        let view = g.inquiry_view(InquiryId(1)).expect("resolves");
        assert_eq!(view.inquirer_name, "External");
        assert_eq!(view.seeking_name, "John Doe");
    }

    #[test]
    fn update_supply_keeps_water_stamp_only_for_water() {
        let mut g = graph();
        g.insert_supply(Supply::from_row(SupplyId(2), "water", None));
        let now = chrono::Utc::now();
        g.stamp_water(SupplyId(2), Some(now)).expect("stamp");
        g.update_supply(SupplyId(2), "Water", Some("2L".into())).expect("edit");
        assert_eq!(g.supply(SupplyId(2)).expect("s").allocated_at(), Some(now));
        g.update_supply(SupplyId(2), "blanket", None).expect("edit");
        assert!(g.supply(SupplyId(2)).expect("s").allocated_at().is_none());
    }
}
