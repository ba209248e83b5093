//! Persistence gateway: the contract the core needs from storage.
//!
//! Row types mirror the persisted record shapes column for column; the
//! loader turns them into the entity graph. Every call is a single-row
//! operation bounded by a caller-supplied [`Deadline`].

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::model::Holder;
use crate::types::{Deadline, FamilyGroupId, InquiryId, LocationId, PersonId, SupplyId};

/// `Person` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonRow {
    /// `person_id`.
    pub id: i64,
    /// `first_name`.
    pub first_name: String,
    /// `last_name`.
    pub last_name: String,
    /// `gender`.
    pub gender: Option<String>,
    /// `phone_number`.
    pub phone: String,
    /// `date_of_birth`.
    pub date_of_birth: Option<String>,
    /// `family_group`.
    pub family_group_id: Option<i64>,
    /// `disaster_type`.
    pub disaster_type: Option<String>,
}

/// `Location` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationRow {
    /// `location_id`.
    pub id: i64,
    /// `name`.
    pub name: String,
    /// `address`.
    pub address: String,
}

/// `Supply` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyRow {
    /// `supply_id`.
    pub id: i64,
    /// `type`.
    pub type_tag: String,
    /// `comments`.
    pub comments: Option<String>,
}

/// `Inquiry` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InquiryRow {
    /// `inquiry_id`.
    pub id: i64,
    /// `inquirer_id`; `None` for an external inquirer.
    pub inquirer_id: Option<i64>,
    /// `seeking_id`.
    pub seeking_id: i64,
    /// `date_of_inquiry`.
    pub date: Option<String>,
    /// `comments`.
    pub comments: String,
}

/// `MedicalRecord` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MedicalRecordRow {
    /// `medical_record_id`.
    pub id: i64,
    /// `location_id`.
    pub location_id: Option<i64>,
    /// `treatment_details`.
    pub treatment_details: String,
    /// `date_of_treatment`.
    pub date: String,
}

/// `FamilyGroup` row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FamilyGroupRow {
    /// `family_group_id`.
    pub id: i64,
    /// `label`.
    pub label: String,
}

/// `PersonLocation` join row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OccupancyRow {
    /// `person_id`.
    pub person_id: i64,
    /// `location_id`.
    pub location_id: i64,
}

/// `SupplyAllocation` join row. Exactly one of the holder columns should
/// be set; the loader rejects rows that break this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocationRow {
    /// `supply_id`.
    pub supply_id: i64,
    /// `person_id`.
    pub person_id: Option<i64>,
    /// `location_id`.
    pub location_id: Option<i64>,
    /// `allocation_date`.
    pub allocated_at: Option<DateTime<Utc>>,
}

/// A full read of the store.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// All persons.
    pub persons: Vec<PersonRow>,
    /// All locations.
    pub locations: Vec<LocationRow>,
    /// All supplies.
    pub supplies: Vec<SupplyRow>,
    /// All inquiries.
    pub inquiries: Vec<InquiryRow>,
    /// All medical records.
    pub medical_records: Vec<MedicalRecordRow>,
    /// All stored family groups.
    pub family_groups: Vec<FamilyGroupRow>,
    /// Who lives where.
    pub occupancy: Vec<OccupancyRow>,
    /// Who holds what.
    pub allocations: Vec<AllocationRow>,
}

/// Fields for a new person.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewPerson {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number.
    pub phone: String,
    /// Gender.
    pub gender: Option<String>,
    /// ISO 8601 date of birth.
    pub date_of_birth: Option<String>,
    /// Family group to join.
    pub family_group: Option<FamilyGroupId>,
    /// Disaster type, for victims.
    pub disaster_type: Option<String>,
}

/// Fields for a new inquiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewInquiry {
    /// Registered inquirer, or `None` for an external one.
    pub inquirer: Option<PersonId>,
    /// The person sought.
    pub seeking: PersonId,
    /// The message.
    pub message: String,
}

/// Mutable person columns written by [`PersistenceGateway::update_person_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonFields {
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number.
    pub phone: String,
    /// Gender.
    pub gender: Option<String>,
    /// ISO 8601 date of birth.
    pub date_of_birth: Option<String>,
    /// Family group.
    pub family_group: Option<FamilyGroupId>,
}

/// Mutable supply columns written by [`PersistenceGateway::update_supply_fields`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupplyFields {
    /// Type tag.
    pub type_tag: String,
    /// Comments.
    pub comments: Option<String>,
}

/// One allocation to write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AllocationRecord {
    /// The supply.
    pub supply: SupplyId,
    /// Its new holder.
    pub holder: Holder,
    /// When the allocation happened.
    pub allocated_at: DateTime<Utc>,
}

/// Storage operations the core depends on.
///
/// Implementations must fail with
/// [`ReliefError::StorageUnavailable`](crate::ReliefError::StorageUnavailable)
/// on connectivity loss and with
/// [`ReliefError::Timeout`](crate::ReliefError::Timeout) when `deadline`
/// passes before the call completes. A failed call must not leave a
/// partial write behind.
pub trait PersistenceGateway {
    /// Read every row of every table.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn load_all(&self, deadline: Deadline) -> Result<Snapshot>;

    /// Insert a person, returning the new id.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn insert_person(&self, person: &NewPerson, deadline: Deadline) -> Result<PersonId>;

    /// Insert an inquiry, returning the new id.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn insert_inquiry(&self, inquiry: &NewInquiry, deadline: Deadline) -> Result<InquiryId>;

    /// Insert a family group, returning the new id.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn insert_family_group(&self, label: &str, deadline: Deadline) -> Result<FamilyGroupId>;

    /// Write a family group row under a known id unless one exists.
    /// Returns whether a row was added.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn ensure_family_group(
        &self,
        id: FamilyGroupId,
        label: &str,
        deadline: Deadline,
    ) -> Result<bool>;

    /// Overwrite a person's mutable columns. Returns whether a row matched.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn update_person_fields(
        &self,
        id: PersonId,
        fields: &PersonFields,
        deadline: Deadline,
    ) -> Result<bool>;

    /// Overwrite a supply's mutable columns. Returns whether a row matched.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn update_supply_fields(
        &self,
        id: SupplyId,
        fields: &SupplyFields,
        deadline: Deadline,
    ) -> Result<bool>;

    /// Overwrite an inquiry's message. Returns whether a row matched.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn update_inquiry_message(
        &self,
        id: InquiryId,
        message: &str,
        deadline: Deadline,
    ) -> Result<bool>;

    /// Record that a person lives at a location. Returns whether a row was added.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn insert_occupancy(
        &self,
        person: PersonId,
        location: LocationId,
        deadline: Deadline,
    ) -> Result<bool>;

    /// Remove an occupancy row. Returns whether a row was removed.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn delete_occupancy(
        &self,
        person: PersonId,
        location: LocationId,
        deadline: Deadline,
    ) -> Result<bool>;

    /// Insert an allocation for a currently unheld supply.
    ///
    /// # Errors
    /// Storage or timeout errors, including a second row for the same supply.
    fn insert_allocation(&self, allocation: &AllocationRecord, deadline: Deadline) -> Result<bool>;

    /// Replace whatever row holds the supply with `allocation`, atomically.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn transfer_allocation(
        &self,
        allocation: &AllocationRecord,
        deadline: Deadline,
    ) -> Result<bool>;

    /// Delete the allocation row of a supply. Returns whether one existed.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn delete_allocation(&self, supply: SupplyId, deadline: Deadline) -> Result<bool>;

    /// Delete every person-held water allocation made strictly before
    /// `cutoff`. Returns the number of rows removed.
    ///
    /// # Errors
    /// Storage or timeout errors.
    fn delete_expired_water_allocations(
        &self,
        cutoff: DateTime<Utc>,
        deadline: Deadline,
    ) -> Result<usize>;
}
