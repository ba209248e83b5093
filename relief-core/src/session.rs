//! The long-lived registry service.
//!
//! [`ReliefSession`] owns one gateway and the current [`ReliefGraph`] behind
//! a single lock, so every operation (reads included) is serialized. Each
//! mutation validates against the graph, writes through the gateway, and
//! applies the change to the graph only after the write succeeded. When an
//! operation needs several writes, the graph follows each one as it lands,
//! so graph and storage agree even if a later write fails.

use std::path::Path;
use std::sync::atomic::AtomicU64;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::allocation::AllocationEngine;
use crate::config::ReliefConfig;
use crate::counters::ReliefCounters;
use crate::error::{ReliefError, Result};
use crate::gateway::{
    AllocationRecord, NewInquiry, NewPerson, PersistenceGateway, PersonFields, SupplyFields,
};
use crate::graph::{GraphCounts, ReliefGraph, SupplyStatus};
use crate::loader::{build_graph, LoadReport};
use crate::model::inquiry::InquiryView;
use crate::model::person::UNKNOWN_DISASTER;
use crate::model::{
    FamilyGroup, Holder, Inquiry, InquirerRef, Location, MedicalRecord, Person, PersonEdit,
    Supply, SupplyKind,
};
use crate::sqlite::SqliteGateway;
use crate::types::{
    Deadline, EntityKind, FamilyGroupId, InquiryId, LocationId, MedicalRecordId, OpContext,
    PersonId, SupplyId,
};

struct Inner<G> {
    gateway: G,
    graph: ReliefGraph,
    last_load: LoadReport,
}

/// Registry service: one store, one graph, one lock.
pub struct ReliefSession<G = SqliteGateway> {
    inner: Mutex<Inner<G>>,
    config: ReliefConfig,
    engine: AllocationEngine,
    counters: ReliefCounters,
}

impl<G> std::fmt::Debug for ReliefSession<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReliefSession")
            .field("config", &self.config)
            .field("engine", &self.engine)
            .finish_non_exhaustive()
    }
}

impl ReliefSession<SqliteGateway> {
    /// Open the SQLite store named in `config` and load it.
    ///
    /// # Errors
    /// Storage and timeout errors from opening or loading.
    pub fn open(config: ReliefConfig) -> Result<Self> {
        let gateway = SqliteGateway::open(&config.persistence.path, &config.persistence)?;
        Self::with_gateway(gateway, config)
    }

    /// Online backup of the store to `dest`.
    ///
    /// # Errors
    /// Storage errors.
    pub fn backup<P: AsRef<Path>>(&self, dest: P) -> Result<()> {
        self.inner.lock().gateway.backup(dest)
    }

    /// Run the store's integrity check.
    ///
    /// # Errors
    /// Storage errors.
    pub fn integrity_check(&self) -> Result<bool> {
        self.inner.lock().gateway.integrity_check()
    }
}

impl<G: PersistenceGateway> ReliefSession<G> {
    /// Wrap an already-open gateway and load the graph from it.
    ///
    /// # Errors
    /// Storage and timeout errors from the initial load.
    pub fn with_gateway(gateway: G, config: ReliefConfig) -> Result<Self> {
        let session = Self {
            inner: Mutex::new(Inner {
                gateway,
                graph: ReliefGraph::new(),
                last_load: LoadReport::default(),
            }),
            engine: AllocationEngine::new(config.allocation.water_ttl()),
            config,
            counters: ReliefCounters::new(),
        };
        session.reload()?;
        Ok(session)
    }

    /// Rebuild the graph from storage.
    ///
    /// On success the new graph replaces the old one in a single step. On
    /// failure the error is returned and the previous graph stays in place.
    ///
    /// # Errors
    /// Storage and timeout errors from the load or the post-load sweep.
    pub fn reload(&self) -> Result<LoadReport> {
        let mut inner = self.inner.lock();
        match self.load(&inner.gateway) {
            Ok((graph, report)) => {
                ReliefCounters::add(&self.counters.loads_completed, 1);
                ReliefCounters::add(&self.counters.rows_rejected, report.rejected.len() as u64);
                ReliefCounters::add(&self.counters.water_expired, report.water_swept as u64);
                inner.graph = graph;
                inner.last_load = report.clone();
                Ok(report)
            }
            Err(e) => {
                ReliefCounters::add(&self.counters.loads_failed, 1);
                self.note_timeout(&e);
                warn!(error = %e, "Reload failed; keeping previous graph");
                Err(e)
            }
        }
    }

    fn load(&self, gateway: &G) -> Result<(ReliefGraph, LoadReport)> {
        let snapshot = gateway.load_all(self.deadline())?;
        let (mut graph, mut report) = build_graph(snapshot);
        for group in &report.placeholder_groups {
            let label = graph.family_group(*group)?.label;
            if gateway.ensure_family_group(*group, &label, self.deadline())? {
                debug!(%group, "Placeholder family group stored");
            }
        }
        if self.config.allocation.sweep_on_load {
            report.water_swept =
                self.engine
                    .cleanup_expired_water(&mut graph, gateway, Utc::now(), self.deadline())?;
        }
        Ok((graph, report))
    }

    /// Report from the most recent successful load.
    #[must_use]
    pub fn last_load_report(&self) -> LoadReport {
        self.inner.lock().last_load.clone()
    }

    /// The configuration this session runs with.
    #[must_use]
    pub fn config(&self) -> &ReliefConfig {
        &self.config
    }

    /// Event counters.
    #[must_use]
    pub fn counters(&self) -> &ReliefCounters {
        &self.counters
    }

    /// Run `f` against the gateway while holding the session lock.
    pub fn with_gateway_ref<R>(&self, f: impl FnOnce(&G) -> R) -> R {
        f(&self.inner.lock().gateway)
    }

    /// Fresh context at the wall clock with the configured call deadline.
    #[must_use]
    pub fn context(&self) -> OpContext {
        OpContext::now(self.deadline())
    }

    fn deadline(&self) -> Deadline {
        self.config.persistence.call_deadline()
    }

    fn note_timeout(&self, err: &ReliefError) {
        if matches!(err, ReliefError::Timeout { .. }) {
            ReliefCounters::add(&self.counters.storage_timeouts, 1);
        }
    }

    fn tally(&self, result: Result<AllocationRecord>) -> Result<AllocationRecord> {
        let counter: &AtomicU64 = match &result {
            Ok(record) => {
                info!(supply = %record.supply, holder = %record.holder, "Supply allocated");
                &self.counters.allocations_granted
            }
            Err(
                ReliefError::AlreadyAllocated { .. }
                | ReliefError::LocationMismatch { .. }
                | ReliefError::NotWater { .. }
                | ReliefError::InvalidReference { .. },
            ) => &self.counters.allocations_rejected,
            Err(e) => {
                self.note_timeout(e);
                return result;
            }
        };
        ReliefCounters::add(counter, 1);
        result
    }

    // ------------------------------------------------------------------
    // Reads (copies)
    // ------------------------------------------------------------------

    /// A copy of the whole graph.
    #[must_use]
    pub fn graph(&self) -> ReliefGraph {
        self.inner.lock().graph.clone()
    }

    /// Entity counts.
    #[must_use]
    pub fn counts(&self) -> GraphCounts {
        self.inner.lock().graph.counts()
    }

    /// All persons.
    #[must_use]
    pub fn persons(&self) -> Vec<Person> {
        self.inner.lock().graph.persons()
    }

    /// One person.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn person(&self, id: PersonId) -> Result<Person> {
        self.inner.lock().graph.person(id)
    }

    /// All locations.
    #[must_use]
    pub fn locations(&self) -> Vec<Location> {
        self.inner.lock().graph.locations()
    }

    /// One location.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn location(&self, id: LocationId) -> Result<Location> {
        self.inner.lock().graph.location(id)
    }

    /// All supplies.
    #[must_use]
    pub fn supplies(&self) -> Vec<Supply> {
        self.inner.lock().graph.supplies()
    }

    /// One supply.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn supply(&self, id: SupplyId) -> Result<Supply> {
        self.inner.lock().graph.supply(id)
    }

    /// All inquiries.
    #[must_use]
    pub fn inquiries(&self) -> Vec<Inquiry> {
        self.inner.lock().graph.inquiries()
    }

    /// One inquiry.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn inquiry(&self, id: InquiryId) -> Result<Inquiry> {
        self.inner.lock().graph.inquiry(id)
    }

    /// All medical records.
    #[must_use]
    pub fn medical_records(&self) -> Vec<MedicalRecord> {
        self.inner.lock().graph.medical_records()
    }

    /// One medical record.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn medical_record(&self, id: MedicalRecordId) -> Result<MedicalRecord> {
        self.inner.lock().graph.medical_record(id)
    }

    /// All family groups.
    #[must_use]
    pub fn family_groups(&self) -> Vec<FamilyGroup> {
        self.inner.lock().graph.family_groups()
    }

    /// One family group.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown.
    pub fn family_group(&self, id: FamilyGroupId) -> Result<FamilyGroup> {
        self.inner.lock().graph.family_group(id)
    }

    /// Current holder of a supply.
    #[must_use]
    pub fn holder_of(&self, supply: SupplyId) -> Option<Holder> {
        self.inner.lock().graph.holder_of(supply)
    }

    /// Locations a person occupies.
    #[must_use]
    pub fn locations_of(&self, person: PersonId) -> Vec<LocationId> {
        self.inner.lock().graph.locations_of(person)
    }

    /// Every supply with its holder.
    #[must_use]
    pub fn supply_overview(&self) -> Vec<SupplyStatus> {
        self.inner.lock().graph.supply_overview()
    }

    /// An inquiry with names resolved.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if a referenced person is unknown.
    pub fn inquiry_view(&self, id: InquiryId) -> Result<InquiryView> {
        self.inner.lock().graph.inquiry_view(id)
    }

    // ------------------------------------------------------------------
    // Allocation
    // ------------------------------------------------------------------

    /// Hand a supply to a person, now.
    ///
    /// # Errors
    /// See [`AllocationEngine::allocate_to_person`].
    pub fn allocate_to_person(&self, supply: SupplyId, person: PersonId) -> Result<AllocationRecord> {
        self.allocate_to_person_with(supply, person, self.context())
    }

    /// Hand a supply to a person under an explicit context.
    ///
    /// # Errors
    /// See [`AllocationEngine::allocate_to_person`].
    pub fn allocate_to_person_with(
        &self,
        supply: SupplyId,
        person: PersonId,
        ctx: OpContext,
    ) -> Result<AllocationRecord> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let result = self
            .engine
            .allocate_to_person(&mut inner.graph, &inner.gateway, supply, person, ctx);
        self.tally(result)
    }

    /// Stock a supply at a location, now.
    ///
    /// # Errors
    /// See [`AllocationEngine::allocate_to_location`].
    pub fn allocate_to_location(
        &self,
        supply: SupplyId,
        location: LocationId,
    ) -> Result<AllocationRecord> {
        self.allocate_to_location_with(supply, location, self.context())
    }

    /// Stock a supply at a location under an explicit context.
    ///
    /// # Errors
    /// See [`AllocationEngine::allocate_to_location`].
    pub fn allocate_to_location_with(
        &self,
        supply: SupplyId,
        location: LocationId,
        ctx: OpContext,
    ) -> Result<AllocationRecord> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let result = self
            .engine
            .allocate_to_location(&mut inner.graph, &inner.gateway, supply, location, ctx);
        self.tally(result)
    }

    /// Hand water to a person, stamped now.
    ///
    /// # Errors
    /// See [`AllocationEngine::allocate_water_to_person`].
    pub fn allocate_water_to_person(
        &self,
        supply: SupplyId,
        person: PersonId,
    ) -> Result<AllocationRecord> {
        self.allocate_water_to_person_with(supply, person, self.context())
    }

    /// Hand water to a person under an explicit context.
    ///
    /// # Errors
    /// See [`AllocationEngine::allocate_water_to_person`].
    pub fn allocate_water_to_person_with(
        &self,
        supply: SupplyId,
        person: PersonId,
        ctx: OpContext,
    ) -> Result<AllocationRecord> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let result = self
            .engine
            .allocate_water_to_person(&mut inner.graph, &inner.gateway, supply, person, ctx);
        self.tally(result)
    }

    /// Remove expired person-held water as of the wall clock.
    ///
    /// # Errors
    /// Storage and timeout errors.
    pub fn cleanup_expired_water(&self) -> Result<usize> {
        self.cleanup_expired_water_at(Utc::now(), self.deadline())
    }

    /// Remove person-held water expired at `now`.
    ///
    /// # Errors
    /// Storage and timeout errors.
    pub fn cleanup_expired_water_at(&self, now: DateTime<Utc>, deadline: Deadline) -> Result<usize> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let removed = self
            .engine
            .cleanup_expired_water(&mut inner.graph, &inner.gateway, now, deadline)
            .inspect_err(|e| self.note_timeout(e))?;
        ReliefCounters::add(&self.counters.water_expired, removed as u64);
        Ok(removed)
    }

    /// Take a supply back from whoever holds it. Returns the old holder.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for an unknown supply; storage errors.
    pub fn release_supply(&self, supply: SupplyId) -> Result<Option<Holder>> {
        let mut inner = self.inner.lock();
        inner.graph.supply_ref(supply)?;
        if inner.graph.holder_of(supply).is_none() {
            return Ok(None);
        }
        inner.gateway.delete_allocation(supply, self.deadline())?;
        let previous = inner.graph.set_holder(supply, None)?;
        inner.graph.stamp_water(supply, None)?;
        debug!(%supply, "Supply released");
        Ok(previous)
    }

    /// Change a supply's type tag and comments.
    ///
    /// # Errors
    /// See [`Self::edit_supply_with`].
    pub fn edit_supply(
        &self,
        supply: SupplyId,
        type_tag: &str,
        comments: Option<String>,
    ) -> Result<()> {
        self.edit_supply_with(supply, type_tag, comments, self.context())
    }

    /// Change a supply's type tag and comments under an explicit context.
    ///
    /// A person-held supply that becomes water is re-stamped at `ctx.now`,
    /// in storage first, so its expiry starts from the edit.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for an unknown supply; storage errors.
    pub fn edit_supply_with(
        &self,
        supply: SupplyId,
        type_tag: &str,
        comments: Option<String>,
        ctx: OpContext,
    ) -> Result<()> {
        let mut inner = self.inner.lock();
        let was_water = inner.graph.supply_ref(supply)?.kind.is_water();
        let becomes_water = SupplyKind::from_type_tag(type_tag).is_water();
        let restamp = match inner.graph.holder_of(supply) {
            Some(holder @ Holder::Person(_)) if becomes_water && !was_water => Some(holder),
            _ => None,
        };
        if let Some(holder) = restamp {
            let record = AllocationRecord {
                supply,
                holder,
                allocated_at: ctx.now,
            };
            inner.gateway.transfer_allocation(&record, ctx.deadline)?;
        }

        let fields = SupplyFields {
            type_tag: type_tag.to_string(),
            comments,
        };
        inner
            .gateway
            .update_supply_fields(supply, &fields, ctx.deadline)?;
        inner.graph.update_supply(supply, &fields.type_tag, fields.comments)?;
        if restamp.is_some() {
            inner.graph.stamp_water(supply, Some(ctx.now))?;
            debug!(%supply, at = %ctx.now, "Held supply became water");
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Persons and occupancy
    // ------------------------------------------------------------------

    /// Register a disaster victim, optionally housing them at `location`.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for an unknown location or family
    /// group; storage errors. If housing fails after the person row was
    /// written, the person stays registered without a location.
    pub fn register_victim(&self, person: NewPerson, location: Option<LocationId>) -> Result<PersonId> {
        let mut inner = self.inner.lock();
        if let Some(l) = location {
            inner.graph.location_ref(l)?;
        }
        check_group(&inner.graph, person.family_group)?;

        let id = inner.gateway.insert_person(&person, self.deadline())?;
        let disaster_type = person
            .disaster_type
            .clone()
            .unwrap_or_else(|| UNKNOWN_DISASTER.to_string());
        inner
            .graph
            .insert_person(new_person(id, &person).with_victim(disaster_type));
        if let Some(group) = person.family_group {
            inner.graph.add_family_member(group, Some(id))?;
        }
        if let Some(l) = location {
            inner.gateway.insert_occupancy(id, l, self.deadline())?;
            inner.graph.add_occupant(l, id)?;
        }
        info!(person = %id, "Victim registered");
        Ok(id)
    }

    /// Register someone asking after a missing person.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for an unknown family group; storage errors.
    pub fn register_inquirer(&self, person: NewPerson) -> Result<PersonId> {
        let mut inner = self.inner.lock();
        check_group(&inner.graph, person.family_group)?;
        let id = inner.gateway.insert_person(&person, self.deadline())?;
        inner.graph.insert_person(new_person(id, &person).with_inquirer(""));
        if let Some(group) = person.family_group {
            inner.graph.add_family_member(group, Some(id))?;
        }
        info!(person = %id, "Inquirer registered");
        Ok(id)
    }

    /// Edit a person's fields.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown; storage errors.
    pub fn edit_person(&self, id: PersonId, edit: &PersonEdit) -> Result<()> {
        let mut inner = self.inner.lock();
        let mut updated = inner.graph.person(id)?;
        if edit.is_empty() {
            return Ok(());
        }
        edit.apply(&mut updated);
        inner
            .gateway
            .update_person_fields(id, &person_fields(&updated), self.deadline())?;
        inner.graph.edit_person(id, edit)
    }

    /// House a person at a location.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids; storage errors.
    pub fn add_occupant(&self, location: LocationId, person: PersonId) -> Result<bool> {
        let mut inner = self.inner.lock();
        inner.graph.person_ref(person)?;
        if inner.graph.location_ref(location)?.houses(person) {
            return Ok(false);
        }
        inner.gateway.insert_occupancy(person, location, self.deadline())?;
        inner.graph.add_occupant(location, person)
    }

    /// Remove a person from a location.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids; storage errors.
    pub fn remove_occupant(&self, location: LocationId, person: PersonId) -> Result<bool> {
        let mut inner = self.inner.lock();
        inner.graph.person_ref(person)?;
        if !inner.graph.location_ref(location)?.houses(person) {
            return Ok(false);
        }
        inner.gateway.delete_occupancy(person, location, self.deadline())?;
        inner.graph.remove_occupant(location, person)
    }

    /// Move a person to `location`, leaving every other location.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids; storage errors.
    pub fn move_person(&self, person: PersonId, location: LocationId) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.graph.person_ref(person)?;
        let target_houses = inner.graph.location_ref(location)?.houses(person);
        if !target_houses {
            inner.gateway.insert_occupancy(person, location, self.deadline())?;
            inner.graph.add_occupant(location, person)?;
        }
        let previous = inner.graph.locations_of(person);
        for old in previous {
            if old == location {
                continue;
            }
            inner.gateway.delete_occupancy(person, old, self.deadline())?;
            inner.graph.remove_occupant(old, person)?;
        }
        debug!(%person, %location, "Person moved");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Families
    // ------------------------------------------------------------------

    /// Create an empty family group.
    ///
    /// # Errors
    /// Storage errors. [`ReliefError::DuplicateId`] if storage hands out an
    /// id the graph already holds; the stored row is picked up by the next
    /// [`Self::reload`].
    pub fn create_family_group(&self, label: &str) -> Result<FamilyGroupId> {
        let mut inner = self.inner.lock();
        let id = inner.gateway.insert_family_group(label, self.deadline())?;
        if !inner.graph.insert_family_group(FamilyGroup::new(id, label)) {
            warn!(group = %id, "Storage reused a family group id already in the graph");
            return Err(ReliefError::DuplicateId {
                kind: EntityKind::FamilyGroup,
                id: id.0,
            });
        }
        Ok(id)
    }

    /// Put a person in `group`, leaving their old group, or take them out of
    /// any group with `None`.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for unknown ids; storage errors.
    pub fn move_family_member(&self, person: PersonId, group: Option<FamilyGroupId>) -> Result<()> {
        let mut inner = self.inner.lock();
        let mut updated = inner.graph.person(person)?;
        check_group(&inner.graph, group)?;
        let previous = updated.family_group;
        if previous == group {
            return Ok(());
        }
        updated.family_group = group;
        inner
            .gateway
            .update_person_fields(person, &person_fields(&updated), self.deadline())?;
        match (group, previous) {
            (Some(g), _) => {
                inner.graph.add_family_member(g, Some(person))?;
            }
            (None, Some(old)) => {
                inner.graph.remove_family_member(old, person)?;
            }
            (None, None) => {}
        }
        debug!(%person, ?group, "Family membership changed");
        Ok(())
    }

    // ------------------------------------------------------------------
    // Inquiries
    // ------------------------------------------------------------------

    /// Log an inquiry. `inquirer = None` files it for an external inquirer.
    ///
    /// The sought person does not have to be registered yet.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] for an unknown inquirer; storage errors.
    pub fn log_inquiry(
        &self,
        inquirer: Option<PersonId>,
        seeking: PersonId,
        message: &str,
    ) -> Result<InquiryId> {
        let mut inner = self.inner.lock();
        if let Some(p) = inquirer {
            inner.graph.person_ref(p)?;
        }
        let new = NewInquiry {
            inquirer,
            seeking,
            message: message.to_string(),
        };
        let id = inner.gateway.insert_inquiry(&new, self.deadline())?;
        let date = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        inner.graph.insert_inquiry(
            Inquiry::new(id, InquirerRef::from_row(inquirer.map(|p| p.0)), message, seeking)
                .with_date(Some(date)),
        );
        if let Some(p) = inquirer {
            inner.graph.record_inquiry_by(p, message)?;
        }
        info!(inquiry = %id, %seeking, "Inquiry logged");
        Ok(id)
    }

    /// Replace an inquiry's message.
    ///
    /// # Errors
    /// [`ReliefError::InvalidReference`] if unknown; storage errors.
    pub fn edit_inquiry_message(&self, id: InquiryId, message: &str) -> Result<()> {
        let mut inner = self.inner.lock();
        inner.graph.inquiry(id)?;
        inner.gateway.update_inquiry_message(id, message, self.deadline())?;
        inner.graph.set_inquiry_message(id, message)
    }
}

fn check_group(graph: &ReliefGraph, group: Option<FamilyGroupId>) -> Result<()> {
    match group {
        Some(g) if !graph.contains_family_group(g) => {
            Err(ReliefError::unknown(EntityKind::FamilyGroup, g.0))
        }
        _ => Ok(()),
    }
}

fn new_person(id: PersonId, fields: &NewPerson) -> Person {
    let mut person = Person::new(
        id,
        fields.first_name.clone(),
        fields.last_name.clone(),
        fields.phone.clone(),
    );
    person.gender.clone_from(&fields.gender);
    person.date_of_birth.clone_from(&fields.date_of_birth);
    person
}

fn person_fields(person: &Person) -> PersonFields {
    PersonFields {
        first_name: person.first_name.clone(),
        last_name: person.last_name.clone(),
        phone: person.phone.clone(),
        gender: person.gender.clone(),
        date_of_birth: person.date_of_birth.clone(),
        family_group: person.family_group,
    }
}
