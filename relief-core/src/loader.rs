//! Builds a [`ReliefGraph`] from a persisted [`Snapshot`].
//!
//! Load order: persons, locations, supplies, family groups, inquiries,
//! medical records, occupancy, allocations, then role classification and
//! family membership. A bad row never fails the load: it is logged, counted
//! in the [`LoadReport`] and skipped.

use std::collections::{BTreeMap, BTreeSet};
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::gateway::{AllocationRow, Snapshot};
use crate::graph::{GraphCounts, ReliefGraph};
use crate::model::person::UNKNOWN_DISASTER;
use crate::model::{
    FamilyGroup, Holder, Inquiry, InquirerRef, InquirerRole, Location, MedicalRecord, Person,
    Supply, VictimRole,
};
use crate::types::{
    FamilyGroupId, InquiryId, LocationId, MedicalRecordId, PersonId, SupplyId,
};

/// A row the loader refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedRow {
    /// Source table.
    pub table: &'static str,
    /// Primary key (or supply / person id for join rows).
    pub id: i64,
    /// Why it was skipped.
    pub reason: String,
}

/// Outcome of one load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// What ended up in the graph.
    pub counts: GraphCounts,
    /// Rows that were skipped.
    pub rejected: Vec<RejectedRow>,
    /// Family groups created because a person named a group with no row.
    /// The session writes a row for each so storage stops reusing their ids.
    pub placeholder_groups: Vec<FamilyGroupId>,
    /// Expired water removed by the post-load sweep, if one ran.
    pub water_swept: usize,
}

impl LoadReport {
    /// Whether every row was accepted.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    fn reject(&mut self, table: &'static str, id: i64, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(table, id, reason = %reason, "Skipping row during load");
        self.rejected.push(RejectedRow { table, id, reason });
    }
}

/// Build the graph from `snapshot`.
#[must_use]
pub fn build_graph(snapshot: Snapshot) -> (ReliefGraph, LoadReport) {
    let start = Instant::now();
    let mut graph = ReliefGraph::new();
    let mut report = LoadReport::default();

    // Persons. Roles are settled once inquiries and occupancy are known.
    let mut disaster_types: BTreeMap<PersonId, Option<String>> = BTreeMap::new();
    let mut family_refs: Vec<(PersonId, FamilyGroupId)> = Vec::new();
    for row in snapshot.persons {
        let id = PersonId(row.id);
        if graph.contains_person(id) {
            report.reject("Person", row.id, "duplicate id");
            continue;
        }
        let mut person = Person::new(id, row.first_name, row.last_name, row.phone);
        person.gender = row.gender;
        person.date_of_birth = row.date_of_birth;
        if let Some(group) = row.family_group_id {
            family_refs.push((id, FamilyGroupId(group)));
        }
        disaster_types.insert(id, row.disaster_type);
        graph.insert_person(person);
    }

    for row in snapshot.locations {
        let id = LocationId(row.id);
        if graph.contains_location(id) {
            report.reject("Location", row.id, "duplicate id");
            continue;
        }
        graph.insert_location(Location::new(id, row.name, row.address));
    }

    for row in snapshot.supplies {
        let id = SupplyId(row.id);
        if graph.contains_supply(id) {
            report.reject("Supply", row.id, "duplicate id");
            continue;
        }
        graph.insert_supply(Supply::from_row(id, &row.type_tag, row.comments));
    }

    for row in snapshot.family_groups {
        if !graph.insert_family_group(FamilyGroup::new(FamilyGroupId(row.id), row.label)) {
            report.reject("FamilyGroup", row.id, "duplicate id");
        }
    }

    // Inquiries. The sought person may be unknown; a named inquirer may not.
    let mut inquirer_messages: BTreeMap<PersonId, String> = BTreeMap::new();
    let mut inquiry_ids = BTreeSet::new();
    for row in snapshot.inquiries {
        if !inquiry_ids.insert(row.id) {
            report.reject("Inquiry", row.id, "duplicate id");
            continue;
        }
        let inquirer = InquirerRef::from_row(row.inquirer_id);
        if let InquirerRef::Registered(p) = inquirer {
            if !graph.contains_person(p) {
                report.reject("Inquiry", row.id, format!("unknown inquirer {p}"));
                continue;
            }
            inquirer_messages.insert(p, row.comments.clone());
        }
        let seeking = PersonId(row.seeking_id);
        if !graph.contains_person(seeking) {
            debug!(inquiry = row.id, %seeking, "Inquiry seeks a person not yet registered");
        }
        graph.insert_inquiry(
            Inquiry::new(InquiryId(row.id), inquirer, row.comments, seeking).with_date(row.date),
        );
    }

    for row in snapshot.medical_records {
        let location = row.location_id.map(LocationId).filter(|l| {
            let known = graph.contains_location(*l);
            if !known {
                debug!(record = row.id, location = %l, "Medical record names an unknown location");
            }
            known
        });
        match MedicalRecord::new(
            MedicalRecordId(row.id),
            location,
            row.treatment_details,
            &row.date,
        ) {
            Ok(record) => graph.insert_medical_record(record),
            Err(e) => report.reject("MedicalRecord", row.id, e.to_string()),
        }
    }

    for row in snapshot.occupancy {
        let (person, location) = (PersonId(row.person_id), LocationId(row.location_id));
        if let Err(e) = graph.add_occupant(location, person) {
            report.reject("PersonLocation", row.person_id, e.to_string());
        }
    }

    for row in snapshot.allocations {
        if let Err(reason) = wire_allocation(&mut graph, &row) {
            report.reject("SupplyAllocation", row.supply_id, reason);
        }
    }

    classify_roles(&mut graph, &disaster_types, &inquirer_messages);

    for (person, group) in family_refs {
        if !graph.contains_family_group(group) {
            graph.insert_family_group(FamilyGroup::placeholder(group));
            report.placeholder_groups.push(group);
        }
        if let Err(e) = graph.add_family_member(group, Some(person)) {
            report.reject("Person", person.0, e.to_string());
        }
    }

    report.counts = graph.counts();
    info!(
        persons = report.counts.persons,
        locations = report.counts.locations,
        supplies = report.counts.supplies,
        allocations = report.counts.allocations,
        rejected = report.rejected.len(),
        elapsed_us = start.elapsed().as_micros(),
        "Relief graph loaded"
    );
    (graph, report)
}

fn wire_allocation(graph: &mut ReliefGraph, row: &AllocationRow) -> Result<(), String> {
    let supply = SupplyId(row.supply_id);
    let holder = match (row.person_id, row.location_id) {
        (Some(p), None) => Holder::Person(PersonId(p)),
        (None, Some(l)) => Holder::Location(LocationId(l)),
        (Some(_), Some(_)) => return Err("names both a person and a location".into()),
        (None, None) => return Err("names no holder".into()),
    };
    if let Some(existing) = graph.holder_of(supply) {
        return Err(format!("already held by {existing}"));
    }
    graph.set_holder(supply, Some(holder)).map_err(|e| e.to_string())?;
    let stamp = match holder {
        Holder::Person(_) => row.allocated_at,
        Holder::Location(_) => None,
    };
    graph.stamp_water(supply, stamp).map_err(|e| e.to_string())
}

fn classify_roles(
    graph: &mut ReliefGraph,
    disaster_types: &BTreeMap<PersonId, Option<String>>,
    inquirer_messages: &BTreeMap<PersonId, String>,
) {
    for mut person in graph.persons() {
        let message = inquirer_messages.get(&person.id);
        let housed = !graph.locations_of(person.id).is_empty();
        if let Some(message) = message {
            person.inquirer = Some(InquirerRole {
                inquiry_message: message.clone(),
            });
        }
        if message.is_none() || housed {
            let disaster_type = disaster_types
                .get(&person.id)
                .cloned()
                .flatten()
                .unwrap_or_else(|| UNKNOWN_DISASTER.to_string());
            person.victim = Some(VictimRole { disaster_type });
        }
        graph.insert_person(person);
    }
}
