//! Supply allocation rules.
//!
//! A supply has at most one holder. Supplies are stocked at a location and
//! then handed out to someone living there; the hand-out moves the holding
//! from the location to the person in one storage transaction. Water can
//! also be handed out unstocked, and person-held water expires after the
//! configured TTL.
//!
//! Every operation validates against the graph, writes through the
//! gateway, and only then mutates the graph. An error at any step leaves
//! the graph as it was.

use std::time::Instant;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, warn};

use crate::error::{ReliefError, Result};
use crate::gateway::{AllocationRecord, PersistenceGateway};
use crate::graph::ReliefGraph;
use crate::model::supply::default_water_ttl;
use crate::model::Holder;
use crate::types::{Deadline, LocationId, OpContext, PersonId, SupplyId};

/// Applies allocation rules to a graph and its store.
#[derive(Debug, Clone, Copy)]
pub struct AllocationEngine {
    water_ttl: Duration,
}

impl Default for AllocationEngine {
    fn default() -> Self {
        Self::new(default_water_ttl())
    }
}

impl AllocationEngine {
    /// Engine with the given water lifetime.
    #[must_use]
    pub fn new(water_ttl: Duration) -> Self {
        Self { water_ttl }
    }

    /// Lifetime of person-held water.
    #[must_use]
    pub fn water_ttl(&self) -> Duration {
        self.water_ttl
    }

    /// Hand `supply` to `person`.
    ///
    /// Water follows [`Self::allocate_water_to_person`]. Anything else must
    /// be stocked at a location `person` occupies.
    ///
    /// # Errors
    /// - [`ReliefError::InvalidReference`] for unknown ids
    /// - [`ReliefError::AlreadyAllocated`] if a person already holds it
    /// - [`ReliefError::LocationMismatch`] if it is not stocked where `person` lives
    /// - storage and timeout errors from the gateway
    pub fn allocate_to_person<G: PersistenceGateway + ?Sized>(
        &self,
        graph: &mut ReliefGraph,
        gateway: &G,
        supply: SupplyId,
        person: PersonId,
        ctx: OpContext,
    ) -> Result<AllocationRecord> {
        graph.person_ref(person)?;
        if graph.supply_ref(supply)?.kind.is_water() {
            return self.allocate_water_to_person(graph, gateway, supply, person, ctx);
        }

        match graph.holder_of(supply) {
            Some(Holder::Location(location)) if graph.location_ref(location)?.houses(person) => {}
            Some(holder @ Holder::Person(_)) => {
                return Err(ReliefError::AlreadyAllocated { supply, holder });
            }
            Some(Holder::Location(_)) | None => {
                return Err(ReliefError::LocationMismatch { supply, person });
            }
        }

        let record = AllocationRecord {
            supply,
            holder: Holder::Person(person),
            allocated_at: ctx.now,
        };
        write(gateway, &record, true, ctx.deadline)?;
        graph.set_holder(supply, Some(record.holder))?;
        Ok(record)
    }

    /// Stock `supply` at `location`.
    ///
    /// Water stocked at a location carries no allocation time and never
    /// expires.
    ///
    /// # Errors
    /// - [`ReliefError::InvalidReference`] for unknown ids
    /// - [`ReliefError::AlreadyAllocated`] if anyone holds it, this location included
    /// - storage and timeout errors from the gateway
    pub fn allocate_to_location<G: PersistenceGateway + ?Sized>(
        &self,
        graph: &mut ReliefGraph,
        gateway: &G,
        supply: SupplyId,
        location: LocationId,
        ctx: OpContext,
    ) -> Result<AllocationRecord> {
        graph.supply_ref(supply)?;
        graph.location_ref(location)?;
        if let Some(holder) = graph.holder_of(supply) {
            return Err(ReliefError::AlreadyAllocated { supply, holder });
        }

        let record = AllocationRecord {
            supply,
            holder: Holder::Location(location),
            allocated_at: ctx.now,
        };
        write(gateway, &record, false, ctx.deadline)?;
        graph.set_holder(supply, Some(record.holder))?;
        graph.stamp_water(supply, None)?;
        Ok(record)
    }

    /// Hand water to `person`, stamping the allocation time with `ctx.now`.
    ///
    /// Water stocked at a location can only go to someone living there.
    /// Unstocked water can be handed out directly.
    ///
    /// # Errors
    /// - [`ReliefError::InvalidReference`] for unknown ids
    /// - [`ReliefError::NotWater`] for any other kind of supply
    /// - [`ReliefError::AlreadyAllocated`] if a person already holds it
    /// - [`ReliefError::LocationMismatch`] if stocked where `person` does not live
    /// - storage and timeout errors from the gateway
    pub fn allocate_water_to_person<G: PersistenceGateway + ?Sized>(
        &self,
        graph: &mut ReliefGraph,
        gateway: &G,
        supply: SupplyId,
        person: PersonId,
        ctx: OpContext,
    ) -> Result<AllocationRecord> {
        graph.person_ref(person)?;
        let item = graph.supply_ref(supply)?;
        if !item.kind.is_water() {
            return Err(ReliefError::NotWater {
                supply,
                kind: item.kind.type_tag().to_string(),
            });
        }

        let transfer = match graph.holder_of(supply) {
            None => false,
            Some(Holder::Location(location)) if graph.location_ref(location)?.houses(person) => {
                true
            }
            Some(Holder::Location(_)) => {
                return Err(ReliefError::LocationMismatch { supply, person });
            }
            Some(holder @ Holder::Person(_)) => {
                return Err(ReliefError::AlreadyAllocated { supply, holder });
            }
        };

        let record = AllocationRecord {
            supply,
            holder: Holder::Person(person),
            allocated_at: ctx.now,
        };
        write(gateway, &record, transfer, ctx.deadline)?;
        graph.set_holder(supply, Some(record.holder))?;
        graph.stamp_water(supply, Some(ctx.now))?;
        Ok(record)
    }

    /// Remove every person-held water allocation expired at `now`.
    ///
    /// Returns how many allocations left the graph.
    ///
    /// # Errors
    /// Storage and timeout errors; the graph is untouched on error.
    pub fn cleanup_expired_water<G: PersistenceGateway + ?Sized>(
        &self,
        graph: &mut ReliefGraph,
        gateway: &G,
        now: DateTime<Utc>,
        deadline: Deadline,
    ) -> Result<usize> {
        let start = Instant::now();
        let expired: Vec<SupplyId> = graph
            .person_held_water()
            .into_iter()
            .filter(|(water, _)| water.is_expired_at(now, self.water_ttl))
            .map(|(water, _)| water.id)
            .collect();

        let deleted = gateway.delete_expired_water_allocations(now - self.water_ttl, deadline)?;
        for supply in &expired {
            graph.set_holder(*supply, None)?;
            graph.stamp_water(*supply, None)?;
        }

        if deleted != expired.len() {
            warn!(
                storage = deleted,
                graph = expired.len(),
                "Expired water count differs between storage and graph"
            );
        }
        info!(
            removed = expired.len(),
            elapsed_us = start.elapsed().as_micros(),
            "Expired water swept"
        );
        Ok(expired.len())
    }
}

fn write<G: PersistenceGateway + ?Sized>(
    gateway: &G,
    record: &AllocationRecord,
    transfer: bool,
    deadline: Deadline,
) -> Result<()> {
    let start = Instant::now();
    let written = if transfer {
        gateway.transfer_allocation(record, deadline)?
    } else {
        gateway.insert_allocation(record, deadline)?
    };
    if !written {
        warn!(supply = %record.supply, holder = %record.holder, "Allocation write matched no row");
    }
    debug!(
        supply = %record.supply,
        holder = %record.holder,
        transfer,
        elapsed_us = start.elapsed().as_micros(),
        "Allocation written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};

    use super::*;
    use crate::gateway::{
        NewInquiry, NewPerson, PersonFields, Snapshot, SupplyFields,
    };
    use crate::model::{Location, Person, Supply};
    use crate::types::{FamilyGroupId, InquiryId};
    use chrono::TimeZone;

    /// Records allocation writes; fails every call while `down` is set.
    #[derive(Default)]
    struct RecordingGateway {
        down: Cell<bool>,
        writes: RefCell<Vec<(AllocationRecord, bool)>>,
        sweep_result: Cell<usize>,
    }

    impl RecordingGateway {
        fn check(&self) -> Result<()> {
            if self.down.get() {
                Err(ReliefError::Timeout { operation: "test" })
            } else {
                Ok(())
            }
        }
    }

    impl PersistenceGateway for RecordingGateway {
        fn load_all(&self, _: Deadline) -> Result<Snapshot> {
            self.check().map(|()| Snapshot::default())
        }
        fn insert_person(&self, _: &NewPerson, _: Deadline) -> Result<PersonId> {
            self.check().map(|()| PersonId(1))
        }
        fn insert_inquiry(&self, _: &NewInquiry, _: Deadline) -> Result<InquiryId> {
            self.check().map(|()| InquiryId(1))
        }
        fn insert_family_group(&self, _: &str, _: Deadline) -> Result<FamilyGroupId> {
            self.check().map(|()| FamilyGroupId(1))
        }
        fn ensure_family_group(&self, _: FamilyGroupId, _: &str, _: Deadline) -> Result<bool> {
            self.check().map(|()| true)
        }
        fn update_person_fields(&self, _: PersonId, _: &PersonFields, _: Deadline) -> Result<bool> {
            self.check().map(|()| true)
        }
        fn update_supply_fields(&self, _: SupplyId, _: &SupplyFields, _: Deadline) -> Result<bool> {
            self.check().map(|()| true)
        }
        fn update_inquiry_message(&self, _: InquiryId, _: &str, _: Deadline) -> Result<bool> {
            self.check().map(|()| true)
        }
        fn insert_occupancy(&self, _: PersonId, _: LocationId, _: Deadline) -> Result<bool> {
            self.check().map(|()| true)
        }
        fn delete_occupancy(&self, _: PersonId, _: LocationId, _: Deadline) -> Result<bool> {
            self.check().map(|()| true)
        }
        fn insert_allocation(&self, a: &AllocationRecord, _: Deadline) -> Result<bool> {
            self.check()?;
            self.writes.borrow_mut().push((*a, false));
            Ok(true)
        }
        fn transfer_allocation(&self, a: &AllocationRecord, _: Deadline) -> Result<bool> {
            self.check()?;
            self.writes.borrow_mut().push((*a, true));
            Ok(true)
        }
        fn delete_allocation(&self, _: SupplyId, _: Deadline) -> Result<bool> {
            self.check().map(|()| true)
        }
        fn delete_expired_water_allocations(&self, _: DateTime<Utc>, _: Deadline) -> Result<usize> {
            self.check().map(|()| self.sweep_result.get())
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).single().expect("valid time")
    }

    fn graph() -> ReliefGraph {
        let mut g = ReliefGraph::new();
        g.insert_person(Person::new(PersonId(1), "Ana", "Diaz", "555-0100").with_victim("Flood"));
        g.insert_person(Person::new(PersonId(2), "Ben", "Okafor", "555-0101").with_victim("Flood"));
        g.insert_location(Location::new(LocationId(1), "Shelter A", "1 Main St"));
        g.insert_location(Location::new(LocationId(2), "Shelter B", "9 Elm St"));
        g.insert_supply(Supply::from_row(SupplyId(1), "blanket", None));
        g.insert_supply(Supply::from_row(SupplyId(2), "water", None));
        g.add_occupant(LocationId(1), PersonId(1)).expect("house ana");
        g.add_occupant(LocationId(2), PersonId(2)).expect("house ben");
        g
    }

    #[test]
    fn hand_out_moves_stock_to_resident() {
        let engine = AllocationEngine::default();
        let gw = RecordingGateway::default();
        let mut g = graph();
        engine
            .allocate_to_location(&mut g, &gw, SupplyId(1), LocationId(1), OpContext::at(t0()))
            .expect("stock");
        engine
            .allocate_to_person(&mut g, &gw, SupplyId(1), PersonId(1), OpContext::at(t0()))
            .expect("hand out");

        assert_eq!(g.holder_of(SupplyId(1)), Some(Holder::Person(PersonId(1))));
        assert!(!g.location(LocationId(1)).expect("loc").stocks(SupplyId(1)));
        let writes = gw.writes.borrow();
        assert_eq!(writes.len(), 2);
        assert!(!writes[0].1, "stocking inserts");
        assert!(writes[1].1, "hand-out transfers");
    }

    #[test]
    fn non_resident_gets_location_mismatch() {
        let engine = AllocationEngine::default();
        let gw = RecordingGateway::default();
        let mut g = graph();
        engine
            .allocate_to_location(&mut g, &gw, SupplyId(1), LocationId(1), OpContext::at(t0()))
            .expect("stock");
        let err = engine
            .allocate_to_person(&mut g, &gw, SupplyId(1), PersonId(2), OpContext::at(t0()))
            .expect_err("ben lives elsewhere");
        assert!(matches!(err, ReliefError::LocationMismatch { .. }));
        assert_eq!(g.holder_of(SupplyId(1)), Some(Holder::Location(LocationId(1))));
    }

    #[test]
    fn unstocked_non_water_cannot_go_to_a_person() {
        let engine = AllocationEngine::default();
        let gw = RecordingGateway::default();
        let mut g = graph();
        assert!(matches!(
            engine.allocate_to_person(&mut g, &gw, SupplyId(1), PersonId(1), OpContext::at(t0())),
            Err(ReliefError::LocationMismatch { .. })
        ));
        assert!(gw.writes.borrow().is_empty());
    }

    #[test]
    fn second_holder_is_refused_both_ways() {
        let engine = AllocationEngine::default();
        let gw = RecordingGateway::default();
        let mut g = graph();
        let ctx = OpContext::at(t0());
        engine.allocate_to_location(&mut g, &gw, SupplyId(1), LocationId(1), ctx).expect("stock");
        assert!(matches!(
            engine.allocate_to_location(&mut g, &gw, SupplyId(1), LocationId(2), ctx),
            Err(ReliefError::AlreadyAllocated { .. })
        ));
        assert!(matches!(
            engine.allocate_to_location(&mut g, &gw, SupplyId(1), LocationId(1), ctx),
            Err(ReliefError::AlreadyAllocated { .. })
        ));
        engine.allocate_to_person(&mut g, &gw, SupplyId(1), PersonId(1), ctx).expect("hand out");
        assert!(matches!(
            engine.allocate_to_location(&mut g, &gw, SupplyId(1), LocationId(1), ctx),
            Err(ReliefError::AlreadyAllocated { holder: Holder::Person(PersonId(1)), .. })
        ));
        assert!(matches!(
            engine.allocate_to_person(&mut g, &gw, SupplyId(1), PersonId(1), ctx),
            Err(ReliefError::AlreadyAllocated { .. })
        ));
    }

    #[test]
    fn water_is_stamped_and_blankets_are_not_water() {
        let engine = AllocationEngine::default();
        let gw = RecordingGateway::default();
        let mut g = graph();
        let ctx = OpContext::at(t0());
        assert!(matches!(
            engine.allocate_water_to_person(&mut g, &gw, SupplyId(1), PersonId(1), ctx),
            Err(ReliefError::NotWater { .. })
        ));
        engine
            .allocate_to_person(&mut g, &gw, SupplyId(2), PersonId(2), ctx)
            .expect("unstocked water goes straight out");
        assert_eq!(g.supply(SupplyId(2)).expect("water").allocated_at(), Some(t0()));
    }

    #[test]
    fn storage_failure_leaves_graph_unchanged() {
        let engine = AllocationEngine::default();
        let gw = RecordingGateway::default();
        let mut g = graph();
        gw.down.set(true);
        assert!(matches!(
            engine.allocate_water_to_person(&mut g, &gw, SupplyId(2), PersonId(1), OpContext::at(t0())),
            Err(ReliefError::Timeout { .. })
        ));
        assert!(g.holder_of(SupplyId(2)).is_none());
        assert!(g.supply(SupplyId(2)).expect("water").allocated_at().is_none());
    }

    #[test]
    fn sweep_removes_only_expired_water() {
        let engine = AllocationEngine::default();
        let gw = RecordingGateway::default();
        let mut g = graph();
        g.insert_supply(Supply::from_row(SupplyId(3), "water", None));
        let old = t0();
        let now = old + Duration::hours(30);
        engine
            .allocate_water_to_person(&mut g, &gw, SupplyId(2), PersonId(1), OpContext::at(old))
            .expect("old water");
        engine
            .allocate_water_to_person(&mut g, &gw, SupplyId(3), PersonId(2), OpContext::at(now))
            .expect("fresh water");

        gw.sweep_result.set(1);
        let removed = engine
            .cleanup_expired_water(&mut g, &gw, now, Deadline::none())
            .expect("sweep");
        assert_eq!(removed, 1);
        assert!(g.holder_of(SupplyId(2)).is_none());
        assert!(!g.person(PersonId(1)).expect("ana").holds(SupplyId(2)));
        assert_eq!(g.holder_of(SupplyId(3)), Some(Holder::Person(PersonId(2))));
    }
}
