//! Entity model: the data the registry tracks.
//!
//! Every type here is plain data plus its own invariants. Cross-entity
//! wiring (who lives where, who holds what) is done by
//! [`ReliefGraph`](crate::graph::ReliefGraph), never by the entities.

pub mod family;
pub mod inquiry;
pub mod location;
pub mod medical;
pub mod person;
pub mod supply;

pub use family::FamilyGroup;
pub use inquiry::{Inquiry, InquirerRef};
pub use location::Location;
pub use medical::MedicalRecord;
pub use person::{InquirerRole, Person, PersonEdit, VictimRole};
pub use supply::{Holder, Supply, SupplyKind};
