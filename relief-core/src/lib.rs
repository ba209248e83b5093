//! # Relief Core
//!
//! Entity graph and allocation rules for a disaster relief registry.
//!
//! The registry tracks victims, the shelters housing them, the supplies
//! handed out to people or stocked at shelters, inquiries about missing
//! persons, medical records, and family groups:
//!
//! - **Model**: plain entities with their own invariants ([`model`])
//! - **Graph**: the canonical in-memory store, read by copy ([`graph`])
//! - **Loader**: builds the graph from a storage snapshot ([`loader`])
//! - **Allocation**: exclusivity, co-residency and water expiry ([`allocation`])
//! - **Gateway**: what the core needs from storage ([`gateway`], [`sqlite`])
//! - **Session**: one store, one graph, one lock ([`session`])
//!
//! ## Consistency Contract
//!
//! - A supply has at most one holder, a person or a location.
//! - Non-water supplies reach a person only from a shelter they live at.
//! - Person-held water expires strictly after its TTL (24h by default).
//! - A failed operation leaves the graph untouched; a failed reload keeps
//!   the previous graph.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod allocation;
pub mod config;
pub mod counters;
pub mod error;
pub mod gateway;
pub mod graph;
pub mod loader;
pub mod model;
pub mod session;
pub mod sqlite;
pub mod telemetry;
pub mod types;

pub use config::ReliefConfig;
pub use error::{ReliefError, Result};
pub use graph::ReliefGraph;
pub use session::ReliefSession;
pub use types::*;
