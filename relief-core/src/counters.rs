//! Operational counters.
//!
//! Plain `AtomicU64`s bumped on the hot path and read on export. The session
//! owns one [`ReliefCounters`]; callers read it through
//! [`ReliefSession::counters`](crate::session::ReliefSession::counters).

use std::fmt::Write as _;
use std::sync::atomic::{AtomicU64, Ordering};

/// Event counters since the session opened.
#[derive(Debug)]
pub struct ReliefCounters {
    /// Allocations that were written and applied.
    pub allocations_granted: AtomicU64,
    /// Allocations refused by a rule (exclusivity, co-residency, kind).
    pub allocations_rejected: AtomicU64,
    /// Person-held water allocations removed by sweeps.
    pub water_expired: AtomicU64,
    /// Successful loads, including reloads.
    pub loads_completed: AtomicU64,
    /// Loads that failed and left the previous graph in place.
    pub loads_failed: AtomicU64,
    /// Rows skipped by the loader.
    pub rows_rejected: AtomicU64,
    /// Storage calls cut off by their deadline.
    pub storage_timeouts: AtomicU64,
}

impl ReliefCounters {
    /// Zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            allocations_granted: AtomicU64::new(0),
            allocations_rejected: AtomicU64::new(0),
            water_expired: AtomicU64::new(0),
            loads_completed: AtomicU64::new(0),
            loads_failed: AtomicU64::new(0),
            rows_rejected: AtomicU64::new(0),
            storage_timeouts: AtomicU64::new(0),
        }
    }

    /// Add `n` to a counter.
    pub fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    /// Read every counter.
    #[must_use]
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            allocations_granted: self.allocations_granted.load(Ordering::Relaxed),
            allocations_rejected: self.allocations_rejected.load(Ordering::Relaxed),
            water_expired: self.water_expired.load(Ordering::Relaxed),
            loads_completed: self.loads_completed.load(Ordering::Relaxed),
            loads_failed: self.loads_failed.load(Ordering::Relaxed),
            rows_rejected: self.rows_rejected.load(Ordering::Relaxed),
            storage_timeouts: self.storage_timeouts.load(Ordering::Relaxed),
        }
    }
}

impl Default for ReliefCounters {
    fn default() -> Self {
        Self::new()
    }
}

/// Counter values at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterSnapshot {
    /// Allocations granted.
    pub allocations_granted: u64,
    /// Allocations rejected.
    pub allocations_rejected: u64,
    /// Water allocations expired.
    pub water_expired: u64,
    /// Loads completed.
    pub loads_completed: u64,
    /// Loads failed.
    pub loads_failed: u64,
    /// Rows rejected at load.
    pub rows_rejected: u64,
    /// Storage timeouts.
    pub storage_timeouts: u64,
}

impl CounterSnapshot {
    /// Render in the Prometheus text exposition format.
    #[must_use]
    pub fn to_prometheus(&self) -> String {
        let series: [(&str, &str, u64); 7] = [
            ("relief_allocations_granted_total", "Supply allocations granted", self.allocations_granted),
            ("relief_allocations_rejected_total", "Supply allocations rejected", self.allocations_rejected),
            ("relief_water_expired_total", "Person-held water allocations expired", self.water_expired),
            ("relief_loads_completed_total", "Graph loads completed", self.loads_completed),
            ("relief_loads_failed_total", "Graph loads failed", self.loads_failed),
            ("relief_rows_rejected_total", "Rows skipped during load", self.rows_rejected),
            ("relief_storage_timeouts_total", "Storage calls past their deadline", self.storage_timeouts),
        ];
        let mut out = String::new();
        for (name, help, value) in series {
            let _ = writeln!(out, "# HELP {name} {help}");
            let _ = writeln!(out, "# TYPE {name} counter");
            let _ = writeln!(out, "{name} {value}");
        }
        out
    }
}
