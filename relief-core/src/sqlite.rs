//! SQLite implementation of [`PersistenceGateway`].
//!
//! One table per entity plus two join tables:
//!
//! ```sql
//! PersonLocation   (person_id, location_id)            -- who lives where
//! SupplyAllocation (supply_id UNIQUE, person_id?, location_id?, allocation_date)
//! ```
//!
//! `supply_id` is unique in `SupplyAllocation`, so storage itself refuses a
//! second holder. There are no foreign keys: dangling rows are reported by
//! the loader instead of blocking writes.
//!
//! Every call runs under a [`Deadline`]. While a bounded call is in flight a
//! progress handler interrupts SQLite once the deadline passes; the
//! interrupted call rolls back and surfaces as [`ReliefError::Timeout`].

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, Row};
use tracing::{debug, info, warn};

use crate::config::PersistenceConfig;
use crate::error::{ReliefError, Result};
use crate::gateway::{
    AllocationRecord, AllocationRow, FamilyGroupRow, InquiryRow, LocationRow, MedicalRecordRow,
    NewInquiry, NewPerson, OccupancyRow, PersistenceGateway, PersonFields, PersonRow, Snapshot,
    SupplyFields, SupplyRow,
};
use crate::model::Holder;
use crate::types::{Deadline, FamilyGroupId, InquiryId, LocationId, PersonId, SupplyId};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS FamilyGroup (
    family_group_id INTEGER PRIMARY KEY,
    label           TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS Person (
    person_id     INTEGER PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    gender        TEXT,
    phone_number  TEXT NOT NULL DEFAULT '',
    date_of_birth TEXT,
    family_group  INTEGER,
    disaster_type TEXT
);
CREATE TABLE IF NOT EXISTS Location (
    location_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    address     TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS Supply (
    supply_id INTEGER PRIMARY KEY,
    type      TEXT NOT NULL,
    comments  TEXT
);
CREATE TABLE IF NOT EXISTS Inquiry (
    inquiry_id      INTEGER PRIMARY KEY,
    inquirer_id     INTEGER,
    seeking_id      INTEGER NOT NULL,
    date_of_inquiry TEXT,
    comments        TEXT NOT NULL DEFAULT ''
);
CREATE TABLE IF NOT EXISTS MedicalRecord (
    medical_record_id INTEGER PRIMARY KEY,
    location_id       INTEGER,
    treatment_details TEXT NOT NULL,
    date_of_treatment TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS PersonLocation (
    person_id   INTEGER NOT NULL,
    location_id INTEGER NOT NULL,
    PRIMARY KEY (person_id, location_id)
);
CREATE TABLE IF NOT EXISTS SupplyAllocation (
    allocation_id   INTEGER PRIMARY KEY,
    supply_id       INTEGER NOT NULL UNIQUE,
    person_id       INTEGER,
    location_id     INTEGER,
    allocation_date TEXT
);
";

/// SQLite VM steps between deadline checks.
const PROGRESS_STEPS: i32 = 1_000;

// ---------------------------------------------------------------------------
// Timestamp helpers
// ---------------------------------------------------------------------------

fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Accepts RFC 3339 and the bare `YYYY-MM-DD HH:MM:SS[.f]` form (read as UTC).
fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|dt| dt.and_utc())
        })
}

fn holder_columns(holder: Holder) -> (Option<i64>, Option<i64>) {
    match holder {
        Holder::Person(p) => (Some(p.0), None),
        Holder::Location(l) => (None, Some(l.0)),
    }
}

// ---------------------------------------------------------------------------
// SqliteGateway
// ---------------------------------------------------------------------------

/// Handle to an open registry database.
///
/// ```no_run
/// # use relief_core::sqlite::SqliteGateway;
/// # use relief_core::config::PersistenceConfig;
/// # use relief_core::gateway::PersistenceGateway;
/// # use relief_core::types::Deadline;
/// let gateway = SqliteGateway::open("relief.db", &PersistenceConfig::default())?;
/// let snapshot = gateway.load_all(Deadline::none())?;
/// # Ok::<(), relief_core::ReliefError>(())
/// ```
pub struct SqliteGateway {
    conn: Connection,
    db_path: PathBuf,
}

impl std::fmt::Debug for SqliteGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteGateway")
            .field("db_path", &self.db_path)
            .finish_non_exhaustive()
    }
}

impl SqliteGateway {
    /// Open (or create) the database at `path` and ensure the schema.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::StorageUnavailable`] on SQLite failures.
    pub fn open<P: AsRef<Path>>(path: P, config: &PersistenceConfig) -> Result<Self> {
        let db_path = path.as_ref().to_path_buf();
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&db_path, flags)?;

        if config.wal_mode {
            conn.execute_batch("PRAGMA journal_mode = WAL;")?;
        }
        conn.execute_batch("PRAGMA synchronous = NORMAL;")?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch(SCHEMA)?;

        info!(
            path = %db_path.display(),
            wal = config.wal_mode,
            "Relief registry store opened"
        );
        Ok(Self { conn, db_path })
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::StorageUnavailable`] on SQLite failures.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn,
            db_path: PathBuf::from(":memory:"),
        })
    }

    /// Run a SQL script, e.g. a seed dump of locations and supplies.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::StorageUnavailable`] if any statement fails.
    pub fn import_sql(&self, script: &str) -> Result<()> {
        self.conn.execute_batch(script)?;
        Ok(())
    }

    /// Path of the database file (`:memory:` for in-memory stores).
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ------------------------------------------------------------------
    // Maintenance
    // ------------------------------------------------------------------

    /// Copy the database to `dest_path` with SQLite's online-backup API.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::StorageUnavailable`] on SQLite failures.
    pub fn backup<P: AsRef<Path>>(&self, dest_path: P) -> Result<()> {
        let start = Instant::now();
        let mut dest = Connection::open(dest_path.as_ref())?;
        let backup = rusqlite::backup::Backup::new(&self.conn, &mut dest)?;
        backup.run_to_completion(256, Duration::from_millis(50), None)?;
        info!(
            dest = %dest_path.as_ref().display(),
            elapsed_ms = start.elapsed().as_millis(),
            "Registry backup completed"
        );
        Ok(())
    }

    /// `PRAGMA integrity_check`; `Ok(false)` means corruption was found.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::StorageUnavailable`] if the check cannot run.
    pub fn integrity_check(&self) -> Result<bool> {
        let result: String = self
            .conn
            .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
        Ok(result == "ok")
    }

    // ------------------------------------------------------------------
    // Deadline guard
    // ------------------------------------------------------------------

    fn guarded<T>(
        &self,
        operation: &'static str,
        deadline: Deadline,
        f: impl FnOnce(&Connection) -> rusqlite::Result<T>,
    ) -> Result<T> {
        if deadline.is_expired() {
            return Err(ReliefError::Timeout { operation });
        }
        let start = Instant::now();
        if let Some(at) = deadline.instant() {
            self.conn
                .progress_handler(PROGRESS_STEPS, Some(move || Instant::now() >= at));
        }
        let result = f(&self.conn);
        if deadline.instant().is_some() {
            self.conn.progress_handler(0, None::<fn() -> bool>);
        }
        debug!(operation, elapsed_us = start.elapsed().as_micros(), "Storage call");

        result.map_err(|e| {
            if e.sqlite_error_code() == Some(ErrorCode::OperationInterrupted) {
                warn!(operation, "Storage call interrupted at deadline");
                ReliefError::Timeout { operation }
            } else {
                ReliefError::StorageUnavailable(e)
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Row readers
// ---------------------------------------------------------------------------

fn person_row(row: &Row<'_>) -> rusqlite::Result<PersonRow> {
    Ok(PersonRow {
        id: row.get(0)?,
        first_name: row.get(1)?,
        last_name: row.get(2)?,
        gender: row.get(3)?,
        phone: row.get(4)?,
        date_of_birth: row.get(5)?,
        family_group_id: row.get(6)?,
        disaster_type: row.get(7)?,
    })
}

fn read_all<T>(
    conn: &Connection,
    sql: &str,
    map: impl FnMut(&Row<'_>) -> rusqlite::Result<T>,
) -> rusqlite::Result<Vec<T>> {
    let mut stmt = conn.prepare_cached(sql)?;
    let rows = stmt.query_map([], map)?;
    rows.collect()
}

fn read_snapshot(conn: &Connection) -> rusqlite::Result<Snapshot> {
    let tx = conn.unchecked_transaction()?;
    let snapshot = Snapshot {
        persons: read_all(
            &tx,
            "SELECT person_id, first_name, last_name, gender, phone_number, date_of_birth,
                    family_group, disaster_type
             FROM Person ORDER BY person_id",
            person_row,
        )?,
        locations: read_all(
            &tx,
            "SELECT location_id, name, address FROM Location ORDER BY location_id",
            |row| {
                Ok(LocationRow {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    address: row.get(2)?,
                })
            },
        )?,
        supplies: read_all(
            &tx,
            "SELECT supply_id, type, comments FROM Supply ORDER BY supply_id",
            |row| {
                Ok(SupplyRow {
                    id: row.get(0)?,
                    type_tag: row.get(1)?,
                    comments: row.get(2)?,
                })
            },
        )?,
        inquiries: read_all(
            &tx,
            "SELECT inquiry_id, inquirer_id, seeking_id, date_of_inquiry, comments
             FROM Inquiry ORDER BY inquiry_id",
            |row| {
                Ok(InquiryRow {
                    id: row.get(0)?,
                    inquirer_id: row.get(1)?,
                    seeking_id: row.get(2)?,
                    date: row.get(3)?,
                    comments: row.get(4)?,
                })
            },
        )?,
        medical_records: read_all(
            &tx,
            "SELECT medical_record_id, location_id, treatment_details, date_of_treatment
             FROM MedicalRecord ORDER BY medical_record_id",
            |row| {
                Ok(MedicalRecordRow {
                    id: row.get(0)?,
                    location_id: row.get(1)?,
                    treatment_details: row.get(2)?,
                    date: row.get(3)?,
                })
            },
        )?,
        family_groups: read_all(
            &tx,
            "SELECT family_group_id, label FROM FamilyGroup ORDER BY family_group_id",
            |row| {
                Ok(FamilyGroupRow {
                    id: row.get(0)?,
                    label: row.get(1)?,
                })
            },
        )?,
        occupancy: read_all(
            &tx,
            "SELECT person_id, location_id FROM PersonLocation ORDER BY rowid",
            |row| {
                Ok(OccupancyRow {
                    person_id: row.get(0)?,
                    location_id: row.get(1)?,
                })
            },
        )?,
        allocations: read_all(
            &tx,
            "SELECT supply_id, person_id, location_id, allocation_date
             FROM SupplyAllocation ORDER BY allocation_id",
            |row| {
                let raw: Option<String> = row.get(3)?;
                let allocated_at = raw.as_deref().and_then(|s| {
                    let parsed = parse_timestamp(s);
                    if parsed.is_none() {
                        warn!(value = s, "Unreadable allocation_date");
                    }
                    parsed
                });
                Ok(AllocationRow {
                    supply_id: row.get(0)?,
                    person_id: row.get(1)?,
                    location_id: row.get(2)?,
                    allocated_at,
                })
            },
        )?,
    };
    tx.commit()?;
    Ok(snapshot)
}

// ---------------------------------------------------------------------------
// PersistenceGateway
// ---------------------------------------------------------------------------

impl PersistenceGateway for SqliteGateway {
    fn load_all(&self, deadline: Deadline) -> Result<Snapshot> {
        self.guarded("load_all", deadline, read_snapshot)
    }

    fn insert_person(&self, person: &NewPerson, deadline: Deadline) -> Result<PersonId> {
        self.guarded("insert_person", deadline, |conn| {
            conn.execute(
                "INSERT INTO Person (first_name, last_name, gender, phone_number, date_of_birth,
                                     family_group, disaster_type)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    person.first_name,
                    person.last_name,
                    person.gender,
                    person.phone,
                    person.date_of_birth,
                    person.family_group.map(|g| g.0),
                    person.disaster_type,
                ],
            )?;
            Ok(PersonId(conn.last_insert_rowid()))
        })
    }

    fn insert_inquiry(&self, inquiry: &NewInquiry, deadline: Deadline) -> Result<InquiryId> {
        self.guarded("insert_inquiry", deadline, |conn| {
            conn.execute(
                "INSERT INTO Inquiry (inquirer_id, seeking_id, date_of_inquiry, comments)
                 VALUES (?1, ?2, date('now'), ?3)",
                params![inquiry.inquirer.map(|p| p.0), inquiry.seeking.0, inquiry.message],
            )?;
            Ok(InquiryId(conn.last_insert_rowid()))
        })
    }

    fn insert_family_group(&self, label: &str, deadline: Deadline) -> Result<FamilyGroupId> {
        self.guarded("insert_family_group", deadline, |conn| {
            conn.execute("INSERT INTO FamilyGroup (label) VALUES (?1)", params![label])?;
            Ok(FamilyGroupId(conn.last_insert_rowid()))
        })
    }

    fn ensure_family_group(
        &self,
        id: FamilyGroupId,
        label: &str,
        deadline: Deadline,
    ) -> Result<bool> {
        self.guarded("ensure_family_group", deadline, |conn| {
            let added = conn.execute(
                "INSERT OR IGNORE INTO FamilyGroup (family_group_id, label) VALUES (?1, ?2)",
                params![id.0, label],
            )?;
            Ok(added > 0)
        })
    }

    fn update_person_fields(
        &self,
        id: PersonId,
        fields: &PersonFields,
        deadline: Deadline,
    ) -> Result<bool> {
        self.guarded("update_person_fields", deadline, |conn| {
            let changed = conn.execute(
                "UPDATE Person SET first_name = ?1, last_name = ?2, phone_number = ?3,
                                   gender = ?4, date_of_birth = ?5, family_group = ?6
                 WHERE person_id = ?7",
                params![
                    fields.first_name,
                    fields.last_name,
                    fields.phone,
                    fields.gender,
                    fields.date_of_birth,
                    fields.family_group.map(|g| g.0),
                    id.0,
                ],
            )?;
            Ok(changed > 0)
        })
    }

    fn update_supply_fields(
        &self,
        id: SupplyId,
        fields: &SupplyFields,
        deadline: Deadline,
    ) -> Result<bool> {
        self.guarded("update_supply_fields", deadline, |conn| {
            let changed = conn.execute(
                "UPDATE Supply SET type = ?1, comments = ?2 WHERE supply_id = ?3",
                params![fields.type_tag, fields.comments, id.0],
            )?;
            Ok(changed > 0)
        })
    }

    fn update_inquiry_message(
        &self,
        id: InquiryId,
        message: &str,
        deadline: Deadline,
    ) -> Result<bool> {
        self.guarded("update_inquiry_message", deadline, |conn| {
            let changed = conn.execute(
                "UPDATE Inquiry SET comments = ?1 WHERE inquiry_id = ?2",
                params![message, id.0],
            )?;
            Ok(changed > 0)
        })
    }

    fn insert_occupancy(
        &self,
        person: PersonId,
        location: LocationId,
        deadline: Deadline,
    ) -> Result<bool> {
        self.guarded("insert_occupancy", deadline, |conn| {
            let added = conn.execute(
                "INSERT OR IGNORE INTO PersonLocation (person_id, location_id) VALUES (?1, ?2)",
                params![person.0, location.0],
            )?;
            Ok(added > 0)
        })
    }

    fn delete_occupancy(
        &self,
        person: PersonId,
        location: LocationId,
        deadline: Deadline,
    ) -> Result<bool> {
        self.guarded("delete_occupancy", deadline, |conn| {
            let removed = conn.execute(
                "DELETE FROM PersonLocation WHERE person_id = ?1 AND location_id = ?2",
                params![person.0, location.0],
            )?;
            Ok(removed > 0)
        })
    }

    fn insert_allocation(&self, allocation: &AllocationRecord, deadline: Deadline) -> Result<bool> {
        let (person, location) = holder_columns(allocation.holder);
        self.guarded("insert_allocation", deadline, |conn| {
            let added = conn.execute(
                "INSERT INTO SupplyAllocation (supply_id, person_id, location_id, allocation_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    allocation.supply.0,
                    person,
                    location,
                    format_timestamp(allocation.allocated_at),
                ],
            )?;
            Ok(added > 0)
        })
    }

    fn transfer_allocation(
        &self,
        allocation: &AllocationRecord,
        deadline: Deadline,
    ) -> Result<bool> {
        let (person, location) = holder_columns(allocation.holder);
        self.guarded("transfer_allocation", deadline, |conn| {
            let tx = conn.unchecked_transaction()?;
            tx.execute(
                "DELETE FROM SupplyAllocation WHERE supply_id = ?1",
                params![allocation.supply.0],
            )?;
            let added = tx.execute(
                "INSERT INTO SupplyAllocation (supply_id, person_id, location_id, allocation_date)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    allocation.supply.0,
                    person,
                    location,
                    format_timestamp(allocation.allocated_at),
                ],
            )?;
            tx.commit()?;
            Ok(added > 0)
        })
    }

    fn delete_allocation(&self, supply: SupplyId, deadline: Deadline) -> Result<bool> {
        self.guarded("delete_allocation", deadline, |conn| {
            let removed = conn.execute(
                "DELETE FROM SupplyAllocation WHERE supply_id = ?1",
                params![supply.0],
            )?;
            Ok(removed > 0)
        })
    }

    fn delete_expired_water_allocations(
        &self,
        cutoff: DateTime<Utc>,
        deadline: Deadline,
    ) -> Result<usize> {
        self.guarded("delete_expired_water_allocations", deadline, |conn| {
            let tx = conn.unchecked_transaction()?;
            // Stored dates come in more than one format, so compare in Rust.
            let candidates: Vec<(i64, Option<String>)> = {
                let mut stmt = tx.prepare_cached(
                    "SELECT a.allocation_id, a.allocation_date
                     FROM SupplyAllocation a JOIN Supply s ON s.supply_id = a.supply_id
                     WHERE a.person_id IS NOT NULL AND lower(trim(s.type)) = 'water'",
                )?;
                let rows = stmt.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;
                rows.collect::<rusqlite::Result<_>>()?
            };
            let mut removed = 0;
            for (allocation_id, date) in candidates {
                let expired = date
                    .as_deref()
                    .and_then(parse_timestamp)
                    .is_some_and(|at| at < cutoff);
                if expired {
                    removed += tx.execute(
                        "DELETE FROM SupplyAllocation WHERE allocation_id = ?1",
                        params![allocation_id],
                    )?;
                }
            }
            tx.commit()?;
            Ok(removed)
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const SEED: &str = "
        INSERT INTO Location (location_id, name, address) VALUES (1, 'Shelter A', '1 Main St');
        INSERT INTO Supply (supply_id, type, comments) VALUES (1, 'water', NULL);
        INSERT INTO Supply (supply_id, type, comments) VALUES (2, 'Water', NULL);
        INSERT INTO Supply (supply_id, type, comments) VALUES (3, 'blanket', NULL);
    ";

    fn store() -> SqliteGateway {
        let gw = SqliteGateway::open_in_memory().expect("open");
        gw.import_sql(SEED).expect("seed");
        gw
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).single().expect("valid time")
    }

    fn new_person(first: &str) -> NewPerson {
        NewPerson {
            first_name: first.into(),
            last_name: "Test".into(),
            phone: "555-0100".into(),
            ..NewPerson::default()
        }
    }

    #[test]
    fn inserted_rows_come_back_in_snapshot() {
        let gw = store();
        let ana = gw.insert_person(&new_person("Ana"), Deadline::none()).expect("person");
        gw.insert_occupancy(ana, LocationId(1), Deadline::none()).expect("occupancy");
        assert!(!gw.insert_occupancy(ana, LocationId(1), Deadline::none()).expect("again"));
        gw.insert_inquiry(
            &NewInquiry {
                inquirer: None,
                seeking: ana,
                message: "Seen Ana?".into(),
            },
            Deadline::none(),
        )
        .expect("inquiry");

        let snap = gw.load_all(Deadline::none()).expect("load");
        assert_eq!(snap.persons.len(), 1);
        assert_eq!(snap.persons[0].first_name, "Ana");
        assert_eq!(snap.occupancy, vec![OccupancyRow { person_id: ana.0, location_id: 1 }]);
        assert_eq!(snap.inquiries[0].inquirer_id, None);
        assert_eq!(snap.supplies.len(), 3);
    }

    #[test]
    fn transfer_replaces_the_holder_row() {
        let gw = store();
        let ana = gw.insert_person(&new_person("Ana"), Deadline::none()).expect("person");
        let stock = AllocationRecord {
            supply: SupplyId(3),
            holder: Holder::Location(LocationId(1)),
            allocated_at: t0(),
        };
        gw.insert_allocation(&stock, Deadline::none()).expect("stock");
        assert!(gw.insert_allocation(&stock, Deadline::none()).is_err(), "supply_id is unique");

        let hand_out = AllocationRecord {
            holder: Holder::Person(ana),
            ..stock
        };
        assert!(gw.transfer_allocation(&hand_out, Deadline::none()).expect("transfer"));
        let snap = gw.load_all(Deadline::none()).expect("load");
        assert_eq!(snap.allocations.len(), 1);
        assert_eq!(snap.allocations[0].person_id, Some(ana.0));
        assert_eq!(snap.allocations[0].location_id, None);
        assert_eq!(snap.allocations[0].allocated_at, Some(t0()));
    }

    #[test]
    fn sweep_deletes_only_old_person_held_water() {
        let gw = store();
        let ana = gw.insert_person(&new_person("Ana"), Deadline::none()).expect("person");
        gw.import_sql(&format!(
            "INSERT INTO SupplyAllocation (supply_id, person_id, allocation_date)
                 VALUES (1, {ana}, '2025-04-01 08:00:00');
             INSERT INTO SupplyAllocation (supply_id, person_id, allocation_date)
                 VALUES (2, {ana}, '2025-04-02T13:00:00Z');
             INSERT INTO SupplyAllocation (supply_id, person_id, allocation_date)
                 VALUES (3, {ana}, '2025-03-01 08:00:00');",
            ana = ana.0
        ))
        .expect("allocations");

        let cutoff = t0() + chrono::Duration::hours(6);
        let removed = gw
            .delete_expired_water_allocations(cutoff, Deadline::none())
            .expect("sweep");
        assert_eq!(removed, 1, "old blanket and fresh water stay");
        let left: Vec<i64> = gw
            .load_all(Deadline::none())
            .expect("load")
            .allocations
            .iter()
            .map(|a| a.supply_id)
            .collect();
        assert_eq!(left, vec![2, 3]);
    }

    #[test]
    fn ensure_family_group_keeps_an_existing_row() {
        let gw = store();
        assert!(gw.ensure_family_group(FamilyGroupId(4), "Group 4", Deadline::none()).expect("add"));
        assert!(!gw.ensure_family_group(FamilyGroupId(4), "Other", Deadline::none()).expect("again"));
        let next = gw.insert_family_group("Smith", Deadline::none()).expect("insert");
        assert_eq!(next, FamilyGroupId(5));
        let groups = gw.load_all(Deadline::none()).expect("load").family_groups;
        assert_eq!(groups[0], FamilyGroupRow { id: 4, label: "Group 4".into() });
    }

    #[test]
    fn expired_deadline_is_a_timeout() {
        let gw = store();
        let past = Deadline::at(Instant::now());
        assert!(matches!(
            gw.load_all(past),
            Err(ReliefError::Timeout { operation: "load_all" })
        ));
        assert!(matches!(
            gw.insert_person(&new_person("Ana"), past),
            Err(ReliefError::Timeout { .. })
        ));
        assert!(gw.load_all(Deadline::none()).expect("load").persons.is_empty());
    }

    #[test]
    fn file_backed_store_backs_up_and_checks_integrity() {
        let dir = tempfile::tempdir().expect("tempdir");
        let gw = SqliteGateway::open(dir.path().join("relief.db"), &PersistenceConfig::default())
            .expect("open");
        gw.insert_person(&new_person("Ana"), Deadline::none()).expect("person");
        assert!(gw.integrity_check().expect("check"));

        let copy = dir.path().join("relief-backup.db");
        gw.backup(&copy).expect("backup");
        let restored = SqliteGateway::open(&copy, &PersistenceConfig::default()).expect("open copy");
        assert_eq!(restored.load_all(Deadline::none()).expect("load").persons.len(), 1);
    }

    #[test]
    fn timestamps_parse_in_both_stored_forms() {
        assert_eq!(parse_timestamp("2025-04-01 08:00:00"), Some(t0()));
        assert_eq!(parse_timestamp(&format_timestamp(t0())), Some(t0()));
        assert!(parse_timestamp("yesterday").is_none());
    }
}
