//! Medical records.
//!
//! The treatment date is the one invariant checked inside the model: it must
//! be an ISO 8601 date (or date-time) whose year is at least 1900.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{ReliefError, Result};
use crate::types::{LocationId, MedicalRecordId};

/// Earliest accepted treatment year.
pub const MIN_TREATMENT_YEAR: i32 = 1900;

/// Parse and range-check a treatment date.
///
/// # Errors
///
/// Returns [`ReliefError::InvalidDate`] if `value` is not ISO 8601 or its
/// year is below [`MIN_TREATMENT_YEAR`].
pub fn parse_treatment_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive()))
        .or_else(|| {
            NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f")
                .ok()
                .map(|dt| dt.date())
        })
        .ok_or_else(|| ReliefError::invalid_date(value, "expected YYYY-MM-DD"))?;

    if date.year() < MIN_TREATMENT_YEAR {
        return Err(ReliefError::invalid_date(
            value,
            format!("year must be {MIN_TREATMENT_YEAR} or later"),
        ));
    }
    Ok(date)
}

/// A medical treatment record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MedicalRecord {
    /// Row id.
    pub id: MedicalRecordId,
    /// Where treatment happened; `None` if the location is unknown.
    pub location: Option<LocationId>,
    /// What was done.
    pub treatment_details: String,
    date_of_treatment: NaiveDate,
}

impl MedicalRecord {
    /// Create a record, validating the treatment date.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::InvalidDate`] for a malformed or pre-1900 date.
    pub fn new(
        id: MedicalRecordId,
        location: Option<LocationId>,
        treatment_details: impl Into<String>,
        date_of_treatment: &str,
    ) -> Result<Self> {
        let date_of_treatment = parse_treatment_date(date_of_treatment)?;
        Ok(Self {
            id,
            location,
            treatment_details: treatment_details.into(),
            date_of_treatment,
        })
    }

    /// Treatment date as `YYYY-MM-DD`.
    #[must_use]
    pub fn date_of_treatment(&self) -> String {
        self.date_of_treatment.format("%Y-%m-%d").to_string()
    }

    /// Change the treatment date. On error the record is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`ReliefError::InvalidDate`] for a malformed or pre-1900 date.
    pub fn set_date_of_treatment(&mut self, value: &str) -> Result<()> {
        self.date_of_treatment = parse_treatment_date(value)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> Result<MedicalRecord> {
        MedicalRecord::new(MedicalRecordId(1), Some(LocationId(1)), "Flu treatment", date)
    }

    #[test]
    fn year_1899_is_rejected() {
        assert!(matches!(
            record("1899-12-31"),
            Err(ReliefError::InvalidDate { .. })
        ));
    }

    #[test]
    fn year_1900_is_accepted() {
        let rec = record("1900-01-01").expect("valid date");
        assert_eq!(rec.date_of_treatment(), "1900-01-01");
    }

    #[test]
    fn malformed_dates_are_rejected() {
        for bad in ["2025/04/01", "April 1 2025", "2025-13-01", "2025-02-30", ""] {
            assert!(record(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn timestamps_keep_their_calendar_date() {
        assert_eq!(
            record("2025-04-01 13:45:00").expect("sql timestamp").date_of_treatment(),
            "2025-04-01"
        );
        assert_eq!(
            record("2025-04-01T13:45:00Z").expect("rfc3339").date_of_treatment(),
            "2025-04-01"
        );
    }

    #[test]
    fn failed_setter_leaves_record_unchanged() {
        let mut rec = record("2024-06-30").expect("valid date");
        assert!(rec.set_date_of_treatment("1850-01-01").is_err());
        assert!(rec.set_date_of_treatment("not a date").is_err());
        assert_eq!(rec.date_of_treatment(), "2024-06-30");
        rec.set_date_of_treatment("2024-07-01").expect("valid date");
        assert_eq!(rec.date_of_treatment(), "2024-07-01");
    }
}
