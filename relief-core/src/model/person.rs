//! Persons and their roles.
//!
//! One record per real individual. A person may be a victim, an inquirer,
//! or both at once; each role is an optional payload on the same record.

use serde::{Deserialize, Serialize};

use crate::types::{FamilyGroupId, PersonId, SupplyId};

/// Disaster-type tag used when none was recorded.
pub const UNKNOWN_DISASTER: &str = "Unknown";

/// Victim-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VictimRole {
    /// Disaster type or status tag.
    pub disaster_type: String,
}

impl Default for VictimRole {
    fn default() -> Self {
        Self {
            disaster_type: UNKNOWN_DISASTER.to_string(),
        }
    }
}

/// Inquirer-specific data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InquirerRole {
    /// Message of the most recent inquiry this person filed.
    pub inquiry_message: String,
}

/// A registered person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Row id, unique once assigned.
    pub id: PersonId,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone: String,
    /// Self-reported gender, if given.
    pub gender: Option<String>,
    /// ISO 8601 date of birth, if known.
    pub date_of_birth: Option<String>,
    /// The family group this person belongs to, if any.
    pub family_group: Option<FamilyGroupId>,
    /// Supplies allocated directly to this person.
    pub allocated_supplies: Vec<SupplyId>,
    /// Present when the person is a disaster victim.
    pub victim: Option<VictimRole>,
    /// Present when the person has filed at least one inquiry.
    pub inquirer: Option<InquirerRole>,
}

impl Person {
    /// Create a person with no roles, gender, birth date or supplies.
    #[must_use]
    pub fn new(
        id: PersonId,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone: phone.into(),
            gender: None,
            date_of_birth: None,
            family_group: None,
            allocated_supplies: Vec::new(),
            victim: None,
            inquirer: None,
        }
    }

    /// Attach a victim role.
    #[must_use]
    pub fn with_victim(mut self, disaster_type: impl Into<String>) -> Self {
        self.victim = Some(VictimRole {
            disaster_type: disaster_type.into(),
        });
        self
    }

    /// Attach an inquirer role.
    #[must_use]
    pub fn with_inquirer(mut self, inquiry_message: impl Into<String>) -> Self {
        self.inquirer = Some(InquirerRole {
            inquiry_message: inquiry_message.into(),
        });
        self
    }

    /// "First Last".
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    /// Whether this person carries a victim role.
    #[must_use]
    pub fn is_victim(&self) -> bool {
        self.victim.is_some()
    }

    /// Whether this person carries an inquirer role.
    #[must_use]
    pub fn is_inquirer(&self) -> bool {
        self.inquirer.is_some()
    }

    /// Record the message of a newly filed inquiry, adding the role if needed.
    pub fn record_inquiry(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.inquirer.as_mut() {
            Some(role) => role.inquiry_message = message,
            None => {
                self.inquirer = Some(InquirerRole {
                    inquiry_message: message,
                });
            }
        }
    }

    /// Whether `supply` is held by this person.
    #[must_use]
    pub fn holds(&self, supply: SupplyId) -> bool {
        self.allocated_supplies.contains(&supply)
    }
}

/// Field changes for [`Person`]; `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersonEdit {
    /// New given name.
    pub first_name: Option<String>,
    /// New family name.
    pub last_name: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New gender.
    pub gender: Option<String>,
    /// New ISO 8601 date of birth.
    pub date_of_birth: Option<String>,
}

impl PersonEdit {
    /// Whether the edit changes nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.phone.is_none()
            && self.gender.is_none()
            && self.date_of_birth.is_none()
    }

    /// Apply the edit to `person`.
    pub fn apply(&self, person: &mut Person) {
        if let Some(v) = &self.first_name {
            person.first_name.clone_from(v);
        }
        if let Some(v) = &self.last_name {
            person.last_name.clone_from(v);
        }
        if let Some(v) = &self.phone {
            person.phone.clone_from(v);
        }
        if let Some(v) = &self.gender {
            person.gender = Some(v.clone());
        }
        if let Some(v) = &self.date_of_birth {
            person.date_of_birth = Some(v.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_record_can_carry_both_roles() {
        let p = Person::new(PersonId(1), "Ana", "Diaz", "555-0100")
            .with_victim("Flood")
            .with_inquirer("Looking for my brother");
        assert!(p.is_victim());
        assert!(p.is_inquirer());
        assert_eq!(p.full_name(), "Ana Diaz");
    }

    #[test]
    fn record_inquiry_adds_role_once() {
        let mut p = Person::new(PersonId(1), "Ana", "Diaz", "555-0100").with_victim("Flood");
        p.record_inquiry("first");
        p.record_inquiry("second");
        assert_eq!(
            p.inquirer.as_ref().map(|r| r.inquiry_message.as_str()),
            Some("second")
        );
        assert!(p.is_victim());
    }

    #[test]
    fn edit_only_touches_given_fields() {
        let mut p = Person::new(PersonId(1), "Ana", "Diaz", "555-0100");
        let edit = PersonEdit {
            phone: Some("555-0199".into()),
            date_of_birth: Some("1990-04-02".into()),
            ..PersonEdit::default()
        };
        edit.apply(&mut p);
        assert_eq!(p.phone, "555-0199");
        assert_eq!(p.first_name, "Ana");
        assert_eq!(p.date_of_birth.as_deref(), Some("1990-04-02"));
        assert!(PersonEdit::default().is_empty());
    }
}
