//! Family groups: a labelled set of persons with no personal attributes.

use serde::{Deserialize, Serialize};

use crate::types::{FamilyGroupId, PersonId};

/// A family group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FamilyGroup {
    /// Row id.
    pub id: FamilyGroupId,
    /// Display label (usually the family name).
    pub label: String,
    members: Vec<PersonId>,
}

impl FamilyGroup {
    /// Create an empty group.
    #[must_use]
    pub fn new(id: FamilyGroupId, label: impl Into<String>) -> Self {
        Self {
            id,
            label: label.into(),
            members: Vec::new(),
        }
    }

    /// Placeholder for a group referenced by a person row but never stored.
    #[must_use]
    pub fn placeholder(id: FamilyGroupId) -> Self {
        Self::new(id, format!("Group {}", id.0))
    }

    /// Add a member. `None` and existing members are ignored.
    ///
    /// Returns whether the member list changed.
    pub fn add_member(&mut self, member: Option<PersonId>) -> bool {
        match member {
            Some(id) if !self.members.contains(&id) => {
                self.members.push(id);
                true
            }
            _ => false,
        }
    }

    /// Remove a member. Returns whether the member list changed.
    pub fn remove_member(&mut self, member: PersonId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| *m != member);
        self.members.len() != before
    }

    /// Members in insertion order.
    #[must_use]
    pub fn members(&self) -> &[PersonId] {
        &self.members
    }

    /// Whether `person` belongs to this group.
    #[must_use]
    pub fn contains(&self, person: PersonId) -> bool {
        self.members.contains(&person)
    }

    /// Number of members.
    #[must_use]
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove_returns_to_empty() {
        let mut g = FamilyGroup::new(FamilyGroupId(1), "Diaz");
        assert_eq!(g.size(), 0);
        assert!(g.add_member(Some(PersonId(10))));
        assert_eq!(g.size(), 1);
        assert!(g.remove_member(PersonId(10)));
        assert_eq!(g.size(), 0);
    }

    #[test]
    fn adding_none_is_a_no_op() {
        let mut g = FamilyGroup::new(FamilyGroupId(1), "Diaz");
        g.add_member(Some(PersonId(10)));
        assert!(!g.add_member(None));
        assert_eq!(g.size(), 1);
    }

    #[test]
    fn duplicate_member_is_ignored() {
        let mut g = FamilyGroup::new(FamilyGroupId(1), "Diaz");
        g.add_member(Some(PersonId(10)));
        assert!(!g.add_member(Some(PersonId(10))));
        assert_eq!(g.members(), &[PersonId(10)]);
    }

    #[test]
    fn removing_stranger_changes_nothing() {
        let mut g = FamilyGroup::new(FamilyGroupId(1), "Diaz");
        assert!(!g.remove_member(PersonId(99)));
    }

    #[test]
    fn placeholder_label_names_the_id() {
        assert_eq!(FamilyGroup::placeholder(FamilyGroupId(4)).label, "Group 4");
    }
}
