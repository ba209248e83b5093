//! Inquiries about missing persons.

use serde::{Deserialize, Serialize};

use crate::types::{InquiryId, PersonId};

/// Who filed an inquiry.
///
/// An inquiry always has an inquirer. Rows stored without one were filed by
/// someone outside the registry and load as [`InquirerRef::Untracked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InquirerRef {
    /// A person registered in the graph.
    Registered(PersonId),
    /// An external inquirer with no person record.
    Untracked,
}

impl InquirerRef {
    /// Build from a nullable stored inquirer id.
    #[must_use]
    pub fn from_row(inquirer_id: Option<i64>) -> Self {
        inquirer_id.map_or(Self::Untracked, |id| Self::Registered(PersonId(id)))
    }

    /// The registered person, if any.
    #[must_use]
    pub fn person(self) -> Option<PersonId> {
        match self {
            Self::Registered(id) => Some(id),
            Self::Untracked => None,
        }
    }
}

/// An inquiry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inquiry {
    /// Row id.
    pub id: InquiryId,
    /// Who asked.
    pub inquirer: InquirerRef,
    /// Free-text message.
    pub message: String,
    /// The person being sought. May not be loaded yet.
    pub seeking: PersonId,
    /// When the inquiry was made, as stored.
    pub date: Option<String>,
}

impl Inquiry {
    /// Create an inquiry.
    #[must_use]
    pub fn new(
        id: InquiryId,
        inquirer: InquirerRef,
        message: impl Into<String>,
        seeking: PersonId,
    ) -> Self {
        Self {
            id,
            inquirer,
            message: message.into(),
            seeking,
            date: None,
        }
    }

    /// Attach the stored inquiry date.
    #[must_use]
    pub fn with_date(mut self, date: Option<String>) -> Self {
        self.date = date;
        self
    }
}

/// Display-ready inquiry with names resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InquiryView {
    /// The inquiry id.
    pub id: InquiryId,
    /// Inquirer's full name, or `"External"`.
    pub inquirer_name: String,
    /// Sought person's full name.
    pub seeking_name: String,
    /// The message.
    pub message: String,
}
