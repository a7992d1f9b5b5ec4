//! Author model

use serde::{Deserialize, Serialize};

/// Author entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    /// Unique identifier, assigned by the database
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
}

/// Input for creating an author
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAuthorInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
}

impl CreateAuthorInput {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }
}

/// Partial update for an author; `None` leaves the stored value untouched
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAuthorInput {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
}

impl UpdateAuthorInput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_name(mut self, first_name: impl Into<String>) -> Self {
        self.first_name = Some(first_name.into());
        self
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Check if any field is set
    pub fn has_changes(&self) -> bool {
        self.first_name.is_some() || self.last_name.is_some() || self.email.is_some()
    }

    /// Apply the set fields on top of an existing author
    pub fn apply_to(&self, author: &Author) -> Author {
        Author {
            id: author.id,
            first_name: self
                .first_name
                .clone()
                .unwrap_or_else(|| author.first_name.clone()),
            last_name: self
                .last_name
                .clone()
                .unwrap_or_else(|| author.last_name.clone()),
            email: self.email.clone().unwrap_or_else(|| author.email.clone()),
        }
    }
}

impl From<CreateAuthorInput> for UpdateAuthorInput {
    fn from(input: CreateAuthorInput) -> Self {
        Self {
            first_name: Some(input.first_name),
            last_name: Some(input.last_name),
            email: Some(input.email),
        }
    }
}
