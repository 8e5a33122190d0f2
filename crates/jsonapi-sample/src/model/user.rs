use jsonapi_framework::store::StoredDocument;
use jsonapi_framework::{Document, ResourceError};
use serde::{Deserialize, Serialize};

/// Represents a registered user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
}

/// Payload for creating or replacing a user.
#[derive(Debug, Clone, Deserialize)]
pub struct UserDraft {
    pub name: String,
    pub email: String,
}

impl User {
    pub fn new(id: u64, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
        }
    }
}

impl Document for User {
    type Id = u64;
    const NAME: &'static str = "user";

    fn id(&self) -> u64 {
        self.id
    }
}

impl StoredDocument for User {
    type Draft = UserDraft;

    fn from_draft(id: u64, draft: UserDraft) -> Result<Self, Vec<ResourceError>> {
        let mut errors = Vec::new();
        if draft.name.trim().is_empty() {
            errors.push(ResourceError::invalid("name", "must not be empty"));
        }
        if !draft.email.contains('@') {
            errors.push(ResourceError::invalid("email", "must contain '@'"));
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self::new(id, draft.name, draft.email))
    }
}
