use jsonapi_framework::store::StoredDocument;
use jsonapi_framework::{Document, ResourceError};
use serde::{Deserialize, Serialize};

/// A widget, optionally owned by a [`User`](super::User) and labelled with [`Tag`](super::Tag)s.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Widget {
    pub id: u64,
    pub name: String,
    pub owner: Option<u64>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WidgetDraft {
    pub name: String,
    #[serde(default)]
    pub owner: Option<u64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Widget {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            owner: None,
            tags: Vec::new(),
        }
    }

    pub fn owned_by(mut self, owner: u64) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn tagged(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

impl Document for Widget {
    type Id = u64;
    const NAME: &'static str = "widget";

    fn id(&self) -> u64 {
        self.id
    }
}

impl StoredDocument for Widget {
    type Draft = WidgetDraft;

    fn from_draft(id: u64, draft: WidgetDraft) -> Result<Self, Vec<ResourceError>> {
        let mut errors = Vec::new();
        if draft.name.trim().is_empty() {
            errors.push(ResourceError::invalid("name", "must not be empty"));
        }
        if let Some(tag) = draft.tags.iter().find(|t| t.is_empty()) {
            errors.push(ResourceError::invalid("tags", format!("invalid tag {tag:?}")));
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            id,
            name: draft.name,
            owner: draft.owner,
            tags: draft.tags,
        })
    }
}
