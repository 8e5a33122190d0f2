use super::slugify;
use jsonapi_framework::store::StoredDocument;
use jsonapi_framework::{Document, ResourceError};
use serde::{Deserialize, Serialize};

/// A label attached to widgets. Identified by the slug of its label.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tag {
    pub id: String,
    pub label: String,
    pub color: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagDraft {
    pub label: String,
    pub color: String,
}

impl TagDraft {
    /// The id a tag created from this draft is stored under.
    pub fn slug(&self) -> String {
        slugify(&self.label)
    }
}

impl Document for Tag {
    type Id = String;
    const NAME: &'static str = "tag";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl StoredDocument for Tag {
    type Draft = TagDraft;

    fn from_draft(id: String, draft: TagDraft) -> Result<Self, Vec<ResourceError>> {
        let mut errors = Vec::new();
        if id.is_empty() {
            errors.push(ResourceError::invalid("label", "needs at least one letter or digit"));
        }
        let hex = draft.color.strip_prefix('#').unwrap_or_default();
        if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            errors.push(ResourceError::invalid("color", "must look like #rgb or #rrggbb"));
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            id,
            label: draft.label,
            color: draft.color.to_lowercase(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(label: &str, color: &str) -> TagDraft {
        TagDraft {
            label: label.to_string(),
            color: color.to_string(),
        }
    }

    #[test]
    fn test_from_draft() {
        let d = draft("Needs Review", "#FA0");
        let tag = Tag::from_draft(d.slug(), d).unwrap();
        assert_eq!(tag.id, "needs-review");
        assert_eq!(tag.color, "#fa0");
    }

    #[test]
    fn test_from_draft_reports_every_problem() {
        let d = draft("???", "red");
        let errors = Tag::from_draft(d.slug(), d).unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
