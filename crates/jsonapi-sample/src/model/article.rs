use super::slugify;
use jsonapi_framework::store::StoredDocument;
use jsonapi_framework::{Document, ResourceError};
use serde::{Deserialize, Serialize};

/// A published article. Identified by the slug of its title.
///
/// `author` references an [`Author`](super::Author) handle and `featured` lists
/// the [`Widget`](super::Widget)s the article showcases.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub author: Option<String>,
    pub featured: Vec<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArticleDraft {
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub featured: Vec<u64>,
}

impl ArticleDraft {
    pub fn slug(&self) -> String {
        slugify(&self.title)
    }
}

impl Document for Article {
    type Id = String;
    const NAME: &'static str = "article";

    fn id(&self) -> String {
        self.id.clone()
    }
}

impl StoredDocument for Article {
    type Draft = ArticleDraft;

    fn from_draft(id: String, draft: ArticleDraft) -> Result<Self, Vec<ResourceError>> {
        let mut errors = Vec::new();
        if id.is_empty() {
            errors.push(ResourceError::invalid("title", "needs at least one letter or digit"));
        }
        if draft.author.as_deref() == Some("") {
            errors.push(ResourceError::invalid("author", "must not be empty when given"));
        }
        if !errors.is_empty() {
            return Err(errors);
        }
        Ok(Self {
            id,
            title: draft.title,
            author: draft.author,
            featured: draft.featured,
        })
    }
}
