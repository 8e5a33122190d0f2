//! Authors come from a fixed directory rather than a store. The directory only
//! supports lookups and queries, so authors cannot be created, changed or
//! deleted through the API.

use async_trait::async_trait;
use jsonapi_framework::{Document, Getter, QueryObject, Queryer, ResourceError};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    /// Handle, e.g. `"ada"`.
    pub id: String,
    pub name: String,
}

impl Author {
    pub fn new(handle: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: handle.into(),
            name: name.into(),
        }
    }
}

impl Document for Author {
    type Id = String;
    const NAME: &'static str = "author";

    fn id(&self) -> String {
        self.id.clone()
    }
}

/// Read-only author lookup. Clones share the same directory.
#[derive(Debug, Clone, Default)]
pub struct AuthorDirectory {
    authors: Arc<BTreeMap<String, Author>>,
}

impl AuthorDirectory {
    pub fn new(authors: impl IntoIterator<Item = Author>) -> Self {
        Self {
            authors: Arc::new(
                authors
                    .into_iter()
                    .map(|author| (author.id.clone(), author))
                    .collect(),
            ),
        }
    }

    pub fn len(&self) -> usize {
        self.authors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.authors.is_empty()
    }
}

#[async_trait]
impl Getter for AuthorDirectory {
    type Doc = Author;

    async fn get(&self, ids: &[String]) -> Result<Vec<Author>, ResourceError> {
        let found: Vec<Author> = ids
            .iter()
            .filter_map(|id| self.authors.get(id).cloned())
            .collect();
        debug!(resource = "author", count = ids.len(), found = found.len(), "Get");
        Ok(found)
    }
}

/// `?name=<text>` matches authors whose name contains `text`, ignoring case.
#[derive(Debug, Clone, Default)]
pub struct AuthorQuery {
    name: Option<String>,
}

impl QueryObject for AuthorQuery {
    fn set_param(&mut self, key: &str, value: &str) -> Result<(), String> {
        match key {
            "name" => {
                self.name = Some(value.to_lowercase());
                Ok(())
            }
            other => Err(format!("authors cannot be filtered by {other:?}")),
        }
    }
}

#[async_trait]
impl Queryer for AuthorDirectory {
    type Doc = Author;
    type Query = AuthorQuery;

    fn new_query(&self) -> AuthorQuery {
        AuthorQuery::default()
    }

    async fn query(&self, query: AuthorQuery) -> Result<Vec<Author>, ResourceError> {
        Ok(self
            .authors
            .values()
            .filter(|author| {
                query
                    .name
                    .as_ref()
                    .map_or(true, |needle| author.name.to_lowercase().contains(needle))
            })
            .cloned()
            .collect())
    }
}
