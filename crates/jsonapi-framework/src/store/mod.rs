//! # Actor-Backed Store
//!
//! An in-memory resource store that implements every capability, so a resource
//! can be served without writing any persistence code.
//!
//! The store is split the usual actor way:
//!
//! - [`StoreActor`] owns a `BTreeMap` of documents and processes requests one at
//!   a time in its own task. No locks are involved.
//! - [`StoreClient`] is a cheap, cloneable handle that sends [`StoreRequest`]s
//!   and awaits the reply. It implements [`Getter`](crate::Getter),
//!   [`Creator`](crate::Creator), [`Setter`](crate::Setter),
//!   [`Deleter`](crate::Deleter) and [`Queryer`](crate::Queryer).
//!
//! ```rust
//! use jsonapi_framework::store::{spawn_store, StoredDocument};
//! use jsonapi_framework::{Document, Getter, ResourceError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize)]
//! struct Note { id: u64, text: String }
//!
//! #[derive(Debug, Deserialize)]
//! struct NoteDraft { text: String }
//!
//! impl Document for Note {
//!     type Id = u64;
//!     const NAME: &'static str = "note";
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! impl StoredDocument for Note {
//!     type Draft = NoteDraft;
//!     fn from_draft(id: u64, draft: NoteDraft) -> Result<Self, Vec<ResourceError>> {
//!         Ok(Note { id, text: draft.text })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut next = 0;
//!     let (handle, notes) = spawn_store::<Note>(8, move |_| { next += 1; next });
//!
//!     notes.insert(Note { id: 7, text: "hello".into() }).await.unwrap();
//!     let found = notes.get(&[7, 8]).await.unwrap();
//!     assert_eq!(found.len(), 1);
//!
//!     drop(notes);
//!     handle.await.unwrap();
//! }
//! ```

mod actor;
mod client;
mod message;

pub use actor::StoreActor;
pub use client::StoreClient;
pub use message::{Response, StoreRequest, Validated};

use crate::capability::QueryObject;
use crate::document::{Document, IdOf};
use crate::error::ResourceError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;
use tokio::task::JoinHandle;

/// A document the store can build from a client supplied draft.
pub trait StoredDocument: Document + Debug {
    /// Payload accepted by create and set.
    type Draft: DeserializeOwned + Debug + Send + 'static;

    /// Builds the document stored under `id`, reporting every validation failure.
    fn from_draft(id: IdOf<Self>, draft: Self::Draft) -> Result<Self, Vec<ResourceError>>;
}

/// Creates a store, spawns its actor, and returns the task handle with a client.
///
/// `next_id` picks the identifier of each created document.
pub fn spawn_store<D: StoredDocument>(
    buffer: usize,
    next_id: impl FnMut(&D::Draft) -> IdOf<D> + Send + 'static,
) -> (JoinHandle<()>, StoreClient<D>) {
    let (actor, client) = StoreActor::new(buffer, next_id);
    (tokio::spawn(actor.run()), client)
}

/// Query object for [`StoreClient`].
///
/// Every parameter except `limit` is an equality filter on a top-level field of
/// the document's JSON form. Array fields match when any element matches.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreQuery {
    filters: Vec<(String, String)>,
    limit: Option<usize>,
}

impl StoreQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<String>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn max_results(&self) -> Option<usize> {
        self.limit
    }

    /// Whether `document` passes every filter.
    pub fn matches<D: Serialize>(&self, document: &D) -> bool {
        if self.filters.is_empty() {
            return true;
        }
        let Ok(Value::Object(fields)) = serde_json::to_value(document) else {
            return false;
        };
        self.filters.iter().all(|(field, expected)| {
            fields
                .get(field)
                .is_some_and(|actual| value_matches(actual, expected))
        })
    }
}

impl QueryObject for StoreQuery {
    fn set_param(&mut self, key: &str, value: &str) -> Result<(), String> {
        if key == "limit" {
            let limit = value
                .parse()
                .map_err(|_| format!("limit must be a non-negative integer, got {value:?}"))?;
            self.limit = Some(limit);
        } else if key.is_empty() {
            return Err("filter name must not be empty".to_string());
        } else {
            self.filters.push((key.to_string(), value.to_string()));
        }
        Ok(())
    }
}

fn value_matches(actual: &Value, expected: &str) -> bool {
    match actual {
        Value::String(s) => s == expected,
        Value::Null => expected == "null",
        Value::Array(items) => items.iter().any(|item| value_matches(item, expected)),
        Value::Object(_) => false,
        other => other.to_string() == expected,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_param() {
        let mut query = StoreQuery::new();
        query.set_param("color", "red").unwrap();
        query.set_param("limit", "2").unwrap();

        assert_eq!(query, StoreQuery::new().filter("color", "red").limit(2));
        assert!(query.set_param("limit", "-1").is_err());
        assert!(query.set_param("", "x").is_err());
    }

    #[test]
    fn test_matches_scalar_and_array_fields() {
        let doc = json!({ "id": 3, "color": "red", "tags": ["a", "b"], "owner": null, "active": true });

        assert!(StoreQuery::new().matches(&doc));
        assert!(StoreQuery::new().filter("color", "red").matches(&doc));
        assert!(StoreQuery::new().filter("id", "3").matches(&doc));
        assert!(StoreQuery::new().filter("tags", "b").matches(&doc));
        assert!(StoreQuery::new().filter("owner", "null").matches(&doc));
        assert!(StoreQuery::new().filter("active", "true").matches(&doc));
        assert!(!StoreQuery::new().filter("color", "blue").matches(&doc));
        assert!(!StoreQuery::new().filter("missing", "x").matches(&doc));
    }
}
