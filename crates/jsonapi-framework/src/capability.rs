//! # Capabilities
//!
//! A resource is not one monolithic interface. Each operation the API can route
//! to is its own trait, and a resource registers only the ones it supports:
//!
//! | Capability | Route |
//! |------------|-------|
//! | [`Getter`] | `GET /{collection}/{ids}` |
//! | [`Queryer`] | `GET /{collection}?k=v` |
//! | [`Creator`] | `POST /{collection}` |
//! | [`Setter`] | `PUT /{collection}/{id}` |
//! | [`Deleter`] | `DELETE /{collection}/{id}` |
//!
//! Relation declaration, the last capability, lives in
//! [`RelationTable`](crate::relation::RelationTable): it names each relation,
//! how to read the referenced ids out of a document, and which [`Getter`] serves
//! the target.
//!
//! Capabilities are checked once, when a
//! [`ResourceRegistration`](crate::handler::ResourceRegistration) is built, and
//! stored as trait objects. Requests never re-inspect them.

use crate::document::{Document, IdOf};
use crate::error::ResourceError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::fmt::Debug;
use std::sync::Arc;

/// Fetch documents by identifier.
///
/// Implementations may return fewer documents than requested (unknown ids are
/// skipped) and in any order.
#[async_trait]
pub trait Getter: Send + Sync + 'static {
    type Doc: Document;

    async fn get(&self, ids: &[IdOf<Self::Doc>]) -> Result<Vec<Self::Doc>, ResourceError>;
}

// Lets one getter back both a resource route and several relations.
#[async_trait]
impl<G: Getter> Getter for Arc<G> {
    type Doc = G::Doc;

    async fn get(&self, ids: &[IdOf<Self::Doc>]) -> Result<Vec<Self::Doc>, ResourceError> {
        self.as_ref().get(ids).await
    }
}

/// Create a document from a client supplied candidate.
#[async_trait]
pub trait Creator: Send + Sync + 'static {
    type Doc: Document;
    type Candidate: DeserializeOwned + Debug + Send + 'static;

    /// Every validation failure is reported, not just the first.
    async fn create(&self, candidate: Self::Candidate) -> Result<Self::Doc, Vec<ResourceError>>;
}

/// Replace the document stored under an identifier.
#[async_trait]
pub trait Setter: Send + Sync + 'static {
    type Doc: Document;
    type Value: DeserializeOwned + Debug + Send + 'static;

    async fn set(&self, id: IdOf<Self::Doc>, value: Self::Value) -> Result<(), Vec<ResourceError>>;
}

/// Remove a document.
#[async_trait]
pub trait Deleter: Send + Sync + 'static {
    type Doc: Document;

    async fn delete(&self, id: IdOf<Self::Doc>) -> Result<(), ResourceError>;
}

/// A query object populated from URL parameters.
pub trait QueryObject: Send + 'static {
    /// Applies one `key=value` pair. The returned message is shown to the client.
    fn set_param(&mut self, key: &str, value: &str) -> Result<(), String>;
}

/// Free-form filtering. The query object is opaque to the API layer.
#[async_trait]
pub trait Queryer: Send + Sync + 'static {
    type Doc: Document;
    type Query: QueryObject;

    fn new_query(&self) -> Self::Query;

    async fn query(&self, query: Self::Query) -> Result<Vec<Self::Doc>, ResourceError>;
}
