//! # JSON:API Framework
//!
//! Serves typed resources as compound documents: a primary payload, the
//! documents it references ("linked"), and the metadata of each relation
//! ("links"). Failures of any kind are answered with a uniform error envelope.
//!
//! ## Architecture Overview
//!
//! A request flows through a fixed pipeline:
//!
//! 1. **Identifier Codec** ([`ids`]) turns `1,2,0x1F` into typed ids.
//! 2. **Capability Model** ([`capability`]) fetches the primary documents through
//!    the resource's [`Getter`].
//! 3. **Relation Extractor** ([`relation`]) knows, from a table declared once at
//!    registration, which ids each document references and where to fetch them.
//! 4. **Batch Fetcher** ([`include`]) collects and deduplicates those ids and
//!    issues exactly one `get` per relation.
//! 5. **Compound Document Assembler** ([`compound`]) builds the response body.
//! 6. **Error Collector** ([`Api::handle`]) turns any failure along the way into
//!    an [`ErrorEnvelope`], never mixed with a partial success.
//!
//! ## Capabilities, not a monolithic trait
//!
//! A resource registers only what it supports. Routes for capabilities it did
//! not register answer `405`. Every capability is an `#[async_trait]` trait:
//! [`Getter`], [`Creator`], [`Setter`], [`Deleter`], [`Queryer`].
//!
//! ## Example
//!
//! ```rust
//! use jsonapi_framework::store::{spawn_store, StoredDocument};
//! use jsonapi_framework::{Api, ApiConfig, ApiRequest, Document, RelationTable, ResourceError};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Clone, Debug, Serialize)]
//! struct User { id: u64, name: String }
//! #[derive(Debug, Deserialize)]
//! struct UserDraft { name: String }
//!
//! impl Document for User {
//!     type Id = u64;
//!     const NAME: &'static str = "user";
//!     fn id(&self) -> u64 { self.id }
//! }
//! impl StoredDocument for User {
//!     type Draft = UserDraft;
//!     fn from_draft(id: u64, d: UserDraft) -> Result<Self, Vec<ResourceError>> {
//!         Ok(User { id, name: d.name })
//!     }
//! }
//!
//! #[derive(Clone, Debug, Serialize)]
//! struct Widget { id: u64, owner: Option<u64> }
//! #[derive(Debug, Deserialize)]
//! struct WidgetDraft { owner: Option<u64> }
//!
//! impl Document for Widget {
//!     type Id = u64;
//!     const NAME: &'static str = "widget";
//!     fn id(&self) -> u64 { self.id }
//! }
//! impl StoredDocument for Widget {
//!     type Draft = WidgetDraft;
//!     fn from_draft(id: u64, d: WidgetDraft) -> Result<Self, Vec<ResourceError>> {
//!         Ok(Widget { id, owner: d.owner })
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (_users_task, users) = spawn_store::<User>(8, |_| 0);
//!     let (_widgets_task, widgets) = spawn_store::<Widget>(8, |_| 0);
//!     users.insert(User { id: 10, name: "ada".into() }).await.unwrap();
//!     widgets.insert(Widget { id: 1, owner: Some(10) }).await.unwrap();
//!     widgets.insert(Widget { id: 2, owner: Some(10) }).await.unwrap();
//!
//!     let mut api = Api::new(ApiConfig::default());
//!     api.register(users.registration()).unwrap();
//!     api.register(
//!         widgets
//!             .registration()
//!             .relations(RelationTable::new().to_one("owner", |w: &Widget| w.owner, users)),
//!     )
//!     .unwrap();
//!
//!     let response = api.handle(ApiRequest::get("/widgets/1,2")).await;
//!     let body = response.body.unwrap();
//!     assert_eq!(response.status, 200);
//!     assert_eq!(body["widgets"].as_array().unwrap().len(), 2);
//!     assert_eq!(body["linked"]["owner"][0]["name"], "ada");
//!     assert_eq!(body["links"]["owner"]["type"], "users");
//!
//!     let response = api.handle(ApiRequest::get("/widgets/abc")).await;
//!     assert_eq!(response.status, 400);
//! }
//! ```
//!
//! ## Concurrency Model
//!
//! - Registration happens once, before serving; the [`Api`] is read-only afterwards
//!   and can be shared across tasks behind an `Arc`.
//! - Independent relations of one request may be fetched concurrently
//!   ([`ApiConfig::concurrent_includes`]); each keeps its own error path.
//! - The [`store`] module's actors process their requests sequentially, without locks.
//!
//! ## Testing
//!
//! [`mock::MockGetter`] scripts a [`Getter`] and records every call, which is how
//! the "one fetch per relation" guarantee is tested.

pub mod capability;
pub mod compound;
pub mod config;
pub mod document;
pub mod error;
pub mod handler;
pub mod ids;
pub mod include;
pub mod mock;
pub mod relation;
pub mod store;
pub mod tracing;

// Re-export core types for convenience
pub use capability::{Creator, Deleter, Getter, QueryObject, Queryer, Setter};
pub use compound::{CompoundDocument, LinkObject, Primary, PrimaryShape};
pub use config::ApiConfig;
pub use document::{collection_name, pluralize, Document, IdOf};
pub use error::{ApiError, BoxError, ConfigError, ErrorEnvelope, ErrorObject, ResourceError};
pub use handler::{Api, ApiRequest, ApiResponse, Method, RegisteredResource, ResourceRegistration};
pub use ids::{parse_ids, IdKind, Identifier, ResourceId};
pub use include::{include_relations, Included, IncludedCollection};
pub use relation::{Cardinality, Relation, RelationDescriptor, RelationTable, Relations};
