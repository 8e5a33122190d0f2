//! Resource registration and the per-resource request pipeline.
//!
//! A [`ResourceRegistration`] collects the capabilities one resource type
//! supports. [`build`](ResourceRegistration::build) validates them once and
//! freezes them into a [`RegisteredResource`], whose capabilities are plain
//! trait objects from then on. Typed payloads (create candidates, set values,
//! query objects) are erased behind small JSON adapters at the same moment.

use super::request::{ApiRequest, ApiResponse, Method};
use crate::capability::{Creator, Deleter, Getter, QueryObject, Queryer, Setter};
use crate::compound::{CompoundDocument, PrimaryShape};
use crate::config::ApiConfig;
use crate::document::{collection_name, Document, IdOf};
use crate::error::{ApiError, ConfigError};
use crate::ids::parse_ids;
use crate::include::{include_relations, IncludedCollection};
use crate::relation::{RelationDescriptor, RelationTable, Relations};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use tracing::debug;

#[async_trait]
trait CreateJson<D: Document>: Send + Sync {
    async fn create_json(&self, resource: &str, body: Value) -> Result<D, ApiError>;
}

#[async_trait]
impl<C: Creator> CreateJson<C::Doc> for C {
    async fn create_json(&self, resource: &str, body: Value) -> Result<C::Doc, ApiError> {
        let candidate: C::Candidate =
            serde_json::from_value(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
        debug!(resource, ?candidate, "Create");
        self.create(candidate)
            .await
            .map_err(|errors| ApiError::Rejected {
                resource: resource.to_string(),
                errors,
            })
    }
}

#[async_trait]
trait SetJson<D: Document>: Send + Sync {
    async fn set_json(&self, resource: &str, id: IdOf<D>, body: Value) -> Result<(), ApiError>;
}

#[async_trait]
impl<S: Setter> SetJson<S::Doc> for S {
    async fn set_json(
        &self,
        resource: &str,
        id: IdOf<S::Doc>,
        body: Value,
    ) -> Result<(), ApiError> {
        let value: S::Value =
            serde_json::from_value(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;
        debug!(resource, %id, ?value, "Set");
        self.set(id, value)
            .await
            .map_err(|errors| ApiError::Rejected {
                resource: resource.to_string(),
                errors,
            })
    }
}

#[async_trait]
trait QueryParams<D: Document>: Send + Sync {
    async fn query_params(
        &self,
        resource: &str,
        params: &[(String, String)],
    ) -> Result<Vec<D>, ApiError>;
}

#[async_trait]
impl<Q: Queryer> QueryParams<Q::Doc> for Q {
    async fn query_params(
        &self,
        resource: &str,
        params: &[(String, String)],
    ) -> Result<Vec<Q::Doc>, ApiError> {
        let mut query = self.new_query();
        for (key, value) in params {
            query
                .set_param(key, value)
                .map_err(|reason| ApiError::InvalidQuery {
                    key: key.clone(),
                    reason,
                })?;
        }
        self.query(query)
            .await
            .map_err(|source| ApiError::Fetch {
                resource: resource.to_string(),
                source,
            })
    }
}

/// Top-level keys of a compound document that a collection must not shadow.
const RESERVED_COLLECTIONS: [&str; 3] = ["linked", "links", "errors"];

/// Builder collecting the capabilities of resource type `D`.
///
/// ```rust,ignore
/// let registration = ResourceRegistration::<Widget>::new()
///     .getter(widgets.clone())
///     .creator(widgets.clone())
///     .relations(RelationTable::new().to_one("owner", |w: &Widget| w.owner, users));
/// api.register(registration)?;
/// ```
pub struct ResourceRegistration<D: Document> {
    getter: Option<Arc<dyn Getter<Doc = D>>>,
    creator: Option<Arc<dyn CreateJson<D>>>,
    setter: Option<Arc<dyn SetJson<D>>>,
    deleter: Option<Arc<dyn Deleter<Doc = D>>>,
    queryer: Option<Arc<dyn QueryParams<D>>>,
    relations: Option<RelationTable<D>>,
}

impl<D: Document> Default for ResourceRegistration<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> ResourceRegistration<D> {
    pub fn new() -> Self {
        Self {
            getter: None,
            creator: None,
            setter: None,
            deleter: None,
            queryer: None,
            relations: None,
        }
    }

    pub fn getter(mut self, getter: impl Getter<Doc = D>) -> Self {
        self.getter = Some(Arc::new(getter));
        self
    }

    pub fn creator(mut self, creator: impl Creator<Doc = D>) -> Self {
        self.creator = Some(Arc::new(creator));
        self
    }

    pub fn setter(mut self, setter: impl Setter<Doc = D>) -> Self {
        self.setter = Some(Arc::new(setter));
        self
    }

    pub fn deleter(mut self, deleter: impl Deleter<Doc = D>) -> Self {
        self.deleter = Some(Arc::new(deleter));
        self
    }

    pub fn queryer(mut self, queryer: impl Queryer<Doc = D>) -> Self {
        self.queryer = Some(Arc::new(queryer));
        self
    }

    /// Declares the relations of `D`. An empty table fails [`build`](Self::build).
    pub fn relations(mut self, table: RelationTable<D>) -> Self {
        self.relations = Some(table);
        self
    }

    /// Validates the registration.
    pub fn build(self) -> Result<RegisteredResource<D>, ConfigError> {
        let collection = collection_name::<D>();
        if collection.is_empty() {
            return Err(ConfigError::UnnamedResource);
        }
        if RESERVED_COLLECTIONS.contains(&collection.as_str()) {
            return Err(ConfigError::ReservedCollection(collection));
        }
        let relations = self.relations.map(RelationTable::extract).transpose()?;

        Ok(RegisteredResource {
            collection,
            getter: self.getter,
            creator: self.creator,
            setter: self.setter,
            deleter: self.deleter,
            queryer: self.queryer,
            relations,
        })
    }
}

/// A validated resource, ready to serve requests.
pub struct RegisteredResource<D: Document> {
    collection: String,
    getter: Option<Arc<dyn Getter<Doc = D>>>,
    creator: Option<Arc<dyn CreateJson<D>>>,
    setter: Option<Arc<dyn SetJson<D>>>,
    deleter: Option<Arc<dyn Deleter<Doc = D>>>,
    queryer: Option<Arc<dyn QueryParams<D>>>,
    relations: Option<Relations<D>>,
}

impl<D: Document> RegisteredResource<D> {
    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn relations(&self) -> Option<&Relations<D>> {
        self.relations.as_ref()
    }

    fn not_allowed(&self, request: &ApiRequest) -> ApiError {
        ApiError::MethodNotAllowed {
            method: request.method.to_string(),
            path: request.path.clone(),
        }
    }

    async fn fetch(
        &self,
        raw: &str,
        request: &ApiRequest,
        config: &ApiConfig,
    ) -> Result<ApiResponse, ApiError> {
        let getter = self.getter.as_ref().ok_or_else(|| self.not_allowed(request))?;
        let ids = parse_ids::<IdOf<D>>(raw)?;
        let shape = if ids.len() == 1 {
            PrimaryShape::Single
        } else {
            PrimaryShape::Collection
        };

        let documents = getter.get(&ids).await.map_err(|source| ApiError::Fetch {
            resource: self.collection.clone(),
            source,
        })?;
        debug!(
            resource = %self.collection,
            requested = ids.len(),
            fetched = documents.len(),
            "Fetched primary"
        );

        let body = self.render(documents, shape, request, config).await?;
        Ok(ApiResponse::ok(body))
    }

    async fn query(&self, request: &ApiRequest, config: &ApiConfig) -> Result<ApiResponse, ApiError> {
        let queryer = self.queryer.as_ref().ok_or_else(|| self.not_allowed(request))?;
        let params: Vec<(String, String)> = request
            .query
            .iter()
            .filter(|(key, _)| key != "include")
            .cloned()
            .collect();

        let documents = queryer.query_params(&self.collection, &params).await?;
        debug!(resource = %self.collection, count = documents.len(), "Queried");

        let body = self
            .render(documents, PrimaryShape::Collection, request, config)
            .await?;
        Ok(ApiResponse::ok(body))
    }

    async fn create(&self, request: &ApiRequest, config: &ApiConfig) -> Result<ApiResponse, ApiError> {
        let creator = self.creator.as_ref().ok_or_else(|| self.not_allowed(request))?;
        let body = request_body(request)?;

        let created = creator.create_json(&self.collection, body).await?;
        debug!(resource = %self.collection, id = %created.id(), "Created");

        let document = CompoundDocument::assemble(
            vec![created],
            PrimaryShape::Single,
            IncludedCollection::new(),
            config.link_base.as_deref(),
        )?;
        Ok(ApiResponse::created(document.to_json()?))
    }

    async fn set(&self, raw: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let setter = self.setter.as_ref().ok_or_else(|| self.not_allowed(request))?;
        let id = single_id::<D>(raw)?;
        let body = request_body(request)?;

        setter.set_json(&self.collection, id, body).await?;
        Ok(ApiResponse::no_content())
    }

    async fn delete(&self, raw: &str, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let deleter = self.deleter.as_ref().ok_or_else(|| self.not_allowed(request))?;
        let id = single_id::<D>(raw)?;

        debug!(resource = %self.collection, %id, "Delete");
        deleter
            .delete(id)
            .await
            .map_err(|error| ApiError::Rejected {
                resource: self.collection.clone(),
                errors: vec![error],
            })?;
        Ok(ApiResponse::no_content())
    }

    /// Runs inclusion for `documents` and assembles the compound body.
    async fn render(
        &self,
        documents: Vec<D>,
        shape: PrimaryShape,
        request: &ApiRequest,
        config: &ApiConfig,
    ) -> Result<Value, ApiError> {
        let included = match &self.relations {
            Some(relations) => {
                let filter = include_filter(request);
                include_relations(
                    relations,
                    filter.as_deref(),
                    &documents,
                    config.concurrent_includes,
                )
                .await?
            }
            None => IncludedCollection::new(),
        };

        CompoundDocument::assemble(documents, shape, included, config.link_base.as_deref())?
            .to_json()
    }
}

/// Object-safe view of a [`RegisteredResource`], keyed by collection in the [`Api`](super::Api).
#[async_trait]
pub(crate) trait Endpoint: Send + Sync {
    fn descriptors(&self) -> Vec<RelationDescriptor>;

    /// Serves a request addressed to this collection, `ids` being the optional
    /// second path segment.
    async fn serve(
        &self,
        ids: Option<&str>,
        request: &ApiRequest,
        config: &ApiConfig,
    ) -> Result<ApiResponse, ApiError>;
}

#[async_trait]
impl<D: Document> Endpoint for RegisteredResource<D> {
    fn descriptors(&self) -> Vec<RelationDescriptor> {
        self.relations
            .as_ref()
            .map(Relations::descriptors)
            .unwrap_or_default()
    }

    async fn serve(
        &self,
        ids: Option<&str>,
        request: &ApiRequest,
        config: &ApiConfig,
    ) -> Result<ApiResponse, ApiError> {
        match (request.method, ids) {
            (Method::Get, Some(raw)) => self.fetch(raw, request, config).await,
            (Method::Get, None) => self.query(request, config).await,
            (Method::Post, None) => self.create(request, config).await,
            (Method::Put, Some(raw)) => self.set(raw, request).await,
            (Method::Delete, Some(raw)) => self.delete(raw, request).await,
            _ => Err(self.not_allowed(request)),
        }
    }
}

fn single_id<D: Document>(raw: &str) -> Result<IdOf<D>, ApiError> {
    let ids = parse_ids::<IdOf<D>>(raw)?;
    let [id] = <[IdOf<D>; 1]>::try_from(ids).map_err(|ids| ApiError::WrongIdCount(ids.len()))?;
    Ok(id)
}

fn request_body(request: &ApiRequest) -> Result<Value, ApiError> {
    request
        .body
        .clone()
        .ok_or_else(|| ApiError::InvalidBody("missing request body".to_string()))
}

/// Lower-cased relation names from `include=a,b`, if the parameter is present.
fn include_filter(request: &ApiRequest) -> Option<Vec<String>> {
    request.param("include").map(|raw| {
        raw.split(',')
            .map(|name| name.trim().to_lowercase())
            .filter(|name| !name.is_empty())
            .collect()
    })
}
