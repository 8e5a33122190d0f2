//! # Request Handling
//!
//! [`Api`] is the registry of served resources and the single entry point a
//! transport calls. Routing is by path segment:
//!
//! | Request | Capability |
//! |---------|------------|
//! | `GET /{collection}/{ids}` | [`Getter`](crate::Getter), then relation inclusion |
//! | `GET /{collection}?k=v` | [`Queryer`](crate::Queryer), then relation inclusion |
//! | `POST /{collection}` | [`Creator`](crate::Creator) |
//! | `PUT /{collection}/{id}` | [`Setter`](crate::Setter) |
//! | `DELETE /{collection}/{id}` | [`Deleter`](crate::Deleter) |
//!
//! ## Error Collector
//!
//! Every stage returns `Result<_, ApiError>` and propagates with `?`.
//! [`Api::handle`] is the only place an error is turned into a response: it
//! logs it once and renders the [`ErrorEnvelope`](crate::ErrorEnvelope) in place
//! of the whole success body. A response never carries both.

mod request;
mod resource;

pub use request::{ApiRequest, ApiResponse, Method};
pub use resource::{RegisteredResource, ResourceRegistration};

use crate::config::ApiConfig;
use crate::document::Document;
use crate::error::{ApiError, ConfigError};
use crate::relation::RelationDescriptor;
use resource::Endpoint;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Registry of served resources.
pub struct Api {
    config: ApiConfig,
    endpoints: HashMap<String, Arc<dyn Endpoint>>,
}

impl Default for Api {
    fn default() -> Self {
        Self::new(ApiConfig::default())
    }
}

impl Api {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            config,
            endpoints: HashMap::new(),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    /// Validates `registration` and starts serving it under its collection name.
    pub fn register<D: Document>(
        &mut self,
        registration: ResourceRegistration<D>,
    ) -> Result<(), ConfigError> {
        let resource = registration.build()?;
        let collection = resource.collection().to_string();
        if self.endpoints.contains_key(&collection) {
            return Err(ConfigError::DuplicateResource(collection));
        }

        let relations = resource.relations().map_or(0, |r| r.len());
        info!(resource = %collection, relations, "Registered");
        self.endpoints.insert(collection, Arc::new(resource));
        Ok(())
    }

    /// Registered collection names, sorted.
    pub fn collections(&self) -> Vec<String> {
        let mut names: Vec<String> = self.endpoints.keys().cloned().collect();
        names.sort();
        names
    }

    /// Relation descriptors of a registered collection.
    pub fn relations(&self, collection: &str) -> Option<Vec<RelationDescriptor>> {
        self.endpoints
            .get(collection)
            .map(|endpoint| endpoint.descriptors())
    }

    /// Serves one request. Never fails: errors become an error envelope.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    pub async fn handle(&self, request: ApiRequest) -> ApiResponse {
        match self.dispatch(&request).await {
            Ok(response) => {
                info!(status = response.status, "Request served");
                response
            }
            Err(error) => {
                let status = error.status();
                warn!(status, error = %error, "Request failed");
                ApiResponse {
                    status,
                    body: error.into_envelope().to_json().ok(),
                }
            }
        }
    }

    async fn dispatch(&self, request: &ApiRequest) -> Result<ApiResponse, ApiError> {
        let segments = request.segments();
        let (collection, ids) = match segments.as_slice() {
            [collection] => (*collection, None),
            [collection, ids] => (*collection, Some(*ids)),
            _ => return Err(ApiError::UnknownResource(request.path.clone())),
        };

        let endpoint = self
            .endpoints
            .get(collection)
            .ok_or_else(|| ApiError::UnknownResource(collection.to_string()))?;
        endpoint.serve(ids, request, &self.config).await
    }
}
