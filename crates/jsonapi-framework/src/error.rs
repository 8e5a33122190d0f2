//! # Errors
//!
//! Every failure in the system belongs to one of three families:
//!
//! - [`ResourceError`]: raised by collaborators behind the capability traits
//!   (a store that cannot find a record, a validation rule that rejects a payload).
//! - [`ApiError`]: request-scoped pipeline failures. Each variant knows its HTTP
//!   status and is converted exactly once, at the request boundary, into an
//!   [`ErrorEnvelope`].
//! - [`ConfigError`]: registration-time failures. These stop a resource from being
//!   served at all and never reach a client.

use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

/// Boxed error used to carry arbitrary backend failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by the collaborators implementing the capability traits.
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid {field}: {message}")]
    Invalid { field: String, message: String },
    #[error("resource unavailable: {0}")]
    Unavailable(String),
    #[error("backend error: {0}")]
    Backend(#[source] BoxError),
}

impl ResourceError {
    /// Shorthand for a field validation failure.
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Invalid {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Failures raised while handling a single request.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("malformed identifier {segment:?}: {reason}")]
    MalformedId { segment: String, reason: String },
    #[error("invalid request body: {0}")]
    InvalidBody(String),
    #[error("invalid query parameter {key:?}: {reason}")]
    InvalidQuery { key: String, reason: String },
    #[error("expected exactly one identifier, got {0}")]
    WrongIdCount(usize),
    #[error("unknown resource collection {0:?}")]
    UnknownResource(String),
    #[error("{method} is not supported on {path}")]
    MethodNotAllowed { method: String, path: String },
    #[error("fetching {resource} failed: {source}")]
    Fetch {
        resource: String,
        #[source]
        source: ResourceError,
    },
    #[error("including {relation} from {target} failed: {source}")]
    RelationFetch {
        relation: String,
        target: String,
        #[source]
        source: ResourceError,
    },
    #[error("{resource} rejected the request with {} error(s)", .errors.len())]
    Rejected {
        resource: String,
        errors: Vec<ResourceError>,
    },
    #[error("encoding response failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ApiError {
    /// HTTP status code reported for this error.
    pub fn status(&self) -> u16 {
        match self {
            ApiError::MalformedId { .. }
            | ApiError::InvalidBody(_)
            | ApiError::InvalidQuery { .. }
            | ApiError::WrongIdCount(_) => 400,
            ApiError::UnknownResource(_) => 404,
            ApiError::MethodNotAllowed { .. } => 405,
            ApiError::Fetch { .. }
            | ApiError::RelationFetch { .. }
            | ApiError::Rejected { .. }
            | ApiError::Encode(_) => 500,
        }
    }

    fn title(&self) -> &'static str {
        match self {
            ApiError::MalformedId { .. } => "Malformed identifier",
            ApiError::InvalidBody(_) => "Invalid request body",
            ApiError::InvalidQuery { .. } => "Invalid query",
            ApiError::WrongIdCount(_) => "Wrong identifier count",
            ApiError::UnknownResource(_) => "Unknown resource",
            ApiError::MethodNotAllowed { .. } => "Method not allowed",
            ApiError::Fetch { .. } => "Fetch failed",
            ApiError::RelationFetch { .. } => "Relation fetch failed",
            ApiError::Rejected { .. } => "Request rejected",
            ApiError::Encode(_) => "Encoding failed",
        }
    }

    /// Converts the error into the envelope sent to the client.
    ///
    /// A rejection carrying several collaborator errors yields one entry per error,
    /// in the order the collaborator reported them.
    pub fn into_envelope(self) -> ErrorEnvelope {
        let status = self.status().to_string();
        let title = self.title().to_string();
        let errors = match self {
            ApiError::Rejected { errors, .. } if !errors.is_empty() => errors
                .into_iter()
                .map(|error| ErrorObject {
                    status: status.clone(),
                    title: title.clone(),
                    detail: error.to_string(),
                })
                .collect(),
            other => vec![ErrorObject {
                detail: other.to_string(),
                status,
                title,
            }],
        };
        ErrorEnvelope { errors }
    }
}

/// Registration-time configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("resource must have a non-empty name")]
    UnnamedResource,
    #[error("{resource} declares an unnamed relation")]
    UnnamedRelation { resource: String },
    #[error("{resource} declares relations but its relation table holds no references")]
    NoRelations { resource: String },
    #[error("{resource} declares relation {relation} more than once")]
    DuplicateRelation { resource: String, relation: String },
    #[error("resource collection {0} collides with a reserved document key")]
    ReservedCollection(String),
    #[error("resource collection {0} is already registered")]
    DuplicateResource(String),
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("reading configuration {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One entry of an [`ErrorEnvelope`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorObject {
    pub status: String,
    pub title: String,
    pub detail: String,
}

/// The failure body: `{ "errors": [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    pub errors: Vec<ErrorObject>,
}

impl ErrorEnvelope {
    /// Renders the envelope as JSON.
    pub fn to_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::to_value(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let malformed = ApiError::MalformedId {
            segment: "abc".into(),
            reason: "invalid digit".into(),
        };
        assert_eq!(malformed.status(), 400);

        let fetch = ApiError::Fetch {
            resource: "widgets".into(),
            source: ResourceError::Unavailable("down".into()),
        };
        assert_eq!(fetch.status(), 500);
        assert_eq!(ApiError::UnknownResource("nope".into()).status(), 404);
    }

    #[test]
    fn test_rejection_keeps_every_error() {
        let error = ApiError::Rejected {
            resource: "widgets".into(),
            errors: vec![
                ResourceError::invalid("name", "must not be empty"),
                ResourceError::invalid("owner", "unknown user"),
            ],
        };
        let envelope = error.into_envelope();

        assert_eq!(envelope.errors.len(), 2);
        assert_eq!(envelope.errors[0].detail, "invalid name: must not be empty");
        assert_eq!(envelope.errors[1].detail, "invalid owner: unknown user");
        assert!(envelope.errors.iter().all(|e| e.status == "500"));
    }

    #[test]
    fn test_envelope_json_shape() {
        let envelope = ApiError::MalformedId {
            segment: "abc".into(),
            reason: "invalid digit".into(),
        }
        .into_envelope();
        let json = envelope.to_json().unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "errors": [{
                    "status": "400",
                    "title": "Malformed identifier",
                    "detail": envelope.errors[0].detail,
                }]
            })
        );
        assert!(envelope.errors[0].detail.contains("\"abc\""));
    }
}
