//! # Store Messages
//!
//! Requests sent from a [`StoreClient`](super::StoreClient) to its
//! [`StoreActor`](super::StoreActor). Each variant maps to one capability and
//! carries a oneshot channel for the reply.

use super::{StoreQuery, StoredDocument};
use crate::document::IdOf;
use crate::error::ResourceError;
use tokio::sync::oneshot;

/// One-shot reply channel for single-error operations.
pub type Response<T> = oneshot::Sender<Result<T, ResourceError>>;

/// One-shot reply channel for operations that validate and may report several errors.
pub type Validated<T> = oneshot::Sender<Result<T, Vec<ResourceError>>>;

#[derive(Debug)]
pub enum StoreRequest<D: StoredDocument> {
    Get {
        ids: Vec<IdOf<D>>,
        respond_to: Response<Vec<D>>,
    },
    Create {
        draft: D::Draft,
        respond_to: Validated<D>,
    },
    Set {
        id: IdOf<D>,
        draft: D::Draft,
        respond_to: Validated<()>,
    },
    Delete {
        id: IdOf<D>,
        respond_to: Response<()>,
    },
    Scan {
        query: StoreQuery,
        respond_to: Response<Vec<D>>,
    },
    /// Stores a fully built document as-is, replacing any previous one.
    Insert { document: D, respond_to: Response<()> },
}
