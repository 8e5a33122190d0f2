//! # Store Actor
//!
//! The server half of a store. It owns the documents and the receiving end of
//! the request channel, and handles requests sequentially, so the map needs no
//! `Mutex` or `RwLock`.
//!
//! ## Operations
//!
//! * **Get**: returns the stored documents for the requested ids, in request
//!   order. Unknown ids are skipped; repeated ids yield repeated documents.
//! * **Create**: picks an id with the `next_id` function, builds the document
//!   with [`StoredDocument::from_draft`] and stores it. An id that is already
//!   taken is a validation error.
//! * **Set**: rebuilds the document under an existing id. `NotFound` if absent.
//! * **Delete**: removes a document. `NotFound` if absent.
//! * **Scan**: every document matching a [`StoreQuery`], in id order, up to its limit.
//! * **Insert**: stores a prepared document, used for seeding.

use super::client::StoreClient;
use super::message::StoreRequest;
use super::{StoreQuery, StoredDocument};
use crate::document::IdOf;
use crate::error::ResourceError;
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

type IdGenerator<D> = Box<dyn FnMut(&<D as StoredDocument>::Draft) -> IdOf<D> + Send>;

pub struct StoreActor<D: StoredDocument> {
    receiver: mpsc::Receiver<StoreRequest<D>>,
    store: BTreeMap<IdOf<D>, D>,
    next_id: IdGenerator<D>,
}

impl<D: StoredDocument> StoreActor<D> {
    /// Creates the actor and a client connected to it.
    ///
    /// `buffer` is the request channel capacity; clients wait when it is full.
    /// The actor does nothing until [`run`](Self::run) is spawned.
    pub fn new(
        buffer: usize,
        next_id: impl FnMut(&D::Draft) -> IdOf<D> + Send + 'static,
    ) -> (Self, StoreClient<D>) {
        let (sender, receiver) = mpsc::channel(buffer.max(1));
        let actor = Self {
            receiver,
            store: BTreeMap::new(),
            next_id: Box::new(next_id),
        };
        (actor, StoreClient::new(sender))
    }

    /// Processes requests until every client has been dropped.
    pub async fn run(mut self) {
        let resource = D::NAME;
        info!(resource, "Store started");

        while let Some(request) = self.receiver.recv().await {
            match request {
                StoreRequest::Get { ids, respond_to } => {
                    let found: Vec<D> = ids
                        .iter()
                        .filter_map(|id| self.store.get(id).cloned())
                        .collect();
                    debug!(resource, count = ids.len(), found = found.len(), "Get");
                    let _ = respond_to.send(Ok(found));
                }
                StoreRequest::Create { draft, respond_to } => {
                    debug!(resource, ?draft, "Create");
                    let id = (self.next_id)(&draft);
                    if self.store.contains_key(&id) {
                        warn!(resource, %id, "Create failed, id taken");
                        let _ = respond_to.send(Err(vec![ResourceError::invalid(
                            "id",
                            format!("{id} already exists"),
                        )]));
                        continue;
                    }
                    match D::from_draft(id.clone(), draft) {
                        Ok(document) => {
                            self.store.insert(id.clone(), document.clone());
                            info!(resource, %id, size = self.store.len(), "Created");
                            let _ = respond_to.send(Ok(document));
                        }
                        Err(errors) => {
                            warn!(resource, errors = errors.len(), "Create rejected");
                            let _ = respond_to.send(Err(errors));
                        }
                    }
                }
                StoreRequest::Set {
                    id,
                    draft,
                    respond_to,
                } => {
                    debug!(resource, %id, ?draft, "Set");
                    if !self.store.contains_key(&id) {
                        warn!(resource, %id, "Not found");
                        let _ = respond_to.send(Err(vec![ResourceError::NotFound(id.to_string())]));
                        continue;
                    }
                    match D::from_draft(id.clone(), draft) {
                        Ok(document) => {
                            self.store.insert(id.clone(), document);
                            info!(resource, %id, "Updated");
                            let _ = respond_to.send(Ok(()));
                        }
                        Err(errors) => {
                            warn!(resource, %id, errors = errors.len(), "Set rejected");
                            let _ = respond_to.send(Err(errors));
                        }
                    }
                }
                StoreRequest::Delete { id, respond_to } => {
                    debug!(resource, %id, "Delete");
                    if self.store.remove(&id).is_some() {
                        info!(resource, %id, size = self.store.len(), "Deleted");
                        let _ = respond_to.send(Ok(()));
                    } else {
                        warn!(resource, %id, "Not found");
                        let _ = respond_to.send(Err(ResourceError::NotFound(id.to_string())));
                    }
                }
                StoreRequest::Scan { query, respond_to } => {
                    let found = self.scan(&query);
                    debug!(resource, ?query, found = found.len(), "Scan");
                    let _ = respond_to.send(Ok(found));
                }
                StoreRequest::Insert {
                    document,
                    respond_to,
                } => {
                    let id = document.id();
                    self.store.insert(id.clone(), document);
                    debug!(resource, %id, size = self.store.len(), "Inserted");
                    let _ = respond_to.send(Ok(()));
                }
            }
        }

        info!(resource, size = self.store.len(), "Shutdown");
    }

    fn scan(&self, query: &StoreQuery) -> Vec<D> {
        self.store
            .values()
            .filter(|document| query.matches(*document))
            .take(query.max_results().unwrap_or(usize::MAX))
            .cloned()
            .collect()
    }
}
