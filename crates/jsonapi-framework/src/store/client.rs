//! # Store Client
//!
//! The cloneable handle to a [`StoreActor`](super::StoreActor). Every capability
//! is one request/reply round trip. A store whose actor has stopped answers
//! with [`ResourceError::Unavailable`].

use super::message::StoreRequest;
use super::{StoreQuery, StoredDocument};
use crate::capability::{Creator, Deleter, Getter, Queryer, Setter};
use crate::document::IdOf;
use crate::error::ResourceError;
use crate::handler::ResourceRegistration;
use async_trait::async_trait;
use tokio::sync::{mpsc, oneshot};

pub struct StoreClient<D: StoredDocument> {
    sender: mpsc::Sender<StoreRequest<D>>,
}

impl<D: StoredDocument> Clone for StoreClient<D> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

fn closed<D: StoredDocument>() -> ResourceError {
    ResourceError::Unavailable(format!("{} store is closed", D::NAME))
}

impl<D: StoredDocument> StoreClient<D> {
    pub fn new(sender: mpsc::Sender<StoreRequest<D>>) -> Self {
        Self { sender }
    }

    /// Sends a request built around a fresh reply channel and awaits the reply.
    async fn call<T>(
        &self,
        request: impl FnOnce(oneshot::Sender<T>) -> StoreRequest<D>,
    ) -> Result<T, ResourceError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(request(respond_to))
            .await
            .map_err(|_| closed::<D>())?;
        response.await.map_err(|_| closed::<D>())
    }

    /// Stores `document` as-is, replacing any document with the same id.
    pub async fn insert(&self, document: D) -> Result<(), ResourceError> {
        self.call(|respond_to| StoreRequest::Insert {
            document,
            respond_to,
        })
        .await?
    }

    /// A registration with every capability backed by this store.
    pub fn registration(&self) -> ResourceRegistration<D> {
        ResourceRegistration::new()
            .getter(self.clone())
            .creator(self.clone())
            .setter(self.clone())
            .deleter(self.clone())
            .queryer(self.clone())
    }
}

#[async_trait]
impl<D: StoredDocument> Getter for StoreClient<D> {
    type Doc = D;

    async fn get(&self, ids: &[IdOf<D>]) -> Result<Vec<D>, ResourceError> {
        let ids = ids.to_vec();
        self.call(|respond_to| StoreRequest::Get { ids, respond_to })
            .await?
    }
}

#[async_trait]
impl<D: StoredDocument> Creator for StoreClient<D> {
    type Doc = D;
    type Candidate = D::Draft;

    async fn create(&self, candidate: D::Draft) -> Result<D, Vec<ResourceError>> {
        self.call(|respond_to| StoreRequest::Create {
            draft: candidate,
            respond_to,
        })
        .await
        .map_err(|error| vec![error])?
    }
}

#[async_trait]
impl<D: StoredDocument> Setter for StoreClient<D> {
    type Doc = D;
    type Value = D::Draft;

    async fn set(&self, id: IdOf<D>, value: D::Draft) -> Result<(), Vec<ResourceError>> {
        self.call(|respond_to| StoreRequest::Set {
            id,
            draft: value,
            respond_to,
        })
        .await
        .map_err(|error| vec![error])?
    }
}

#[async_trait]
impl<D: StoredDocument> Deleter for StoreClient<D> {
    type Doc = D;

    async fn delete(&self, id: IdOf<D>) -> Result<(), ResourceError> {
        self.call(|respond_to| StoreRequest::Delete { id, respond_to })
            .await?
    }
}

#[async_trait]
impl<D: StoredDocument> Queryer for StoreClient<D> {
    type Doc = D;
    type Query = StoreQuery;

    fn new_query(&self) -> StoreQuery {
        StoreQuery::new()
    }

    async fn query(&self, query: StoreQuery) -> Result<Vec<D>, ResourceError> {
        self.call(|respond_to| StoreRequest::Scan { query, respond_to })
            .await?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::store::spawn_store;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct Note {
        id: u64,
        text: String,
        pinned: bool,
    }

    #[derive(Debug, Deserialize)]
    struct NoteDraft {
        text: String,
        #[serde(default)]
        pinned: bool,
    }

    impl Document for Note {
        type Id = u64;
        const NAME: &'static str = "note";
        fn id(&self) -> u64 {
            self.id
        }
    }

    impl StoredDocument for Note {
        type Draft = NoteDraft;

        fn from_draft(id: u64, draft: NoteDraft) -> Result<Self, Vec<ResourceError>> {
            let mut errors = Vec::new();
            if draft.text.trim().is_empty() {
                errors.push(ResourceError::invalid("text", "must not be empty"));
            }
            if draft.text.len() > 20 {
                errors.push(ResourceError::invalid("text", "too long"));
            }
            if draft.text.contains('!') {
                errors.push(ResourceError::invalid("text", "no shouting"));
            }
            if !errors.is_empty() {
                return Err(errors);
            }
            Ok(Note {
                id,
                text: draft.text,
                pinned: draft.pinned,
            })
        }
    }

    fn draft(text: &str) -> NoteDraft {
        NoteDraft {
            text: text.to_string(),
            pinned: false,
        }
    }

    fn counter() -> impl FnMut(&NoteDraft) -> u64 + Send + 'static {
        let mut next = 0;
        move |_: &NoteDraft| {
            next += 1;
            next
        }
    }

    #[tokio::test]
    async fn test_crud_round() {
        let (handle, notes) = spawn_store::<Note>(4, counter());

        let first = notes.create(draft("hello")).await.unwrap();
        let second = notes.create(draft("world")).await.unwrap();
        assert_eq!((first.id, second.id), (1, 2));

        let fetched = notes.get(&[2, 99, 1]).await.unwrap();
        assert_eq!(fetched, vec![second.clone(), first.clone()]);

        notes.set(1, draft("changed")).await.unwrap();
        assert_eq!(notes.get(&[1]).await.unwrap()[0].text, "changed");

        notes.delete(2).await.unwrap();
        assert!(notes.get(&[2]).await.unwrap().is_empty());
        assert!(matches!(
            notes.delete(2).await,
            Err(ResourceError::NotFound(id)) if id == "2"
        ));

        drop(notes);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_validation_reports_every_error() {
        let (_handle, notes) = spawn_store::<Note>(4, counter());

        let errors = notes
            .create(draft("this one is far too long!"))
            .await
            .unwrap_err();
        assert_eq!(errors.len(), 2);

        let errors = notes.set(42, draft("x")).await.unwrap_err();
        assert!(matches!(errors.as_slice(), [ResourceError::NotFound(_)]));
    }

    #[tokio::test]
    async fn test_create_with_taken_id_is_rejected() {
        let (_handle, notes) = spawn_store::<Note>(4, |_: &NoteDraft| 5);
        notes.create(draft("a")).await.unwrap();
        let errors = notes.create(draft("b")).await.unwrap_err();
        assert!(matches!(errors.as_slice(), [ResourceError::Invalid { field, .. }] if field == "id"));
    }

    #[tokio::test]
    async fn test_query_filters_and_limit() {
        let (_handle, notes) = spawn_store::<Note>(4, counter());
        for (id, pinned) in [(1, true), (2, false), (3, true), (4, true)] {
            notes
                .insert(Note {
                    id,
                    text: format!("n{id}"),
                    pinned,
                })
                .await
                .unwrap();
        }

        let pinned = notes
            .query(StoreQuery::new().filter("pinned", "true").limit(2))
            .await
            .unwrap();
        assert_eq!(pinned.iter().map(|n| n.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[tokio::test]
    async fn test_closed_store_is_unavailable() {
        let (actor, notes) = crate::store::StoreActor::<Note>::new(4, counter());
        drop(actor);

        assert!(matches!(
            notes.get(&[1]).await,
            Err(ResourceError::Unavailable(_))
        ));
        let errors = notes.create(draft("x")).await.unwrap_err();
        assert!(matches!(errors.as_slice(), [ResourceError::Unavailable(_)]));
    }
}
