//! # Batch Fetcher
//!
//! Resolves the relations of a primary result set.
//!
//! For each relation, the referenced identifiers of every primary document are
//! collected into a request-scoped ordered set, so duplicates collapse and the
//! target sees them in a stable order. A non-empty set is sent to the target's
//! [`Getter`] in a single call. An empty set skips the relation entirely.
//!
//! Relations are independent of each other. [`include_relations`] runs them
//! concurrently when asked to; each relation still yields its own `Result`, and
//! the first failure (in declaration order) fails the whole inclusion.

use crate::capability::Getter;
use crate::document::{Document, IdOf};
use crate::error::ApiError;
use crate::ids::{Identifier, ResourceId};
use crate::relation::{Relation, RelationDescriptor, Relations};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::debug;

/// Type-erased accessor plus target fetch, one per declared relation.
#[async_trait]
pub(crate) trait Includer<S: Document>: Send + Sync {
    fn references(&self, document: &S) -> Vec<Identifier>;

    /// Returns `None` when the relation contributes nothing.
    async fn fetch(
        &self,
        descriptor: &RelationDescriptor,
        primary: &[S],
    ) -> Result<Option<Vec<Value>>, ApiError>;
}

type Accessor<S, I> = Arc<dyn Fn(&S) -> Vec<I> + Send + Sync>;

/// Includer for a relation whose target is served by `G`.
pub(crate) struct BatchFetcher<S: Document, G: Getter> {
    accessor: Accessor<S, IdOf<G::Doc>>,
    target: G,
    _source: PhantomData<fn(&S)>,
}

impl<S: Document, G: Getter> BatchFetcher<S, G> {
    pub(crate) fn new<F>(accessor: F, target: G) -> Self
    where
        F: Fn(&S) -> Vec<IdOf<G::Doc>> + Send + Sync + 'static,
    {
        Self {
            accessor: Arc::new(accessor),
            target,
            _source: PhantomData,
        }
    }

    /// Union of the identifiers every primary document references.
    fn collect_ids(&self, primary: &[S]) -> BTreeSet<IdOf<G::Doc>> {
        primary
            .iter()
            .flat_map(|document| (self.accessor)(document))
            .collect()
    }
}

#[async_trait]
impl<S: Document, G: Getter> Includer<S> for BatchFetcher<S, G> {
    fn references(&self, document: &S) -> Vec<Identifier> {
        (self.accessor)(document)
            .into_iter()
            .map(ResourceId::into_identifier)
            .collect()
    }

    async fn fetch(
        &self,
        descriptor: &RelationDescriptor,
        primary: &[S],
    ) -> Result<Option<Vec<Value>>, ApiError> {
        let ids: Vec<IdOf<G::Doc>> = self.collect_ids(primary).into_iter().collect();
        if ids.is_empty() {
            debug!(relation = %descriptor.name, "No references, skipping");
            return Ok(None);
        }

        debug!(relation = %descriptor.name, target = %descriptor.target, count = ids.len(), "Batch fetch");
        let fetched = self
            .target
            .get(&ids)
            .await
            .map_err(|source| ApiError::RelationFetch {
                relation: descriptor.name.clone(),
                target: descriptor.target.clone(),
                source,
            })?;

        // The target may echo an id more than once; keep the first copy.
        let mut seen = BTreeSet::new();
        let mut documents = Vec::with_capacity(fetched.len());
        for document in fetched {
            if seen.insert(document.id()) {
                documents.push(serde_json::to_value(&document)?);
            }
        }

        if documents.is_empty() {
            return Ok(None);
        }
        Ok(Some(documents))
    }
}

/// The related documents of one relation.
#[derive(Debug, Clone, PartialEq)]
pub struct Included {
    pub descriptor: RelationDescriptor,
    pub documents: Vec<Value>,
}

/// Request-scoped mapping from relation name to its included documents.
pub type IncludedCollection = BTreeMap<String, Included>;

/// Fetches every relation selected by `filter` for `primary`.
///
/// `filter` holds lower-cased relation names; `None` selects every declared
/// relation. Names that match no declared relation are ignored.
pub async fn include_relations<S: Document>(
    relations: &Relations<S>,
    filter: Option<&[String]>,
    primary: &[S],
    concurrent: bool,
) -> Result<IncludedCollection, ApiError> {
    let selected: Vec<&Relation<S>> = relations
        .iter()
        .filter(|relation| filter.map_or(true, |names| names.iter().any(|n| n == relation.name())))
        .collect();

    if primary.is_empty() || selected.is_empty() {
        return Ok(IncludedCollection::new());
    }

    let results = if concurrent {
        join_all(
            selected
                .iter()
                .map(|relation| relation.includer.fetch(relation.descriptor(), primary)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?
    } else {
        let mut results = Vec::with_capacity(selected.len());
        for relation in &selected {
            results.push(relation.includer.fetch(relation.descriptor(), primary).await?);
        }
        results
    };

    let mut included = IncludedCollection::new();
    for (relation, result) in selected.into_iter().zip(results) {
        if let Some(documents) = result {
            included.insert(
                relation.name().to_string(),
                Included {
                    descriptor: relation.descriptor().clone(),
                    documents,
                },
            );
        }
    }
    Ok(included)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ResourceError;
    use crate::mock::MockGetter;
    use crate::relation::RelationTable;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, Serialize)]
    struct User {
        id: u64,
        name: String,
    }

    impl Document for User {
        type Id = u64;
        const NAME: &'static str = "user";
        fn id(&self) -> u64 {
            self.id
        }
    }

    #[derive(Clone, Debug, Serialize)]
    struct Tag {
        id: String,
    }

    impl Document for Tag {
        type Id = String;
        const NAME: &'static str = "tag";
        fn id(&self) -> String {
            self.id.clone()
        }
    }

    #[derive(Clone, Debug, Serialize)]
    struct Widget {
        id: u64,
        owner: Option<u64>,
        tags: Vec<String>,
    }

    impl Document for Widget {
        type Id = u64;
        const NAME: &'static str = "widget";
        fn id(&self) -> u64 {
            self.id
        }
    }

    fn user(id: u64) -> User {
        User {
            id,
            name: format!("user-{id}"),
        }
    }

    fn widget(id: u64, owner: Option<u64>, tags: &[&str]) -> Widget {
        Widget {
            id,
            owner,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn relations(users: &MockGetter<User>, tags: &MockGetter<Tag>) -> Relations<Widget> {
        RelationTable::new()
            .to_one("owner", |w: &Widget| w.owner, users.clone())
            .to_many("tags", |w: &Widget| w.tags.clone(), tags.clone())
            .extract()
            .unwrap()
    }

    #[tokio::test]
    async fn test_one_call_per_relation_with_deduplicated_ids() {
        let users = MockGetter::<User>::new();
        let tags = MockGetter::<Tag>::new();
        users.expect_get(vec![10, 11]).return_ok(vec![user(10), user(11)]);
        tags.expect_get(vec!["a".to_string(), "b".to_string()])
            .return_ok(vec![Tag { id: "a".into() }, Tag { id: "b".into() }]);

        let primary = vec![
            widget(1, Some(11), &["b", "a"]),
            widget(2, Some(10), &["a"]),
            widget(3, Some(11), &["b", "b"]),
        ];
        let included = include_relations(&relations(&users, &tags), None, &primary, true)
            .await
            .unwrap();

        users.verify();
        tags.verify();
        assert_eq!(users.calls(), vec![vec![10, 11]]);
        assert_eq!(included["owner"].documents.len(), 2);
        assert_eq!(included["tags"].documents.len(), 2);
        assert_eq!(included["owner"].descriptor.target, "users");
    }

    #[tokio::test]
    async fn test_relation_without_references_is_omitted() {
        let users = MockGetter::<User>::new();
        let tags = MockGetter::<Tag>::new();
        tags.expect_get(vec!["x".to_string()])
            .return_ok(vec![Tag { id: "x".into() }]);

        let primary = vec![widget(1, None, &["x"]), widget(2, None, &[])];
        let included = include_relations(&relations(&users, &tags), None, &primary, false)
            .await
            .unwrap();

        assert_eq!(users.call_count(), 0);
        assert!(!included.contains_key("owner"));
        assert!(included.contains_key("tags"));
    }

    #[tokio::test]
    async fn test_target_echoing_duplicates_is_deduplicated() {
        let users = MockGetter::<User>::new();
        let tags = MockGetter::<Tag>::new();
        users.expect_get(vec![10]).return_ok(vec![user(10), user(10)]);

        let primary = vec![widget(1, Some(10), &[]), widget(2, Some(10), &[])];
        let included = include_relations(&relations(&users, &tags), None, &primary, true)
            .await
            .unwrap();

        assert_eq!(included["owner"].documents, vec![serde_json::to_value(user(10)).unwrap()]);
    }

    #[tokio::test]
    async fn test_failure_in_one_relation_fails_inclusion() {
        let users = MockGetter::<User>::new();
        let tags = MockGetter::<Tag>::new();
        users.expect_get(vec![10]).return_ok(vec![user(10)]);
        tags.expect_get(vec!["x".to_string()])
            .return_err(ResourceError::Unavailable("tag store down".into()));

        let primary = vec![widget(1, Some(10), &["x"])];
        let err = include_relations(&relations(&users, &tags), None, &primary, true)
            .await
            .unwrap_err();

        match err {
            ApiError::RelationFetch {
                relation, target, ..
            } => {
                assert_eq!(relation, "tags");
                assert_eq!(target, "tags");
            }
            other => panic!("Expected RelationFetch, got {other:?}"),
        }
        users.verify();
    }

    #[tokio::test]
    async fn test_sequential_inclusion_stops_at_first_failure() {
        let users = MockGetter::<User>::new();
        let tags = MockGetter::<Tag>::new();
        users
            .expect_get(vec![10])
            .return_err(ResourceError::Unavailable("user store down".into()));

        let primary = vec![widget(1, Some(10), &["x"])];
        let err = include_relations(&relations(&users, &tags), None, &primary, false)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::RelationFetch { ref relation, .. } if relation == "owner"));
        users.verify();
        assert_eq!(tags.call_count(), 0);
    }

    #[tokio::test]
    async fn test_filter_restricts_relations() {
        let users = MockGetter::<User>::new();
        let tags = MockGetter::<Tag>::new();
        users.expect_get(vec![10]).return_ok(vec![user(10)]);

        let primary = vec![widget(1, Some(10), &["x"])];
        let filter = vec!["owner".to_string(), "unknown".to_string()];
        let included =
            include_relations(&relations(&users, &tags), Some(&filter), &primary, true)
                .await
                .unwrap();

        assert_eq!(included.keys().collect::<Vec<_>>(), vec!["owner"]);
        assert_eq!(tags.call_count(), 0);
    }
}
