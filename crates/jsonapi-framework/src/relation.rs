//! # Relation Extractor
//!
//! A resource type that references other resources declares its relations in a
//! [`RelationTable`]: one row per relation, holding the relation name, an
//! accessor that reads the referenced identifiers out of a document, and the
//! [`Getter`] that serves the target resource.
//!
//! ```rust
//! use jsonapi_framework::mock::MockGetter;
//! use jsonapi_framework::{Document, RelationTable};
//! use serde::Serialize;
//!
//! #[derive(Clone, Debug, Serialize)]
//! struct User { id: u64 }
//! impl Document for User {
//!     type Id = u64;
//!     const NAME: &'static str = "user";
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! #[derive(Clone, Debug, Serialize)]
//! struct Widget { id: u64, owner: Option<u64>, watchers: Vec<u64> }
//! impl Document for Widget {
//!     type Id = u64;
//!     const NAME: &'static str = "widget";
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! let users = MockGetter::<User>::new();
//! let relations = RelationTable::<Widget>::new()
//!     .to_one("owner", |w: &Widget| w.owner, users.clone())
//!     .to_many("watchers", |w: &Widget| w.watchers.clone(), users)
//!     .extract()
//!     .unwrap();
//!
//! assert_eq!(relations.len(), 2);
//! assert_eq!(relations.get("owner").unwrap().descriptor().target, "users");
//! ```
//!
//! The table is turned into [`Relations`] once, at registration. Extraction is
//! the only place relation configuration is validated; after it succeeds the
//! descriptors are immutable and every request reuses the cached accessors.

use crate::capability::Getter;
use crate::document::{collection_name, Document, IdOf};
use crate::error::ConfigError;
use crate::ids::Identifier;
use crate::include::{BatchFetcher, Includer};
use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;
use std::sync::Arc;

/// Whether a relation references at most one or any number of documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cardinality {
    ToOne,
    ToMany,
}

impl Display for Cardinality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Cardinality::ToOne => write!(f, "to-one"),
            Cardinality::ToMany => write!(f, "to-many"),
        }
    }
}

/// Static description of one relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct RelationDescriptor {
    /// Lower-cased relation name.
    pub name: String,
    /// Collection name of the declaring resource.
    pub source: String,
    /// Collection name of the referenced resource.
    pub target: String,
    pub cardinality: Cardinality,
}

/// A declared relation: its descriptor plus the cached accessor and target fetch.
pub struct Relation<S: Document> {
    descriptor: RelationDescriptor,
    pub(crate) includer: Arc<dyn Includer<S>>,
}

impl<S: Document> Relation<S> {
    pub fn descriptor(&self) -> &RelationDescriptor {
        &self.descriptor
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Identifiers `document` references through this relation.
    pub fn references(&self, document: &S) -> Vec<Identifier> {
        self.includer.references(document)
    }
}

impl<S: Document> Clone for Relation<S> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            includer: Arc::clone(&self.includer),
        }
    }
}

impl<S: Document> std::fmt::Debug for Relation<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Relation")
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// Builder for the relations of resource type `S`.
pub struct RelationTable<S: Document> {
    rows: Vec<Relation<S>>,
}

impl<S: Document> Default for RelationTable<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Document> RelationTable<S> {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    /// Declares a relation holding zero or one reference.
    pub fn to_one<G, F>(self, name: &str, accessor: F, target: G) -> Self
    where
        G: Getter,
        F: Fn(&S) -> Option<IdOf<G::Doc>> + Send + Sync + 'static,
    {
        self.push(
            name,
            Cardinality::ToOne,
            move |doc: &S| accessor(doc).into_iter().collect(),
            target,
        )
    }

    /// Declares a relation holding any number of references.
    pub fn to_many<G, F>(self, name: &str, accessor: F, target: G) -> Self
    where
        G: Getter,
        F: Fn(&S) -> Vec<IdOf<G::Doc>> + Send + Sync + 'static,
    {
        self.push(name, Cardinality::ToMany, accessor, target)
    }

    fn push<G, F>(mut self, name: &str, cardinality: Cardinality, accessor: F, target: G) -> Self
    where
        G: Getter,
        F: Fn(&S) -> Vec<IdOf<G::Doc>> + Send + Sync + 'static,
    {
        let descriptor = RelationDescriptor {
            name: name.trim().to_lowercase(),
            source: collection_name::<S>(),
            target: collection_name::<G::Doc>(),
            cardinality,
        };
        self.rows.push(Relation {
            descriptor,
            includer: Arc::new(BatchFetcher::new(accessor, target)),
        });
        self
    }

    /// Validates the table and freezes it.
    pub fn extract(self) -> Result<Relations<S>, ConfigError> {
        let resource = collection_name::<S>();
        if resource.is_empty() {
            return Err(ConfigError::UnnamedResource);
        }
        if self.rows.is_empty() {
            return Err(ConfigError::NoRelations { resource });
        }

        let mut seen = HashSet::new();
        for row in &self.rows {
            if row.descriptor.name.is_empty() {
                return Err(ConfigError::UnnamedRelation { resource });
            }
            if !seen.insert(row.descriptor.name.clone()) {
                return Err(ConfigError::DuplicateRelation {
                    resource,
                    relation: row.descriptor.name.clone(),
                });
            }
        }

        Ok(Relations { rows: self.rows })
    }
}

/// The frozen, validated relation set of resource type `S`, in declaration order.
pub struct Relations<S: Document> {
    rows: Vec<Relation<S>>,
}

impl<S: Document> Relations<S> {
    pub fn get(&self, name: &str) -> Option<&Relation<S>> {
        self.rows.iter().find(|row| row.descriptor.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation<S>> {
        self.rows.iter()
    }

    pub fn descriptors(&self) -> Vec<RelationDescriptor> {
        self.rows.iter().map(|row| row.descriptor.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl<S: Document> Clone for Relations<S> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<S: Document> std::fmt::Debug for Relations<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.rows.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockGetter;

    #[derive(Clone, Debug, Serialize)]
    struct User {
        id: u64,
    }

    impl Document for User {
        type Id = u64;
        const NAME: &'static str = "user";
        fn id(&self) -> u64 {
            self.id
        }
    }

    #[derive(Clone, Debug, Serialize)]
    struct Label {
        id: String,
    }

    impl Document for Label {
        type Id = String;
        const NAME: &'static str = "label";
        fn id(&self) -> String {
            self.id.clone()
        }
    }

    #[derive(Clone, Debug, Serialize)]
    struct Widget {
        id: u64,
        owner: Option<u64>,
        labels: Vec<String>,
    }

    impl Document for Widget {
        type Id = u64;
        const NAME: &'static str = "widget";
        fn id(&self) -> u64 {
            self.id
        }
    }

    fn widget_table() -> RelationTable<Widget> {
        RelationTable::new()
            .to_one("Owner", |w: &Widget| w.owner, MockGetter::<User>::new())
            .to_many(
                "labels",
                |w: &Widget| w.labels.clone(),
                MockGetter::<Label>::new(),
            )
    }

    #[test]
    fn test_extract_builds_descriptors() {
        let relations = widget_table().extract().unwrap();

        assert_eq!(
            relations.descriptors(),
            vec![
                RelationDescriptor {
                    name: "owner".into(),
                    source: "widgets".into(),
                    target: "users".into(),
                    cardinality: Cardinality::ToOne,
                },
                RelationDescriptor {
                    name: "labels".into(),
                    source: "widgets".into(),
                    target: "labels".into(),
                    cardinality: Cardinality::ToMany,
                },
            ]
        );
    }

    #[test]
    fn test_registering_twice_yields_identical_descriptors() {
        let first = widget_table().extract().unwrap();
        let second = widget_table().extract().unwrap();
        assert_eq!(first.descriptors(), second.descriptors());
    }

    #[test]
    fn test_accessors_map_documents_to_identifiers() {
        let relations = widget_table().extract().unwrap();
        let owner = relations.get("owner").unwrap();
        let labels = relations.get("labels").unwrap();

        let with_refs = Widget {
            id: 1,
            owner: Some(10),
            labels: vec!["red".into(), "blue".into()],
        };
        let without_refs = Widget {
            id: 2,
            owner: None,
            labels: vec![],
        };

        assert_eq!(owner.references(&with_refs), vec![Identifier::Uint(10)]);
        assert!(owner.references(&without_refs).is_empty());
        assert_eq!(
            labels.references(&with_refs),
            vec![Identifier::Str("red".into()), Identifier::Str("blue".into())]
        );
        assert!(labels.references(&without_refs).is_empty());
    }

    #[test]
    fn test_empty_table_is_a_config_error() {
        let err = RelationTable::<Widget>::new().extract().unwrap_err();
        assert!(matches!(err, ConfigError::NoRelations { resource } if resource == "widgets"));
    }

    #[test]
    fn test_duplicate_and_unnamed_relations_are_rejected() {
        let duplicate = RelationTable::<Widget>::new()
            .to_one("owner", |w: &Widget| w.owner, MockGetter::<User>::new())
            .to_one("OWNER", |w: &Widget| w.owner, MockGetter::<User>::new())
            .extract()
            .unwrap_err();
        assert!(matches!(
            duplicate,
            ConfigError::DuplicateRelation { relation, .. } if relation == "owner"
        ));

        let unnamed = RelationTable::<Widget>::new()
            .to_one("  ", |w: &Widget| w.owner, MockGetter::<User>::new())
            .extract()
            .unwrap_err();
        assert!(matches!(unnamed, ConfigError::UnnamedRelation { .. }));
    }
}
