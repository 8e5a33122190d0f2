//! # Compound Document Assembler
//!
//! Builds the success body:
//!
//! ```json
//! {
//!   "widgets": [ { "id": 1, "owner": 10 }, { "id": 2, "owner": 10 } ],
//!   "linked": { "owner": [ { "id": 10, "name": "ada" } ] },
//!   "links":  { "owner": { "type": "users", "href": "http://api.test/users/{widgets.owner}" } }
//! }
//! ```
//!
//! The primary key is the collection name. Its value is a single document when
//! one identifier was requested and one document came back, and a list in every
//! other case. `linked` and `links` only appear when at least one relation
//! produced documents.

use crate::document::{collection_name, Document};
use crate::error::ApiError;
use crate::include::IncludedCollection;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// How the caller addressed the primary documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimaryShape {
    /// Exactly one identifier was requested.
    Single,
    /// Several identifiers, a query, or anything else that is naturally a list.
    Collection,
}

/// The primary payload.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Primary {
    One(Value),
    Many(Vec<Value>),
}

/// Relation metadata emitted under `links`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkObject {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompoundDocument {
    collection: String,
    primary: Primary,
    linked: BTreeMap<String, Vec<Value>>,
    links: BTreeMap<String, LinkObject>,
}

impl CompoundDocument {
    /// Assembles the response for `documents` of resource type `D`.
    pub fn assemble<D: Document>(
        documents: Vec<D>,
        shape: PrimaryShape,
        included: IncludedCollection,
        link_base: Option<&str>,
    ) -> Result<Self, ApiError> {
        let primary = match (shape, documents.as_slice()) {
            (PrimaryShape::Single, [document]) => Primary::One(serde_json::to_value(document)?),
            _ => Primary::Many(
                documents
                    .iter()
                    .map(serde_json::to_value)
                    .collect::<Result<_, _>>()?,
            ),
        };

        let mut linked = BTreeMap::new();
        let mut links = BTreeMap::new();
        for (name, entry) in included {
            if entry.documents.is_empty() {
                continue;
            }
            let href = link_base.map(|base| {
                format!(
                    "{}/{}/{{{}.{}}}",
                    base.trim_end_matches('/'),
                    entry.descriptor.target,
                    entry.descriptor.source,
                    entry.descriptor.name
                )
            });
            links.insert(
                name.clone(),
                LinkObject {
                    kind: entry.descriptor.target,
                    href,
                },
            );
            linked.insert(name, entry.documents);
        }

        Ok(Self {
            collection: collection_name::<D>(),
            primary,
            linked,
            links,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn primary(&self) -> &Primary {
        &self.primary
    }

    pub fn linked(&self) -> &BTreeMap<String, Vec<Value>> {
        &self.linked
    }

    pub fn links(&self) -> &BTreeMap<String, LinkObject> {
        &self.links
    }

    pub fn to_json(&self) -> Result<Value, ApiError> {
        Ok(serde_json::to_value(self)?)
    }
}

impl Serialize for CompoundDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.linked.is_empty() { 1 } else { 3 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(&self.collection, &self.primary)?;
        if !self.linked.is_empty() {
            map.serialize_entry("linked", &self.linked)?;
            map.serialize_entry("links", &self.links)?;
        }
        map.end()
    }
}
