//! # Documents
//!
//! A [`Document`] is one record of a resource type. The trait carries the
//! resource's name and its identifier type, so everything downstream (routing,
//! relation descriptors, batch fetches) can be derived from the type alone.

use crate::ids::ResourceId;
use serde::Serialize;

/// A record served by the API.
///
/// # Example
///
/// ```rust
/// use jsonapi_framework::Document;
/// use serde::Serialize;
///
/// #[derive(Clone, Debug, Serialize)]
/// struct Widget {
///     id: u64,
///     name: String,
/// }
///
/// impl Document for Widget {
///     type Id = u64;
///     const NAME: &'static str = "widget";
///
///     fn id(&self) -> u64 {
///         self.id
///     }
/// }
///
/// assert_eq!(jsonapi_framework::collection_name::<Widget>(), "widgets");
/// ```
pub trait Document: Serialize + Clone + Send + Sync + 'static {
    /// Identifier type, fixed for the resource type.
    type Id: ResourceId;

    /// Singular resource name, e.g. `"widget"`.
    const NAME: &'static str;

    fn id(&self) -> Self::Id;
}

/// Identifier type of a document type.
pub type IdOf<D> = <D as Document>::Id;

/// The collection name a document type is served under.
pub fn collection_name<D: Document>() -> String {
    pluralize(D::NAME)
}

/// Lower-cases `name` and turns it into its plural form.
pub fn pluralize(name: &str) -> String {
    let name = name.trim().to_lowercase();
    if name.is_empty() {
        return name;
    }
    if let Some(stem) = name.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) && !stem.is_empty() {
            return format!("{stem}ies");
        }
    }
    if name.ends_with('s') || name.ends_with('x') || name.ends_with("ch") || name.ends_with("sh")
    {
        return format!("{name}es");
    }
    format!("{name}s")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize("widget"), "widgets");
        assert_eq!(pluralize("User"), "users");
        assert_eq!(pluralize("category"), "categories");
        assert_eq!(pluralize("key"), "keys");
        assert_eq!(pluralize("box"), "boxes");
        assert_eq!(pluralize("batch"), "batches");
        assert_eq!(pluralize("status"), "statuses");
        assert_eq!(pluralize(""), "");
    }
}
