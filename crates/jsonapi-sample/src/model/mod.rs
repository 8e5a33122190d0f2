//! Demo resources.
//!
//! | Resource | Id | Backed by | Relations |
//! |----------|----|-----------|-----------|
//! | [`User`] | `u64` | store | none |
//! | [`Tag`] | `String` | store | none |
//! | [`Widget`] | `u64` | store | `owner` -> users, `tags` -> tags |
//! | [`Author`] | `String` | [`AuthorDirectory`] (read-only) | none |
//! | [`Article`] | `String` | store | `author` -> authors, `featured` -> widgets |

pub mod article;
pub mod author;
pub mod tag;
pub mod user;
pub mod widget;

pub use article::{Article, ArticleDraft};
pub use author::{Author, AuthorDirectory, AuthorQuery};
pub use tag::{Tag, TagDraft};
pub use user::{User, UserDraft};
pub use widget::{Widget, WidgetDraft};

/// Lower-cases `text` and joins its alphanumeric runs with `-`.
pub fn slugify(text: &str) -> String {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Rust  2021 "), "rust-2021");
        assert_eq!(slugify("!!!"), "");
    }
}
