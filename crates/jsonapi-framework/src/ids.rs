//! # Identifier Codec
//!
//! Turns the comma-separated `{ids}` path segment into a typed identifier list.
//!
//! A resource type uses exactly one identifier kind for its whole lifetime:
//! unsigned 64-bit integers or strings. The kind is carried by the
//! [`ResourceId`] trait, which is sealed and implemented only for `u64` and
//! `String`, so a resource whose documents expose any other identifier type is
//! rejected by the compiler instead of at startup.
//!
//! Parsing is all-or-nothing: the first malformed segment fails the whole call
//! with [`ApiError::MalformedId`] naming that segment. Input order and duplicates
//! are preserved.

use crate::error::ApiError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};
use std::hash::Hash;

mod sealed {
    pub trait Sealed {}
    impl Sealed for u64 {}
    impl Sealed for String {}
}

/// The two identifier representations a resource type may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    Uint,
    Str,
}

impl Display for IdKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IdKind::Uint => write!(f, "unsigned integer"),
            IdKind::Str => write!(f, "string"),
        }
    }
}

impl IdKind {
    /// Parses `raw` into kind-tagged identifiers.
    pub fn parse(self, raw: &str) -> Result<Vec<Identifier>, ApiError> {
        match self {
            IdKind::Uint => Ok(parse_ids::<u64>(raw)?
                .into_iter()
                .map(Identifier::Uint)
                .collect()),
            IdKind::Str => Ok(parse_ids::<String>(raw)?
                .into_iter()
                .map(Identifier::Str)
                .collect()),
        }
    }
}

/// A kind-tagged identifier, used where the concrete id type has been erased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(untagged)]
pub enum Identifier {
    Uint(u64),
    Str(String),
}

impl Identifier {
    pub fn kind(&self) -> IdKind {
        match self {
            Identifier::Uint(_) => IdKind::Uint,
            Identifier::Str(_) => IdKind::Str,
        }
    }
}

impl Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::Uint(id) => write!(f, "{id}"),
            Identifier::Str(id) => write!(f, "{id}"),
        }
    }
}

/// Identifier types a document may expose.
pub trait ResourceId:
    sealed::Sealed
    + Clone
    + Ord
    + Hash
    + Debug
    + Display
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// The fixed kind of this identifier type.
    const KIND: IdKind;

    /// Parses a single segment of an identifier list.
    fn parse_segment(segment: &str) -> Result<Self, ApiError>;

    /// Erases the concrete type.
    fn into_identifier(self) -> Identifier;
}

impl ResourceId for u64 {
    const KIND: IdKind = IdKind::Uint;

    fn parse_segment(segment: &str) -> Result<Self, ApiError> {
        parse_uint(segment).map_err(|reason| ApiError::MalformedId {
            segment: segment.to_string(),
            reason: reason.to_string(),
        })
    }

    fn into_identifier(self) -> Identifier {
        Identifier::Uint(self)
    }
}

impl ResourceId for String {
    const KIND: IdKind = IdKind::Str;

    // Empty segments are accepted as-is.
    fn parse_segment(segment: &str) -> Result<Self, ApiError> {
        Ok(segment.to_string())
    }

    fn into_identifier(self) -> Identifier {
        Identifier::Str(self)
    }
}

/// Splits `raw` on commas and parses every segment as `I`.
pub fn parse_ids<I: ResourceId>(raw: &str) -> Result<Vec<I>, ApiError> {
    raw.split(',').map(I::parse_segment).collect()
}

/// Parses an unsigned integer whose base is chosen by its prefix:
/// `0x` hexadecimal, `0o` or a bare leading `0` octal, `0b` binary, decimal otherwise.
/// Single underscores may separate digits, as in `1_000` or `0x_ff`.
fn parse_uint(segment: &str) -> Result<u64, &'static str> {
    if segment.is_empty() {
        return Err("empty identifier");
    }
    let lower = segment.to_ascii_lowercase();
    let (digits, radix, prefixed) = if let Some(rest) = lower.strip_prefix("0x") {
        (rest, 16, true)
    } else if let Some(rest) = lower.strip_prefix("0b") {
        (rest, 2, true)
    } else if let Some(rest) = lower.strip_prefix("0o") {
        (rest, 8, true)
    } else if lower.len() > 1 && lower.starts_with('0') {
        (&lower[1..], 8, true)
    } else {
        (lower.as_str(), 10, false)
    };

    // '_' may separate digits or follow a base prefix, never lead, trail or repeat.
    // from_str_radix tolerates a leading '+', the identifier grammar does not.
    let mut after_digit = prefixed;
    let mut cleaned = String::with_capacity(digits.len());
    for c in digits.chars() {
        if c == '_' {
            if !after_digit {
                return Err("misplaced digit separator");
            }
            after_digit = false;
        } else if c.is_digit(radix) {
            cleaned.push(c);
            after_digit = true;
        } else {
            return Err("not an unsigned integer");
        }
    }
    if cleaned.is_empty() || !after_digit {
        return Err("not an unsigned integer");
    }
    u64::from_str_radix(&cleaned, radix).map_err(|_| "value out of range for u64")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_list_keeps_order_and_duplicates() {
        let ids = parse_ids::<u64>("3,1,2,1").unwrap();
        assert_eq!(ids, vec![3, 1, 2, 1]);
    }

    #[test]
    fn test_parse_digit_separators() {
        let ids = parse_ids::<u64>("1_000,0x_1F,0b1_01,0_17").unwrap();
        assert_eq!(ids, vec![1000, 31, 5, 15]);

        for bad in ["_1", "1_", "1__0", "0x_", "0_"] {
            assert!(
                matches!(parse_ids::<u64>(bad), Err(ApiError::MalformedId { .. })),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_parse_prefixed_forms() {
        let ids = parse_ids::<u64>("0x1F,010,0b101,0o17,0").unwrap();
        assert_eq!(ids, vec![31, 8, 5, 15, 0]);
    }

    #[test]
    fn test_parse_rejects_non_numeric_segment() {
        let err = parse_ids::<u64>("1,abc,3").unwrap_err();
        match err {
            ApiError::MalformedId { segment, .. } => assert_eq!(segment, "abc"),
            other => panic!("Expected MalformedId, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_rejects_signs_empty_and_overflow() {
        assert!(parse_ids::<u64>("+5").is_err());
        assert!(parse_ids::<u64>("-5").is_err());
        assert!(parse_ids::<u64>("1,,2").is_err());
        assert!(parse_ids::<u64>("0x").is_err());
        assert!(parse_ids::<u64>("09").is_err());
        assert!(parse_ids::<u64>("18446744073709551616").is_err());
        assert_eq!(
            parse_ids::<u64>("18446744073709551615").unwrap(),
            vec![u64::MAX]
        );
    }

    #[test]
    fn test_string_ids_are_verbatim() {
        let ids = parse_ids::<String>("alpha,,Beta").unwrap();
        assert_eq!(ids, vec!["alpha", "", "Beta"]);
    }

    #[test]
    fn test_segment_count_matches_for_generated_lists() {
        for len in 1..20u64 {
            let raw = (0..len)
                .map(|n| (n * 7919).to_string())
                .collect::<Vec<_>>()
                .join(",");
            let ids = parse_ids::<u64>(&raw).unwrap();
            assert_eq!(ids.len() as u64, len);
            assert!(ids.iter().enumerate().all(|(i, id)| *id == i as u64 * 7919));
        }
    }

    #[test]
    fn test_kind_tagged_parse() {
        assert_eq!(
            IdKind::Uint.parse("7").unwrap(),
            vec![Identifier::Uint(7)]
        );
        assert_eq!(
            IdKind::Str.parse("x,y").unwrap(),
            vec![Identifier::Str("x".into()), Identifier::Str("y".into())]
        );
        assert_eq!(Identifier::Str("x".into()).kind(), IdKind::Str);
    }
}
