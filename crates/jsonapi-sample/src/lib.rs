//! # JSON:API Sample
//!
//! Demo resources served through `jsonapi-framework`. Exposed as a library for
//! integration testing.

pub mod lifecycle;
pub mod model;
