//! # Mock Getter
//!
//! `MockGetter<D>` implements [`Getter`] entirely in memory. Tests queue the
//! calls they expect, together with the answer each call should produce, and
//! then assert on what the pipeline actually asked for.
//!
//! ## When to use Mocks vs Real Stores
//!
//! | Feature | MockGetter | StoreClient |
//! |---------|------------|-------------|
//! | **State** | None, answers are scripted | Real documents in an actor |
//! | **Call recording** | Every `get` is recorded | No |
//! | **Error Injection** | Easy (`return_err`) | Only by shutting the actor down |
//! | **Use Case** | Proving how the pipeline calls a target | End-to-end flows |
//!
//! ## Example
//!
//! ```rust
//! use jsonapi_framework::mock::MockGetter;
//! use jsonapi_framework::{Document, Getter, ResourceError};
//! use serde::Serialize;
//!
//! #[derive(Clone, Debug, PartialEq, Serialize)]
//! struct User { id: u64 }
//! impl Document for User {
//!     type Id = u64;
//!     const NAME: &'static str = "user";
//!     fn id(&self) -> u64 { self.id }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let users = MockGetter::<User>::new();
//!     users.expect_get(vec![10]).return_ok(vec![User { id: 10 }]);
//!     users.expect_get(vec![11]).return_err(ResourceError::NotFound("11".into()));
//!
//!     assert_eq!(users.get(&[10]).await.unwrap(), vec![User { id: 10 }]);
//!     assert!(users.get(&[11]).await.is_err());
//!
//!     assert_eq!(users.calls(), vec![vec![10], vec![11]]);
//!     users.verify();
//! }
//! ```
//!
//! A call that arrives with no expectation queued, or with different ids than
//! the next expectation, panics with both id lists in the message.

use crate::capability::Getter;
use crate::document::{Document, IdOf};
use crate::error::ResourceError;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct Expectation<D: Document> {
    ids: Vec<IdOf<D>>,
    response: Result<Vec<D>, ResourceError>,
}

struct MockState<D: Document> {
    expectations: VecDeque<Expectation<D>>,
    calls: Vec<Vec<IdOf<D>>>,
}

/// A scripted [`Getter`]. Clones share the same expectations and call log.
pub struct MockGetter<D: Document> {
    state: Arc<Mutex<MockState<D>>>,
}

impl<D: Document> Clone for MockGetter<D> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<D: Document> Default for MockGetter<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: Document> MockGetter<D> {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                expectations: VecDeque::new(),
                calls: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState<D>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Expects a `get` with exactly `ids`, in that order.
    pub fn expect_get(&self, ids: impl Into<Vec<IdOf<D>>>) -> GetExpectationBuilder<D> {
        GetExpectationBuilder {
            ids: ids.into(),
            state: Arc::clone(&self.state),
        }
    }

    /// Every id list `get` was called with, oldest first.
    pub fn calls(&self) -> Vec<Vec<IdOf<D>>> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let state = self.lock();
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<D: Document> {
    ids: Vec<IdOf<D>>,
    state: Arc<Mutex<MockState<D>>>,
}

impl<D: Document> GetExpectationBuilder<D> {
    /// Sets the expectation to return these documents.
    pub fn return_ok(self, documents: Vec<D>) {
        self.push(Ok(documents));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: ResourceError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Vec<D>, ResourceError>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        state.expectations.push_back(Expectation {
            ids: self.ids,
            response,
        });
    }
}

#[async_trait]
impl<D: Document> Getter for MockGetter<D> {
    type Doc = D;

    async fn get(&self, ids: &[IdOf<D>]) -> Result<Vec<D>, ResourceError> {
        let mut state = self.lock();
        state.calls.push(ids.to_vec());
        match state.expectations.pop_front() {
            Some(expectation) if expectation.ids == ids => expectation.response,
            Some(expectation) => panic!(
                "Unexpected get on {}: expected ids {:?}, got {:?}",
                D::NAME,
                expectation.ids,
                ids
            ),
            None => panic!("Unexpected get on {} with ids {:?}", D::NAME, ids),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Clone, Debug, PartialEq, Serialize)]
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

    #[tokio::test]
    async fn test_mock_getter_with_expectations() {
        let mock = MockGetter::<Tag>::new();
        mock.expect_get(vec!["a".to_string()])
            .return_ok(vec![Tag { id: "a".into() }]);

        let client = mock.clone();
        let tags = client.get(&["a".to_string()]).await.unwrap();

        assert_eq!(tags, vec![Tag { id: "a".into() }]);
        assert_eq!(mock.call_count(), 1);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Not all expectations were met")]
    async fn test_verify_reports_unmet_expectations() {
        let mock = MockGetter::<Tag>::new();
        mock.expect_get(vec!["a".to_string()]).return_ok(vec![]);
        mock.verify();
    }

    #[tokio::test]
    #[should_panic(expected = "Unexpected get on tag")]
    async fn test_unexpected_ids_panic() {
        let mock = MockGetter::<Tag>::new();
        mock.expect_get(vec!["a".to_string()]).return_ok(vec![]);
        let _ = mock.get(&["b".to_string()]).await;
    }
}
