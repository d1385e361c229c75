//! # Mock Framework
//!
//! Utilities for testing service handlers in isolation.
//!
//! Use [`MockStore`] for a fluent expectation API, or [`mock_store_client`]
//! with the `expect_*` helpers when you want to inspect raw requests.

use crate::framework::{InsertOutcome, Response, StoreClient, StoreEntity, StoreError, StoreRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected request to the mock store.
enum Expectation<T: StoreEntity> {
    Insert {
        response: Result<InsertOutcome<T>, StoreError>,
    },
    Get {
        id: T::Id,
        response: Result<Option<T>, StoreError>,
    },
    Apply {
        id: T::Id,
        response: Result<T, StoreError>,
    },
}

/// A mock store client with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mut mock = MockStore::<Order>::new();
/// mock.expect_get("order_1".to_string()).return_ok(Some(order));
/// mock.expect_insert().return_ok(InsertOutcome::Inserted);
///
/// let store = mock.client();
/// // Use the store in tests...
/// mock.verify(); // Ensures all expectations were met
/// ```
pub struct MockStore<T: StoreEntity> {
    client: StoreClient<T>,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: StoreEntity> MockStore<T> {
    /// Creates a new mock store with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<StoreRequest<T>>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        // Background task answering requests from the expectation queue
        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        StoreRequest::Insert { respond_to, .. },
                        Some(Expectation::Insert { response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Get { id: _, respond_to },
                        Some(Expectation::Get { id: _, response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    (
                        StoreRequest::Apply { id: _, respond_to, .. },
                        Some(Expectation::Apply { id: _, response }),
                    ) => {
                        let _ = respond_to.send(response);
                    }
                    _ => {
                        panic!("Unexpected request or expectation mismatch");
                    }
                }
            }
        });

        Self {
            client: StoreClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the store client for use in tests.
    pub fn client(&self) -> StoreClient<T> {
        self.client.clone()
    }

    /// Expects an `insert` operation.
    pub fn expect_insert(&mut self) -> InsertExpectationBuilder<T> {
        InsertExpectationBuilder {
            expectations: self.expectations.clone(),
        }
    }

    /// Expects a `get` operation.
    pub fn expect_get(&mut self, id: T::Id) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Expects an `apply` operation.
    pub fn expect_apply(&mut self, id: T::Id) -> ApplyExpectationBuilder<T> {
        ApplyExpectationBuilder {
            id,
            expectations: self.expectations.clone(),
        }
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl<T: StoreEntity> Default for MockStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `insert` expectations.
pub struct InsertExpectationBuilder<T: StoreEntity> {
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: StoreEntity> InsertExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, outcome: InsertOutcome<T>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Insert {
            response: Ok(outcome),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Insert {
            response: Err(error),
        });
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: StoreEntity> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: StoreEntity> GetExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: Option<T>) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Get {
            id: self.id,
            response: Ok(value),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Get {
            id: self.id,
            response: Err(error),
        });
    }
}

/// Builder for `apply` expectations.
pub struct ApplyExpectationBuilder<T: StoreEntity> {
    id: T::Id,
    expectations: Arc<Mutex<VecDeque<Expectation<T>>>>,
}

impl<T: StoreEntity> ApplyExpectationBuilder<T> {
    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, record: T) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Apply {
            id: self.id,
            response: Ok(record),
        });
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        let mut exps = self.expectations.lock().unwrap();
        exps.push_back(Expectation::Apply {
            id: self.id,
            response: Err(error),
        });
    }
}

// =============================================================================
// CHANNEL-LEVEL HELPERS
// =============================================================================

/// Creates a mock store client and a receiver for asserting requests.
///
/// # Testing Strategy
/// In unit tests we often don't want to spin up a full [`StoreActor`](crate::framework::StoreActor)
/// if we are just testing handler logic. This client sends messages to a
/// channel the test controls, so the test can inspect each request and
/// simulate the store's behavior (success, failure, delays) deterministically.
///
/// **Note**: Consider using [`MockStore`] for a more fluent API.
pub fn mock_store_client<T: StoreEntity>(
    buffer_size: usize,
) -> (StoreClient<T>, mpsc::Receiver<StoreRequest<T>>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (StoreClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Insert request.
pub async fn expect_insert<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T, Option<String>, Response<InsertOutcome<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Insert { entity, alias, respond_to }) => {
            Some((entity, alias, respond_to))
        }
        _ => None,
    }
}

/// Helper to verify that the next message is a Get request.
pub async fn expect_get<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, Response<Option<T>>)> {
    match receiver.recv().await {
        Some(StoreRequest::Get { id, respond_to }) => Some((id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an Apply request.
pub async fn expect_apply<T: StoreEntity>(
    receiver: &mut mpsc::Receiver<StoreRequest<T>>,
) -> Option<(T::Id, T::Update, Response<T>)> {
    match receiver.recv().await {
        Some(StoreRequest::Apply { id, update, respond_to }) => Some((id, update, respond_to)),
        _ => None,
    }
}
