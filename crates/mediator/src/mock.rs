//! # Mock Handlers
//!
//! [`MockHandler`] is a scriptable [`Handler`] for tests. Queue the results it
//! should return, register a clone of it on a bus, dispatch, then
//! [`verify`](MockHandler::verify) that every scripted result was consumed.
//!
//! | | `MockHandler` | Real handler |
//! |---|---|---|
//! | **State** | None, only scripted results | Real repositories and services |
//! | **Error injection** | `return_err` | Requires arranging failing state |
//! | **Use case** | Testing code *around* a bus | Testing the handler itself |
//!
//! ```rust
//! use mediator::mock::MockHandler;
//! use mediator::{Context, MediatorError, Query, QueryBus, Request};
//!
//! #[derive(Debug)] struct CountUsers;
//! #[derive(Debug, thiserror::Error)]
//! #[error(transparent)]
//! struct CountError(#[from] MediatorError);
//!
//! impl Request for CountUsers { type Output = u64; type Error = CountError; }
//! impl Query for CountUsers {}
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockHandler::<CountUsers>::new();
//!     mock.expect().return_ok(3);
//!
//!     let bus = QueryBus::new();
//!     bus.register_handler::<CountUsers, _>(mock.clone()).unwrap();
//!
//!     assert_eq!(bus.dispatch(&Context::new(), CountUsers).await.unwrap(), 3);
//!     mock.verify();
//! }
//! ```

use crate::context::Context;
use crate::request::{Handler, Request};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

struct MockState<R: Request> {
    expectations: Mutex<VecDeque<Result<R::Output, R::Error>>>,
    received: Mutex<Vec<String>>,
}

/// A handler that replays queued results in order.
///
/// Clones share the same script and call log.
pub struct MockHandler<R: Request> {
    state: Arc<MockState<R>>,
}

impl<R: Request> Clone for MockHandler<R> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<R: Request> Default for MockHandler<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Request> MockHandler<R> {
    /// Creates a mock with no expectations.
    pub fn new() -> Self {
        Self {
            state: Arc::new(MockState {
                expectations: Mutex::new(VecDeque::new()),
                received: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Queues the result for the next call.
    pub fn expect(&self) -> ExpectationBuilder<R> {
        ExpectationBuilder {
            state: Arc::clone(&self.state),
        }
    }

    /// Number of requests handled so far.
    pub fn calls(&self) -> usize {
        self.state.received.lock().len()
    }

    /// `Debug` renderings of every request handled so far, oldest first.
    pub fn received(&self) -> Vec<String> {
        self.state.received.lock().clone()
    }

    /// Panics if any queued result was never consumed.
    pub fn verify(&self) {
        let remaining = self.state.expectations.lock().len();
        if remaining != 0 {
            panic!("Not all expectations were met. {} remaining", remaining);
        }
    }
}

/// Builder returned by [`MockHandler::expect`].
pub struct ExpectationBuilder<R: Request> {
    state: Arc<MockState<R>>,
}

impl<R: Request> ExpectationBuilder<R> {
    pub fn return_ok(self, output: R::Output) {
        self.state.expectations.lock().push_back(Ok(output));
    }

    pub fn return_err(self, error: R::Error) {
        self.state.expectations.lock().push_back(Err(error));
    }
}

#[async_trait]
impl<R: Request> Handler<R> for MockHandler<R> {
    async fn handle(&self, _ctx: &Context, request: R) -> Result<R::Output, R::Error> {
        self.state.received.lock().push(format!("{:?}", request));
        let next = self.state.expectations.lock().pop_front();
        match next {
            Some(result) => result,
            None => panic!("Unexpected request with no expectation queued: {:?}", request),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MediatorError;
    use crate::{Command, CommandBus};

    #[derive(Debug)]
    struct Archive {
        id: u32,
    }

    #[derive(Debug, PartialEq, thiserror::Error)]
    enum ArchiveError {
        #[error("already archived")]
        AlreadyArchived,
        #[error(transparent)]
        Mediator(#[from] MediatorError),
    }

    impl Request for Archive {
        type Output = ();
        type Error = ArchiveError;
    }

    impl Command for Archive {}

    #[tokio::test]
    async fn replays_results_in_order() {
        let mock = MockHandler::<Archive>::new();
        mock.expect().return_ok(());
        mock.expect().return_err(ArchiveError::AlreadyArchived);

        let bus = CommandBus::new();
        bus.register_handler::<Archive, _>(mock.clone()).unwrap();

        let ctx = Context::new();
        assert_eq!(bus.dispatch(&ctx, Archive { id: 1 }).await, Ok(()));
        assert_eq!(
            bus.dispatch(&ctx, Archive { id: 1 }).await,
            Err(ArchiveError::AlreadyArchived)
        );

        assert_eq!(mock.calls(), 2);
        assert_eq!(mock.received()[0], "Archive { id: 1 }");
        mock.verify();
    }

    #[test]
    #[should_panic(expected = "1 remaining")]
    fn verify_reports_unconsumed_expectations() {
        let mock = MockHandler::<Archive>::new();
        mock.expect().return_ok(());
        mock.verify();
    }
}
