use std::convert::Infallible;
use std::task::{Context, Poll};

use cachebench::{Dispatcher, Request, Response};
use futures::FutureExt;
use tower::Service;

use crate::future::InterceptFuture;

/// Tower service answering every request through a [`Dispatcher`].
///
/// Created by [`InterceptLayer`](crate::InterceptLayer). Clones share the
/// dispatcher, so a strategy change or reset made through one clone is seen
/// by all of them.
#[derive(Clone, Debug)]
pub struct InterceptService {
    dispatcher: Dispatcher,
}

impl InterceptService {
    /// Wraps an existing dispatcher.
    pub fn new(dispatcher: Dispatcher) -> Self {
        InterceptService { dispatcher }
    }

    /// The dispatcher behind this service, for control messages and
    /// lifecycle calls.
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }
}

impl Service<Request> for InterceptService {
    type Response = Response;
    type Error = Infallible;
    type Future = InterceptFuture;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        // The wrapped service is driven to readiness per fetch.
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request) -> Self::Future {
        let dispatcher = self.dispatcher.clone();
        InterceptFuture::new(async move { dispatcher.fetch(request).await }.boxed())
    }
}
