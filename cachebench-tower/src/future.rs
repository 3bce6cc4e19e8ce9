use std::convert::Infallible;
use std::pin::Pin;
use std::task::{Context, Poll};

use cachebench::Response;
use futures::Future;
use futures::future::BoxFuture;
use futures::ready;
use pin_project::pin_project;

/// Future returned by [`InterceptService`](crate::InterceptService).
///
/// Interception never fails: whatever the policy produces, including a
/// synthetic `408`, is handed back as `Ok`.
#[pin_project]
pub struct InterceptFuture {
    #[pin]
    inner: BoxFuture<'static, Response>,
}

impl InterceptFuture {
    pub(crate) fn new(inner: BoxFuture<'static, Response>) -> Self {
        Self { inner }
    }
}

impl Future for InterceptFuture {
    type Output = Result<Response, Infallible>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        let response = ready!(this.inner.poll(cx));
        Poll::Ready(Ok(response))
    }
}
