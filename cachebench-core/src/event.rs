//! Intercepted request events.

use std::future::Future;

use smol_str::SmolStr;

use crate::{Offload, Request, RequestKey};

/// A request intercepted on its way to the network.
///
/// The event carries the request and a lifetime handle. Background work
/// registered through [`FetchEvent::wait_until`] keeps running after the
/// response has been handed back, and the host waits for it before tearing
/// the interception context down.
#[derive(Debug)]
pub struct FetchEvent<O> {
    request: Request,
    key: RequestKey,
    lifetime: O,
}

impl<O> FetchEvent<O>
where
    O: Offload,
{
    /// Wraps an intercepted request.
    pub fn new(request: Request, lifetime: O) -> Self {
        let key = RequestKey::from_request(&request);
        FetchEvent {
            request,
            key,
            lifetime,
        }
    }

    /// Returns the intercepted request.
    pub fn request(&self) -> &Request {
        &self.request
    }

    /// Returns the key addressing this request in the store.
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    /// Returns the lifetime handle.
    pub fn lifetime(&self) -> &O {
        &self.lifetime
    }

    /// Registers background work that must complete before teardown.
    pub fn wait_until<F>(&self, kind: impl Into<SmolStr>, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.lifetime.spawn(kind, future);
    }

    /// Splits the event into its request, key and lifetime handle.
    pub fn into_parts(self) -> (Request, RequestKey, O) {
        (self.request, self.key, self.lifetime)
    }
}
