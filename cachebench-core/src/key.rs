//! Request key types.
//!
//! A [`RequestKey`] is the canonical identity of an intercepted request. It is
//! built from the request method and URL only, so the same request always
//! addresses the same stored entry regardless of headers or body.
//!
//! ```
//! use cachebench_core::RequestKey;
//! use http::Method;
//!
//! let key = RequestKey::new(&Method::GET, &"https://example.com/x".parse().unwrap());
//! assert_eq!(format!("{}", key), "GET https://example.com/x");
//! ```
//!
//! [`RequestKey`] uses `Arc` internally, so cloning a key only bumps a
//! reference count.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use http::{Method, Uri};
use smol_str::SmolStr;

#[derive(Debug, Eq, PartialEq, Hash)]
struct RequestKeyInner {
    method: Method,
    url: SmolStr,
}

/// Canonical identity of an intercepted request.
///
/// Two requests with the same method and URL produce equal keys.
#[derive(Clone, Debug)]
pub struct RequestKey {
    inner: Arc<RequestKeyInner>,
}

impl RequestKey {
    /// Builds a key from a method and URL.
    pub fn new(method: &Method, uri: &Uri) -> Self {
        RequestKey {
            inner: Arc::new(RequestKeyInner {
                method: method.clone(),
                url: SmolStr::new(uri.to_string()),
            }),
        }
    }

    /// Builds the key addressing `request`.
    pub fn from_request<B>(request: &http::Request<B>) -> Self {
        Self::new(request.method(), request.uri())
    }

    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Returns the request URL as it was intercepted.
    #[inline]
    pub fn url(&self) -> &str {
        &self.inner.url
    }
}

impl PartialEq for RequestKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)
    }
}
