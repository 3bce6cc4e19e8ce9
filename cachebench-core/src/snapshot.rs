//! Stored response snapshots.
//!
//! `http::Response` is not `Clone`, so whatever goes into the store is a
//! [`StoredResponse`]: the status line, headers and buffered body of a
//! response, together with the moment it was captured.

use std::mem::size_of;
use std::time::Duration;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::{HeaderMap, StatusCode, Version};

use crate::Response;

/// Snapshot of a response as written to the store.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use cachebench_core::StoredResponse;
///
/// let response = http::Response::builder()
///     .status(200)
///     .header("content-type", "text/plain")
///     .body(Bytes::from_static(b"hello"))
///     .unwrap();
///
/// let snapshot = StoredResponse::from_response(&response);
/// let replayed = snapshot.to_response();
/// assert_eq!(replayed.status(), 200);
/// assert_eq!(replayed.body(), &Bytes::from_static(b"hello"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Bytes,
    stored_at: DateTime<Utc>,
}

impl StoredResponse {
    /// Creates a snapshot from its parts, stamped with the current time.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        StoredResponse {
            status,
            version: Version::HTTP_11,
            headers,
            body,
            stored_at: Utc::now(),
        }
    }

    /// Captures `response` without consuming it.
    pub fn from_response(response: &Response) -> Self {
        StoredResponse {
            status: response.status(),
            version: response.version(),
            headers: response.headers().clone(),
            body: response.body().clone(),
            stored_at: Utc::now(),
        }
    }

    /// Rebuilds a response the caller can own.
    pub fn to_response(&self) -> Response {
        let mut response = http::Response::new(self.body.clone());
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers.clone();
        response
    }

    /// Returns the captured status code.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the captured headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the captured body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns when the snapshot was captured.
    #[inline]
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Time elapsed since the snapshot was captured.
    ///
    /// Returns `Duration::ZERO` if the clock went backwards.
    pub fn age(&self) -> Duration {
        Utc::now()
            .signed_duration_since(self.stored_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    /// Returns the estimated memory usage of this snapshot in bytes.
    ///
    /// Counts the struct itself, header names and values, and the body.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();

        size_of::<Self>() + headers + self.body.len()
    }
}
