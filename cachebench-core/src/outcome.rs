//! Results produced by caching policies.
//!
//! Every policy terminates in a [`ResponseOutcome`]. There is no error
//! variant: when neither source can answer, the outcome is a synthetic
//! `408 Request Timeout` built from a [`SyntheticError`].

use std::fmt;

use bytes::Bytes;
use http::StatusCode;
use http::header::{CONTENT_TYPE, HeaderValue};

use crate::Response;

/// Where a response handed to the caller came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResponseSource {
    /// Fetched from the network during this request.
    Network,
    /// Served from the durable store.
    Store,
    /// Built locally because no source could answer.
    Synthetic,
}

impl ResponseSource {
    /// Short label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Store => "store",
            Self::Synthetic => "synthetic",
        }
    }
}

impl fmt::Display for ResponseSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal failure reported to the caller as a synthetic response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticError {
    /// The only source consulted last (the network) failed.
    NetworkFailed,
    /// The store missed and the network failed.
    BothFailed,
}

impl SyntheticError {
    /// Status code of every synthetic response.
    pub const STATUS: StatusCode = StatusCode::REQUEST_TIMEOUT;

    /// Literal plain-text body of the synthetic response.
    pub fn message(&self) -> &'static str {
        match self {
            Self::NetworkFailed => "Network error happened",
            Self::BothFailed => "Both network and cache failed",
        }
    }

    /// Renders the synthetic `408` response.
    pub fn to_response(&self) -> Response {
        let mut response = http::Response::new(Bytes::from_static(self.message().as_bytes()));
        *response.status_mut() = Self::STATUS;
        response
            .headers_mut()
            .insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        response
    }
}

/// Tagged result of running a caching policy for one request.
#[derive(Debug)]
pub enum ResponseOutcome {
    /// Response captured from the network.
    Network(Response),
    /// Response replayed from the store.
    Cached(Response),
    /// Neither source could answer.
    Synthetic(SyntheticError),
}

impl ResponseOutcome {
    /// Returns where the response came from.
    pub fn source(&self) -> ResponseSource {
        match self {
            Self::Network(_) => ResponseSource::Network,
            Self::Cached(_) => ResponseSource::Store,
            Self::Synthetic(_) => ResponseSource::Synthetic,
        }
    }

    /// Returns `true` if the response was served from the store.
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached(_))
    }

    /// Converts the outcome into the response handed to the caller.
    pub fn into_response(self) -> Response {
        match self {
            Self::Network(response) | Self::Cached(response) => response,
            Self::Synthetic(error) => error.to_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_responses_are_plain_text_408() {
        for (error, body) in [
            (SyntheticError::NetworkFailed, "Network error happened"),
            (SyntheticError::BothFailed, "Both network and cache failed"),
        ] {
            let response = ResponseOutcome::Synthetic(error).into_response();
            assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
            assert_eq!(response.headers()[CONTENT_TYPE], "text/plain");
            assert_eq!(response.body(), &Bytes::from_static(body.as_bytes()));
        }
    }
}
