//! Per-call transport settings.
//!
//! The requester never interprets these beyond merging `Content-Length` into
//! the headers; everything else is handed to the selected transport as is.

use std::time::Duration;

/// Transport settings for a single request. `Default` is the empty set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Extra request headers, sent in order.
    pub headers: Vec<(String, String)>,
    /// Overall deadline for the round trip, enforced by the transport.
    pub timeout: Option<Duration>,
    pub tls: TlsOptions,
}

/// TLS settings used by the encrypted transport only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TlsOptions {
    /// Accept any server certificate. Only meant for test servers.
    pub disable_verification: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn tls(mut self, tls: TlsOptions) -> Self {
        self.tls = tls;
        self
    }

    /// Caller headers with any `Content-Length` replaced by the computed one.
    ///
    /// The computed header goes last, so it wins regardless of what the
    /// caller supplied.
    pub(crate) fn merged_headers(&self, content_length: usize) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .headers
            .iter()
            .filter(|(name, _)| !name.eq_ignore_ascii_case("content-length"))
            .cloned()
            .collect();
        headers.push(("Content-Length".to_string(), content_length.to_string()));
        headers
    }
}
