//! HTTP transport types exchanged between the requester and a `Transport`.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! requester builds an `HttpRequest` descriptor, hands it to a transport for
//! the actual I/O, and interprets the returned `HttpResponse`. Keeping both
//! ends as data means the build and parse halves can be tested without a
//! socket.
//!
//! All fields use owned types (`String`, `Vec`) so a descriptor can move to
//! whichever thread runs the transport.

use std::fmt;
use std::str::FromStr;

use crate::options::RequestOptions;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Case-insensitive, so `"get"` and `"GET"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(s.to_string()),
        }
    }
}

/// An HTTP request described as plain data.
///
/// Built by [`build_request`](crate::client::build_request) from the caller's URL,
/// payload and options. `headers` always contains exactly one
/// `Content-Length` entry.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    /// Full URL exactly as the caller assembled it.
    pub url: String,
    /// Lowercased scheme without the trailing colon, e.g. `"https"`.
    pub scheme: String,
    pub hostname: String,
    /// Port given explicitly in the URL, if any.
    pub port: Option<u16>,
    /// Path plus query string; `"/"` when the URL has none.
    pub path: String,
    pub headers: Vec<(String, String)>,
    /// Encoded payload. `None` means nothing is written to the wire.
    pub body: Option<String>,
    /// Transport settings passed through untouched.
    pub options: RequestOptions,
}

impl HttpRequest {
    /// The port the connection will actually use.
    pub fn effective_port(&self) -> u16 {
        self.port
            .unwrap_or(if self.scheme == "https" { 443 } else { 80 })
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

/// An HTTP response described as plain data.
///
/// Produced by a `Transport` once the body has been fully read, then passed
/// to [`parse_response`](crate::client::parse_response).
#[derive(Debug, Clone, Default)]
pub struct HttpResponse {
    /// Status code, when the transport reported one.
    pub status: Option<u16>,
    /// Status message (reason phrase).
    pub reason: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    /// Status code with a missing value treated as a server error.
    pub fn effective_status(&self) -> u16 {
        self.status.unwrap_or(500)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}
