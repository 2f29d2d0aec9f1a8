//! Stateless GET requester with JSON-or-text response parsing.
//!
//! # Design
//! `SyntheticRequester` holds a base URL, a response-transform callback and a
//! transport factory, and carries no mutable state between calls. A call is
//! split into three steps, with I/O only in the middle one:
//!
//! 1. `build_request` turns a method, URL, payload and options into an
//!    `HttpRequest` (URL parsing, payload encoding, `Content-Length`).
//! 2. The transport chosen for the URL scheme executes the request.
//! 3. `parse_response` turns the `HttpResponse` into a `ResponseBody` or a
//!    `SyntheticRequesterError`.
//!
//! A status ≥ 400 returns `Err` from `parse_response` and the call ends
//! there; the callback only ever sees successful results.

use std::fmt;
use std::sync::Arc;

use ureq::http::Uri;

use crate::error::{RequestError, SyntheticRequesterError};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::RequestOptions;
use crate::transport::{SchemeTransports, TransportFactory};
use crate::types::{RequestBody, ResponseBody};

/// Post-processing applied to every successful result.
pub type ResponseCallback = Arc<dyn Fn(ResponseBody) -> ResponseBody + Send + Sync>;

/// Issues GET requests against a base URL.
///
/// Cloning is cheap; clones share the callback and transport factory.
#[derive(Clone)]
pub struct SyntheticRequester {
    base_url: String,
    callback: ResponseCallback,
    transports: Arc<dyn TransportFactory>,
}

impl SyntheticRequester {
    /// `base_url` is prefixed verbatim to every path; no slash is added or
    /// removed.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            callback: Arc::new(|body| body),
            transports: Arc::new(SchemeTransports::default()),
        }
    }

    /// Replace the identity transform applied to successful results.
    pub fn with_callback<F>(mut self, callback: F) -> Self
    where
        F: Fn(ResponseBody) -> ResponseBody + Send + Sync + 'static,
    {
        self.callback = Arc::new(callback);
        self
    }

    /// Replace the scheme-based transport selection.
    pub fn with_transports<T>(mut self, transports: T) -> Self
    where
        T: TransportFactory + 'static,
    {
        self.transports = Arc::new(transports);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `base_url + path`.
    ///
    /// Resolves to the parsed body (JSON when it parses, raw text otherwise)
    /// after the callback has been applied. Fails with
    /// `RequestError::Status` when the server answers with status ≥ 400 and
    /// with `RequestError::Transport` when no response arrives.
    pub fn get(
        &self,
        path: &str,
        options: Option<RequestOptions>,
    ) -> Result<ResponseBody, RequestError> {
        let url = format!("{}{}", self.base_url, path);
        let body = self.request(
            HttpMethod::Get.as_str(),
            &url,
            RequestBody::Empty,
            options.unwrap_or_default(),
        )?;
        Ok((self.callback)(body))
    }

    /// One request/response cycle for any supported method.
    pub(crate) fn request(
        &self,
        method: &str,
        url: &str,
        body: RequestBody,
        options: RequestOptions,
    ) -> Result<ResponseBody, RequestError> {
        let method: HttpMethod = method.parse().map_err(RequestError::UnsupportedMethod)?;
        let request = build_request(method, url, &body, options)?;

        let transport = self.transports.transport_for(&request.scheme);
        log::debug!("{} {} via {}", request.method, request.url, transport.name());

        let response = transport.request(&request).map_err(|err| {
            log::warn!("{} {} failed: {err}", request.method, request.url);
            RequestError::Transport(err)
        })?;
        log::debug!(
            "{} {} -> {} ({} bytes)",
            request.method,
            request.url,
            response.effective_status(),
            response.body.len()
        );

        parse_response(response).map_err(RequestError::Status)
    }
}

impl fmt::Debug for SyntheticRequester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntheticRequester")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Build the request descriptor for `method url`.
///
/// The payload is encoded first so `Content-Length` can be computed; an
/// empty encoding leaves `body` as `None`.
pub fn build_request(
    method: HttpMethod,
    url: &str,
    body: &RequestBody,
    options: RequestOptions,
) -> Result<HttpRequest, RequestError> {
    let invalid = |reason: &str| RequestError::InvalidUrl {
        url: url.to_string(),
        reason: reason.to_string(),
    };

    let uri: Uri = url.parse().map_err(|err: ureq::http::uri::InvalidUri| invalid(&err.to_string()))?;
    let scheme = uri
        .scheme_str()
        .ok_or_else(|| invalid("missing scheme"))?
        .to_ascii_lowercase();
    let hostname = uri
        .host()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| invalid("missing host"))?
        .to_string();
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .filter(|pq| !pq.is_empty())
        .unwrap_or("/")
        .to_string();

    let encoded = body.encode()?;
    let headers = options.merged_headers(encoded.len());

    Ok(HttpRequest {
        method,
        url: url.to_string(),
        scheme,
        hostname,
        port: uri.port_u16(),
        path,
        headers,
        body: (!encoded.is_empty()).then_some(encoded),
        options,
    })
}

/// Interpret a completed response.
///
/// The body is parsed before the status is checked so a failing status
/// still carries the server's (parsed) explanation.
pub fn parse_response(response: HttpResponse) -> Result<ResponseBody, SyntheticRequesterError> {
    let status = response.effective_status();
    let body = ResponseBody::parse(&response.body);

    if status >= 400 {
        return Err(SyntheticRequesterError {
            message: response.reason.unwrap_or_default(),
            status,
            request: body,
        });
    }
    Ok(body)
}
