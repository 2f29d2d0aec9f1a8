//! Pluggable transports that execute an `HttpRequest` over the network.
//!
//! # Design
//! The requester never branches on the URL scheme itself. It asks a
//! `TransportFactory` for the transport that handles a scheme and calls
//! `Transport::request`. The default factory, `SchemeTransports`, returns
//! `TlsTransport` for `https` and `PlainTransport` for everything else; tests
//! and callers that need proxying or mocking provide their own factory.
//!
//! Both built-in transports run on `ureq` and build a fresh agent per call,
//! so no connection outlives its request. `http_status_as_error` is off:
//! a 404 is a response to be parsed, not a transport failure. Redirects are
//! not followed: a 3xx is returned as is, so each call sends one request.

use ureq::tls::TlsConfig;
use ureq::Agent;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::RequestOptions;

/// Executes one request/response round trip.
pub trait Transport: Send + Sync {
    /// Send `request` and return the fully read response.
    ///
    /// Returns `Err` only when no response was received (connection refused,
    /// DNS failure, timeout, TLS handshake failure and the like).
    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;

    /// Short label used in log lines.
    fn name(&self) -> &'static str {
        "custom"
    }
}

/// Picks the transport for a URL scheme.
pub trait TransportFactory: Send + Sync {
    /// `scheme` is lowercased and has no trailing colon.
    fn transport_for(&self, scheme: &str) -> &dyn Transport;
}

/// Plaintext HTTP.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTransport;

impl Transport for PlainTransport {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .https_only(false)
            .timeout_global(request.options.timeout)
            .build()
            .new_agent();
        execute(&agent, request)
    }
}

/// HTTPS over rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct TlsTransport;

impl Transport for TlsTransport {
    fn name(&self) -> &'static str {
        "tls"
    }

    fn request(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .https_only(true)
            .timeout_global(request.options.timeout)
            .tls_config(tls_config(&request.options))
            .build()
            .new_agent();
        execute(&agent, request)
    }
}

fn tls_config(options: &RequestOptions) -> TlsConfig {
    TlsConfig::builder()
        .disable_verification(options.tls.disable_verification)
        .build()
}

/// Default factory: `https` goes over TLS, any other scheme in plaintext.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemeTransports {
    plain: PlainTransport,
    tls: TlsTransport,
}

impl TransportFactory for SchemeTransports {
    fn transport_for(&self, scheme: &str) -> &dyn Transport {
        if scheme == "https" {
            &self.tls
        } else {
            &self.plain
        }
    }
}

/// Run `request` on `agent` and read the whole body.
///
/// Headers go out exactly as the descriptor lists them, including a
/// `Content-Length: 0` on a bodiless GET, which is why bodiless methods are
/// forced into body mode.
fn execute(agent: &Agent, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
    let url = request.url.as_str();
    let payload = request.body.as_deref().unwrap_or_default().as_bytes();

    let result = match request.method {
        HttpMethod::Get => with_headers(agent.get(url), &request.headers)
            .force_send_body()
            .send(payload),
        HttpMethod::Delete => with_headers(agent.delete(url), &request.headers)
            .force_send_body()
            .send(payload),
        HttpMethod::Post => with_headers(agent.post(url), &request.headers).send(payload),
        HttpMethod::Put => with_headers(agent.put(url), &request.headers).send(payload),
    };
    let mut response = result?;

    let status = response.status();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|value| (name.as_str().to_string(), value.to_string()))
        })
        .collect();
    // Any body the server sent is part of the response: no size cap, and
    // invalid UTF-8 is replaced rather than failing the call.
    let bytes = response
        .body_mut()
        .with_config()
        .limit(u64::MAX)
        .read_to_vec()?;
    let body = String::from_utf8_lossy(&bytes).into_owned();

    Ok(HttpResponse {
        status: Some(status.as_u16()),
        reason: status.canonical_reason().map(str::to_string),
        headers,
        body,
    })
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
