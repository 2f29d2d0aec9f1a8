//! Minimal HTTP GET requester.
//!
//! # Overview
//! `SyntheticRequester` issues a GET against `base_url + path`, parses the
//! body as JSON when it can (falling back to the raw text), and fails with a
//! `SyntheticRequesterError` on status ≥ 400 or with the untouched transport
//! error when no response arrives.
//!
//! # Design
//! - `SyntheticRequester` is stateless: it holds only `base_url`, a result
//!   callback and a transport factory.
//! - Each call is split into `build_request` (produces a descriptor),
//!   `Transport::request` (the only I/O) and `parse_response` (consumes the
//!   response), so both pure halves are testable without a socket.
//! - Transports are chosen by URL scheme through `TransportFactory`; the
//!   default one maps `https` to `TlsTransport` and everything else to
//!   `PlainTransport`.

pub mod client;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;
pub mod types;

pub use client::{build_request, parse_response, ResponseCallback, SyntheticRequester};
pub use error::{RequestError, SyntheticRequesterError, TransportError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{RequestOptions, TlsOptions};
pub use transport::{PlainTransport, SchemeTransports, TlsTransport, Transport, TransportFactory};
pub use types::{RequestBody, ResponseBody};
