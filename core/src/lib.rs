//! Minimal HTTP/1.1 client written directly on TCP sockets.
//!
//! # Overview
//! Shows how a request is framed on the wire and how the raw bytes that come
//! back are turned into a status code and a body, without any HTTP library
//! in between.
//!
//! # Design
//! - `url` decomposes an absolute URL into host, port and path+query.
//! - `request` builds `HttpRequest` values and serializes them to wire text.
//! - `transport` owns one blocking `TcpStream` per request and reads until
//!   the peer closes it.
//! - `response` extracts the status code, header block and body from the
//!   raw text.
//! - `HttpClient` composes these into `get`, `post` and `command`.
//!
//! Plain `http` only. No TLS, keep-alive, chunked decoding, redirects,
//! cookies or authentication.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod response;
pub mod transport;
pub mod url;

pub use client::HttpClient;
pub use config::ClientConfig;
pub use error::ClientError;
pub use request::{HttpMethod, HttpRequest};
pub use response::{HttpResponse, RawResponse};
pub use transport::Connection;
pub use crate::url::{decompose, ParsedUrl};
