//! Error types for the raw HTTP client.
//!
//! # Design
//! Every failure in the pipeline maps to exactly one variant and travels
//! unchanged to the caller through `?`. Nothing is retried. `Connection`
//! keeps the underlying `io::Error` as its source so the caller sees the
//! operating system's diagnostic (refused, DNS failure, timeout, reset).

use std::io;

use thiserror::Error;

/// Errors produced while decomposing a URL, talking to the peer, or parsing
/// its response.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The URL scheme requires encrypted transport, which is not implemented.
    #[error("TLS Not Supported")]
    UnsupportedTransport,

    /// The URL scheme is neither `http` nor a TLS scheme.
    #[error("Unexpected Protocol: {0}")]
    UnsupportedProtocol(String),

    /// The URL could not be parsed, or it has no host to connect to.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Socket creation, connect, send or receive failed.
    #[error("connection error: {0}")]
    Connection(#[from] io::Error),

    /// The response had no usable status line or was not valid UTF-8.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

pub type Result<T, E = ClientError> = std::result::Result<T, E>;
