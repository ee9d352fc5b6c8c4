//! Outbound request values and their HTTP/1.1 wire framing.
//!
//! # Design
//! `HttpRequest` is plain data: method, path, headers in insertion order and
//! an optional body. `to_wire` is the only place that knows the textual
//! layout of a request, so what the tests assert is byte-for-byte what the
//! transport writes. Each constructor builds a fresh header list; nothing is
//! shared between requests.

use std::fmt;

use tracing::debug;
use url::form_urlencoded;

use crate::url::ParsedUrl;

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// HTTP method understood by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

impl HttpMethod {
    /// Map a command word to a method. Only the exact word `POST` selects
    /// `Post`; everything else, including unknown or lower-case words, falls
    /// back to `Get`. The fallback is logged at `debug`.
    pub fn from_command(command: &str) -> Self {
        match command {
            "POST" => HttpMethod::Post,
            "GET" => HttpMethod::Get,
            _ => {
                debug!(method = command, "unrecognised method, falling back to GET");
                HttpMethod::Get
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a header. Duplicates are kept and written in order.
    pub fn header(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.headers.push((name.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The GET request sent by the client facade.
    pub fn get(target: &ParsedUrl, user_agent: &str) -> Self {
        Self::new(HttpMethod::Get, &target.path)
            .header("Host", target.host_header())
            .header("Accept", "*/*")
            .header("User-Agent", user_agent)
    }

    /// The POST request sent by the client facade.
    ///
    /// With no arguments the request carries `Content-Length: 0` and no body.
    /// Otherwise the arguments are form-url-encoded in the order given and
    /// the content headers describe the encoded body.
    pub fn post(target: &ParsedUrl, args: &[(String, String)]) -> Self {
        let request = Self::new(HttpMethod::Post, &target.path)
            .header("Host", target.host_header())
            .header("Accept", "*/*");

        if args.is_empty() {
            return request.header("Content-Length", 0);
        }

        let encoded = encode_form(args);
        request
            .header("Content-Type", FORM_CONTENT_TYPE)
            .header("Content-Length", encoded.len())
            .body(encoded)
    }

    /// Serialize to the exact bytes written to the socket.
    ///
    /// An empty body is treated the same as no body.
    pub fn to_wire(&self) -> String {
        let mut payload = format!("{} {} HTTP/1.1\r\n", self.method, self.path);

        for (name, value) in &self.headers {
            payload.push_str(name);
            payload.push_str(": ");
            payload.push_str(value);
            payload.push_str("\r\n");
        }

        payload.push_str("\r\n");

        if let Some(body) = self.body.as_deref().filter(|b| !b.is_empty()) {
            payload.push_str(body);
        }

        payload
    }
}

/// Form-url-encode key/value pairs in iteration order.
///
/// Spaces become `+`, reserved characters are percent-escaped and pairs are
/// joined with `&`.
pub fn encode_form<I, K, V>(pairs: I) -> String
where
    I: IntoIterator,
    I::Item: std::borrow::Borrow<(K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
