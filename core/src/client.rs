//! GET/POST facade over the URL, request, transport and response modules.
//!
//! # Design
//! `HttpClient` holds only its configuration and carries no mutable state
//! between calls. Every call is one straight pipeline: decompose the URL,
//! build the request, connect, send, receive, close, parse. Each call opens
//! and closes its own connection; nothing is cached or reused. Errors are
//! returned as they occur, without retries.

use tracing::debug;

use crate::config::ClientConfig;
use crate::error::Result;
use crate::request::{HttpMethod, HttpRequest};
use crate::response::{HttpResponse, RawResponse};
use crate::transport::Connection;
use crate::url::{decompose, ParsedUrl};

/// Blocking HTTP/1.1 client over plain TCP.
#[derive(Debug, Clone, Default)]
pub struct HttpClient {
    config: ClientConfig,
}

impl HttpClient {
    pub fn new(config: ClientConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn get(&self, url: &str) -> Result<HttpResponse> {
        self.fetch(HttpMethod::Get, url, &[])?.parse()
    }

    /// POST `args` as a form-url-encoded body. An empty slice sends
    /// `Content-Length: 0` and no body.
    pub fn post(&self, url: &str, args: &[(String, String)]) -> Result<HttpResponse> {
        self.fetch(HttpMethod::Post, url, args)?.parse()
    }

    /// Dispatch on a method word. `POST` posts `args`; any other word,
    /// recognised or not, performs a GET and ignores `args`.
    pub fn command(&self, url: &str, method: &str, args: &[(String, String)]) -> Result<HttpResponse> {
        match HttpMethod::from_command(method) {
            HttpMethod::Post => self.post(url, args),
            HttpMethod::Get => self.get(url),
        }
    }

    /// Run one request/response cycle and return the unparsed response.
    #[tracing::instrument(level = "debug", skip(self, args))]
    pub fn fetch(&self, method: HttpMethod, url: &str, args: &[(String, String)]) -> Result<RawResponse> {
        let target = decompose(url)?;
        let request = match method {
            HttpMethod::Get => HttpRequest::get(&target, &self.config.user_agent),
            HttpMethod::Post => HttpRequest::post(&target, args),
        };
        self.exchange(&target, &request)
    }

    fn exchange(&self, target: &ParsedUrl, request: &HttpRequest) -> Result<RawResponse> {
        debug!(method = %request.method, path = %request.path, "sending request");

        let mut connection = Connection::connect(&target.host, target.port, &self.config)?;
        connection.send_all(request.to_wire().as_bytes())?;
        let raw = connection.receive_all()?;
        connection.close()?;

        Ok(raw)
    }
}

#[cfg(test)]
mod tests {
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    use tracing_test::traced_test;

    use super::*;
    use crate::error::ClientError;

    /// Accept one connection, capture the request head, answer with
    /// `response` and close.
    fn one_shot_server(response: &'static str) -> (String, thread::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 512];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
            String::from_utf8(received).unwrap()
        });
        (url, handle)
    }

    #[test]
    fn tls_url_fails_before_connecting() {
        let err = HttpClient::default().get("https://example.com/").unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedTransport));
    }

    #[test]
    fn unsupported_scheme_propagates() {
        let err = HttpClient::default()
            .command("gopher://example.com/", "GET", &[])
            .unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedProtocol(_)));
    }

    #[test]
    fn refused_connection_is_a_connection_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = HttpClient::default()
            .get(&format!("http://{addr}/"))
            .unwrap_err();
        assert!(matches!(err, ClientError::Connection(_)));
    }

    #[test]
    fn get_sends_request_line_and_parses_reply() {
        let (url, server) = one_shot_server("HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello");
        let response = HttpClient::default().get(&format!("{url}/greeting?lang=en")).unwrap();
        let request = server.join().unwrap();

        assert!(request.starts_with("GET /greeting?lang=en HTTP/1.1\r\n"));
        assert!(request.contains("\r\nAccept: */*\r\n"));
        assert!(request.contains("\r\nUser-Agent: curl/7.54.0\r\n"));
        assert_eq!(response.code, 200);
        assert_eq!(response.body.as_deref(), Some("hello"));
    }

    #[test]
    fn configured_user_agent_is_sent() {
        let (url, server) = one_shot_server("HTTP/1.1 204 No Content\r\n\r\n");
        let client = HttpClient::new(ClientConfig::default().with_user_agent("rawhttp-test"));
        client.get(&url).unwrap();
        assert!(server.join().unwrap().contains("\r\nUser-Agent: rawhttp-test\r\n"));
    }

    #[test]
    #[traced_test]
    fn unknown_method_falls_back_to_get() {
        let (url, server) = one_shot_server("HTTP/1.1 200 OK\r\n\r\nok");
        let response = HttpClient::default().command(&url, "DELETE", &[]).unwrap();

        assert!(server.join().unwrap().starts_with("GET / HTTP/1.1\r\n"));
        assert_eq!(response.code, 200);
        assert!(logs_contain("falling back to GET"));
    }

    #[test]
    fn malformed_status_line_is_reported_after_close() {
        let (url, server) = one_shot_server("garbage\r\n\r\n");
        let err = HttpClient::default().get(&url).unwrap_err();
        server.join().unwrap();
        assert!(matches!(err, ClientError::MalformedResponse(_)));
    }
}
