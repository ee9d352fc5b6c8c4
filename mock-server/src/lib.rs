use std::{collections::HashMap, io, sync::Arc};

use serde::{Deserialize, Serialize};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
    sync::RwLock,
};
use tracing::{debug, warn};

/// Sent verbatim when no route matches.
pub const NOT_FOUND: &str = "HTTP/1.1 404 Not Found\r\n\r\n";

pub const HELLO: &str = "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhello";

pub const MULTILINE: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\n\r\n<html>\r\n<body>hi</body>\r\n</html>\r\n";

/// What the server writes back before closing the connection.
#[derive(Clone, Debug)]
pub enum Reply {
    /// Raw response bytes, written as-is.
    Canned(String),
    /// 200 with the request body as the response body.
    Echo,
}

/// A request as the server received it off the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: String,
    pub target: String,
    pub version: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or_default()
    }
}

pub type Log = Arc<RwLock<Vec<RecordedRequest>>>;

/// Close-delimited HTTP/1.1 server: one request per connection, one reply,
/// then the write side is shut down.
#[derive(Clone, Default)]
pub struct MockServer {
    routes: HashMap<(String, String), Reply>,
    log: Log,
}

/// The fixture routes used by the client tests.
pub fn app() -> MockServer {
    MockServer::new()
        .route("GET", "/", Reply::Canned(HELLO.to_string()))
        .route("GET", "/lines", Reply::Canned(MULTILINE.to_string()))
        .route(
            "GET",
            "/no-separator",
            Reply::Canned("HTTP/1.1 200 OK\r\nContent-Type: text/plain".to_string()),
        )
        .route("GET", "/missing", Reply::Canned(NOT_FOUND.to_string()))
        .route("POST", "/echo", Reply::Echo)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    app().serve(listener).await
}

impl MockServer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a reply for `method` on `path` (query string ignored).
    pub fn route(mut self, method: &str, path: &str, reply: Reply) -> Self {
        self.routes
            .insert((method.to_string(), path.to_string()), reply);
        self
    }

    /// Shared handle to every request received so far.
    pub fn requests(&self) -> Log {
        self.log.clone()
    }

    pub async fn serve(self, listener: TcpListener) -> io::Result<()> {
        let server = Arc::new(self);
        loop {
            let (stream, peer) = listener.accept().await?;
            let server = server.clone();
            tokio::spawn(async move {
                if let Err(e) = server.handle(stream).await {
                    warn!(%peer, error = %e, "connection failed");
                }
            });
        }
    }

    pub async fn handle(&self, mut stream: TcpStream) -> io::Result<()> {
        let request = read_request(&mut stream).await?;
        debug!(
            request = %serde_json::to_string(&request).unwrap_or_default(),
            "request received"
        );

        let reply = self
            .routes
            .get(&(request.method.clone(), request.path().to_string()))
            .cloned();

        let bytes = match reply {
            Some(Reply::Canned(raw)) => raw,
            Some(Reply::Echo) => format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nContent-Length: {}\r\n\r\n{}",
                request.body.len(),
                request.body
            ),
            None => NOT_FOUND.to_string(),
        };

        self.log.write().await.push(request);

        stream.write_all(bytes.as_bytes()).await?;
        stream.shutdown().await
    }
}

/// Read the head up to the blank line, then exactly `Content-Length` body
/// bytes.
async fn read_request(stream: &mut TcpStream) -> io::Result<RecordedRequest> {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 1024];

    let head_end = loop {
        if let Some(pos) = buffer.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed before end of request head",
            ));
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buffer[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let request_line = lines.next().unwrap_or_default();
    let mut parts = request_line.splitn(3, ' ');
    let method = parts.next().unwrap_or_default().to_string();
    let target = parts.next().unwrap_or_default().to_string();
    let version = parts.next().unwrap_or_default().to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(name, value)| (name.trim().to_string(), value.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buffer[head_end + 4..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);

    Ok(RecordedRequest {
        method,
        target,
        version,
        headers,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}
