//! Blocking socket transport for a single request/response cycle.
//!
//! # Design
//! `Connection` owns its stream. It is produced by `connect`, borrowed
//! mutably by `send_all` and `receive_all`, and consumed by `close`. If a
//! cycle fails half way the value is dropped on the early return, which
//! releases the socket just the same, so no path can leak it or reuse it
//! for a second request.
//!
//! The response is complete only when the peer closes its side: reads
//! continue until one returns zero bytes. `Content-Length` and chunked
//! framing are not interpreted here.

use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream, ToSocketAddrs};

use tracing::{debug, trace};

use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::response::RawResponse;

/// One exclusively owned stream, used for exactly one request.
#[derive(Debug)]
pub struct Connection<S = TcpStream> {
    stream: S,
    chunk_size: usize,
}

impl Connection<TcpStream> {
    /// Open a blocking TCP connection to `host:port`.
    ///
    /// Every address the host resolves to is tried in order; the last
    /// failure is returned when none accept.
    pub fn connect(host: &str, port: u16, config: &ClientConfig) -> Result<Self> {
        let stream = match config.connect_timeout {
            None => TcpStream::connect((host, port))?,
            Some(timeout) => {
                let mut last_err = None;
                let mut connected = None;
                for addr in (host, port).to_socket_addrs()? {
                    match TcpStream::connect_timeout(&addr, timeout) {
                        Ok(stream) => {
                            connected = Some(stream);
                            break;
                        }
                        Err(e) => last_err = Some(e),
                    }
                }
                match connected {
                    Some(stream) => stream,
                    None => {
                        return Err(last_err
                            .unwrap_or_else(|| {
                                io::Error::new(
                                    ErrorKind::NotFound,
                                    format!("no addresses found for {host}"),
                                )
                            })
                            .into())
                    }
                }
            }
        };

        stream.set_read_timeout(config.read_timeout)?;
        stream.set_write_timeout(config.write_timeout)?;

        debug!(host, port, "connected");
        Ok(Self::from_stream(stream, config.chunk_size))
    }

    /// Shut the socket down in both directions and release it.
    ///
    /// A peer that already went away is not an error here.
    pub fn close(self) -> Result<()> {
        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotConnected => {}
            Err(e) => return Err(e.into()),
        }
        debug!("connection closed");
        Ok(())
    }
}

impl<S: Read + Write> Connection<S> {
    pub fn from_stream(stream: S, chunk_size: usize) -> Self {
        Self {
            stream,
            chunk_size: chunk_size.max(1),
        }
    }

    /// Write the whole payload, then flush.
    pub fn send_all(&mut self, payload: &[u8]) -> Result<()> {
        self.stream.write_all(payload)?;
        self.stream.flush()?;
        debug!(bytes = payload.len(), "request sent");
        Ok(())
    }

    /// Read `chunk_size` bytes at a time until the peer closes the
    /// connection, then decode everything as UTF-8.
    pub fn receive_all(&mut self) -> Result<RawResponse> {
        let mut buffer = Vec::new();
        let mut chunk = vec![0u8; self.chunk_size];

        loop {
            let read = match self.stream.read(&mut chunk) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            trace!(bytes = read, "chunk received");
            buffer.extend_from_slice(&chunk[..read]);
        }

        debug!(bytes = buffer.len(), "response received");

        String::from_utf8(buffer)
            .map(RawResponse::new)
            .map_err(|e| ClientError::MalformedResponse(format!("response is not valid UTF-8: {e}")))
    }

    pub fn into_inner(self) -> S {
        self.stream
    }
}
