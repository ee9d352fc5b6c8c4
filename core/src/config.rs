//! Client configuration.

use std::time::Duration;

pub const DEFAULT_CHUNK_SIZE: usize = 1024;
pub const DEFAULT_USER_AGENT: &str = "curl/7.54.0";

/// Knobs for `HttpClient`.
///
/// The defaults reproduce fully blocking behaviour: no timeouts, so a peer
/// that never closes its end keeps the call waiting. Set the timeouts to
/// bound a call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Size of each socket read while draining the response.
    pub chunk_size: usize,
    /// Value of the `User-Agent` header sent with GET requests.
    pub user_agent: String,
    pub connect_timeout: Option<Duration>,
    pub read_timeout: Option<Duration>,
    pub write_timeout: Option<Duration>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            connect_timeout: None,
            read_timeout: None,
            write_timeout: None,
        }
    }
}

impl ClientConfig {
    /// A zero chunk size is replaced by the default.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = if chunk_size == 0 {
            DEFAULT_CHUNK_SIZE
        } else {
            chunk_size
        };
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Apply the same limit to connect, read and write.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self.read_timeout = Some(timeout);
        self.write_timeout = Some(timeout);
        self
    }
}
