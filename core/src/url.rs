//! URL decomposition into the three values a raw socket request needs.
//!
//! # Design
//! Scheme, host and port come from the `url` crate; this module only decides
//! which schemes are acceptable and flattens the result into
//! `host`/`port`/`path`. The path and query are sliced from the input text
//! instead of the parsed URL, so the request line carries them exactly as
//! given: dot-segments stay, and nothing is percent-encoded or decoded.

use serde::{Deserialize, Serialize};
use url::{Host, Url};

use crate::error::{ClientError, Result};

pub const DEFAULT_HTTP_PORT: u16 = 80;

/// Schemes that can only be spoken over an encrypted transport.
const TLS_SCHEMES: &[&str] = &["https", "wss"];

/// Connection target and request path extracted from an absolute URL.
///
/// `path` is never empty and already includes `?query` when the URL had a
/// non-empty query string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedUrl {
    pub host: String,
    pub port: u16,
    pub path: String,
}

impl ParsedUrl {
    /// Value for the `Host` request header. IPv6 literals get their brackets
    /// back; the port is not included.
    pub fn host_header(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        }
    }
}

/// Split an absolute `http://` URL into host, port and path+query.
///
/// # Errors
/// - [`ClientError::UnsupportedTransport`] for `https`/`wss`, even with an
///   explicit port.
/// - [`ClientError::UnsupportedProtocol`] for any other non-`http` scheme.
/// - [`ClientError::InvalidUrl`] when the text is not a URL or has no host.
pub fn decompose(input: &str) -> Result<ParsedUrl> {
    let url = Url::parse(input).map_err(|e| ClientError::InvalidUrl(format!("{input}: {e}")))?;

    match url.scheme() {
        "http" => {}
        scheme if TLS_SCHEMES.contains(&scheme) => return Err(ClientError::UnsupportedTransport),
        scheme => return Err(ClientError::UnsupportedProtocol(scheme.to_string())),
    }

    let host = match url.host() {
        Some(Host::Ipv6(addr)) => addr.to_string(),
        Some(Host::Ipv4(addr)) => addr.to_string(),
        Some(Host::Domain(domain)) if !domain.is_empty() => domain.to_string(),
        _ => return Err(ClientError::InvalidUrl(format!("{input}: missing host"))),
    };

    let port = url.port_or_known_default().unwrap_or(DEFAULT_HTTP_PORT);

    let (raw_path, query) = raw_path_and_query(input);
    let mut path = if raw_path.is_empty() { "/".to_string() } else { raw_path.to_string() };
    if let Some(query) = query.filter(|q| !q.is_empty()) {
        path.push('?');
        path.push_str(query);
    }

    Ok(ParsedUrl { host, port, path })
}

/// Path and query of an already validated absolute URL, as written.
///
/// The authority ends at the first `/`, `?`, `#` or `\` after the scheme's
/// slashes; the fragment is dropped.
fn raw_path_and_query(input: &str) -> (&str, Option<&str>) {
    let input = input.trim_matches(|c: char| c <= ' ');
    let after_scheme = input.split_once(':').map_or(input, |(_, rest)| rest);
    let authority_and_rest = after_scheme.trim_start_matches(|c: char| c == '/' || c == '\\');
    let rest = authority_and_rest
        .find(|c: char| matches!(c, '/' | '?' | '#' | '\\'))
        .map_or("", |idx| &authority_and_rest[idx..]);
    let without_fragment = rest.split_once('#').map_or(rest, |(head, _)| head);

    match without_fragment.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (without_fragment, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_host_defaults_to_port_80_and_root_path() {
        let parsed = decompose("http://example.com").unwrap();
        assert_eq!(
            parsed,
            ParsedUrl {
                host: "example.com".to_string(),
                port: 80,
                path: "/".to_string(),
            }
        );
    }

    #[test]
    fn explicit_port_is_kept() {
        let parsed = decompose("http://localhost:8080/index.html").unwrap();
        assert_eq!(parsed.host, "localhost");
        assert_eq!(parsed.port, 8080);
        assert_eq!(parsed.path, "/index.html");
    }

    #[test]
    fn query_is_appended_to_path() {
        let parsed = decompose("http://example.com/search?q=rust&page=2").unwrap();
        assert_eq!(parsed.path, "/search?q=rust&page=2");
    }

    #[test]
    fn empty_query_is_dropped() {
        let parsed = decompose("http://example.com/a?").unwrap();
        assert_eq!(parsed.path, "/a");
    }

    #[test]
    fn query_without_path_gets_root() {
        let parsed = decompose("http://example.com?x=1").unwrap();
        assert_eq!(parsed.path, "/?x=1");
    }

    #[test]
    fn fragment_is_not_sent() {
        let parsed = decompose("http://example.com/doc#section").unwrap();
        assert_eq!(parsed.path, "/doc");
    }

    #[test]
    fn percent_escapes_are_not_decoded() {
        let parsed = decompose("http://example.com/a%20b").unwrap();
        assert_eq!(parsed.path, "/a%20b");
    }

    #[test]
    fn dot_segments_are_kept() {
        assert_eq!(decompose("http://h/a/../b").unwrap().path, "/a/../b");
        assert_eq!(decompose("http://h/x/./y").unwrap().path, "/x/./y");
    }

    #[test]
    fn spaces_and_non_ascii_are_sent_as_given() {
        assert_eq!(decompose("http://h/a b").unwrap().path, "/a b");
        assert_eq!(decompose("http://h/s?q=a b").unwrap().path, "/s?q=a b");
        assert_eq!(decompose("http://h/café").unwrap().path, "/café");
    }

    #[test]
    fn query_and_fragment_split_after_authority() {
        let parsed = decompose("http://user@h:8080/p?x=1#frag?not-query").unwrap();
        assert_eq!(parsed.port, 8080);
        assert_eq!(parsed.path, "/p?x=1");
    }

    #[test]
    fn https_is_rejected_as_unsupported_transport() {
        let err = decompose("https://example.com/").unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedTransport));
        assert_eq!(err.to_string(), "TLS Not Supported");
    }

    #[test]
    fn https_with_explicit_port_is_still_rejected() {
        let err = decompose("https://example.com:8443/").unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedTransport));
    }

    #[test]
    fn other_schemes_are_unsupported() {
        let err = decompose("ftp://example.com/file").unwrap_err();
        assert!(matches!(err, ClientError::UnsupportedProtocol(ref s) if s == "ftp"));
    }

    #[test]
    fn relative_url_is_invalid() {
        let err = decompose("example.com/index.html").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn ipv6_host_is_unbracketed_for_connect() {
        let parsed = decompose("http://[::1]:3000/").unwrap();
        assert_eq!(parsed.host, "::1");
        assert_eq!(parsed.port, 3000);
        assert_eq!(parsed.host_header(), "[::1]");
    }
}
