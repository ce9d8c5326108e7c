//! Absolute URI splitting and `X-Forwarded-For` client address extraction.

use std::net::Ipv4Addr;

use http::Uri;
use tracing::trace;

/// Components of an absolute `http` or `https` URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UriParts {
    pub proto: String,
    pub host: String,
    pub port: u16,
    pub path: String,
    pub query: String,
}

/// Splits an absolute URI into protocol, host, port, path and query string.
///
/// The port defaults to 80 for `http` and 443 for `https`; the path defaults to `/`.
/// Returns `None` for relative references and for other schemes without a port.
pub fn parse_uri(uri: &str) -> Option<UriParts> {
    let parsed: Uri = uri.parse().ok()?;
    let scheme = parsed.scheme_str()?;
    let host = parsed.host()?;

    let port = match parsed.port_u16() {
        Some(port) => port,
        None if scheme.eq_ignore_ascii_case("http") => 80,
        None if scheme.eq_ignore_ascii_case("https") => 443,
        None => {
            trace!(uri, "no default port for scheme");
            return None;
        }
    };

    Some(UriParts {
        proto: scheme.to_string(),
        host: host.to_string(),
        port,
        path: parsed.path().to_string(),
        query: parsed.query().unwrap_or_default().to_string(),
    })
}

/// Returns the first public IPv4 address of a comma separated `X-Forwarded-For` list.
///
/// Entries that are not dotted quads, loopback addresses and private network addresses
/// (`10/8`, `172.16/12`, `192.168/16`) are skipped.
pub fn parse_forwarded_for(header: &str) -> Option<Ipv4Addr> {
    header
        .split(',')
        .filter_map(|entry| entry.trim().parse::<Ipv4Addr>().ok())
        .find(|addr| !addr.is_loopback() && !addr.is_private())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absolute_uri() {
        let parts = parse_uri("http://127.0.0.1/folder/file.ext?q=uery").unwrap();
        assert_eq!(
            parts,
            UriParts {
                proto: "http".into(),
                host: "127.0.0.1".into(),
                port: 80,
                path: "/folder/file.ext".into(),
                query: "q=uery".into(),
            }
        );

        let parts = parse_uri("http://www.cloudmeter.com/folder/file.ext").unwrap();
        assert_eq!(parts.host, "www.cloudmeter.com");
        assert_eq!(parts.path, "/folder/file.ext");
        assert!(parts.query.is_empty());
    }

    #[test]
    fn explicit_and_default_ports() {
        assert_eq!(parse_uri("http://example.com:8080/a").unwrap().port, 8080);
        assert_eq!(parse_uri("https://example.com/").unwrap().port, 443);
        assert_eq!(parse_uri("https://example.com").unwrap().path, "/");
    }

    #[test]
    fn relative_uri_is_rejected() {
        assert!(parse_uri("/folder/file.ext").is_none());
        assert!(parse_uri("ftp://example.com/file").is_none());
    }

    #[test]
    fn forwarded_for_skips_invalid_entries() {
        assert_eq!(parse_forwarded_for("myserver"), None);
        assert_eq!(parse_forwarded_for("128.2.02f.12"), None);
        assert_eq!(parse_forwarded_for("   129.12.12.204   "), Some(Ipv4Addr::new(129, 12, 12, 204)));
        assert_eq!(parse_forwarded_for(" phono , 129.2.31.24, 62.31.21.2"), Some(Ipv4Addr::new(129, 2, 31, 24)));
    }

    #[test]
    fn forwarded_for_skips_private_addresses() {
        for addr in ["127.0.0.1", "10.0.2.1", "192.168.2.12", "172.16.2.1", "172.21.2.1", "172.30.2.1"] {
            assert_eq!(parse_forwarded_for(addr), None, "{addr}");
        }
        assert_eq!(parse_forwarded_for("not_ipv4, 127.2.31.24, 62.31.21.2"), Some(Ipv4Addr::new(62, 31, 21, 2)));
        assert_eq!(parse_forwarded_for("10.21.31.2, 172.15.31.2"), Some(Ipv4Addr::new(172, 15, 31, 2)));
        assert_eq!(parse_forwarded_for("192.168.2.12, 172.32.31.2"), Some(Ipv4Addr::new(172, 32, 31, 2)));
    }
}
