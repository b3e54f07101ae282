//! URL Guard
//!
//! Decides whether a caller-supplied URL may be fetched at all. Checks run in
//! a fixed order and stop at the first failure: length, syntax, scheme, DNS
//! resolution, then the address policy.
//!
//! The verdict is computed from a fresh resolution on every call. The HTTP
//! client resolves the host again when it connects, so an answer that changes
//! between the two lookups is not caught here.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use tokio::net::lookup_host;
use tracing::debug;
use url::{Host, ParseError, Url};

use crate::error::FetchError;

// == Public Constants ==
/// Longest URL, in characters, that will be considered
pub const MAX_URL_LENGTH: usize = 256;

/// Validates `raw` and returns the parsed URL if it is safe to fetch.
pub async fn validate_url(raw: &str) -> Result<Url, FetchError> {
    let url = check_syntax(raw)?;
    let addrs = resolve(&url).await?;
    check_addresses(&addrs)?;
    debug!("URL {} resolved to {:?}", url, addrs);
    Ok(url)
}

// == Static checks ==
/// Length, syntax and scheme checks. Never touches the network.
pub fn check_syntax(raw: &str) -> Result<Url, FetchError> {
    let length = raw.chars().count();
    if length > MAX_URL_LENGTH {
        return Err(FetchError::UrlTooLong(length));
    }

    let url = match Url::parse(raw) {
        Ok(url) => url,
        // A relative reference is well-formed, it just has no scheme
        Err(ParseError::RelativeUrlWithoutBase) => {
            return Err(FetchError::InsecureScheme(String::new()))
        }
        Err(err) => return Err(FetchError::UrlMalformed(err.to_string())),
    };

    if url.scheme() != "https" {
        return Err(FetchError::InsecureScheme(url.scheme().to_string()));
    }

    Ok(url)
}

// == Resolution ==
/// Resolves the URL's host to its address set. IP literals are returned as-is.
pub async fn resolve(url: &Url) -> Result<Vec<IpAddr>, FetchError> {
    let domain = match url.host() {
        Some(Host::Ipv4(ip)) => return Ok(vec![IpAddr::V4(ip)]),
        Some(Host::Ipv6(ip)) => return Ok(vec![IpAddr::V6(ip)]),
        Some(Host::Domain(domain)) => domain,
        None => return Err(FetchError::UrlMalformed("URL has no host".to_string())),
    };

    let port = url.port_or_known_default().unwrap_or(443);
    let addrs: Vec<IpAddr> = lookup_host((domain, port))
        .await
        .map_err(|err| FetchError::DnsFailure {
            host: domain.to_string(),
            reason: err.to_string(),
        })?
        .map(|sock| sock.ip())
        .collect();

    if addrs.is_empty() {
        return Err(FetchError::DnsFailure {
            host: domain.to_string(),
            reason: "no addresses returned".to_string(),
        });
    }
    Ok(addrs)
}

// == Address policy ==
/// Rejects the set if any address is not publicly routable.
pub fn check_addresses(addrs: &[IpAddr]) -> Result<(), FetchError> {
    for &addr in addrs {
        if let Some(class) = unsafe_class(addr) {
            return Err(FetchError::UnsafeTarget { addr, class });
        }
    }
    Ok(())
}

/// Names the forbidden range `addr` falls in, if any.
pub fn unsafe_class(addr: IpAddr) -> Option<&'static str> {
    match addr {
        IpAddr::V4(v4) => unsafe_class_v4(v4),
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => unsafe_class_v4(v4),
            None => unsafe_class_v6(v6),
        },
    }
}

fn unsafe_class_v4(ip: Ipv4Addr) -> Option<&'static str> {
    if ip.is_private() || ip.is_link_local() {
        Some("private")
    } else if ip.is_loopback() {
        Some("loopback")
    } else if ip.is_multicast() {
        Some("multicast")
    } else if ip.is_unspecified() {
        Some("unspecified")
    } else {
        None
    }
}

fn unsafe_class_v6(ip: Ipv6Addr) -> Option<&'static str> {
    let first = ip.segments()[0];
    // fc00::/7 unique local, fe80::/10 link local
    if (first & 0xfe00) == 0xfc00 || (first & 0xffc0) == 0xfe80 {
        Some("private")
    } else if ip.is_loopback() {
        Some("loopback")
    } else if ip.is_multicast() {
        Some("multicast")
    } else if ip.is_unspecified() {
        Some("unspecified")
    } else {
        None
    }
}
