//! Hostname normalization used both for same-site fencing during discovery
//! and for joining crawled link targets back to registry members.

use url::Url;

/// Subdomain prefixes that do not distinguish one member from another.
pub const COMMON_SUBDOMAINS: &[&str] = &["www", "blog", "library", "note", "notes"];

/// Normalize a host (or a full URL pasted where a host was expected) down to
/// the identity-bearing part: lowercase, no scheme, no path, and with common
/// subdomain prefixes stripped until none remains.
///
/// Returns an empty string when there is no usable host.
pub fn strip_host(input: &str) -> String {
    let mut host = input.trim();
    if let Some(index) = host.find("://") {
        host = &host[index + 3..];
    }
    if let Some(index) = host.find('/') {
        host = &host[..index];
    }
    let mut host = host.trim().to_lowercase();
    loop {
        let before = host.len();
        for subdomain in COMMON_SUBDOMAINS {
            if let Some(rest) = host.strip_prefix(&format!("{}.", subdomain)) {
                host = rest.trim().to_string();
                break;
            }
        }
        if host.len() == before {
            break;
        }
    }
    host
}

/// Normalized host of a URL string, empty when the URL does not parse or has
/// no host component.
pub fn simple_host(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.host_str().map(strip_host).unwrap_or_default(),
        Err(_) => String::new(),
    }
}

/// True when two URLs point at different members after normalization.
pub fn cross_domain(a: &Url, b: &Url) -> bool {
    let (Some(host_a), Some(host_b)) = (a.host_str(), b.host_str()) else {
        return false;
    };
    strip_host(host_a) != strip_host(host_b)
}

/// True when `host` is in `list`, either exactly or as a subdomain of an
/// entry (`cdn.example.com` matches a listed `example.com`).
pub fn host_or_sub_matches(host: &str, list: &[&str]) -> bool {
    let mut remaining = host;
    loop {
        if list.contains(&remaining) {
            return true;
        }
        match remaining.find('.') {
            Some(dot) => remaining = &remaining[dot + 1..],
            None => return false,
        }
    }
}
