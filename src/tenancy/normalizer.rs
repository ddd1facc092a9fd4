//! Hostname normalization
//!
//! Canonicalizes raw host strings before any registry or store lookup so
//! every caller compares the same form.

/// Normalize a raw host string: strip scheme, path, port and trailing
/// dots, then lowercase. Total: empty input yields an empty string.
pub fn normalize_host(raw: &str) -> String {
    let mut host = raw.trim();

    for scheme in ["https://", "http://"] {
        if let Some(rest) = host.strip_prefix(scheme) {
            host = rest;
            break;
        }
    }

    // Drop any path or query the caller left attached
    if let Some((authority, _)) = host.split_once('/') {
        host = authority;
    }

    // Strip a :port suffix; only when the suffix is purely numeric, so
    // IPv6 literals survive untouched
    if let Some((name, port)) = host.rsplit_once(':') {
        if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
            host = name;
        }
    }

    host.trim_end_matches('.').to_lowercase()
}
