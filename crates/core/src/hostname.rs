//! Hostname normalization, validation, and request routing order.
//!
//! Root pages claim hostnames; a request's `Host` is matched against those
//! claims to pick the site root. Two values are wildcards and never count as
//! conflicting claims: `*` (any host) and `default` (fallback site).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::CoreError;

/// Matches any request host.
pub const WILDCARD_ANY: &str = "*";

/// Fallback site when nothing else matches.
pub const WILDCARD_DEFAULT: &str = "default";

/// Dotted domain (or `localhost`) with an optional `:port` suffix.
const HOSTNAME_PATTERN: &str =
    r"^(localhost|([a-z0-9]([a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63})(:[0-9]{1,5})?$";

static HOSTNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(HOSTNAME_PATTERN).expect("valid regex"));

/// A leading `scheme://`. Only the prefix counts; a URL nested in the path or
/// query is left for the path cut below.
static SCHEME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-z0-9+.-]*://").expect("valid regex"));

/// Normalize raw user input into a bare `host[:port]`.
///
/// Strips any `scheme://` prefix and everything from the first `/`, `?`, or
/// `#`, then lowercases and trims:
///
/// `"HTTP://Example.COM:8080/path?x=1"` becomes `"example.com:8080"`.
pub fn normalize_hostname(raw: &str) -> String {
    let lowered = raw.trim().to_lowercase();
    let without_scheme = match SCHEME_RE.find(&lowered) {
        Some(m) => &lowered[m.end()..],
        None => lowered.as_str(),
    };
    let end = without_scheme
        .find(['/', '?', '#'])
        .unwrap_or(without_scheme.len());
    without_scheme[..end].trim().to_string()
}

/// Whether a normalized value is one of the wildcard claims.
pub fn is_wildcard(hostname: &str) -> bool {
    hostname == WILDCARD_ANY || hostname == WILDCARD_DEFAULT
}

/// Validate an already-normalized hostname.
pub fn validate_hostname(hostname: &str) -> Result<(), CoreError> {
    if hostname.is_empty() {
        return Err(CoreError::Validation("Hostname must not be empty".into()));
    }
    if is_wildcard(hostname) {
        return Ok(());
    }
    if hostname.len() > 253 + 6 || !HOSTNAME_RE.is_match(hostname) {
        return Err(CoreError::Validation(format!(
            "'{hostname}' is not a valid hostname (expected domain with optional :port)"
        )));
    }
    if let Some((_, port)) = hostname.rsplit_once(':') {
        match port.parse::<u32>() {
            Ok(p) if (1..=65_535).contains(&p) => {}
            _ => {
                return Err(CoreError::Validation(format!(
                    "Port in '{hostname}' must be between 1 and 65535"
                )))
            }
        }
    }
    Ok(())
}

/// Normalize then validate raw input, returning the stored form.
pub fn parse_hostname(raw: &str) -> Result<String, CoreError> {
    let normalized = normalize_hostname(raw);
    validate_hostname(&normalized)?;
    Ok(normalized)
}

/// Normalize and validate a set of hostnames, rejecting duplicates within the set.
pub fn parse_hostnames(raw: &[String]) -> Result<Vec<String>, CoreError> {
    let mut out: Vec<String> = Vec::with_capacity(raw.len());
    for value in raw {
        let host = parse_hostname(value)?;
        if out.contains(&host) {
            return Err(CoreError::Validation(format!(
                "Hostname '{host}' is listed more than once"
            )));
        }
        out.push(host);
    }
    Ok(out)
}

/// Claims to try, in priority order, when routing a request host.
///
/// Exact `host:port` first, then the bare host, then `*`, then `default`.
pub fn lookup_candidates(request_host: &str) -> Vec<String> {
    let host = normalize_hostname(request_host);
    let mut candidates = Vec::with_capacity(4);
    if !host.is_empty() {
        candidates.push(host.clone());
        if let Some((bare, _port)) = host.rsplit_once(':') {
            if !bare.is_empty() {
                candidates.push(bare.to_string());
            }
        }
    }
    candidates.push(WILDCARD_ANY.to_string());
    candidates.push(WILDCARD_DEFAULT.to_string());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    // -- normalize_hostname --------------------------------------------------

    #[test]
    fn normalize_strips_scheme_path_and_query() {
        assert_eq!(
            normalize_hostname("HTTP://Example.COM:8080/path?x=1"),
            "example.com:8080"
        );
    }

    #[test]
    fn normalize_strips_fragment_and_keeps_port() {
        assert_eq!(
            normalize_hostname("HTTPS://WWW.Example.org:443/a/b?q=1#frag"),
            "www.example.org:443"
        );
    }

    #[test]
    fn normalize_trims_whitespace() {
        assert_eq!(normalize_hostname("  Example.com  "), "example.com");
    }

    #[test]
    fn normalize_cuts_at_query_without_path() {
        assert_eq!(normalize_hostname("example.com?x=1"), "example.com");
        assert_eq!(normalize_hostname("example.com#top"), "example.com");
    }

    #[test]
    fn normalize_ignores_scheme_nested_in_query() {
        assert_eq!(
            normalize_hostname("example.com/login?next=https://evil.org"),
            "example.com"
        );
        assert_eq!(
            normalize_hostname("https://example.com/go?to=http://other.net/x"),
            "example.com"
        );
    }

    #[test]
    fn normalize_leaves_wildcards_alone() {
        assert_eq!(normalize_hostname("*"), "*");
        assert_eq!(normalize_hostname("DEFAULT"), "default");
    }

    // -- validate_hostname ---------------------------------------------------

    #[test]
    fn valid_domains_accepted() {
        assert!(validate_hostname("example.com").is_ok());
        assert!(validate_hostname("sub.example.co.uk").is_ok());
        assert!(validate_hostname("example.com:8080").is_ok());
        assert!(validate_hostname("localhost:3000").is_ok());
    }

    #[test]
    fn wildcards_accepted() {
        assert!(validate_hostname("*").is_ok());
        assert!(validate_hostname("default").is_ok());
    }

    #[test]
    fn malformed_values_rejected() {
        assert!(validate_hostname("").is_err());
        assert!(validate_hostname("not a host").is_err());
        assert!(validate_hostname("example").is_err());
        assert!(validate_hostname("-bad.example.com").is_err());
        assert!(validate_hostname("example.com:").is_err());
    }

    #[test]
    fn out_of_range_port_rejected() {
        assert!(validate_hostname("example.com:0").is_err());
        assert!(validate_hostname("example.com:70000").is_err());
    }

    // -- parse_hostnames -----------------------------------------------------

    #[test]
    fn parse_hostnames_rejects_duplicates_after_normalizing() {
        let raw = vec!["Example.com".to_string(), "https://example.com/".to_string()];
        assert!(parse_hostnames(&raw).is_err());
    }

    #[test]
    fn parse_hostnames_returns_normalized_values() {
        let raw = vec!["HTTP://A.example.com".to_string(), "*".to_string()];
        assert_eq!(
            parse_hostnames(&raw).unwrap(),
            vec!["a.example.com".to_string(), "*".to_string()]
        );
    }

    // -- lookup_candidates ---------------------------------------------------

    #[test]
    fn candidates_with_port() {
        assert_eq!(
            lookup_candidates("Example.com:8080"),
            vec!["example.com:8080", "example.com", "*", "default"]
        );
    }

    #[test]
    fn candidates_without_port() {
        assert_eq!(
            lookup_candidates("example.com"),
            vec!["example.com", "*", "default"]
        );
    }

    #[test]
    fn candidates_for_empty_host_are_wildcards_only() {
        assert_eq!(lookup_candidates(""), vec!["*", "default"]);
    }
}
