/// Checks if a host matches an allowed-origin pattern
///
/// This function supports two types of patterns:
/// 1. Exact match: "example.com" matches only "example.com"
/// 2. Wildcard match: "*.example.com" matches "example.com" itself and any
///    subdomain of it, however deep
///
/// Comparison is case-insensitive.
///
/// # Examples
///
/// ```
/// use contact_harvest::url::matches_host_pattern;
///
/// assert!(matches_host_pattern("example.com", "EXAMPLE.com"));
/// assert!(!matches_host_pattern("example.com", "blog.example.com"));
///
/// assert!(matches_host_pattern("*.example.com", "example.com"));
/// assert!(matches_host_pattern("*.example.com", "api.v2.example.com"));
/// assert!(!matches_host_pattern("*.example.com", "badexample.com"));
/// ```
pub fn matches_host_pattern(pattern: &str, host: &str) -> bool {
    let pattern = pattern.to_lowercase();
    let host = host.to_lowercase();

    match pattern.strip_prefix("*.") {
        Some(base) => host == base || host.ends_with(&format!(".{}", base)),
        None => host == pattern,
    }
}
