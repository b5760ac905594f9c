use url::Url;

/// Reduces a URL to its origin key: `scheme://host[:port]`
///
/// The host is lower-cased and the port is only kept when it differs from
/// the scheme default. Path, query and fragment are dropped.
///
/// # Returns
///
/// * `Some(String)` - The origin key
/// * `None` - The URL has no host or is not http(s)
///
/// # Examples
///
/// ```
/// use url::Url;
/// use contact_harvest::url::origin_of;
///
/// let a = Url::parse("https://Sub.Example.com/path?q=1").unwrap();
/// let b = Url::parse("https://Sub.Example.com/other").unwrap();
/// assert_eq!(origin_of(&a), Some("https://sub.example.com".to_string()));
/// assert_eq!(origin_of(&a), origin_of(&b));
/// ```
pub fn origin_of(url: &Url) -> Option<String> {
    let scheme = url.scheme();
    if scheme != "http" && scheme != "https" {
        return None;
    }

    let host = url.host_str()?.to_lowercase();
    match url.port() {
        Some(port) => Some(format!("{}://{}:{}", scheme, host, port)),
        None => Some(format!("{}://{}", scheme, host)),
    }
}

/// Parses a raw string and reduces it to its origin key
///
/// Unparseable input has no origin.
pub fn origin_of_str(raw: &str) -> Option<String> {
    Url::parse(raw.trim()).ok().as_ref().and_then(origin_of)
}

/// Extracts the lower-cased host from a URL
pub fn host_of(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}
