use crate::{UrlError, UrlResult};
use url::Url;

/// Query parameters that only carry campaign tracking
const TRACKING_PARAMS: &[&str] = &["fbclid", "gclid", "mc_eid", "ref", "source"];

/// Normalizes a scrape target into its canonical string form
///
/// Two targets are the same work item iff their normalized strings are
/// equal.
///
/// # Normalization Steps
///
/// 1. Trim whitespace; assume `https://` when no scheme is given
/// 2. Parse; reject anything that is not http(s) or has no host
/// 3. Lowercase the host (done by the parser for http(s))
/// 4. Collapse dot segments and repeated slashes in the path
/// 5. Remove the fragment and tracking query parameters
/// 6. Drop the trailing slash, including the root one
///
/// # Examples
///
/// ```
/// use contact_harvest::url::normalize_target;
///
/// assert_eq!(normalize_target(" Example.COM/ ").unwrap(), "https://example.com");
/// assert_eq!(
///     normalize_target("https://example.com/about/?utm_source=x#team").unwrap(),
///     "https://example.com/about"
/// );
/// ```
pub fn normalize_target(raw: &str) -> UrlResult<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(UrlError::Parse("empty target".to_string()));
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let mut url = Url::parse(&candidate).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    let path = normalize_path(url.path());
    url.set_path(&path);
    url.set_fragment(None);

    if url.query().is_some() {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !is_tracking_param(key))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();

        if kept.is_empty() {
            url.set_query(None);
        } else {
            url.query_pairs_mut().clear().extend_pairs(kept);
        }
    }

    let mut normalized = url.to_string();
    if url.path() == "/" && url.query().is_none() {
        normalized.pop();
    }

    Ok(normalized)
}

/// Collapses dot segments and empty segments; never ends in `/` except root
fn normalize_path(path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => continue,
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }

    format!("/{}", segments.join("/"))
}

fn is_tracking_param(key: &str) -> bool {
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key)
}
