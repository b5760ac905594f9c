//! Contact-likely link selection
//!
//! A link is followed iff it stays on the seed's origin (or an explicitly
//! allowed host) and its path mentions one of the configured contact tokens.

use crate::config::CrawlConfig;
use crate::url::{matches_host_pattern, origin_of};
use std::collections::HashSet;
use url::Url;

/// A candidate URL derived from one of a page's outbound anchors
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContactLink {
    pub url: Url,
    pub origin: String,
    pub path: String,
}

impl ContactLink {
    /// Builds a link from an absolute URL; non-http(s) URLs are rejected
    pub fn from_url(url: Url) -> Option<Self> {
        let origin = origin_of(&url)?;
        let path = url.path().to_string();
        Some(Self { url, origin, path })
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Url::parse(raw).ok().and_then(Self::from_url)
    }

    pub fn host(&self) -> &str {
        self.url.host_str().unwrap_or_default()
    }
}

/// Decides whether a link is worth following from a seed
///
/// True iff `link.origin == seed_origin` and the link's path contains at
/// least one of `tokens` (case-insensitive substring match).
///
/// # Example
///
/// ```
/// use contact_harvest::crawler::{is_candidate, ContactLink};
/// use std::collections::HashSet;
///
/// let tokens: HashSet<String> = ["contact".to_string()].into();
/// let keep = ContactLink::parse("https://x.com/contact-us").unwrap();
/// let blog = ContactLink::parse("https://x.com/blog").unwrap();
/// let evil = ContactLink::parse("https://evil.com/contact").unwrap();
///
/// assert!(is_candidate(&keep, "https://x.com", &tokens));
/// assert!(!is_candidate(&blog, "https://x.com", &tokens));
/// assert!(!is_candidate(&evil, "https://x.com", &tokens));
/// ```
pub fn is_candidate(link: &ContactLink, seed_origin: &str, tokens: &HashSet<String>) -> bool {
    link.origin.eq_ignore_ascii_case(seed_origin) && path_has_token(&link.path, tokens.iter())
}

fn path_has_token<'a>(path: &str, mut tokens: impl Iterator<Item = &'a String>) -> bool {
    let path = path.to_lowercase();
    tokens.any(|token| path.contains(&token.to_lowercase()))
}

/// Configured link filter: token set plus allowed host patterns
#[derive(Debug, Clone)]
pub struct LinkFilter {
    tokens: HashSet<String>,
    allowed_hosts: Vec<String>,
}

impl LinkFilter {
    pub fn new<I, S>(tokens: I, allowed_hosts: Vec<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let tokens = tokens
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .collect();

        Self {
            tokens,
            allowed_hosts,
        }
    }

    pub fn from_config(config: &CrawlConfig) -> Self {
        Self::new(&config.contact_tokens, config.allowed_origins.clone())
    }

    pub fn tokens(&self) -> &HashSet<String> {
        &self.tokens
    }

    /// Checks a link against any of the seed's accepted origins
    pub fn is_candidate(&self, link: &ContactLink, seed_origins: &[String]) -> bool {
        if !path_has_token(&link.path, self.tokens.iter()) {
            return false;
        }

        let same_origin = seed_origins
            .iter()
            .any(|origin| link.origin.eq_ignore_ascii_case(origin));

        same_origin
            || self
                .allowed_hosts
                .iter()
                .any(|pattern| matches_host_pattern(pattern, link.host()))
    }

    /// Selects the distinct candidate links of a page, in page order
    ///
    /// `exclude` (normally the seed page itself) is never selected, and at
    /// most `limit` links are returned.
    pub fn select(
        &self,
        links: &[String],
        seed_origins: &[String],
        exclude: &[&Url],
        limit: usize,
    ) -> Vec<Url> {
        let mut seen: HashSet<String> = exclude.iter().map(|u| u.to_string()).collect();
        let mut selected = Vec::new();

        for raw in links {
            let Some(link) = ContactLink::parse(raw) else {
                continue;
            };

            if !self.is_candidate(&link, seed_origins) {
                tracing::trace!("Dropping link {}", link.url);
                continue;
            }

            if !seen.insert(link.url.to_string()) {
                continue;
            }

            if selected.len() == limit {
                tracing::debug!(
                    "Link limit of {} reached; ignoring remaining candidates",
                    limit
                );
                break;
            }

            selected.push(link.url);
        }

        selected
    }
}
