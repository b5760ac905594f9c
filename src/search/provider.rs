//! Search provider seam and the DuckDuckGo HTML implementation

use crate::config::SearchConfig;
use crate::FailureKind;
use async_trait::async_trait;
use once_cell::sync::Lazy;
use reqwest::Client;
use scraper::{Html, Selector};
use thiserror::Error;
use url::Url;

/// Results on one page of the HTML endpoint
const RESULTS_PER_PAGE: u64 = 30;

static RESULT_SELECTOR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a.result__a").expect("result selector parses"));

/// One organic search result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub href: String,
    pub title: String,
}

/// Fixed parameters sent with every query
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParams {
    pub region: String,
    /// `on`, `moderate` or `off`
    pub safesearch: String,
    /// `d`, `w`, `m` or `y`
    pub freshness: String,
    /// 1-based result page
    pub page: u32,
}

impl From<&SearchConfig> for SearchParams {
    fn from(config: &SearchConfig) -> Self {
        Self {
            region: config.region.clone(),
            safesearch: config.safesearch.clone(),
            freshness: config.freshness.clone(),
            page: config.page,
        }
    }
}

/// Why a query produced no hits
#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search for '{query}' returned HTTP {status}")]
    Status { query: String, status: u16 },

    #[error("Search for '{query}' failed: {reason}")]
    Transport { query: String, reason: String },
}

impl SearchError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Status { .. } => FailureKind::Upstream,
            Self::Transport { .. } => FailureKind::Transport,
        }
    }
}

/// Text search backend used by the search expander
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn text_search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<SearchHit>, SearchError>;
}

/// Scrapes the DuckDuckGo HTML endpoint
#[derive(Debug, Clone)]
pub struct DuckDuckGoProvider {
    client: Client,
    endpoint: Url,
}

impl DuckDuckGoProvider {
    pub fn new(client: Client, endpoint: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            client,
            endpoint: Url::parse(endpoint)?,
        })
    }

    /// Builds the query string for one search
    ///
    /// - `q`: the query text
    /// - `kl`: region
    /// - `kp`: safe search (`1` on, `-1` moderate, `-2` off)
    /// - `df`: freshness window
    /// - `s`: result offset, only past the first page
    pub fn build_params(query: &str, params: &SearchParams) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("q", query.to_string()),
            ("kl", params.region.clone()),
            ("kp", safesearch_code(&params.safesearch).to_string()),
        ];

        if !params.freshness.is_empty() {
            pairs.push(("df", params.freshness.clone()));
        }

        if params.page > 1 {
            let offset = (u64::from(params.page) - 1) * RESULTS_PER_PAGE;
            pairs.push(("s", offset.to_string()));
        }

        pairs
    }
}

fn safesearch_code(policy: &str) -> &'static str {
    match policy {
        "on" => "1",
        "moderate" => "-1",
        _ => "-2",
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    async fn text_search(
        &self,
        query: &str,
        params: &SearchParams,
    ) -> Result<Vec<SearchHit>, SearchError> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&Self::build_params(query, params))
            .send()
            .await
            .map_err(|e| SearchError::Transport {
                query: query.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                query: query.to_string(),
                status: status.as_u16(),
            });
        }

        let html = response.text().await.map_err(|e| SearchError::Transport {
            query: query.to_string(),
            reason: e.to_string(),
        })?;

        Ok(parse_results(&html, &self.endpoint))
    }
}

/// Reads result anchors from a DuckDuckGo HTML results page
///
/// Redirect links (`/l/?uddg=<target>`) are unwrapped to their target.
pub fn parse_results(html: &str, endpoint: &Url) -> Vec<SearchHit> {
    let document = Html::parse_document(html);

    document
        .select(&RESULT_SELECTOR)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            let resolved = endpoint.join(href.trim()).ok()?;
            let title = anchor.text().collect::<String>().trim().to_string();
            Some(SearchHit {
                href: unwrap_redirect(resolved),
                title,
            })
        })
        .collect()
}

fn unwrap_redirect(url: Url) -> String {
    let is_redirect = url
        .host_str()
        .map(|host| host == "duckduckgo.com" || host.ends_with(".duckduckgo.com"))
        .unwrap_or(false)
        && url.path() == "/l/";

    if is_redirect {
        if let Some((_, target)) = url.query_pairs().find(|(key, _)| key == "uddg") {
            return target.into_owned();
        }
    }

    url.to_string()
}
