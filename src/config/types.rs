use serde::Deserialize;

/// Main configuration structure for Contact-Harvest
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    #[serde(default)]
    pub client: ClientConfig,
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub search: SearchConfig,
    /// Remote action settings; when absent both stages run in-process
    pub dispatch: Option<DispatchConfig>,
    pub output: OutputConfig,
}

/// Shared HTTP client settings
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ClientConfig {
    /// User agent sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Total per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
        }
    }
}

/// Crawl worker behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CrawlConfig {
    /// Path tokens that mark a link as contact-likely
    #[serde(default = "default_contact_tokens")]
    pub contact_tokens: Vec<String>,

    /// Extra host patterns treated as same-origin (e.g. "*.example.com")
    #[serde(default)]
    pub allowed_origins: Vec<String>,

    /// Upper bound on filtered links fetched per seed
    #[serde(default = "default_max_links_per_seed")]
    pub max_links_per_seed: usize,

    /// Number of seeds crawled at the same time
    #[serde(default = "default_max_concurrent_seeds")]
    pub max_concurrent_seeds: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            contact_tokens: default_contact_tokens(),
            allowed_origins: Vec::new(),
            max_links_per_seed: default_max_links_per_seed(),
            max_concurrent_seeds: default_max_concurrent_seeds(),
        }
    }
}

/// Search provider parameters
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SearchConfig {
    #[serde(default = "default_search_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_region")]
    pub region: String,

    /// One of "on", "moderate", "off"
    #[serde(default = "default_safesearch")]
    pub safesearch: String,

    /// One of "d", "w", "m", "y"
    #[serde(default = "default_freshness")]
    pub freshness: String,

    #[serde(default = "default_page")]
    pub page: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: default_search_endpoint(),
            region: default_region(),
            safesearch: default_safesearch(),
            freshness: default_freshness(),
            page: default_page(),
        }
    }
}

/// Downstream scrape/search actions
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DispatchConfig {
    /// Base URL the action paths are appended to
    pub base_url: String,

    /// Sent as `x-functions-key` when non-empty
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Path to the SQLite database file
    pub database_path: String,

    /// Path to the markdown summary file
    pub summary_path: String,
}

fn default_user_agent() -> String {
    format!("contact-harvest/{}", env!("CARGO_PKG_VERSION"))
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_contact_tokens() -> Vec<String> {
    vec![
        "contact".to_string(),
        "about".to_string(),
        "support".to_string(),
    ]
}

fn default_max_links_per_seed() -> usize {
    20
}

fn default_max_concurrent_seeds() -> usize {
    4
}

fn default_search_endpoint() -> String {
    "https://html.duckduckgo.com/html/".to_string()
}

fn default_region() -> String {
    "il-he".to_string()
}

fn default_safesearch() -> String {
    "off".to_string()
}

fn default_freshness() -> String {
    "y".to_string()
}

fn default_page() -> u32 {
    1
}

pub(crate) fn default_batch_size() -> usize {
    5
}
