use crate::config::types::{
    ClientConfig, Config, CrawlConfig, DispatchConfig, OutputConfig, SearchConfig,
};
use crate::{ConfigError, ConfigResult};
use url::Url;

const SAFESEARCH_VALUES: &[&str] = &["on", "moderate", "off"];
const FRESHNESS_VALUES: &[&str] = &["d", "w", "m", "y"];
const MAX_SEARCH_PAGE: u32 = 50;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_client_config(&config.client)?;
    validate_crawl_config(&config.crawl)?;
    validate_search_config(&config.search)?;
    if let Some(dispatch) = &config.dispatch {
        validate_dispatch_config(dispatch)?;
    }
    validate_output_config(&config.output)?;
    Ok(())
}

fn validate_client_config(config: &ClientConfig) -> ConfigResult<()> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 || config.timeout_secs > 600 {
        return Err(ConfigError::Validation(format!(
            "timeout_secs must be between 1 and 600, got {}",
            config.timeout_secs
        )));
    }

    if config.connect_timeout_secs == 0 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "connect_timeout_secs must be between 1 and timeout_secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    Ok(())
}

fn validate_crawl_config(config: &CrawlConfig) -> ConfigResult<()> {
    if config.contact_tokens.is_empty() {
        return Err(ConfigError::Validation(
            "contact_tokens must contain at least one token".to_string(),
        ));
    }

    if config.contact_tokens.iter().any(|t| t.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "contact_tokens cannot contain empty tokens".to_string(),
        ));
    }

    if config.max_links_per_seed < 1 || config.max_links_per_seed > 200 {
        return Err(ConfigError::Validation(format!(
            "max_links_per_seed must be between 1 and 200, got {}",
            config.max_links_per_seed
        )));
    }

    if config.max_concurrent_seeds < 1 || config.max_concurrent_seeds > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_seeds must be between 1 and 64, got {}",
            config.max_concurrent_seeds
        )));
    }

    for pattern in &config.allowed_origins {
        validate_host_pattern(pattern)?;
    }

    Ok(())
}

fn validate_search_config(config: &SearchConfig) -> ConfigResult<()> {
    let endpoint = Url::parse(&config.endpoint)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid search endpoint: {}", e)))?;
    if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "Search endpoint must be http(s), got '{}'",
            config.endpoint
        )));
    }

    if config.region.trim().is_empty() {
        return Err(ConfigError::Validation("region cannot be empty".to_string()));
    }

    if !SAFESEARCH_VALUES.contains(&config.safesearch.as_str()) {
        return Err(ConfigError::Validation(format!(
            "safesearch must be one of {:?}, got '{}'",
            SAFESEARCH_VALUES, config.safesearch
        )));
    }

    if !FRESHNESS_VALUES.contains(&config.freshness.as_str()) {
        return Err(ConfigError::Validation(format!(
            "freshness must be one of {:?}, got '{}'",
            FRESHNESS_VALUES, config.freshness
        )));
    }

    if !(1..=MAX_SEARCH_PAGE).contains(&config.page) {
        return Err(ConfigError::Validation(format!(
            "page must be between 1 and {}, got {}",
            MAX_SEARCH_PAGE, config.page
        )));
    }

    Ok(())
}

fn validate_dispatch_config(config: &DispatchConfig) -> ConfigResult<()> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid dispatch base_url: {}", e)))?;
    if base.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(format!(
            "dispatch base_url cannot be used as a base: '{}'",
            config.base_url
        )));
    }

    if config.batch_size < 1 || config.batch_size > 100 {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and 100, got {}",
            config.batch_size
        )));
    }

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.summary_path.is_empty() {
        return Err(ConfigError::Validation(
            "summary_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates a host pattern (supports a leading `*.` wildcard)
fn validate_host_pattern(pattern: &str) -> ConfigResult<()> {
    let host = pattern.strip_prefix("*.").unwrap_or(pattern);

    if host.is_empty() {
        return Err(ConfigError::InvalidPattern(
            "Host pattern cannot be empty".to_string(),
        ));
    }

    if !host
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' contains invalid characters",
            host
        )));
    }

    if host.starts_with('.') || host.ends_with('.') || host.contains("..") {
        return Err(ConfigError::InvalidPattern(format!(
            "Host '{}' has an empty label",
            host
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_host_pattern() {
        assert!(validate_host_pattern("example.com").is_ok());
        assert!(validate_host_pattern("*.example.com").is_ok());
        assert!(validate_host_pattern("localhost").is_ok());

        assert!(validate_host_pattern("").is_err());
        assert!(validate_host_pattern("*.").is_err());
        assert!(validate_host_pattern(".example.com").is_err());
        assert!(validate_host_pattern("example..com").is_err());
        assert!(validate_host_pattern("https://example.com").is_err());
    }

    #[test]
    fn test_rejects_unknown_safesearch() {
        let config = SearchConfig {
            safesearch: "strict".to_string(),
            ..SearchConfig::default()
        };
        assert!(matches!(
            validate_search_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_rejects_unknown_freshness() {
        let config = SearchConfig {
            freshness: "decade".to_string(),
            ..SearchConfig::default()
        };
        assert!(validate_search_config(&config).is_err());
    }

    #[test]
    fn test_page_bounds() {
        for page in [0, MAX_SEARCH_PAGE + 1, u32::MAX] {
            let config = SearchConfig {
                page,
                ..SearchConfig::default()
            };
            assert!(validate_search_config(&config).is_err(), "page {}", page);
        }

        let config = SearchConfig {
            page: MAX_SEARCH_PAGE,
            ..SearchConfig::default()
        };
        assert!(validate_search_config(&config).is_ok());
    }

    #[test]
    fn test_rejects_empty_token_set() {
        let config = CrawlConfig {
            contact_tokens: vec![],
            ..CrawlConfig::default()
        };
        assert!(validate_crawl_config(&config).is_err());
    }

    #[test]
    fn test_rejects_zero_batch_size() {
        let config = DispatchConfig {
            base_url: "http://localhost:7071/api".to_string(),
            api_key: String::new(),
            batch_size: 0,
        };
        assert!(validate_dispatch_config(&config).is_err());
    }

    #[test]
    fn test_rejects_connect_timeout_above_total() {
        let config = ClientConfig {
            timeout_secs: 5,
            connect_timeout_secs: 10,
            ..ClientConfig::default()
        };
        assert!(validate_client_config(&config).is_err());
    }

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate_client_config(&ClientConfig::default()).is_ok());
        assert!(validate_crawl_config(&CrawlConfig::default()).is_ok());
        assert!(validate_search_config(&SearchConfig::default()).is_ok());
    }
}
