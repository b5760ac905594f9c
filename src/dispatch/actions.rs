//! Client for the downstream scrape and search actions
//!
//! Each call delivers one batch: `{"urls": [...]}` to `/scrape-action` or
//! `{"queries": [...]}` to `/search-action`. Both actions answer with a JSON
//! array of strings; older scrape deployments wrap it as `{"emails": [...]}`.

use crate::config::DispatchConfig;
use crate::FailureKind;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const API_KEY_HEADER: &str = "x-functions-key";

/// Why a downstream action call produced no results
#[derive(Debug, Clone, Error)]
pub enum ActionError {
    #[error("{action} returned HTTP {status}")]
    Status { action: &'static str, status: u16 },

    #[error("{action} request failed: {reason}")]
    Transport { action: &'static str, reason: String },

    #[error("{action} returned an unusable payload: {reason}")]
    Payload { action: &'static str, reason: String },
}

impl ActionError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Status { .. } | Self::Payload { .. } => FailureKind::Upstream,
            Self::Transport { .. } => FailureKind::Transport,
        }
    }
}

#[derive(Debug, Serialize)]
struct ScrapeRequest<'a> {
    urls: &'a [String],
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    queries: &'a [String],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ActionResponse {
    List(Vec<String>),
    Emails { emails: Vec<String> },
}

impl From<ActionResponse> for Vec<String> {
    fn from(response: ActionResponse) -> Self {
        match response {
            ActionResponse::List(items) | ActionResponse::Emails { emails: items } => items,
        }
    }
}

/// Posts batches to the scrape/search actions
#[derive(Debug, Clone)]
pub struct ActionClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl ActionClient {
    /// Creates a client sharing the run's connection pool
    ///
    /// # Arguments
    ///
    /// * `client` - HTTP client of the current run; its timeout bounds every call
    /// * `config` - Base URL and key of the action deployment
    pub fn new(client: Client, config: &DispatchConfig) -> Self {
        Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Crawls a batch of seed URLs remotely; returns the emails found
    pub async fn scrape(&self, urls: Vec<String>) -> Result<Vec<String>, ActionError> {
        self.post("scrape-action", &ScrapeRequest { urls: &urls })
            .await
    }

    /// Expands a batch of queries remotely; returns result URLs or origins
    pub async fn search(&self, queries: Vec<String>) -> Result<Vec<String>, ActionError> {
        self.post("search-action", &SearchRequest { queries: &queries })
            .await
    }

    async fn post<B: Serialize>(
        &self,
        action: &'static str,
        body: &B,
    ) -> Result<Vec<String>, ActionError> {
        let mut request = self
            .client
            .post(format!("{}/{}", self.base_url, action))
            .json(body);

        if !self.api_key.is_empty() {
            request = request.header(API_KEY_HEADER, &self.api_key);
        }

        let response = request.send().await.map_err(|e| ActionError::Transport {
            action,
            reason: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ActionError::Status {
                action,
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| ActionError::Transport {
            action,
            reason: e.to_string(),
        })?;

        let parsed: ActionResponse =
            serde_json::from_str(&body).map_err(|e| ActionError::Payload {
                action,
                reason: e.to_string(),
            })?;

        Ok(parsed.into())
    }
}
