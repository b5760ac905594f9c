//! Query expansion into site origins

use crate::search::provider::{SearchParams, SearchProvider};
use crate::url::origin_of_str;
use std::collections::HashSet;
use std::sync::Arc;

/// Result of expanding a set of queries
#[derive(Debug, Clone, Default)]
pub struct ExpansionReport {
    /// Distinct site origins across all successful queries
    pub origins: HashSet<String>,
    pub queries_ok: usize,
    pub queries_failed: usize,
    /// Raw hits before origin reduction
    pub hits: usize,
}

/// Reduces result URLs to a set of origins, dropping anything without one
///
/// # Example
///
/// ```
/// use contact_harvest::search::collect_origins;
///
/// let origins = collect_origins([
///     "https://Sub.Example.com/path?q=1",
///     "https://sub.example.com/other",
///     "mailto:someone@example.com",
/// ]);
/// assert_eq!(origins.len(), 1);
/// assert!(origins.contains("https://sub.example.com"));
/// ```
pub fn collect_origins<I, S>(hrefs: I) -> HashSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hrefs
        .into_iter()
        .filter_map(|href| {
            let origin = origin_of_str(href.as_ref());
            if origin.is_none() {
                tracing::debug!("Dropping result without origin: {}", href.as_ref());
            }
            origin
        })
        .collect()
}

/// Turns free-text queries into candidate site origins
pub struct SearchExpander {
    provider: Arc<dyn SearchProvider>,
    params: SearchParams,
}

impl SearchExpander {
    pub fn new(provider: Arc<dyn SearchProvider>, params: SearchParams) -> Self {
        Self { provider, params }
    }

    /// Searches every query and unions the origins of all hits
    ///
    /// Queries run one after another. A failed query is logged and counted
    /// and the remaining queries still run.
    pub async fn expand(&self, queries: &[String]) -> ExpansionReport {
        let mut report = ExpansionReport::default();

        for query in queries {
            match self.provider.text_search(query, &self.params).await {
                Ok(hits) => {
                    report.queries_ok += 1;
                    report.hits += hits.len();
                    let origins = collect_origins(hits.iter().map(|hit| hit.href.as_str()));
                    tracing::debug!(
                        "Query '{}': {} hits, {} origins",
                        query,
                        hits.len(),
                        origins.len()
                    );
                    report.origins.extend(origins);
                }
                Err(e) => {
                    report.queries_failed += 1;
                    tracing::warn!(kind = %e.kind(), "Query '{}' failed: {}", query, e);
                }
            }
        }

        tracing::info!(
            "Expanded {} queries into {} origins ({} failed)",
            queries.len(),
            report.origins.len(),
            report.queries_failed
        );

        report
    }
}
