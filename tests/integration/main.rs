//! Integration tests for Contact-Harvest
//!
//! These tests use wiremock to stand in for websites, the search endpoint
//! and the downstream actions, and tempfile for configs and databases.

mod crawl_tests;
mod dispatch_tests;
mod pipeline_tests;

use std::path::Path;

/// Minimal config TOML with the given extra sections
pub fn config_toml(db_path: &Path, extra: &str) -> String {
    format!(
        r#"
[client]
timeout-secs = 5
connect-timeout-secs = 2

[output]
database-path = "{}"
summary-path = "{}"

{}
"#,
        db_path.display(),
        db_path.with_extension("md").display(),
        extra
    )
}
