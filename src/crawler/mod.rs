//! Crawler module for per-seed contact page discovery
//!
//! This module contains the in-process crawl path, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - HTML anchor extraction
//! - Contact link filtering
//! - The crawl worker that ties them together for a set of seeds

mod fetcher;
mod link_filter;
mod parser;
mod worker;

pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpPageFetcher, PageFetcher};
pub use link_filter::{is_candidate, ContactLink, LinkFilter};
pub use parser::extract_links;
pub use worker::{CrawlLimits, CrawlSummary, CrawlWorker, SeedReport};
