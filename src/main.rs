//! Contact-Harvest main entry point
//!
//! This is the command-line interface for the Contact-Harvest pipeline.

use clap::Parser;
use contact_harvest::config::{load_config_with_hash, Config};
use contact_harvest::pipeline::{Pipeline, Stages};
use contact_harvest::storage::{Persistence, SqliteStorage};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Contact-Harvest: contact email discovery
///
/// Contact-Harvest expands pending search queries into site origins, crawls
/// each pending site one hop deep along contact-like links, and records the
/// email addresses it finds. With a `[dispatch]` section both stages are
/// sent in batches to the remote scrape/search actions instead.
#[derive(Parser, Debug)]
#[command(name = "contact-harvest")]
#[command(version)]
#[command(about = "Contact email discovery for a set of websites", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Run both stages in-process even if [dispatch] is configured
    #[arg(long)]
    local: bool,

    /// Only expand pending queries into scrape targets
    #[arg(long, conflicts_with = "crawl_only")]
    search_only: bool,

    /// Only crawl pending scrape targets
    #[arg(long, conflicts_with = "search_only")]
    crawl_only: bool,

    /// Validate config and show what would run without running it
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary from existing data and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,

    /// Queue a site for crawling and exit (repeatable)
    #[arg(long = "add-target", value_name = "URL")]
    add_targets: Vec<String>,

    /// Queue a search query and exit (repeatable)
    #[arg(long = "add-query", value_name = "TEXT")]
    add_queries: Vec<String>,
}

impl Cli {
    fn stages(&self) -> Stages {
        if self.search_only {
            Stages::SearchOnly
        } else if self.crawl_only {
            Stages::CrawlOnly
        } else {
            Stages::All
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config, &cli)?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else if !cli.add_targets.is_empty() || !cli.add_queries.is_empty() {
        handle_enqueue(&config, &cli.add_targets, &cli.add_queries)?;
    } else {
        handle_run(config, config_hash, &cli).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("contact_harvest=info,warn"),
            1 => EnvFilter::new("contact_harvest=debug,info"),
            2 => EnvFilter::new("contact_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn open_database(config: &Config) -> Result<SqliteStorage, Box<dyn std::error::Error>> {
    Ok(SqliteStorage::new(Path::new(&config.output.database_path))?)
}

/// Handles the --dry-run mode: validates config and shows what would run
fn handle_dry_run(config: &Config, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let pipeline = Pipeline::new(config.clone(), "").force_local(cli.local);

    println!("=== Contact-Harvest Dry Run ===\n");

    println!("Execution:");
    println!("  Mode: {}", pipeline.mode());
    println!("  Stages: {:?}", cli.stages());

    println!("\nClient:");
    println!("  User agent: {}", config.client.user_agent);
    println!("  Timeout: {}s", config.client.timeout_secs);
    println!("  Connect timeout: {}s", config.client.connect_timeout_secs);

    println!("\nCrawl:");
    println!("  Contact tokens: {}", config.crawl.contact_tokens.join(", "));
    println!("  Max links per seed: {}", config.crawl.max_links_per_seed);
    println!("  Max concurrent seeds: {}", config.crawl.max_concurrent_seeds);
    for pattern in &config.crawl.allowed_origins {
        println!("  Allowed origin: {}", pattern);
    }

    println!("\nSearch:");
    println!("  Endpoint: {}", config.search.endpoint);
    println!(
        "  Region: {}, safesearch: {}, freshness: {}, page: {}",
        config.search.region, config.search.safesearch, config.search.freshness, config.search.page
    );

    if let Some(dispatch) = &config.dispatch {
        println!("\nDispatch:");
        println!("  Base URL: {}", dispatch.base_url);
        println!("  Batch size: {}", dispatch.batch_size);
        println!(
            "  API key: {}",
            if dispatch.api_key.is_empty() { "none" } else { "set" }
        );
    }

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);

    println!("\n✓ Configuration is valid");

    if Path::new(&config.output.database_path).exists() {
        let stats = open_database(config)?.stats()?;
        println!(
            "✓ Would process {} pending queries and {} pending targets",
            stats.queries_pending, stats.targets_pending
        );
    } else {
        println!("✓ Database does not exist yet; nothing is pending");
    }

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use contact_harvest::output::{load_statistics, print_statistics};

    println!("Database: {}\n", config.output.database_path);

    let storage = open_database(config)?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use contact_harvest::output::{generate_markdown_summary, generate_summary};

    println!("=== Exporting Harvest Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = open_database(config)?;

    tracing::info!("Loading harvest data from database...");
    let summary = generate_summary(&storage)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles --add-target / --add-query: queues work items
fn handle_enqueue(
    config: &Config,
    targets: &[String],
    queries: &[String],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = open_database(config)?;

    for target in targets {
        if storage.add_target(target)? {
            println!("✓ Queued target: {}", target);
        } else {
            println!("- Target already known or invalid: {}", target);
        }
    }

    for query in queries {
        if storage.add_query(query)? {
            println!("✓ Queued query: {}", query);
        } else {
            println!("- Query already known or empty: {}", query);
        }
    }

    Ok(())
}

/// Handles the main pipeline run
async fn handle_run(
    config: Config,
    config_hash: String,
    cli: &Cli,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut storage = open_database(&config)?;
    let pipeline = Pipeline::new(config, config_hash)
        .with_stages(cli.stages())
        .force_local(cli.local);

    match pipeline.run(&mut storage).await {
        Ok(report) => {
            if report.has_failures() {
                tracing::warn!("Run completed with contained failures: {}", report);
            } else {
                tracing::info!("Run completed: {}", report);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Run failed: {}", e);
            Err(e.into())
        }
    }
}
