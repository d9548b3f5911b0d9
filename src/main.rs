//! Tome-Harvest main entry point
//!
//! This is the command-line interface for the Tome-Harvest catalog harvester.

use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tome_harvest::config::{read_config_with_hash, validate, Config};
use tome_harvest::crawler::Coordinator;
use tome_harvest::output::{print_statistics, write_catalog, RunStatistics};
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

/// Tome-Harvest: a resilient book-catalog harvester
///
/// Tome-Harvest walks a range of category listing pages, parses every listed
/// book, downloads its text and cover, and writes a JSON catalog of the results.
#[derive(Parser, Debug)]
#[command(name = "tome-harvest")]
#[command(version)]
#[command(about = "A resilient book-catalog harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Category listing URL
    #[arg(long)]
    category_url: Option<String>,

    /// First listing page to harvest
    #[arg(long)]
    start_page: Option<u32>,

    /// Last listing page to harvest (inclusive)
    #[arg(long)]
    end_page: Option<u32>,

    /// Root folder for downloaded books and images
    #[arg(long)]
    dest_folder: Option<PathBuf>,

    /// Folder for the books.json catalog (defaults to the destination folder)
    #[arg(long)]
    json_path: Option<PathBuf>,

    /// Do not download cover images
    #[arg(long)]
    skip_imgs: bool,

    /// Do not download book texts
    #[arg(long)]
    skip_txt: bool,

    /// Number of books acquired in parallel
    #[arg(long)]
    workers: Option<u32>,

    /// Also write logs to a timestamped file in this folder
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be harvested without fetching anything
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet, cli.log_dir.as_deref())?;

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            match read_config_with_hash(path) {
                Ok((cfg, hash)) => {
                    tracing::info!("Configuration read (hash: {})", hash);
                    cfg
                }
                Err(e) => {
                    tracing::error!("Failed to load configuration: {}", e);
                    return Err(e.into());
                }
            }
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    if let Err(e) = validate(&config) {
        tracing::error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    if cli.dry_run {
        handle_dry_run(&config);
        Ok(())
    } else {
        handle_harvest(config).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// When `log_dir` is given, the same events are also written without ANSI
/// colors to `books {date time}.log` inside it.
fn setup_logging(verbose: u8, quiet: bool, log_dir: Option<&Path>) -> std::io::Result<()> {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("tome_harvest=info,warn"),
            1 => EnvFilter::new("tome_harvest=debug,info"),
            2 => EnvFilter::new("tome_harvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let stamp = chrono::Local::now().format("%Y-%m-%d %H.%M");
            let file = File::create(dir.join(format!("books {}.log", stamp)))?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_target(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_file(false),
        )
        .with(file_layer)
        .init();

    Ok(())
}

/// Applies command-line values on top of the loaded configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(url) = &cli.category_url {
        config.catalog.category_url = url.clone();
    }
    if let Some(start) = cli.start_page {
        config.catalog.start_page = start;
    }
    if let Some(end) = cli.end_page {
        config.catalog.end_page = end;
    }
    if let Some(workers) = cli.workers {
        config.catalog.workers = workers;
    }
    if let Some(dest) = &cli.dest_folder {
        config.output.dest_folder = dest.clone();
    }
    if let Some(json_path) = &cli.json_path {
        config.output.json_path = Some(json_path.clone());
    }
    config.output.skip_images |= cli.skip_imgs;
    config.output.skip_text |= cli.skip_txt;
}

/// Handles the --dry-run mode: shows what would be harvested
fn handle_dry_run(config: &Config) {
    println!("=== Tome-Harvest Dry Run ===\n");

    println!("Catalog:");
    println!("  Category URL: {}", config.catalog.category_url);
    println!(
        "  Pages: {}..={}",
        config.catalog.start_page, config.catalog.end_page
    );
    println!("  Workers: {}", config.catalog.workers);
    println!(
        "  On listing failure: {:?}",
        config.catalog.on_listing_failure
    );

    println!("\nRetry:");
    println!(
        "  Backoff: {}s step, {}s cap",
        config.retry.backoff_step_secs, config.retry.backoff_cap_secs
    );
    match config.retry.fetch_deadline_secs {
        Some(deadline) => println!("  Fetch deadline: {}s", deadline),
        None => println!("  Fetch deadline: none"),
    }

    println!("\nOutput:");
    println!("  Books: {}", config.output.books_dir().display());
    println!("  Images: {}", config.output.images_dir().display());
    println!("  Catalog: {}", config.output.catalog_path().display());
    println!("  Skip texts: {}", config.output.skip_text);
    println!("  Skip images: {}", config.output.skip_images);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let catalog_path = config.output.catalog_path();
    let coordinator = Coordinator::new(config)?;

    let report = match coordinator.run().await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            return Err(e.into());
        }
    };

    write_catalog(&report.books, &catalog_path)?;
    print_statistics(&RunStatistics::from_report(&report));

    Ok(())
}
