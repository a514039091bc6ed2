//! TenderWatch - procurement tender watchlist filter
//!
//! A CLI tool that filters scraped tender notices against keyword and
//! monitored-entity watchlists, groups the matches by issuing entity and
//! writes a JSON file plus a text report.
//!
//! Exit codes:
//!   0 - Success (including runs with zero matches)
//!   1 - Error (invalid config, malformed input, I/O failure)

mod analysis;
mod cli;
mod config;
mod error;
mod ingest;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::Args;
use config::{Config, DEFAULT_CONFIG_FILE};
use models::{EntityGroups, RunSummary};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        if let Err(e) = handle_init_config() {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
        return;
    }

    // Configuration is loaded before logging since it can enable verbose output
    let (mut config, config_path) = match load_config(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };
    config.merge_with_args(&args);

    init_logging(&args, &config);

    info!("TenderWatch v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);
    match config_path {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => debug!("No config file found, using defaults"),
    }

    if let Err(e) = run(&args, &config) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }
}

/// Handle --init-config: generate a default .tenderwatch.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        anyhow::bail!(
            "{} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to customize watchlists, file paths and report title.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
///
/// `RUST_LOG` takes precedence over the CLI flags when set.
fn init_logging(args: &Args, config: &Config) {
    let level = if config.general.verbose && !args.quiet {
        tracing::Level::DEBUG
    } else {
        args.log_level()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_lowercase()));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the load, filter, group and report pipeline.
fn run(args: &Args, config: &Config) -> Result<()> {
    let start_time = Instant::now();

    config.validate()?;

    // Step 1: Build the watchlists
    let watchlists = config
        .watchlists()
        .context("Invalid watchlist configuration")?;
    info!(
        "Watching {} keywords and {} entities",
        watchlists.keywords().len(),
        watchlists.entities().len()
    );
    debug!(
        "Keywords: {:?}",
        watchlists.keywords().labels().collect::<Vec<_>>()
    );
    debug!(
        "Entities: {:?}",
        watchlists.entities().labels().collect::<Vec<_>>()
    );
    if watchlists.keywords().is_empty() && watchlists.entities().is_empty() {
        warn!("Both watchlists are empty; no tender can match");
    }

    // Step 2: Load the tenders
    println!("📥 Loading tenders: {}", config.general.input.display());
    let loaded = ingest::load_tenders(&config.general.input, config.general.on_malformed)?;

    // Step 3: Filter and group
    println!("🔎 Filtering {} tenders...", loaded.records.len());
    let run_time = Utc::now();
    let scraped_at = config.general.stamp_scraped_at.then_some(run_time);

    let matches = analysis::filter_tenders(&loaded.records, &watchlists, scraped_at);
    info!(
        "Found {} matching tenders out of {} total",
        matches.len(),
        loaded.records.len()
    );

    let groups = if config.grouping.normalize_entity_names {
        analysis::group_by_entity_normalized(matches)
    } else {
        analysis::group_by_entity(matches)
    };
    let summary = analysis::summarize(loaded.total, loaded.skipped, &groups);

    if args.dry_run {
        print_summary(&summary, &groups);
        println!("\n✅ Dry run complete. No files were written.");
        return Ok(());
    }

    // Step 4: Write the outputs
    println!("\n📝 Writing results...");

    let json = report::generate_json_report(&groups)?;
    report::write_report(&json, &config.general.output)?;
    info!("Results saved to {}", config.general.output.display());

    let text = report::generate_text_report(&groups, &config.report_options(), run_time);
    report::write_report(&text, &config.general.report)?;
    info!("Report saved to {}", config.general.report.display());

    print_summary(&summary, &groups);
    println!("   Duration: {:.2}s", start_time.elapsed().as_secs_f64());
    println!(
        "\n✅ Done! Results: {} | Report: {}",
        config.general.output.display(),
        config.general.report.display()
    );

    Ok(())
}

/// Print the end-of-run statistics.
fn print_summary(summary: &RunSummary, groups: &EntityGroups) {
    println!("\n📊 Summary:");
    println!("   Total tenders found: {}", summary.total_records);
    if summary.skipped_records > 0 {
        println!("   Skipped (malformed): {}", summary.skipped_records);
    }
    println!("   Filtered tenders: {}", summary.matched_tenders);
    println!(
        "   Unique entities with matching tenders: {}",
        summary.unique_entities
    );

    if !groups.is_empty() {
        println!("\n   Entities with matching tenders:");
        for (entity, count) in analysis::entity_counts(groups) {
            println!("   - {}: {} tender(s)", entity, count);
        }
    }
}

/// Load configuration from file or use defaults.
///
/// Returns the path the configuration came from, if any. A default config
/// file that exists but cannot be parsed is an error.
fn load_config(args: &Args) -> Result<(Config, Option<PathBuf>)> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        return Ok((Config::load(config_path)?, Some(config_path.clone())));
    }

    // Try default location
    match Config::load_default()? {
        Some(config) => Ok((config, Some(PathBuf::from(DEFAULT_CONFIG_FILE)))),
        None => Ok((Config::default(), None)),
    }
}
