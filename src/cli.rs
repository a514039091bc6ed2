//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation. Values left unset fall back to the config file.

use crate::models::MalformedPolicy;
use clap::Parser;
use std::path::PathBuf;

/// TenderWatch - keyword and entity watchlist filter for procurement tenders
///
/// Reads scraped tender notices, keeps those whose title mentions a watched
/// keyword or whose issuing entity is on the monitored list, and groups the
/// matches by entity into a JSON file and a text report.
///
/// Examples:
///   tenderwatch --input tenders.json
///   tenderwatch -i tenders.json -o matches.json -r report.txt
///   tenderwatch -i tenders.json --keywords cloud,gpu --entities omantel
///   tenderwatch -i tenders.json --on-malformed skip --dry-run
///   tenderwatch --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Tender JSON file to filter
    ///
    /// Must contain an array of objects with "Tender No", "Tender Title",
    /// "Entity" and "Date" fields. Defaults to tenders.json.
    #[arg(short, long, value_name = "FILE", env = "TENDERWATCH_INPUT")]
    pub input: Option<PathBuf>,

    /// Output file for the entity-grouped JSON
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Output file for the text report
    #[arg(short, long, value_name = "FILE")]
    pub report: Option<PathBuf>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .tenderwatch.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Keywords to match in tender titles (comma-separated)
    ///
    /// Replaces the configured keyword watchlist. Example: --keywords cloud,gpu
    #[arg(long, value_name = "WORDS", value_delimiter = ',')]
    pub keywords: Option<Vec<String>>,

    /// Entity names to monitor (comma-separated)
    ///
    /// Replaces the configured entity watchlist. Example: --entities omantel,ministry
    #[arg(long, value_name = "NAMES", value_delimiter = ',')]
    pub entities: Option<Vec<String>>,

    /// What to do with records missing a title or entity
    #[arg(long, value_name = "POLICY")]
    pub on_malformed: Option<MalformedPolicy>,

    /// Add a Scraped_At timestamp to every matched tender
    #[arg(long)]
    pub scraped_at: bool,

    /// Group entity names that differ only in case or whitespace together
    #[arg(long)]
    pub normalize_entities: bool,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (errors only)
    #[arg(short, long)]
    pub quiet: bool,

    /// Dry run: load and filter tenders, print the summary, write nothing
    #[arg(long)]
    pub dry_run: bool,

    /// Generate a default .tenderwatch.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if let Some(ref input) = self.input {
            if input.is_dir() {
                return Err(format!("Input path is a directory: {}", input.display()));
            }
        }

        Ok(())
    }

    /// Returns the log level based on verbosity settings.
    pub fn log_level(&self) -> tracing::Level {
        if self.quiet {
            tracing::Level::ERROR
        } else if self.verbose {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::classify;
    use crate::config::Config;
    use crate::models::TenderRecord;

    fn make_args() -> Args {
        Args {
            input: Some(PathBuf::from("tenders.json")),
            output: None,
            report: None,
            config: None,
            keywords: None,
            entities: None,
            on_malformed: None,
            scraped_at: false,
            normalize_entities: false,
            verbose: false,
            quiet: false,
            dry_run: false,
            init_config: false,
        }
    }

    #[test]
    fn test_parse_comma_separated_watchlists() {
        let args = Args::try_parse_from([
            "tenderwatch",
            "--keywords",
            "cloud,gpu",
            "--entities",
            "omantel",
            "--on-malformed",
            "skip",
        ])
        .unwrap();

        assert_eq!(args.keywords, Some(vec!["cloud".to_string(), "gpu".to_string()]));
        assert_eq!(args.entities, Some(vec!["omantel".to_string()]));
        assert_eq!(args.on_malformed, Some(MalformedPolicy::Skip));
    }

    #[test]
    fn test_validation_conflicting_options() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_comma_separated_keywords_are_trimmed() {
        let args = Args::try_parse_from(["tenderwatch", "--keywords", "cloud, gpu"]).unwrap();
        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.watchlist.keywords, vec!["cloud", "gpu"]);

        let watchlists = config.watchlists().unwrap();
        let record = TenderRecord::new("1", "GPU cluster", "X", "");
        let result = classify(&record, &watchlists).unwrap();
        assert_eq!(result.matched_keywords, vec!["gpu"]);
    }

    #[test]
    fn test_comma_separated_entities_are_trimmed() {
        let args =
            Args::try_parse_from(["tenderwatch", "--entities", "omantel , bank muscat"]).unwrap();
        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.watchlist.entities, vec!["omantel", "bank muscat"]);
    }

    #[test]
    fn test_validation_init_config_skips_checks() {
        let mut args = make_args();
        args.verbose = true;
        args.quiet = true;
        args.init_config = true;
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_log_level() {
        let mut args = make_args();
        assert_eq!(args.log_level(), tracing::Level::INFO);

        args.verbose = true;
        assert_eq!(args.log_level(), tracing::Level::DEBUG);

        args.verbose = false;
        args.quiet = true;
        assert_eq!(args.log_level(), tracing::Level::ERROR);
    }

    #[test]
    fn test_merge_with_args_overrides_only_given_values() {
        let mut args = make_args();
        args.output = Some(PathBuf::from("matches.json"));
        args.keywords = Some(vec!["gpu".to_string()]);
        args.scraped_at = true;

        let mut config = Config::default();
        config.merge_with_args(&args);

        assert_eq!(config.general.input, PathBuf::from("tenders.json"));
        assert_eq!(config.general.output, PathBuf::from("matches.json"));
        assert_eq!(config.general.report, PathBuf::from("tender_report.txt"));
        assert_eq!(config.watchlist.keywords, vec!["gpu"]);
        assert_eq!(config.watchlist.entities, Config::default().watchlist.entities);
        assert!(config.general.stamp_scraped_at);
        assert!(!config.grouping.normalize_entity_names);
    }
}
