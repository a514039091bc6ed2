//! Configuration file handling.
//!
//! This module handles loading and merging configuration from
//! `.tenderwatch.toml` files. It is also the one place where the default
//! keyword and monitored-entity watchlists are defined.

use crate::analysis::Watchlists;
use crate::error::ConfigError;
use crate::models::MalformedPolicy;
use crate::report::ReportOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".tenderwatch.toml";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,

    /// Keyword and entity watchlists.
    #[serde(default)]
    pub watchlist: WatchlistConfig,

    /// Entity grouping settings.
    #[serde(default)]
    pub grouping: GroupingConfig,

    /// Report settings.
    #[serde(default)]
    pub report: ReportConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Tender input file.
    #[serde(default = "default_input")]
    pub input: PathBuf,

    /// Grouped JSON output file.
    #[serde(default = "default_output")]
    pub output: PathBuf,

    /// Text report file.
    #[serde(default = "default_report")]
    pub report: PathBuf,

    /// Enable verbose logging by default.
    #[serde(default)]
    pub verbose: bool,

    /// What to do with records missing a title or entity.
    #[serde(default)]
    pub on_malformed: MalformedPolicy,

    /// Add a `Scraped_At` timestamp to every matched tender.
    #[serde(default)]
    pub stamp_scraped_at: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            input: default_input(),
            output: default_output(),
            report: default_report(),
            verbose: false,
            on_malformed: MalformedPolicy::default(),
            stamp_scraped_at: false,
        }
    }
}

fn default_input() -> PathBuf {
    PathBuf::from("tenders.json")
}

fn default_output() -> PathBuf {
    PathBuf::from("filtered_tenders_output.json")
}

fn default_report() -> PathBuf {
    PathBuf::from("tender_report.txt")
}

/// Watchlist contents. Matching is case-insensitive substring matching.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchlistConfig {
    /// Keywords searched for in tender titles.
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,

    /// Organization names searched for in the tender entity.
    #[serde(default = "default_entities")]
    pub entities: Vec<String>,
}

impl Default for WatchlistConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
            entities: default_entities(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    vec![
        "ai infrastructure",
        "cloud",
        "vmware",
        "infrastructure as a service",
        "digital transformation",
        "scaling",
        "migration",
        "gpu",
        "llm",
        "oracle",
        "chatbot",
        "ai",
        "machine learning",
        "artificial intelligence",
        "cloud computing",
        "data center",
        "virtualization",
        "devops",
        "microservices",
        "database",
        "analytics",
        "big data",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_entities() -> Vec<String> {
    vec![
        // Banks & financial institutions
        "bank muscat",
        "bank dhofar",
        "sohar international bank",
        "bank nizwa",
        "al izz islamic bank",
        "oman housing bank",
        "national bank of oman",
        "al ahli bank",
        "central bank of oman",
        "oman arab bank",
        "oman development bank",
        "muscat clearing depository",
        "dhofar insurance",
        // Telecommunications
        "omantel",
        "vodafone",
        "ooredoo",
        "oman broadband company",
        "telecommunication regulatory authority",
        // Oil & gas
        "petroleum development oman",
        "oq",
        "british petroleum",
        "mb petroleum",
        "oman oil marketing",
        "daleel",
        "minerals development oman",
        // Government ministries; the bare "ministry" catches the rest
        "ministry of finance",
        "ministry of health",
        "ministry of defense",
        "ministry of technology and communications",
        "ministry of oil",
        "ministry of interior",
        "ministry",
        // Defense & security
        "royal oman police",
        "royal air force of oman",
        "royal navy of oman",
        "sultan special forces",
        "internal security service",
        // Healthcare
        "royal hospital",
        "sultan qaboos university hospital",
        "armed forces hospital",
        "hospital",
        // Education
        "sultan qaboos university",
        "university of applied sciences",
        "dhofar university",
        "university",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

/// Entity grouping settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupingConfig {
    /// Merge entity names that differ only in case or whitespace.
    ///
    /// Off by default: names are grouped exactly as they appear.
    #[serde(default)]
    pub normalize_entity_names: bool,
}

/// Report generation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Title line of the text report.
    #[serde(default = "default_title")]
    pub title: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
        }
    }
}

fn default_title() -> String {
    ReportOptions::default().title
}

impl Config {
    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Try to load configuration from the default location.
    ///
    /// Returns `Ok(None)` if the file doesn't exist, `Err` if it exists but can't be parsed.
    pub fn load_default() -> Result<Option<Self>> {
        Self::load_from_dir(Path::new("."))
    }

    /// Try to load `.tenderwatch.toml` from a directory.
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_path = dir.join(DEFAULT_CONFIG_FILE);

        if config_path.exists() {
            Ok(Some(Self::load(&config_path)?))
        } else {
            Ok(None)
        }
    }

    /// Merge this configuration with CLI arguments.
    ///
    /// CLI arguments take precedence over config file settings, but only
    /// where the CLI provides an explicit value.
    pub fn merge_with_args(&mut self, args: &crate::cli::Args) {
        if let Some(ref input) = args.input {
            self.general.input = input.clone();
        }
        if let Some(ref output) = args.output {
            self.general.output = output.clone();
        }
        if let Some(ref report) = args.report {
            self.general.report = report.clone();
        }
        if let Some(policy) = args.on_malformed {
            self.general.on_malformed = policy;
        }

        // Comma-split CLI values keep the space after each comma
        if let Some(ref keywords) = args.keywords {
            self.watchlist.keywords = trim_all(keywords);
        }
        if let Some(ref entities) = args.entities {
            self.watchlist.entities = trim_all(entities);
        }

        // Flags can only switch features on
        if args.scraped_at {
            self.general.stamp_scraped_at = true;
        }
        if args.normalize_entities {
            self.grouping.normalize_entity_names = true;
        }
        if args.verbose {
            self.general.verbose = true;
        }
    }

    /// Check settings that only make sense once file and CLI are merged.
    pub fn validate(&self) -> Result<()> {
        if self.general.output == self.general.report {
            anyhow::bail!(
                "Output and report must be different files (both are {})",
                self.general.output.display()
            );
        }

        Ok(())
    }

    /// Validate the watchlists and build the immutable matcher input.
    pub fn watchlists(&self) -> Result<Watchlists, ConfigError> {
        Watchlists::new(
            self.watchlist.keywords.iter().cloned(),
            self.watchlist.entities.iter().cloned(),
        )
    }

    /// Presentation options for the text report.
    pub fn report_options(&self) -> ReportOptions {
        ReportOptions {
            title: self.report.title.clone(),
        }
    }

    /// Generate a default configuration file content.
    pub fn default_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config).unwrap_or_else(|_| String::new())
    }
}

fn trim_all(values: &[String]) -> Vec<String> {
    values.iter().map(|v| v.trim().to_string()).collect()
}
