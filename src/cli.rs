//! Command-line interface argument parsing.
//!
//! This module handles all CLI argument parsing using clap,
//! including validation and default values.

use crate::models::{GroupBy, SurveyModule};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// SurveyPulse - survey response aggregation dashboard
///
/// Aggregates a respondent's survey answers into positive-response
/// percentages per module, section, category and driver, and reconciles
/// them with the backend's authoritative scores.
///
/// Examples:
///   surveypulse --module leadership --user u-42
///   surveypulse --offline --format json --output snapshot.json
///   surveypulse --module ai-readiness --watch 60 --survey-id s-1
///   surveypulse --init-config
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Args {
    /// Survey modules to report on (comma-separated)
    ///
    /// Values: ai-readiness, leadership, employee-experience.
    /// Defaults to all three.
    #[arg(short, long, value_name = "MODULES", value_delimiter = ',')]
    pub module: Vec<SurveyModule>,

    /// Respondent whose answers are aggregated
    #[arg(short, long, default_value = "current-user", env = "SURVEYPULSE_USER")]
    pub user: String,

    /// Survey API base URL
    ///
    /// Overrides `api.base_url` from .surveypulse.toml.
    #[arg(long, value_name = "URL", env = "SURVEYPULSE_API_URL")]
    pub api_url: Option<String>,

    /// Use the built-in sample data instead of the API
    #[arg(long)]
    pub offline: bool,

    /// Keep polling for this many seconds before printing the report
    ///
    /// Ctrl-C stops early and still prints the report.
    #[arg(short, long, value_name = "SECS")]
    pub watch: Option<u64>,

    /// Survey id for realtime statistics
    #[arg(long, value_name = "ID")]
    pub survey_id: Option<String>,

    /// Output format (markdown, json)
    #[arg(long, value_name = "FORMAT")]
    pub format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Dimensions to break results down by (comma-separated)
    ///
    /// Example: --group-by section,driver
    #[arg(long, value_name = "DIMS", value_delimiter = ',')]
    pub group_by: Option<Vec<GroupBy>>,

    /// Path to configuration file
    ///
    /// If not specified, looks for .surveypulse.toml in the current directory
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging output
    #[arg(short, long)]
    pub verbose: bool,

    /// Run in quiet mode (minimal output)
    #[arg(short, long)]
    pub quiet: bool,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Poll interval in milliseconds for analytics and realtime stats
    #[arg(long, value_name = "MS")]
    pub poll_interval: Option<u64>,

    /// Generate a default .surveypulse.toml configuration file
    #[arg(long)]
    pub init_config: bool,
}

/// Output format for the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Markdown format (default)
    #[default]
    Markdown,
    /// JSON format
    Json,
}

impl Args {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Modules to report on, in the order given. All modules when none
    /// were named.
    pub fn modules(&self) -> Vec<SurveyModule> {
        if self.module.is_empty() {
            return SurveyModule::ALL.to_vec();
        }
        let mut modules = Vec::new();
        for module in &self.module {
            if !modules.contains(module) {
                modules.push(*module);
            }
        }
        modules
    }

    /// Validate the parsed arguments.
    pub fn validate(&self) -> Result<(), String> {
        // Skip validation for --init-config
        if self.init_config {
            return Ok(());
        }

        if let Some(ref url) = self.api_url {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err("API URL must start with 'http://' or 'https://'".to_string());
            }
        }

        if self.user.trim().is_empty() {
            return Err("User id must not be empty".to_string());
        }

        // Check for conflicting options
        if self.verbose && self.quiet {
            return Err("Cannot use both --verbose and --quiet".to_string());
        }

        if self.timeout == Some(0) {
            return Err("Timeout must be at least 1 second".to_string());
        }

        if self.watch == Some(0) {
            return Err("Watch duration must be at least 1 second".to_string());
        }

        if self.poll_interval == Some(0) {
            return Err("Poll interval must be at least 1 ms".to_string());
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
