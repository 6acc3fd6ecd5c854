//! Output formatting for run reports
//!
//! This module provides:
//! - Text output for human-readable display
//! - JSON output for machine processing

mod json;
mod text;

pub use json::JsonFormatter;
pub use text::TextFormatter;

use crate::engine::{ProbeResult, RunReport};
use std::io::Write;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable text output
    #[default]
    Text,
    /// JSON output for machine processing
    Json,
}

/// Output verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Verbosity {
    /// Decision line only
    Quiet,
    /// Decision plus per-component changes
    #[default]
    Normal,
    /// Everything, including unchanged components
    Verbose,
}

/// Configuration for output formatting
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub verbosity: Verbosity,
    /// Whether to use colors (when supported)
    pub color: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::default(),
            verbosity: Verbosity::default(),
            color: true,
        }
    }
}

impl OutputConfig {
    /// Create configuration from CLI flags
    pub fn from_cli(json: bool, verbose: bool, quiet: bool, color: bool) -> Self {
        let format = if json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        };

        let verbosity = if quiet {
            Verbosity::Quiet
        } else if verbose {
            Verbosity::Verbose
        } else {
            Verbosity::Normal
        };

        Self {
            format,
            verbosity,
            color,
        }
    }
}

/// Trait for output formatters
pub trait OutputFormatter {
    /// Format and write the report of an update run
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()>;

    /// Format and write probe results
    fn format_probe(
        &self,
        project: &str,
        results: &[ProbeResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()>;
}

/// Create an output formatter based on configuration
pub fn create_formatter(config: OutputConfig) -> Box<dyn OutputFormatter> {
    match config.format {
        OutputFormat::Text => Box::new(TextFormatter::with_color(config.verbosity, config.color)),
        OutputFormat::Json => Box::new(JsonFormatter::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_config_default() {
        let config = OutputConfig::default();
        assert_eq!(config.format, OutputFormat::Text);
        assert_eq!(config.verbosity, Verbosity::Normal);
        assert!(config.color);
    }

    #[test]
    fn test_output_config_from_cli_json() {
        let config = OutputConfig::from_cli(true, false, false, true);
        assert_eq!(config.format, OutputFormat::Json);
        assert_eq!(config.verbosity, Verbosity::Normal);
    }

    #[test]
    fn test_output_config_quiet_wins_over_verbose() {
        let config = OutputConfig::from_cli(false, true, true, true);
        assert_eq!(config.verbosity, Verbosity::Quiet);
    }

    #[test]
    fn test_output_config_from_cli_verbose() {
        let config = OutputConfig::from_cli(false, true, false, true);
        assert_eq!(config.verbosity, Verbosity::Verbose);
        assert!(config.color);
    }

    #[test]
    fn test_output_config_without_color() {
        let config = OutputConfig::from_cli(false, false, false, false);
        assert!(!config.color);

        let formatter = create_formatter(config);
        let report = RunReport {
            project: "php".to_string(),
            updates: crate::domain::VersionUpdate::new(),
            decision: crate::domain::UpdateDecision::NoChange,
            dry_run: false,
        };
        let mut out = Vec::new();
        formatter.format(&report, &mut out).unwrap();
        assert!(!String::from_utf8(out).unwrap().contains('\x1b'));
    }
}
