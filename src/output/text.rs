//! Text output formatter for human-readable display

use crate::domain::UpdateDecision;
use crate::engine::{ProbeResult, RunReport};
use crate::output::{OutputFormatter, Verbosity};
use colored::Colorize;
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    verbosity: Verbosity,
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self::with_color(verbosity, true)
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn dry_run_prefix(&self, dry_run: bool) -> String {
        match (dry_run, self.color) {
            (false, _) => String::new(),
            (true, true) => format!("{} ", "(dry-run)".cyan()),
            (true, false) => "(dry-run) ".to_string(),
        }
    }

    fn decision_line(&self, decision: &UpdateDecision) -> String {
        let text = decision.to_string();
        if !self.color {
            return text;
        }
        match decision {
            UpdateDecision::NoChange => text.dimmed().to_string(),
            UpdateDecision::AwaitingChecks { .. } => text.yellow().to_string(),
            _ => text.green().to_string(),
        }
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let project = if self.color {
            report.project.bold().to_string()
        } else {
            report.project.clone()
        };
        writeln!(
            writer,
            "{}{}: {}",
            self.dry_run_prefix(report.dry_run),
            project,
            self.decision_line(&report.decision)
        )?;

        if self.verbosity == Verbosity::Quiet {
            return Ok(());
        }

        for update in report.updates.iter() {
            let from = update.from.as_deref().unwrap_or("?");
            let to = update.full_version();
            if self.color {
                writeln!(
                    writer,
                    "  {}  {} {} {}",
                    update.component,
                    from.dimmed(),
                    "→".dimmed(),
                    to.green()
                )?;
            } else {
                writeln!(writer, "  {}  {} → {}", update.component, from, to)?;
            }
        }
        Ok(())
    }

    fn format_probe(
        &self,
        project: &str,
        results: &[ProbeResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        writeln!(writer, "{}", project)?;

        let width = results
            .iter()
            .map(|r| r.component.len())
            .max()
            .unwrap_or(0);

        for result in results {
            let outdated = result.is_outdated();
            if !outdated && self.verbosity == Verbosity::Quiet {
                continue;
            }
            let latest = match (outdated, self.color) {
                (true, true) => result.latest.green().to_string(),
                (false, true) => result.latest.dimmed().to_string(),
                (_, false) => result.latest.clone(),
            };
            writeln!(
                writer,
                "  {:width$}  {} → {}",
                result.component,
                result.current,
                latest,
                width = width
            )?;
        }
        Ok(())
    }
}
