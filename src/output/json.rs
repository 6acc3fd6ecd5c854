//! JSON output formatter for machine processing

use crate::domain::UpdateDecision;
use crate::engine::{ProbeResult, RunReport};
use crate::output::OutputFormatter;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
#[derive(Default)]
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        Self
    }
}

/// JSON representation of a run
#[derive(Serialize)]
struct JsonReport<'a> {
    project: &'a str,
    dry_run: bool,
    decision: &'a UpdateDecision,
    updates: Vec<JsonUpdate<'a>>,
}

#[derive(Serialize)]
struct JsonUpdate<'a> {
    component: &'a str,
    from: Option<&'a str>,
    to: String,
}

#[derive(Serialize)]
struct JsonProbe<'a> {
    project: &'a str,
    components: &'a [ProbeResult],
}

fn write_json(value: &impl Serialize, writer: &mut dyn Write) -> std::io::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    writeln!(writer, "{}", json)
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &RunReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonReport {
            project: &report.project,
            dry_run: report.dry_run,
            decision: &report.decision,
            updates: report
                .updates
                .iter()
                .map(|u| JsonUpdate {
                    component: &u.component,
                    from: u.from.as_deref(),
                    to: u.full_version(),
                })
                .collect(),
        };
        write_json(&output, writer)
    }

    fn format_probe(
        &self,
        project: &str,
        results: &[ProbeResult],
        writer: &mut dyn Write,
    ) -> std::io::Result<()> {
        write_json(
            &JsonProbe {
                project,
                components: results,
            },
            writer,
        )
    }
}
