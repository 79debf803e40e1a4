//! Output formatting

use miette::{IntoDiagnostic, Result};
use sqlsift_core::{ExtractMode, RawStatement};

use crate::args::OutputFormat;
use crate::batch::FileReport;

/// Output formatter for batch progress and reports
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    fn human(&self) -> bool {
        self.format == OutputFormat::Human && !self.quiet
    }

    /// Announce that a file is about to be processed
    pub fn print_processing(&self, file_name: &str) {
        if self.human() {
            println!("Processing {}...", file_name);
        }
    }

    /// Report the outcome for one file
    pub fn print_file_report(&self, mode: ExtractMode, report: &FileReport) {
        if !self.human() {
            return;
        }
        let kind = mode.kind();
        match &report.output {
            Some(output) => println!(
                "  -> Extracted {} {} statements into {}",
                report.statements,
                kind,
                output
                    .file_name()
                    .map(|n| n.to_string_lossy())
                    .unwrap_or_default()
            ),
            None => println!("  -> Extracted {} {} statements", report.statements, kind),
        }
    }

    /// Print the end-of-run summary
    pub fn print_summary(&self, mode: ExtractMode, reports: &[FileReport]) -> Result<()> {
        let total: usize = reports.iter().map(|r| r.statements).sum();
        match self.format {
            OutputFormat::Human => {
                if !self.quiet {
                    eprintln!();
                    eprintln!(
                        "Extracted {} statement(s) from {} file(s)",
                        total,
                        reports.len()
                    );
                }
            }
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "mode": mode,
                    "statements": total,
                    "files": reports,
                });
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            }
        }
        Ok(())
    }

    /// Print raw statement boundaries found in one file
    pub fn print_statements(&self, file_name: &str, statements: &[RawStatement]) -> Result<()> {
        match self.format {
            OutputFormat::Human => {
                for (i, stmt) in statements.iter().enumerate() {
                    let dangling = if stmt.dangling { " (no terminator)" } else { "" };
                    println!("Statement {} [{}:{}]{}:", i + 1, file_name, stmt.span, dangling);
                    println!("{}", stmt.text());
                    println!();
                }
            }
            OutputFormat::Json => {
                let items: Vec<serde_json::Value> = statements
                    .iter()
                    .map(|s| {
                        serde_json::json!({
                            "span": s.span,
                            "dangling": s.dangling,
                            "text": s.text(),
                        })
                    })
                    .collect();
                let output = serde_json::json!({
                    "file": file_name,
                    "statements": items,
                });
                println!("{}", serde_json::to_string_pretty(&output).into_diagnostic()?);
            }
        }
        Ok(())
    }
}
