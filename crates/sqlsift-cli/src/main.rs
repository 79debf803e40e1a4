//! sqlsift CLI - SQL statement extraction tool

mod args;
mod batch;
mod config;
mod output;

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use miette::{IntoDiagnostic, Result};
use sqlsift_core::{AllowList, ExtractMode, Extractor, Scanner, SqlDialect};
use tracing_subscriber::EnvFilter;

use crate::args::{Args, BatchArgs, Command};
use crate::batch::BatchOptions;
use crate::config::Config;
use crate::output::OutputFormatter;

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing; RUST_LOG wins over -v
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:?}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> Result<()> {
    let quiet = args.quiet;
    match args.command {
        Command::Creates { batch } => run_batch(ExtractMode::Creates, batch, &[], &[], quiet),
        Command::Inserts { batch } => run_batch(ExtractMode::Inserts, batch, &[], &[], quiet),
        Command::Rows {
            batch,
            allow,
            inject,
        } => run_batch(ExtractMode::Rows, batch, &allow, &inject, quiet),

        Command::Split {
            file,
            dialect,
            format,
        } => {
            // Show raw boundaries without classification (for debugging)
            let dialect: SqlDialect = dialect.parse()?;
            let bytes = fs::read(&file).into_diagnostic()?;
            let content = String::from_utf8_lossy(&bytes);
            let statements = Scanner::new(dialect).scan(&content);

            let formatter = OutputFormatter::new(format, quiet);
            formatter.print_statements(&file.display().to_string(), &statements)
        }
    }
}

fn run_batch(
    mode: ExtractMode,
    batch: BatchArgs,
    allow: &[String],
    inject: &[String],
    quiet: bool,
) -> Result<()> {
    // Load configuration
    let config = if let Some(path) = &batch.config {
        Config::from_file(path)?
    } else {
        Config::find_and_load()?.unwrap_or_default()
    };

    // Merge CLI args with config (CLI takes precedence)
    let config = config.merge_with_args(&batch.dialect, &batch.format, allow, inject);

    let dialect: SqlDialect = match &config.dialect {
        Some(name) => name.parse()?,
        None => SqlDialect::default(),
    };

    let mut extractor = Extractor::with_dialect(mode, dialect);
    if let Some(tables) = &config.allow_tables {
        extractor = extractor.allow_list(AllowList::new(tables));
    }
    if let Some(columns) = &config.inject_columns {
        extractor = extractor.inject_columns(columns.iter().cloned())?;
    }

    let options = BatchOptions {
        output_dir: batch
            .out_dir
            .clone()
            .unwrap_or_else(|| batch.dir.join(config.output_dir(mode))),
        archive_dir: (!batch.no_archive).then(|| batch.dir.join(config.archive_dir())),
        input_dir: batch.dir,
    };
    tracing::debug!(%mode, %dialect, ?options, "starting batch");

    let formatter = OutputFormatter::new(config.output_format(), quiet);
    let reports = batch::run(&extractor, &options, &formatter)?;
    formatter.print_summary(mode, &reports)
}
