//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "sqlsift")]
#[command(author, version, about = "Extract CREATE and INSERT statements from SQL dump folders")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output (repeat for more)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Options shared by every folder-processing command
#[derive(clap::Args)]
pub struct BatchArgs {
    /// Folder containing .sql files
    #[arg(value_name = "DIR")]
    pub dir: PathBuf,

    /// SQL dialect used to lex quoted literals
    #[arg(short, long)]
    pub dialect: Option<String>,

    /// Output format
    #[arg(short, long, value_enum)]
    pub format: Option<OutputFormat>,

    /// Configuration file (defaults to the nearest sqlsift.toml)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write extracted statements here instead of the mode's subfolder
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Leave processed files in place instead of moving them to the archive
    #[arg(long)]
    pub no_archive: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Extract CREATE statements, making CREATE TABLE idempotent
    Creates {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Extract INSERT statements verbatim
    Inserts {
        #[command(flatten)]
        batch: BatchArgs,
    },

    /// Extract allow-listed INSERT statements, one statement per row
    Rows {
        #[command(flatten)]
        batch: BatchArgs,

        /// Table whose rows are extracted (repeatable)
        #[arg(short, long = "allow", value_name = "TABLE")]
        allow: Vec<String>,

        /// Column appended to every row as NULL (repeatable)
        #[arg(short, long = "inject", value_name = "COLUMN")]
        inject: Vec<String>,
    },

    /// Show the statement boundaries found in a file (for debugging)
    Split {
        /// SQL file to scan
        file: PathBuf,

        /// SQL dialect used to lex quoted literals
        #[arg(short, long, default_value = "postgresql")]
        dialect: String,

        /// Output format
        #[arg(short, long, default_value = "human", value_enum)]
        format: OutputFormat,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Progress lines for humans
    #[default]
    Human,
    /// One JSON report for the whole run
    Json,
}
