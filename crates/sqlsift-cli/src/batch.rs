//! Folder processing: discover scripts, extract, write bundles, archive

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use sqlsift_core::{bundle, Error, Extractor};
use tracing::{debug, info, warn};

use crate::output::OutputFormatter;

/// Where a batch reads from and writes to
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// `None` leaves processed inputs in place
    pub archive_dir: Option<PathBuf>,
}

/// Outcome for one input file
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub file: String,
    pub statements: usize,
    pub output: Option<PathBuf>,
    pub archived: Option<PathBuf>,
}

/// List `*.sql` files (any case) directly inside `dir`, sorted by name
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>> {
    let Some(dir_str) = dir.to_str() else {
        miette::bail!("input folder path is not valid UTF-8: {}", dir.display());
    };
    let pattern = format!("{}/*.sql", Pattern::escape(dir_str));
    let options = MatchOptions {
        case_sensitive: false,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    let mut files: Vec<PathBuf> = glob::glob_with(&pattern, options)
        .into_diagnostic()?
        .flatten()
        .filter(|p| p.is_file())
        .collect();
    files.sort();
    Ok(files)
}

/// Process every script in the input folder, one file at a time.
///
/// A file is archived only after its output has been written.
pub fn run(
    extractor: &Extractor,
    options: &BatchOptions,
    formatter: &OutputFormatter,
) -> Result<Vec<FileReport>> {
    if !options.input_dir.is_dir() {
        miette::bail!("not a folder: {}", options.input_dir.display());
    }

    fs::create_dir_all(&options.output_dir).into_diagnostic()?;
    if let Some(archive_dir) = &options.archive_dir {
        fs::create_dir_all(archive_dir).into_diagnostic()?;
    }

    let files = discover(&options.input_dir)?;
    info!(count = files.len(), dir = %options.input_dir.display(), "discovered scripts");

    let mut reports = Vec::with_capacity(files.len());
    for path in files {
        let report = process_file(extractor, options, formatter, &path)?;
        formatter.print_file_report(extractor.mode(), &report);
        reports.push(report);
    }
    Ok(reports)
}

fn process_file(
    extractor: &Extractor,
    options: &BatchOptions,
    formatter: &OutputFormatter,
    path: &Path,
) -> Result<FileReport> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    formatter.print_processing(&file_name);

    let statements = extractor.extract_file(path)?;

    let output = if statements.is_empty() {
        warn!(file = %file_name, "no statements extracted");
        None
    } else {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let out_path = options
            .output_dir
            .join(format!("{}{}", stem, extractor.mode().output_suffix()));
        fs::write(&out_path, bundle(&statements)).map_err(|source| Error::Write {
            path: out_path.clone(),
            source,
        })?;
        info!(file = %file_name, statements = statements.len(), output = %out_path.display(), "wrote bundle");
        Some(out_path)
    };

    let archived = match &options.archive_dir {
        Some(archive_dir) => {
            let target = archive_dir.join(&file_name);
            move_file(path, &target).into_diagnostic()?;
            info!(file = %file_name, to = %target.display(), "archived");
            Some(target)
        }
        None => None,
    };

    Ok(FileReport {
        file: file_name,
        statements: statements.len(),
        output,
        archived,
    })
}

/// Rename `from` to `to`, copying and deleting when they sit on different
/// filesystems
fn move_file(from: &Path, to: &Path) -> std::io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), to = %to.display(), "rename crosses devices, copying");
            copy_and_remove(from, to)
        }
        result => result,
    }
}

fn copy_and_remove(from: &Path, to: &Path) -> std::io::Result<()> {
    fs::copy(from, to)?;
    fs::remove_file(from)
}
