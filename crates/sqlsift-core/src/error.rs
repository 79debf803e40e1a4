//! Error and source location types

use std::path::PathBuf;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source location of a statement, in lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineSpan {
    /// First line of the statement (1-indexed)
    pub start: usize,
    /// Last line of the statement (1-indexed, inclusive)
    pub end: usize,
}

impl LineSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }
}

impl std::fmt::Display for LineSpan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start == self.end {
            write!(f, "line {}", self.start)
        } else {
            write!(f, "lines {}-{}", self.start, self.end)
        }
    }
}

/// Errors surfaced by the extraction library
///
/// Malformed statements never produce an error; they pass through the
/// pipeline unchanged. Only I/O and configuration problems end up here.
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    #[diagnostic(code(sqlsift::io))]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    #[diagnostic(code(sqlsift::io))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown dialect: '{0}'")]
    #[diagnostic(
        code(sqlsift::dialect),
        help("supported dialects: postgresql, mysql")
    )]
    UnknownDialect(String),

    #[error("invalid column name '{0}' in injected column list")]
    #[diagnostic(
        code(sqlsift::config),
        help("injected columns must be plain identifiers (letters, digits, underscore)")
    )]
    InvalidColumn(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
