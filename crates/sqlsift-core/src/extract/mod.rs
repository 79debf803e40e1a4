//! Extraction pipeline
//!
//! Scanner output is classified and, depending on the mode, rewritten:
//!
//! - [`ExtractMode::Creates`] keeps CREATE statements and makes
//!   `CREATE TABLE` idempotent.
//! - [`ExtractMode::Inserts`] keeps every INSERT statement verbatim.
//! - [`ExtractMode::Rows`] keeps INSERT statements for allow-listed tables and
//!   splits them into one statement per row.

mod create;
mod rows;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{AllowList, ClassifiedStatement, StatementKind};
use crate::dialect::SqlDialect;
use crate::error::{Error, Result};
use crate::scanner::{split_terminated, RawStatement, Scanner};

pub use create::make_idempotent;
pub use rows::{RowSplitter, DEFAULT_INJECTED_COLUMNS};

/// Separator written between statements in an output bundle
pub const STATEMENT_SEPARATOR: &str = "\n\n-- STATEMENT END --\n\n";

/// What to extract from a script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractMode {
    Creates,
    Inserts,
    Rows,
}

impl ExtractMode {
    /// Statement kind the scanner records in this mode
    pub fn kind(&self) -> StatementKind {
        match self {
            ExtractMode::Creates => StatementKind::Create,
            ExtractMode::Inserts | ExtractMode::Rows => StatementKind::Insert,
        }
    }

    /// Suffix appended to the input file stem for the output file
    pub fn output_suffix(&self) -> &'static str {
        match self {
            ExtractMode::Creates => "_creates.sql",
            ExtractMode::Inserts | ExtractMode::Rows => "_inserts.sql",
        }
    }

    /// Default output subdirectory, relative to the input directory
    pub fn default_output_dir(&self) -> &'static str {
        match self {
            ExtractMode::Creates => "createscripts",
            ExtractMode::Inserts => "done",
            ExtractMode::Rows => "insertscripts",
        }
    }
}

impl std::fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractMode::Creates => write!(f, "creates"),
            ExtractMode::Inserts => write!(f, "inserts"),
            ExtractMode::Rows => write!(f, "rows"),
        }
    }
}

/// Extractor - turns a script into the accepted, rewritten statements of one
/// mode
#[derive(Debug, Clone)]
pub struct Extractor {
    mode: ExtractMode,
    dialect: SqlDialect,
    allow_list: AllowList,
    splitter: RowSplitter,
}

impl Extractor {
    pub fn new(mode: ExtractMode) -> Self {
        Self::with_dialect(mode, SqlDialect::default())
    }

    pub fn with_dialect(mode: ExtractMode, dialect: SqlDialect) -> Self {
        Self {
            mode,
            dialect,
            allow_list: AllowList::default(),
            splitter: RowSplitter::for_dialect(dialect),
        }
    }

    pub fn allow_list(mut self, allow_list: AllowList) -> Self {
        self.allow_list = allow_list;
        self
    }

    /// Replace the columns injected by row splitting
    pub fn inject_columns<I, S>(mut self, columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.splitter = RowSplitter::new(columns, self.dialect)?;
        Ok(self)
    }

    pub fn mode(&self) -> ExtractMode {
        self.mode
    }

    pub fn dialect(&self) -> SqlDialect {
        self.dialect
    }

    /// Extract the accepted statements of a script
    pub fn extract(&self, sql: &str) -> Vec<String> {
        Scanner::for_kinds(self.dialect, &[self.mode.kind()])
            .scan(sql)
            .iter()
            .flat_map(|raw| self.accept(raw))
            .collect()
    }

    /// Read a file and extract from it. Bytes that are not valid UTF-8 are
    /// replaced with U+FFFD rather than failing the file.
    pub fn extract_file(&self, path: &Path) -> Result<Vec<String>> {
        let bytes = std::fs::read(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let sql = String::from_utf8_lossy(&bytes);
        Ok(self.extract(&sql))
    }

    /// Classify one raw statement and apply the mode's rewrite. Returns no
    /// statements when it is rejected.
    ///
    /// In the INSERT modes the text is first cut at top-level `;`, so several
    /// inserts sharing a line are handled one by one.
    pub fn accept(&self, raw: &RawStatement) -> Vec<String> {
        let text = raw.text();
        match self.mode {
            ExtractMode::Creates => self.accept_text(raw, &text),
            ExtractMode::Inserts | ExtractMode::Rows => split_terminated(&text, self.dialect)
                .into_iter()
                .flat_map(|piece| self.accept_text(raw, piece))
                .collect(),
        }
    }

    fn accept_text(&self, raw: &RawStatement, text: &str) -> Vec<String> {
        let stmt = ClassifiedStatement::classify(text);
        if stmt.kind != self.mode.kind() {
            debug!(span = %raw.span, kind = %stmt.kind, "rejected: wrong statement kind");
            return Vec::new();
        }

        match self.mode {
            ExtractMode::Creates => vec![make_idempotent(&stmt.text).into_owned()],
            ExtractMode::Inserts => vec![stmt.text],
            ExtractMode::Rows => {
                if !stmt.is_allowed(&self.allow_list) {
                    debug!(
                        span = %raw.span,
                        table = stmt.table_name.as_deref().unwrap_or("?"),
                        "rejected: table not allow-listed"
                    );
                    return Vec::new();
                }
                self.splitter.split(&stmt.text)
            }
        }
    }
}

/// Join statements into the text of one output file
pub fn bundle<S: AsRef<str>>(statements: &[S]) -> String {
    statements
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(STATEMENT_SEPARATOR)
}
