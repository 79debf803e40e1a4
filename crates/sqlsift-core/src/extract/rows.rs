//! Row splitting for multi-row INSERT statements
//!
//! `INSERT INTO t (a, b) VALUES (1, 2), (3, 4);` becomes one statement per
//! tuple. The injected columns are appended to the column list and a `NULL`
//! per injected column is appended to every tuple.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dialect::SqlDialect;
use crate::error::{Error, Result};
use crate::scanner::{Lexer, SegmentKind};

/// Columns appended to every split row unless configured otherwise
pub const DEFAULT_INJECTED_COLUMNS: &[&str] = &["promotionid", "promotionname"];

static VALUES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bVALUES\b").expect("valid regex"));
static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\w+$").expect("valid regex"));

/// Splits multi-row inserts and injects extra columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowSplitter {
    columns: Vec<String>,
    dialect: SqlDialect,
}

impl Default for RowSplitter {
    fn default() -> Self {
        Self {
            columns: DEFAULT_INJECTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
            dialect: SqlDialect::default(),
        }
    }
}

impl RowSplitter {
    /// Build a splitter injecting `columns`. Every name must be a plain
    /// identifier.
    pub fn new<I, S>(columns: I, dialect: SqlDialect) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let columns = columns
            .into_iter()
            .map(Into::into)
            .map(|c: String| {
                if IDENTIFIER.is_match(&c) {
                    Ok(c)
                } else {
                    Err(Error::InvalidColumn(c))
                }
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { columns, dialect })
    }

    /// Default columns, lexing literals per `dialect`
    pub fn for_dialect(dialect: SqlDialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Split one INSERT statement into single-row statements.
    ///
    /// A statement without a `VALUES` keyword is returned as the only element,
    /// trimmed but otherwise unmodified.
    pub fn split(&self, statement: &str) -> Vec<String> {
        let Some(values) = VALUES.find(statement) else {
            debug!("no VALUES keyword, passing statement through");
            return vec![statement.trim().to_string()];
        };

        let (column_clause, missing) = self.augment_columns(statement[..values.start()].trim());
        let tuple_list = statement[values.end()..]
            .trim()
            .trim_end_matches(';')
            .trim_end();

        let nulls = ", NULL".repeat(missing);
        self.tuples(tuple_list, &nulls)
            .into_iter()
            .map(|tuple| format!("{column_clause} VALUES {tuple};"))
            .collect()
    }

    /// Append the injected columns that are not already listed. Returns the new
    /// clause and how many columns were appended.
    fn augment_columns(&self, clause: &str) -> (String, usize) {
        match (clause.find('('), clause.rfind(')')) {
            (Some(open), Some(close)) if open < close => {
                let existing = clause[open + 1..close].trim();
                let present: Vec<String> = existing.split(',').map(normalize_column).collect();
                let missing: Vec<&str> = self
                    .columns
                    .iter()
                    .filter(|c| !present.contains(&c.to_lowercase()))
                    .map(String::as_str)
                    .collect();

                let mut columns = existing.to_string();
                if !missing.is_empty() {
                    if !columns.is_empty() {
                        columns.push_str(", ");
                    }
                    columns.push_str(&missing.join(", "));
                }
                let clause = format!("{}{}{}", &clause[..=open], columns, &clause[close..]);
                (clause, missing.len())
            }
            _ if self.columns.is_empty() => (clause.to_string(), 0),
            _ => (
                format!("{clause} ({})", self.columns.join(", ")),
                self.columns.len(),
            ),
        }
    }

    /// Cut a tuple list into tuples, appending `nulls` inside each closing
    /// parenthesis. Depth-zero commas and terminators between tuples are
    /// dropped.
    fn tuples(&self, tuple_list: &str, nulls: &str) -> Vec<String> {
        let mut lexer = Lexer::new(self.dialect);
        let mut tuples = Vec::new();
        let mut buf = String::new();
        let mut depth: i64 = 0;

        for segment in lexer.segments(tuple_list) {
            let text = &tuple_list[segment.range];
            match segment.kind {
                SegmentKind::Code => {
                    for ch in text.chars() {
                        buf.push(ch);
                        match ch {
                            '(' => depth += 1,
                            ')' => {
                                depth -= 1;
                                if depth == 0 {
                                    buf.pop();
                                    buf.push_str(nulls);
                                    buf.push(')');
                                    tuples.push(buf.trim().to_string());
                                    buf.clear();
                                }
                            }
                            ',' | ';' if depth == 0 => buf.clear(),
                            _ => {}
                        }
                    }
                }
                SegmentKind::Comment if depth == 0 => {}
                _ => buf.push_str(text),
            }
        }

        if !buf.trim().is_empty() {
            tuples.push(buf.trim().to_string());
        }
        tuples
    }
}

/// Compare column names without quoting or case
fn normalize_column(column: &str) -> String {
    column
        .trim()
        .trim_matches(|c| c == '`' || c == '"')
        .to_lowercase()
}
