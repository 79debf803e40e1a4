//! Statement classification
//!
//! Classification is keyword matching on the first meaningful line, nothing
//! more. No grammar is checked.

mod allow_list;

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

pub use allow_list::AllowList;

static CREATE_START: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*CREATE(\s+OR\s+REPLACE)?\b").expect("valid regex")
});
static INSERT_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*INSERT\b").expect("valid regex"));
static INSERT_TABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*INSERT\s+INTO\s+`?(\w+)`?").expect("valid regex")
});

/// Kind of statement, decided by its leading keyword
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementKind {
    Create,
    Insert,
    Other,
}

impl StatementKind {
    /// Detect the kind a line starts, if any
    pub fn detect(line: &str) -> Self {
        if CREATE_START.is_match(line) {
            StatementKind::Create
        } else if INSERT_START.is_match(line) {
            StatementKind::Insert
        } else {
            StatementKind::Other
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            StatementKind::Create => "CREATE",
            StatementKind::Insert => "INSERT",
            StatementKind::Other => "OTHER",
        }
    }
}

impl std::fmt::Display for StatementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A statement with its kind and, for inserts, its target table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedStatement {
    pub kind: StatementKind,
    pub table_name: Option<String>,
    pub text: String,
}

impl ClassifiedStatement {
    /// Classify statement text. Leading full-line comments and blank lines are
    /// dropped from the stored text.
    pub fn classify(text: &str) -> Self {
        let text = strip_leading_comments(text);
        let kind = StatementKind::detect(&text);
        let table_name = match kind {
            StatementKind::Insert => insert_table_name(&text).map(str::to_string),
            _ => None,
        };
        Self {
            kind,
            table_name,
            text,
        }
    }

    /// Whether an insert targets a table on the allow list
    pub fn is_allowed(&self, allow_list: &AllowList) -> bool {
        self.table_name
            .as_deref()
            .is_some_and(|name| allow_list.contains(name))
    }
}

/// Drop leading blank lines and lines starting with `--`
pub fn strip_leading_comments(text: &str) -> String {
    let mut lines = text.lines().peekable();
    while lines
        .peek()
        .is_some_and(|line| line.trim().is_empty() || line.trim_start().starts_with("--"))
    {
        lines.next();
    }
    lines.collect::<Vec<_>>().join("\n").trim().to_string()
}

/// Table name of an `INSERT INTO <name>` statement, back-quotes removed
pub fn insert_table_name(text: &str) -> Option<&str> {
    INSERT_TABLE
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
