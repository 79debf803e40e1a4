//! Statement terminator tracking (`DELIMITER` directives)

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::dialect::DEFAULT_DELIMITER;

static DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*DELIMITER\s+(\S+)\s*$").expect("valid regex"));

/// Current statement terminator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelimiterTracker {
    current: String,
}

impl Default for DelimiterTracker {
    fn default() -> Self {
        Self {
            current: DEFAULT_DELIMITER.to_string(),
        }
    }
}

impl DelimiterTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn is_default(&self) -> bool {
        self.current == DEFAULT_DELIMITER
    }

    /// Examine a line. Returns `true` when it was a directive; the line is
    /// then consumed and must not become part of any statement.
    pub fn observe(&mut self, line: &str) -> bool {
        match parse_directive(line) {
            Some(token) => {
                debug!(from = %self.current, to = %token, "delimiter redeclared");
                self.current = token.to_string();
                true
            }
            None => false,
        }
    }
}

/// Extract the new terminator from a `DELIMITER <token>` line
pub fn parse_directive(line: &str) -> Option<&str> {
    DIRECTIVE
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}
