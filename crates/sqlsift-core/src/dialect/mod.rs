//! SQL dialect support

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::Error;

/// Default statement terminator shared by every dialect
pub const DEFAULT_DELIMITER: &str = ";";

/// Supported SQL dialects
///
/// Both dialects recognize `DELIMITER` directives and dollar-quoted bodies,
/// since dumps routinely mix conventions. The dialect only changes how quoted
/// literals are lexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlDialect {
    #[default]
    PostgreSQL,
    MySQL,
}

impl SqlDialect {
    /// Whether a backslash inside a quoted literal escapes the next character
    pub fn backslash_escapes(&self) -> bool {
        match self {
            SqlDialect::PostgreSQL => false,
            SqlDialect::MySQL => true,
        }
    }

    /// Whether `#` starts a comment running to the end of the line
    pub fn hash_comments(&self) -> bool {
        matches!(self, SqlDialect::MySQL)
    }
}

impl FromStr for SqlDialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSQL),
            "mysql" | "mysql8" | "mariadb" => Ok(SqlDialect::MySQL),
            _ => Err(Error::UnknownDialect(s.to_string())),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlDialect::PostgreSQL => write!(f, "postgresql"),
            SqlDialect::MySQL => write!(f, "mysql"),
        }
    }
}
