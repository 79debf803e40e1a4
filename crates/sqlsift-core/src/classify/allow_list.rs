//! Tables eligible for row-level extraction

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

/// Tables whose rows are extracted in row-splitting mode
pub const DEFAULT_TABLES: &[&str] = &["customer", "call_outcome"];

/// Set of lowercase table names. Read-only once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct AllowList {
    tables: IndexSet<String>,
}

impl AllowList {
    pub fn new<I, S>(tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tables: tables
                .into_iter()
                .map(|t| t.as_ref().trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains(&table.to_lowercase())
    }
}

impl Default for AllowList {
    fn default() -> Self {
        Self::new(DEFAULT_TABLES)
    }
}

impl From<Vec<String>> for AllowList {
    fn from(tables: Vec<String>) -> Self {
        Self::new(tables)
    }
}

impl From<AllowList> for Vec<String> {
    fn from(list: AllowList) -> Self {
        list.tables.into_iter().collect()
    }
}
