//! Idempotency rewrite for CREATE statements

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

static OR_REPLACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*CREATE\s+OR\s+REPLACE\b").expect("valid regex"));
static CREATE_TABLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*CREATE\s+TABLE\b").expect("valid regex"));
static IF_NOT_EXISTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*CREATE\s+TABLE\s+IF\s+NOT\s+EXISTS\b").expect("valid regex")
});

/// Rewrite `CREATE TABLE` to `CREATE TABLE IF NOT EXISTS`.
///
/// `CREATE OR REPLACE ...`, tables already guarded by `IF NOT EXISTS`, and
/// every other CREATE kind come back untouched.
pub fn make_idempotent(statement: &str) -> Cow<'_, str> {
    if OR_REPLACE.is_match(statement) || IF_NOT_EXISTS.is_match(statement) {
        return Cow::Borrowed(statement);
    }
    CREATE_TABLE.replacen(statement, 1, "CREATE TABLE IF NOT EXISTS")
}
