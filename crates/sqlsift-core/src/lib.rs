//! sqlsift-core: statement extraction for SQL dump files
//!
//! This library cuts multi-statement SQL scripts into individual statements
//! and rewrites them for replay: CREATE TABLE statements become idempotent and
//! multi-row INSERT statements are split into one statement per row. It does
//! not parse SQL; boundaries are found by a line scanner that understands
//! `DELIMITER` directives, quoted literals and dollar-quoted bodies.

pub mod classify;
pub mod dialect;
pub mod error;
pub mod extract;
pub mod scanner;

pub use classify::{AllowList, ClassifiedStatement, StatementKind};
pub use dialect::SqlDialect;
pub use error::{Error, LineSpan, Result};
pub use extract::{bundle, ExtractMode, Extractor, RowSplitter, STATEMENT_SEPARATOR};
pub use scanner::{RawStatement, Scanner};
