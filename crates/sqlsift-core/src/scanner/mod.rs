//! Statement boundary scanner
//!
//! Consumes a script line by line and cuts it into raw statements. Only lines
//! that start a statement of a requested kind begin recording; everything
//! between statements is ignored. A statement ends at the first line whose
//! code ends with the active terminator while no quoted literal, dollar body
//! or block comment is open, or at end of input.

mod delimiter;
mod lexer;

use tracing::debug;

use crate::classify::StatementKind;
use crate::dialect::SqlDialect;
use crate::error::LineSpan;

pub use delimiter::{parse_directive, DelimiterTracker};
pub use lexer::{find_dollar_tag_end, Lexer, Region, Segment, SegmentKind};

/// Accumulated lines of one statement, as they appeared in the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawStatement {
    /// Source lines including their line endings. With a redeclared terminator
    /// the final line has it stripped.
    pub lines: Vec<String>,
    pub span: LineSpan,
    /// Whether the statement ran into end of input without a terminator
    pub dangling: bool,
}

impl RawStatement {
    /// Statement text with trailing whitespace removed
    pub fn text(&self) -> String {
        self.lines.concat().trim_end().to_string()
    }
}

/// Per-statement buffer, present only while recording
#[derive(Debug)]
struct Buffer {
    lines: Vec<String>,
    start_line: usize,
}

/// Mutable scanner state
#[derive(Debug)]
pub struct ScanState {
    delimiter: DelimiterTracker,
    lexer: Lexer,
    buffer: Option<Buffer>,
    line_no: usize,
}

impl ScanState {
    fn new(dialect: SqlDialect) -> Self {
        Self {
            delimiter: DelimiterTracker::new(),
            lexer: Lexer::new(dialect),
            buffer: None,
            line_no: 0,
        }
    }

    pub fn delimiter(&self) -> &str {
        self.delimiter.current()
    }

    pub fn region(&self) -> &Region {
        self.lexer.region()
    }

    pub fn is_recording(&self) -> bool {
        self.buffer.is_some()
    }
}

/// Line-oriented statement scanner, parameterized by the statement kinds it
/// records
#[derive(Debug)]
pub struct Scanner {
    kinds: Vec<StatementKind>,
    state: ScanState,
}

impl Scanner {
    /// Scanner recording CREATE and INSERT statements
    pub fn new(dialect: SqlDialect) -> Self {
        Self::for_kinds(dialect, &[StatementKind::Create, StatementKind::Insert])
    }

    /// Scanner recording only the given statement kinds
    pub fn for_kinds(dialect: SqlDialect, kinds: &[StatementKind]) -> Self {
        Self {
            kinds: kinds.to_vec(),
            state: ScanState::new(dialect),
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Split a whole script into raw statements
    pub fn scan(mut self, sql: &str) -> Vec<RawStatement> {
        let mut statements: Vec<RawStatement> = sql
            .split_inclusive('\n')
            .filter_map(|line| self.push_line(line))
            .collect();
        statements.extend(self.finish());
        statements
    }

    /// Feed one line (with or without its line ending). Returns a statement
    /// when this line completes one.
    pub fn push_line(&mut self, line: &str) -> Option<RawStatement> {
        let state = &mut self.state;
        state.line_no += 1;

        // Inside an open literal or body a directive-looking line is content
        if state.lexer.region().is_code() && state.delimiter.observe(line) {
            state.lexer.set_delimiter(state.delimiter.current());
            return None;
        }

        if state.buffer.is_none() {
            let kind = StatementKind::detect(line);
            if !self.kinds.contains(&kind) {
                return None;
            }
            debug!(line = state.line_no, %kind, "statement start");
            state.buffer = Some(Buffer {
                lines: Vec::new(),
                start_line: state.line_no,
            });
        }

        let segments = state.lexer.segments(line);
        let buffer = state.buffer.as_mut()?;
        buffer.lines.push(line.to_string());

        if !state.lexer.region().is_code() {
            return None;
        }

        // Trailing comments do not hide a terminator before them
        let code_end = segments
            .iter()
            .rev()
            .find(|s| s.kind != SegmentKind::Comment && !line[s.range.clone()].trim().is_empty())
            .map_or(0, |s| s.range.end);
        let code = line[..code_end].trim_end();
        let delimiter = state.delimiter.current();
        if !code.ends_with(delimiter) {
            return None;
        }

        if !state.delimiter.is_default() {
            let comment = line[code_end..].trim();
            let mut last = code[..code.len() - delimiter.len()].trim_end().to_string();
            if !comment.is_empty() {
                last.push(' ');
                last.push_str(comment);
            }
            last.push('\n');
            if let Some(slot) = buffer.lines.last_mut() {
                *slot = last;
            }
        }

        Some(self.close(false))
    }

    /// Signal end of input. A statement still being recorded is returned as
    /// is, terminator or not.
    pub fn finish(mut self) -> Option<RawStatement> {
        if self.state.buffer.is_none() {
            return None;
        }
        debug!(line = self.state.line_no, "dangling statement at end of input");
        Some(self.close(true))
    }

    fn close(&mut self, dangling: bool) -> RawStatement {
        let state = &mut self.state;
        state.lexer.reset();
        let buffer = state.buffer.take().unwrap_or(Buffer {
            lines: Vec::new(),
            start_line: state.line_no,
        });
        let span = LineSpan::new(buffer.start_line, state.line_no);
        debug!(%span, dangling, "statement end");
        RawStatement {
            lines: buffer.lines,
            span,
            dangling,
        }
    }
}

/// Cut statement text at every `;` that sits in code outside parentheses.
///
/// Each piece keeps its `;`. A tail holding only comments stays with the
/// piece before it; a tail holding code is returned as a final,
/// unterminated piece.
pub fn split_terminated(text: &str, dialect: SqlDialect) -> Vec<&str> {
    let mut lexer = Lexer::new(dialect);
    let mut ranges: Vec<std::ops::Range<usize>> = Vec::new();
    let mut start = 0;
    let mut depth: i64 = 0;
    let mut has_code = false;

    for segment in lexer.segments(text) {
        if segment.kind == SegmentKind::Comment {
            continue;
        }
        if segment.kind != SegmentKind::Code {
            has_code = true;
            continue;
        }
        for (offset, ch) in text[segment.range.clone()].char_indices() {
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                ';' if depth <= 0 => {
                    let end = segment.range.start + offset + 1;
                    if has_code {
                        ranges.push(start..end);
                    }
                    start = end;
                    has_code = false;
                    continue;
                }
                _ => {}
            }
            if !ch.is_whitespace() {
                has_code = true;
            }
        }
    }

    if has_code {
        ranges.push(start..text.len());
    } else if let Some(last) = ranges.last_mut() {
        last.end = text.len();
    }
    ranges.into_iter().map(|r| text[r].trim()).collect()
}

/// Split `sql` into raw statements of the given kinds
pub fn split_statements(
    sql: &str,
    dialect: SqlDialect,
    kinds: &[StatementKind],
) -> Vec<RawStatement> {
    Scanner::for_kinds(dialect, kinds).scan(sql)
}
