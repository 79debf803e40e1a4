//! Quote and dollar-body tracking
//!
//! A small automaton that splits text into code, quoted literals, dollar
//! bodies and comments (`--`, `/* */`, and `#` under MySQL). It carries its state across calls, so a literal
//! or body opened on one line is still open when the next line is fed in.
//! The statement scanner feeds it line by line; the row splitter feeds it a
//! whole tuple list at once.

use std::ops::Range;

use tracing::trace;

use crate::dialect::SqlDialect;

/// Where the automaton currently is
///
/// Being inside a quoted literal and inside a dollar body are separate
/// variants, so the two can never be active at the same time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Code,
    /// Inside a literal opened by this quote character (`'` or `"`)
    Quoted(char),
    /// Inside a PostgreSQL escape string (`E'...'`), where backslash escapes
    /// apply regardless of dialect
    Escaped,
    /// Inside a `/* ... */` comment
    BlockComment,
    /// Inside a dollar-quoted body opened by this exact tag (e.g. `$$`, `$fn$`)
    Dollar(String),
}

impl Region {
    pub fn is_code(&self) -> bool {
        matches!(self, Region::Code)
    }
}

/// Kind of a lexed segment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    Code,
    Quoted,
    Dollar,
    Comment,
}

/// A contiguous run of text of one kind, as a byte range into the fed text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    pub range: Range<usize>,
}

#[derive(Debug, Clone, Default)]
pub struct Lexer {
    region: Region,
    dialect: SqlDialect,
    delimiter: Option<String>,
}

impl Lexer {
    pub fn new(dialect: SqlDialect) -> Self {
        Self {
            region: Region::Code,
            dialect,
            delimiter: None,
        }
    }

    pub fn region(&self) -> &Region {
        &self.region
    }

    /// Tell the lexer about the active statement terminator.
    ///
    /// A dollar-shaped token identical to the terminator (as in
    /// `DELIMITER $$`) ends statements and never opens a body.
    pub fn set_delimiter(&mut self, delimiter: &str) {
        self.delimiter = Some(delimiter.to_string());
    }

    /// Drop any open literal or body
    pub fn reset(&mut self) {
        self.region = Region::Code;
    }

    /// Lex `text`, continuing from the current region, and return its segments
    /// in order. Segments cover the whole input without gaps.
    pub fn segments(&mut self, text: &str) -> Vec<Segment> {
        let bytes = text.as_bytes();
        let len = bytes.len();
        let mut segments = Vec::new();
        let mut start = 0;
        let mut i = 0;

        while i < len {
            match &self.region {
                Region::Code => match bytes[i] {
                    b'\'' if is_escape_prefix(bytes, i) => {
                        push(&mut segments, SegmentKind::Code, start..i - 1);
                        start = i - 1;
                        i += 1;
                        self.enter(Region::Escaped);
                    }
                    quote @ (b'\'' | b'"') => {
                        push(&mut segments, SegmentKind::Code, start..i);
                        start = i;
                        i += 1;
                        self.enter(Region::Quoted(quote as char));
                    }
                    b'$' => match find_dollar_tag_end(text, i) {
                        Some(tag_end) if !self.is_delimiter(&text[i..=tag_end]) => {
                            push(&mut segments, SegmentKind::Code, start..i);
                            start = i;
                            let tag = text[i..=tag_end].to_string();
                            i = tag_end + 1;
                            self.enter(Region::Dollar(tag));
                        }
                        Some(tag_end) => i = tag_end + 1,
                        None => i += 1,
                    },
                    b'-' if i + 1 < len && bytes[i + 1] == b'-' => {
                        push(&mut segments, SegmentKind::Code, start..i);
                        let end = line_end(text, i);
                        push(&mut segments, SegmentKind::Comment, i..end);
                        start = end;
                        i = end;
                    }
                    b'#' if self.dialect.hash_comments() => {
                        push(&mut segments, SegmentKind::Code, start..i);
                        let end = line_end(text, i);
                        push(&mut segments, SegmentKind::Comment, i..end);
                        start = end;
                        i = end;
                    }
                    b'/' if i + 1 < len && bytes[i + 1] == b'*' => {
                        push(&mut segments, SegmentKind::Code, start..i);
                        start = i;
                        i += 2;
                        self.enter(Region::BlockComment);
                    }
                    _ => i += 1,
                },
                Region::Quoted(_) | Region::Escaped => {
                    let (quote, escapes) = match self.region {
                        Region::Quoted(quote) => (quote as u8, self.dialect.backslash_escapes()),
                        _ => (b'\'', true),
                    };
                    if bytes[i] == b'\\' && escapes {
                        i = (i + 2).min(len);
                    } else if bytes[i] == quote {
                        i += 1;
                        push(&mut segments, SegmentKind::Quoted, start..i);
                        start = i;
                        self.enter(Region::Code);
                    } else {
                        i += 1;
                    }
                }
                Region::Dollar(tag) => match text[i..].find(tag.as_str()) {
                    Some(pos) => {
                        i += pos + tag.len();
                        push(&mut segments, SegmentKind::Dollar, start..i);
                        start = i;
                        self.enter(Region::Code);
                    }
                    None => i = len,
                },
                Region::BlockComment => match text[i..].find("*/") {
                    Some(pos) => {
                        i += pos + 2;
                        push(&mut segments, SegmentKind::Comment, start..i);
                        start = i;
                        self.enter(Region::Code);
                    }
                    None => i = len,
                },
            }
        }

        let trailing = match self.region {
            Region::Code => SegmentKind::Code,
            Region::Quoted(_) | Region::Escaped => SegmentKind::Quoted,
            Region::Dollar(_) => SegmentKind::Dollar,
            Region::BlockComment => SegmentKind::Comment,
        };
        push(&mut segments, trailing, start..len);
        segments
    }

    fn enter(&mut self, region: Region) {
        trace!(from = ?self.region, to = ?region, "region change");
        self.region = region;
    }

    fn is_delimiter(&self, tag: &str) -> bool {
        self.delimiter.as_deref() == Some(tag)
    }
}

fn push(segments: &mut Vec<Segment>, kind: SegmentKind, range: Range<usize>) {
    if range.is_empty() {
        return;
    }
    // Adjacent code runs are merged so callers see one span per gap
    if let Some(last) = segments.last_mut() {
        if last.kind == kind && last.range.end == range.start && kind == SegmentKind::Code {
            last.range.end = range.end;
            return;
        }
    }
    segments.push(Segment { kind, range });
}

/// End of the line comment starting at `start`, excluding the newline
fn line_end(text: &str, start: usize) -> usize {
    text[start..].find('\n').map_or(text.len(), |p| start + p)
}

/// Whether the quote at `quote` is preceded by a standalone `E` / `e`
fn is_escape_prefix(bytes: &[u8], quote: usize) -> bool {
    if quote == 0 || !matches!(bytes[quote - 1], b'E' | b'e') {
        return false;
    }
    quote < 2 || !(bytes[quote - 2].is_ascii_alphanumeric() || bytes[quote - 2] == b'_')
}

/// Find the end of a dollar-quote tag starting at position `start`.
/// Returns the index of the closing `$` if a valid tag is found.
pub fn find_dollar_tag_end(sql: &str, start: usize) -> Option<usize> {
    let bytes = sql.as_bytes();
    let len = bytes.len();
    // Tag is $<identifier>$ or just $$
    let mut i = start + 1;
    if i < len && bytes[i] == b'$' {
        return Some(i);
    }
    while i < len && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if i < len && bytes[i] == b'$' {
        Some(i)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(lexer: &mut Lexer, text: &str) -> Vec<(SegmentKind, String)> {
        lexer
            .segments(text)
            .into_iter()
            .map(|s| (s.kind, text[s.range].to_string()))
            .collect()
    }

    #[test]
    fn test_plain_code_is_one_segment() {
        let mut lexer = Lexer::default();
        assert_eq!(
            kinds(&mut lexer, "SELECT 1;"),
            vec![(SegmentKind::Code, "SELECT 1;".to_string())]
        );
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_quoted_literal_with_semicolon() {
        let mut lexer = Lexer::default();
        let segs = kinds(&mut lexer, "VALUES ('a;b', 2);");
        assert_eq!(segs[1], (SegmentKind::Quoted, "'a;b'".to_string()));
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_quote_kinds_do_not_nest() {
        let mut lexer = Lexer::default();
        let segs = kinds(&mut lexer, r#"('it"s', "it's")"#);
        assert_eq!(segs[1], (SegmentKind::Quoted, r#"'it"s'"#.to_string()));
        assert_eq!(segs[3], (SegmentKind::Quoted, r#""it's""#.to_string()));
    }

    #[test]
    fn test_literal_stays_open_across_calls() {
        let mut lexer = Lexer::default();
        lexer.segments("VALUES ('first line;\n");
        assert_eq!(lexer.region(), &Region::Quoted('\''));
        lexer.segments("second line');\n");
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_doubled_quote_stays_inside_literal() {
        let mut lexer = Lexer::default();
        lexer.segments("'it''s");
        assert_eq!(lexer.region(), &Region::Quoted('\''));
    }

    #[test]
    fn test_backslash_escape_depends_on_dialect() {
        let mut mysql = Lexer::new(SqlDialect::MySQL);
        mysql.segments(r"('it\'s');");
        assert!(mysql.region().is_code());

        let mut pg = Lexer::new(SqlDialect::PostgreSQL);
        pg.segments(r"('it\'s');");
        assert_eq!(pg.region(), &Region::Quoted('\''));
    }

    #[test]
    fn test_dollar_body_ignores_other_tags() {
        let mut lexer = Lexer::default();
        lexer.segments("AS $outer$\n");
        assert_eq!(lexer.region(), &Region::Dollar("$outer$".to_string()));
        lexer.segments("  x := $$ not a close $$;\n");
        assert_eq!(lexer.region(), &Region::Dollar("$outer$".to_string()));
        lexer.segments("$outer$;\n");
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_quotes_inside_dollar_body_are_inert() {
        let mut lexer = Lexer::default();
        lexer.segments("AS $$ SELECT 'unterminated; $$");
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_line_comment_hides_quotes() {
        let mut lexer = Lexer::default();
        let segs = kinds(&mut lexer, "id INT, -- don't care\n");
        assert!(segs.iter().any(|(kind, text)| *kind == SegmentKind::Comment
            && text == "-- don't care"));
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_comment_ends_at_newline() {
        let mut lexer = Lexer::default();
        let segs = kinds(&mut lexer, "-- c\n(1)");
        assert_eq!(segs[0], (SegmentKind::Comment, "-- c".to_string()));
        assert_eq!(segs[1], (SegmentKind::Code, "\n(1)".to_string()));
    }

    #[test]
    fn test_block_comment_hides_quotes() {
        let mut lexer = Lexer::default();
        let segs = kinds(&mut lexer, "id INT /* user's id */);");
        assert_eq!(segs[1], (SegmentKind::Comment, "/* user's id */".to_string()));
        assert_eq!(segs[2], (SegmentKind::Code, ");".to_string()));
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_block_comment_spans_calls() {
        let mut lexer = Lexer::default();
        lexer.segments("id INT, /* it's\n");
        assert_eq!(lexer.region(), &Region::BlockComment);
        let segs = kinds(&mut lexer, "  still */ name TEXT\n");
        assert_eq!(segs[0], (SegmentKind::Comment, "  still */".to_string()));
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_escape_string_uses_backslashes() {
        let mut lexer = Lexer::new(SqlDialect::PostgreSQL);
        let segs = kinds(&mut lexer, r"(1, E'it\'s');");
        assert_eq!(segs[1], (SegmentKind::Quoted, r"E'it\'s'".to_string()));
        assert!(lexer.region().is_code());

        // An identifier ending in `e` is not a prefix
        let mut lexer = Lexer::new(SqlDialect::PostgreSQL);
        lexer.segments(r"WHERE name='\';");
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_hash_comment_only_in_mysql() {
        let mut mysql = Lexer::new(SqlDialect::MySQL);
        let segs = kinds(&mut mysql, "id INT # user's id\n");
        assert_eq!(segs[1], (SegmentKind::Comment, "# user's id".to_string()));
        assert!(mysql.region().is_code());

        let mut pg = Lexer::new(SqlDialect::PostgreSQL);
        pg.segments("SELECT 5 # 3, 'x';\n");
        assert!(pg.region().is_code());
    }

    #[test]
    fn test_delimiter_shaped_tag_is_code() {
        let mut lexer = Lexer::default();
        lexer.set_delimiter("$$");
        lexer.segments("END$$\n");
        assert!(lexer.region().is_code());
    }

    #[test]
    fn test_find_dollar_tag_end() {
        assert_eq!(find_dollar_tag_end("$$", 0), Some(1));
        assert_eq!(find_dollar_tag_end("$body$", 0), Some(5));
        assert_eq!(find_dollar_tag_end("$1 + 2", 0), None);
        assert_eq!(find_dollar_tag_end("$", 0), None);
    }
}
