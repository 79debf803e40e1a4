// Integration tests for statement extraction
use pretty_assertions::assert_eq;
use sqlsift_core::classify::{AllowList, StatementKind};
use sqlsift_core::dialect::SqlDialect;
use sqlsift_core::extract::{bundle, ExtractMode, Extractor};
use sqlsift_core::scanner::{split_statements, Scanner};

fn dump() -> &'static str {
    r#"-- MySQL dump 10.13
/*!40101 SET NAMES utf8 */;
DROP TABLE IF EXISTS `customer`;
CREATE TABLE `customer` (
  `id` int NOT NULL, /* customer's key */
  `name` varchar(64) DEFAULT NULL, # owner's name
  PRIMARY KEY (`id`)
);

LOCK TABLES `customer` WRITE;
INSERT INTO `customer` VALUES (1,'Ann; Smith'),(2,'Bob (jr)');
UNLOCK TABLES;
/* Don't replay
   this section; */

CREATE INDEX idx_customer_name ON customer (name);
INSERT INTO audit_log (id, msg) VALUES (1, 'created');

DELIMITER //
CREATE PROCEDURE bump()
BEGIN
  UPDATE customer SET name = 'x;y';
END //
DELIMITER ;

CREATE OR REPLACE VIEW v_customer AS SELECT id FROM customer;
"#
}

// ========== Scanner ==========

#[test]
fn test_statement_count_matches_source() {
    let stmts = Scanner::new(SqlDialect::MySQL).scan(dump());
    let kinds: Vec<_> = stmts
        .iter()
        .map(|s| StatementKind::detect(&s.text()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            StatementKind::Create,
            StatementKind::Insert,
            StatementKind::Create,
            StatementKind::Insert,
            StatementKind::Create,
            StatementKind::Create,
        ]
    );
}

#[test]
fn test_round_trip_spans() {
    let sql = "CREATE TABLE a (id INT);\n\nCREATE TABLE b (\n  id INT\n);\nCREATE VIEW c AS SELECT 1;\n";
    let stmts = split_statements(sql, SqlDialect::default(), &[StatementKind::Create]);
    let texts: Vec<_> = stmts.iter().map(|s| s.text()).collect();
    assert_eq!(
        texts,
        vec![
            "CREATE TABLE a (id INT);",
            "CREATE TABLE b (\n  id INT\n);",
            "CREATE VIEW c AS SELECT 1;",
        ]
    );
    assert_eq!(stmts[1].span.start, 3);
    assert_eq!(stmts[1].span.end, 5);
}

#[test]
fn test_dollar_body_with_terminator_lookalikes() {
    let sql = r#"DELIMITER //
CREATE FUNCTION f() RETURNS trigger AS $fn$
BEGIN
  RAISE NOTICE 'done; //';
  RETURN NEW; //
END
$fn$ LANGUAGE plpgsql //
DELIMITER ;
CREATE TABLE after_fn (id INT);
"#;
    let stmts = split_statements(sql, SqlDialect::PostgreSQL, &[StatementKind::Create]);
    assert_eq!(stmts.len(), 2);
    assert_eq!(
        stmts[0].text(),
        "CREATE FUNCTION f() RETURNS trigger AS $fn$\nBEGIN\n  RAISE NOTICE 'done; //';\n  RETURN NEW; //\nEND\n$fn$ LANGUAGE plpgsql"
    );
    assert_eq!(stmts[1].text(), "CREATE TABLE after_fn (id INT);");
}

#[test]
fn test_mysql_dollar_delimiter() {
    let sql = "DELIMITER $$\nCREATE PROCEDURE p()\nBEGIN\n  SELECT 1;\nEND$$\nDELIMITER ;\nCREATE TABLE t (id INT);\n";
    let stmts = split_statements(sql, SqlDialect::MySQL, &[StatementKind::Create]);
    let texts: Vec<_> = stmts.iter().map(|s| s.text()).collect();
    assert_eq!(
        texts,
        vec![
            "CREATE PROCEDURE p()\nBEGIN\n  SELECT 1;\nEND",
            "CREATE TABLE t (id INT);",
        ]
    );
}

#[test]
fn test_truncated_script_keeps_last_statement() {
    let sql = "INSERT INTO customer VALUES (1,'a');\nINSERT INTO customer VALUES\n(2,'b'),\n(3,'c')";
    let stmts = split_statements(sql, SqlDialect::default(), &[StatementKind::Insert]);
    assert_eq!(stmts.len(), 2);
    assert!(stmts[1].dangling);
    assert_eq!(stmts[1].text(), "INSERT INTO customer VALUES\n(2,'b'),\n(3,'c')");
}

#[test]
fn test_comments_and_escape_strings_keep_boundaries() {
    let sql = r#"CREATE TABLE note (
  id INT, /* the note's id;
  spans lines */
  body TEXT -- it's free text
);
INSERT INTO note VALUES (1, E'it\'s; done');
INSERT INTO note VALUES (2, 'plain');
CREATE TABLE after_note (id INT);
"#;
    let stmts = Scanner::new(SqlDialect::PostgreSQL).scan(sql);
    let texts: Vec<_> = stmts.iter().map(|s| s.text()).collect();
    assert_eq!(
        texts,
        vec![
            "CREATE TABLE note (\n  id INT, /* the note's id;\n  spans lines */\n  body TEXT -- it's free text\n);",
            r"INSERT INTO note VALUES (1, E'it\'s; done');",
            "INSERT INTO note VALUES (2, 'plain');",
            "CREATE TABLE after_note (id INT);",
        ]
    );
    assert!(stmts.iter().all(|s| !s.dangling));
}

// ========== Extraction modes ==========

#[test]
fn test_creates_from_dump() {
    let out = Extractor::with_dialect(ExtractMode::Creates, SqlDialect::MySQL).extract(dump());
    assert_eq!(out.len(), 4);
    assert!(out[0].starts_with("CREATE TABLE IF NOT EXISTS `customer` ("));
    assert_eq!(out[1], "CREATE INDEX idx_customer_name ON customer (name);");
    assert!(out[2].starts_with("CREATE PROCEDURE bump()"));
    assert!(out[2].ends_with("END"));
    assert_eq!(
        out[3],
        "CREATE OR REPLACE VIEW v_customer AS SELECT id FROM customer;"
    );
}

#[test]
fn test_inserts_from_dump() {
    let out = Extractor::with_dialect(ExtractMode::Inserts, SqlDialect::MySQL).extract(dump());
    assert_eq!(
        out,
        vec![
            "INSERT INTO `customer` VALUES (1,'Ann; Smith'),(2,'Bob (jr)');",
            "INSERT INTO audit_log (id, msg) VALUES (1, 'created');",
        ]
    );
}

#[test]
fn test_rows_from_dump() {
    let out = Extractor::with_dialect(ExtractMode::Rows, SqlDialect::MySQL).extract(dump());
    assert_eq!(
        out,
        vec![
            "INSERT INTO `customer` (promotionid, promotionname) VALUES (1,'Ann; Smith', NULL, NULL);",
            "INSERT INTO `customer` (promotionid, promotionname) VALUES (2,'Bob (jr)', NULL, NULL);",
        ]
    );
}

#[test]
fn test_rows_table_not_allowed() {
    let out = Extractor::new(ExtractMode::Rows)
        .extract("INSERT INTO other_table (id, name) VALUES (1, 'a'), (2, 'b');\n");
    assert!(out.is_empty());

    let out = Extractor::new(ExtractMode::Rows)
        .allow_list(AllowList::new(["other_table"]))
        .extract("INSERT INTO other_table (id, name) VALUES (1, 'a'), (2, 'b');\n");
    assert_eq!(out.len(), 2);
}

#[test]
fn test_rows_inserts_sharing_a_line() {
    let sql = "INSERT INTO customer (id) VALUES (1); INSERT INTO customer (id) VALUES (2),(3);\nINSERT INTO orders (id) VALUES (4); INSERT INTO call_outcome (id) VALUES (5);\n";
    let out = Extractor::new(ExtractMode::Rows).extract(sql);
    assert_eq!(
        out,
        vec![
            "INSERT INTO customer (id, promotionid, promotionname) VALUES (1, NULL, NULL);",
            "INSERT INTO customer (id, promotionid, promotionname) VALUES (2, NULL, NULL);",
            "INSERT INTO customer (id, promotionid, promotionname) VALUES (3, NULL, NULL);",
            "INSERT INTO call_outcome (id, promotionid, promotionname) VALUES (5, NULL, NULL);",
        ]
    );
}

#[test]
fn test_rows_multi_line_insert() {
    let sql = "INSERT INTO call_outcome (id, label)\nVALUES\n  (1, 'answered'),\n  (2, 'no, answer');\n";
    let out = Extractor::new(ExtractMode::Rows).extract(sql);
    assert_eq!(
        out,
        vec![
            "INSERT INTO call_outcome (id, label, promotionid, promotionname) VALUES (1, 'answered', NULL, NULL);",
            "INSERT INTO call_outcome (id, label, promotionid, promotionname) VALUES (2, 'no, answer', NULL, NULL);",
        ]
    );
}

#[test]
fn test_bundle_output() {
    let out = Extractor::new(ExtractMode::Creates)
        .extract("CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);\n");
    assert_eq!(
        bundle(&out),
        "CREATE TABLE IF NOT EXISTS a (id INT);\n\n-- STATEMENT END --\n\nCREATE TABLE IF NOT EXISTS b (id INT);"
    );
}

#[test]
fn test_extract_file_replaces_invalid_utf8() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("latin1.sql");
    let mut bytes = b"INSERT INTO customer VALUES (1,'Jos".to_vec();
    bytes.push(0xE9);
    bytes.extend_from_slice(b"');\n");
    std::fs::write(&path, bytes).unwrap();

    let out = Extractor::new(ExtractMode::Inserts)
        .extract_file(&path)
        .unwrap();
    assert_eq!(out, vec!["INSERT INTO customer VALUES (1,'Jos\u{FFFD}');"]);
}

#[test]
fn test_extract_file_missing() {
    let err = Extractor::new(ExtractMode::Creates)
        .extract_file(std::path::Path::new("/nonexistent/sqlsift/file.sql"))
        .unwrap_err();
    assert!(err.to_string().contains("failed to read"));
}
