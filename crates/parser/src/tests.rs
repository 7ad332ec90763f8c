use super::*;
use common::AuditError;
use pretty_assertions::assert_eq;

fn parse(dialect: SqlDialect, sql: &str) -> AuditResult<Vec<Statement>> {
    StatementReader::new(dialect, sql.as_bytes()).collect()
}

fn stmts(sql: &str) -> Vec<Statement> {
    parse(SqlDialect::Generic, sql).expect("parser should succeed")
}

fn select(sql: &str) -> SelectStatement {
    let mut stmts = stmts(sql);
    assert_eq!(stmts.len(), 1, "expected exactly one statement from {sql}");
    stmts.remove(0).into_select().expect("expected a SELECT")
}

#[test]
fn select_exposes_table_and_predicate() {
    let stmt = select("SELECT * FROM users WHERE email = 'x'");
    assert_eq!(stmt.table(), "users");
    let predicate = stmt.predicate().expect("expected WHERE clause");
    assert_eq!(predicate.to_string(), "email = 'x'");
}

#[test]
fn select_without_where_has_no_predicate() {
    let stmt = select("SELECT id, name FROM users");
    assert!(stmt.predicate().is_none());
}

#[test]
fn canonical_rendering_normalizes_spacing_and_keywords() {
    let stmt = select("select *   from users\n where name='x'");
    assert_eq!(stmt.to_string(), "SELECT * FROM users WHERE name = 'x'");
}

#[test]
fn table_name_is_first_from_entry_without_alias() {
    let stmt = select("SELECT * FROM users u JOIN posts p ON u.id = p.user_id WHERE u.id = 1");
    assert_eq!(stmt.table(), "users");

    let stmt = select("SELECT * FROM orders, users WHERE id = 1");
    assert_eq!(stmt.table(), "orders");
}

#[test]
fn table_name_keeps_qualifier_and_case() {
    let stmt = select("SELECT * FROM app.Users WHERE id = 1");
    assert_eq!(stmt.table(), "app.Users");
}

#[test]
fn derived_table_renders_as_sql_text() {
    let stmt = select("SELECT * FROM (SELECT id FROM users) AS sub WHERE id = 1");
    assert_eq!(stmt.table(), "(SELECT id FROM users) AS sub");
}

#[test]
fn stream_yields_statements_in_order() {
    let sql = "SELECT * FROM a WHERE x = 1;
               SELECT * FROM b;;
               SELECT * FROM c WHERE y = 2;";
    let tables: Vec<String> = stmts(sql)
        .into_iter()
        .map(|stmt| stmt.into_select().expect("select").table().to_string())
        .collect();
    assert_eq!(tables, vec!["a", "b", "c"]);
}

#[test]
fn empty_input_yields_nothing() {
    assert!(stmts("").is_empty());
    assert!(stmts(" ;; ;").is_empty());
}

#[test]
fn stream_stops_after_first_error() {
    let sql = "SELECT * FROM a; SELEKT * FROM b; SELECT * FROM c";
    let mut stream = StatementReader::new(SqlDialect::Generic, sql.as_bytes());

    let first = stream.next().expect("first statement").expect("valid");
    assert_eq!(first.into_select().expect("select").table(), "a");

    let err = stream
        .next()
        .expect("second item")
        .expect_err("invalid statement");
    assert!(matches!(err, AuditError::Parser(_)), "{err:?}");

    assert!(stream.next().is_none(), "stream should end after an error");
}

#[test]
fn statements_must_be_separated() {
    let err = parse(SqlDialect::Generic, "SELECT * FROM a SELECT * FROM b")
        .expect_err("missing separator should fail");
    let msg = format!("{err}");
    assert!(msg.contains("end of statement"), "{msg}");
}

#[test]
fn tokenizer_errors_are_parse_errors() {
    let err = parse(SqlDialect::Generic, "SELECT * FROM a WHERE x = 'open")
        .expect_err("unterminated literal should fail");
    assert!(matches!(err, AuditError::Parser(_)), "{err:?}");
}

#[test]
fn lexical_error_leaves_earlier_statements_intact() {
    let sql = "SELECT * FROM a WHERE x = 1; SELECT * FROM b WHERE y = 'open";
    let mut stream = StatementReader::new(SqlDialect::Generic, sql.as_bytes());

    let first = stream.next().expect("first statement").expect("valid");
    assert_eq!(first.into_select().expect("select").table(), "a");

    let err = stream
        .next()
        .expect("second item")
        .expect_err("unterminated literal");
    assert!(matches!(err, AuditError::Parser(_)), "{err:?}");
    assert!(stream.next().is_none());
}

#[test]
fn invalid_utf8_fails_only_its_own_statement() {
    let mut input = b"SELECT * FROM a; SELECT * FROM b WHERE x = '".to_vec();
    input.extend_from_slice(&[0xff, 0xfe]);
    input.extend_from_slice(b"'");
    let mut stream = StatementReader::new(SqlDialect::Generic, input.as_slice());

    let first = stream.next().expect("first statement").expect("valid");
    assert_eq!(first.into_select().expect("select").table(), "a");
    let err = stream.next().expect("second item").expect_err("bad bytes");
    assert!(format!("{err}").contains("UTF-8"), "{err}");
}

#[test]
fn semicolons_inside_literals_do_not_split_statements() {
    let stmt = select("SELECT * FROM users WHERE name = 'a;b' AND note = 'c'");
    assert_eq!(stmt.table(), "users");
    assert_eq!(
        stmt.predicate().expect("predicate").to_string(),
        "name = 'a;b' AND note = 'c'"
    );
}

#[test]
fn select_without_from_reads_from_dual() {
    let stmt = select("SELECT 1");
    assert_eq!(stmt.table(), NO_TABLE);
    assert!(stmt.predicate().is_none());

    let stmt = select("SELECT 1 WHERE 1 = 1");
    assert_eq!(stmt.table(), "dual");
}

#[test]
fn insert_is_classified_with_its_table() {
    let mut stmts = stmts("INSERT INTO posts VALUES (1, 'Hello')");
    match stmts.remove(0) {
        Statement::Insert(insert) => assert_eq!(insert.table(), "posts"),
        other => panic!("expected Insert, got {other:?}"),
    }
}

#[test]
fn non_select_statements_are_rejected_at_the_boundary() {
    for sql in [
        "DELETE FROM users WHERE id = 1",
        "UPDATE users SET name = 'x' WHERE id = 1",
        "INSERT INTO users VALUES (1)",
        "SELECT id FROM a UNION SELECT id FROM b",
    ] {
        let mut parsed = stmts(sql);
        let err = parsed.remove(0).into_select().expect_err(sql);
        match err {
            AuditError::UnsupportedStatement(text) => assert!(!text.is_empty()),
            other => panic!("expected UnsupportedStatement for {sql}, got {other:?}"),
        }
    }
}

#[test]
fn rejected_statement_carries_canonical_text() {
    let mut parsed = stmts("delete from users where id=1");
    let err = parsed.remove(0).into_select().expect_err("delete");
    assert_eq!(
        format!("{err}"),
        "only SELECT queries are supported: DELETE FROM users WHERE id = 1"
    );
}

#[test]
fn dialect_selection_accepts_backtick_identifiers_in_mysql() {
    let mut parsed = parse(SqlDialect::MySql, "SELECT * FROM `users` WHERE `id` = 1")
        .expect("mysql dialect parses backticks");
    let stmt = parsed.remove(0).into_select().expect("select");
    assert_eq!(stmt.table(), "`users`");
}
