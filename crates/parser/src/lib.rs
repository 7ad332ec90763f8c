mod ast;
mod split;
#[cfg(test)]
mod tests;

pub use ast::*;

use std::{collections::VecDeque, io::BufRead};

use common::{AuditError, AuditResult, SqlDialect};
use sqlparser::ast as sqlast;
use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser as SqlParser;
use sqlparser::tokenizer::Token;

use crate::split::StatementSplitter;

/// Table name given to a SELECT that has no FROM clause.
pub const NO_TABLE: &str = "dual";

fn dialect_for(dialect: SqlDialect) -> Box<dyn Dialect> {
    match dialect {
        SqlDialect::Generic => Box::new(GenericDialect {}),
        SqlDialect::MySql => Box::new(MySqlDialect {}),
        SqlDialect::PostgreSql => Box::new(PostgreSqlDialect {}),
    }
}

/// Reads classified statements off a buffered input, one at a time.
///
/// Input is consumed only up to the end of the statement being returned, so
/// a statement is available as soon as its `;` has been read. Each statement
/// is tokenized on its own: a lexical error affects only the statement that
/// contains it. Empty statements are skipped. After the first error the
/// reader yields nothing more.
pub struct StatementReader<R> {
    splitter: StatementSplitter<R>,
    dialect: Box<dyn Dialect>,
    pending: VecDeque<AuditResult<Statement>>,
    finished: bool,
}

impl<R: BufRead> StatementReader<R> {
    pub fn new(dialect: SqlDialect, reader: R) -> Self {
        Self {
            splitter: StatementSplitter::new(reader, dialect),
            dialect: dialect_for(dialect),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    /// Parse chunks until at least one result is queued; false at end of input.
    fn fill(&mut self) -> AuditResult<bool> {
        while self.pending.is_empty() {
            let Some(chunk) = self.splitter.next_chunk()? else {
                return Ok(false);
            };
            let sql = String::from_utf8(chunk).map_err(|err| {
                AuditError::Parser(format!("SQL parse error: statement is not valid UTF-8: {err}"))
            })?;
            let stream = StatementStream::new(self.dialect.as_ref(), &sql)?;
            self.pending.extend(stream);
        }
        Ok(true)
    }
}

impl<R: BufRead> Iterator for StatementReader<R> {
    type Item = AuditResult<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        let item = match self.fill() {
            Ok(true) => self.pending.pop_front()?,
            Ok(false) => {
                self.finished = true;
                return None;
            }
            Err(err) => Err(err),
        };
        if item.is_err() {
            self.finished = true;
            self.pending.clear();
        }
        Some(item)
    }
}

/// Pulls statements off one tokenized chunk of input.
struct StatementStream<'a> {
    parser: SqlParser<'a>,
    finished: bool,
}

impl<'a> StatementStream<'a> {
    fn new(dialect: &'a dyn Dialect, sql: &str) -> AuditResult<Self> {
        let parser = SqlParser::new(dialect)
            .try_with_sql(sql)
            .map_err(|e| AuditError::Parser(format!("SQL parse error: {e}")))?;
        Ok(Self {
            parser,
            finished: false,
        })
    }

    fn parse_next(&mut self) -> AuditResult<Statement> {
        let stmt = self
            .parser
            .parse_statement()
            .map_err(|e| AuditError::Parser(format!("SQL parse error: {e}")))?;

        let next = self.parser.peek_token();
        match next.token {
            Token::SemiColon | Token::EOF => Ok(classify(stmt)),
            found => Err(AuditError::Parser(format!(
                "SQL parse error: Expected end of statement, found: {found}"
            ))),
        }
    }
}

impl Iterator for StatementStream<'_> {
    type Item = AuditResult<Statement>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }
        while self.parser.consume_token(&Token::SemiColon) {}
        if self.parser.peek_token().token == Token::EOF {
            self.finished = true;
            return None;
        }

        let result = self.parse_next();
        if result.is_err() {
            self.finished = true;
        }
        Some(result)
    }
}

fn classify(stmt: sqlast::Statement) -> Statement {
    use sqlast::Statement as SqlStatement;

    if let SqlStatement::Insert { table_name, .. } = &stmt {
        let table = table_name.to_string();
        return Statement::Insert(InsertStatement::new(table, Box::new(stmt)));
    }

    match stmt {
        SqlStatement::Query(query) => match first_relation(&query) {
            Some(table) => Statement::Select(SelectStatement::new(table, query)),
            None => Statement::Other(Box::new(SqlStatement::Query(query))),
        },
        other => Statement::Other(Box::new(other)),
    }
}

/// Render the first FROM relation of a plain SELECT body.
///
/// Named tables render as their (possibly qualified) name without alias;
/// derived tables and other factors render as their full SQL text. A SELECT
/// without FROM reads from `dual`. Set operations have no single relation.
fn first_relation(query: &sqlast::Query) -> Option<String> {
    let sqlast::SetExpr::Select(select) = query.body.as_ref() else {
        return None;
    };
    let Some(from) = select.from.first() else {
        return Some(NO_TABLE.to_string());
    };
    let name = match &from.relation {
        sqlast::TableFactor::Table { name, .. } => name.to_string(),
        other => other.to_string(),
    };
    Some(name)
}
