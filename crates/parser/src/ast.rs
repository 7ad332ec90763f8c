use std::fmt;

use sqlparser::ast as sqlast;

/// A parsed statement, classified by the kinds the audit tools care about.
#[derive(Clone, Debug, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    /// Anything else, kept only for reporting.
    Other(Box<sqlast::Statement>),
}

impl Statement {
    /// Accept the SELECT variant and reject everything else.
    pub fn into_select(self) -> common::AuditResult<SelectStatement> {
        match self {
            Statement::Select(select) => Ok(select),
            other => Err(common::AuditError::UnsupportedStatement(other.to_string())),
        }
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Select(select) => write!(f, "{select}"),
            Statement::Insert(insert) => write!(f, "{insert}"),
            Statement::Other(stmt) => write!(f, "{stmt}"),
        }
    }
}

/// SELECT with at least one FROM entry.
///
/// Only the first FROM entry names the audited table; joins and further FROM
/// entries are kept for rendering but otherwise ignored.
#[derive(Clone, Debug, PartialEq)]
pub struct SelectStatement {
    table: String,
    query: Box<sqlast::Query>,
}

impl SelectStatement {
    pub(crate) fn new(table: String, query: Box<sqlast::Query>) -> Self {
        Self { table, query }
    }

    /// Name of the first FROM relation, rendered as written.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The WHERE expression, if any.
    pub fn predicate(&self) -> Option<&sqlast::Expr> {
        match self.query.body.as_ref() {
            sqlast::SetExpr::Select(select) => select.selection.as_ref(),
            _ => None,
        }
    }
}

impl fmt::Display for SelectStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.query)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct InsertStatement {
    table: String,
    statement: Box<sqlast::Statement>,
}

impl InsertStatement {
    pub(crate) fn new(table: String, statement: Box<sqlast::Statement>) -> Self {
        Self { table, statement }
    }

    pub fn table(&self) -> &str {
        &self.table
    }
}

impl fmt::Display for InsertStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statement)
    }
}
