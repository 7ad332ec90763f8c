
pub mod pretty;

use std::io;
use thiserror::Error;

use crate::pretty::TableStyleKind;

/// Canonical error type shared across the audit crates.
#[derive(Error, Debug)]
pub enum AuditError {
    /// A catalog record did not decode into exactly a `(table, column)` pair.
    #[error("catalog format: record {record} has {fields} fields, expected 2")]
    CatalogFormat { record: u64, fields: usize },
    #[error("catalog: {0}")]
    Catalog(String),
    #[error("parse: {0}")]
    Parser(String),
    /// Carries the canonical text of the rejected statement.
    #[error("only SELECT queries are supported: {0}")]
    UnsupportedStatement(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Result alias that carries an `AuditError`.
pub type AuditResult<T> = Result<T, AuditError>;

/// SQL dialect used to tokenize the statement stream.
///
/// Defaults to MySQL, where `"x"` is a string literal rather than a quoted
/// identifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SqlDialect {
    Generic,
    #[default]
    MySql,
    PostgreSql,
}

/// Runtime configuration for an audit run.
///
/// # Example
/// ```
/// use common::{AuditConfig, SqlDialect};
///
/// let config = AuditConfig::builder()
///     .dialect(SqlDialect::PostgreSql)
///     .summary(true)
///     .build();
/// assert!(config.summary);
/// ```
#[derive(Clone, Debug, bon::Builder)]
pub struct AuditConfig {
    /// Dialect handed to the SQL tokenizer.
    #[builder(default)]
    pub dialect: SqlDialect,
    /// Write verdict counters to the diagnostic stream at end of input.
    #[builder(default = false)]
    pub summary: bool,
    /// Table style used for the summary.
    #[builder(default)]
    pub summary_style: TableStyleKind,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            dialect: SqlDialect::MySql,
            summary: false,
            summary_style: TableStyleKind::default(),
        }
    }
}

/// Convenient re-exports for downstream crates.
pub mod prelude {
    pub use crate::pretty::TableStyleKind;
    pub use crate::{AuditConfig, AuditError, AuditResult, SqlDialect};
}
