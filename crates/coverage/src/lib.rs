//! Index-coverage decisions for SELECT predicates.
//!
//! A statement is covered when its WHERE clause references at least one column
//! recorded as indexed for the statement's first FROM table.

pub mod audit;
pub mod check;
pub mod extract;
pub mod report;

pub use audit::{audit, extract_columns};
pub use check::{Verdict, check};
pub use extract::{ColumnRef, extract, first_indexed_column};
pub use report::{ReportEmitter, ReportStats};
