use std::fmt;

use catalog::IndexCatalog;
use serde::Serialize;

use crate::extract::ColumnRef;

/// Outcome of coverage analysis for one statement.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum Verdict {
    Covered,
    Uncovered,
    /// The table never appeared in the catalog.
    UnknownTable,
}

impl Verdict {
    /// Anything short of `Covered` is reported.
    pub fn is_flagged(self) -> bool {
        self != Verdict::Covered
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Verdict::Covered => "covered",
            Verdict::Uncovered => "uncovered",
            Verdict::UnknownTable => "unknown table",
        })
    }
}

/// Decide whether at least one predicate column is indexed on `table`.
///
/// Columns are examined in the order given and the first exact match ends
/// the scan. A known table with no predicate columns is `Uncovered`.
pub fn check<'c, I>(table: &str, columns: I, catalog: &IndexCatalog) -> Verdict
where
    I: IntoIterator<Item = &'c ColumnRef>,
{
    let indexes = catalog.lookup(table);
    if !indexes.known {
        return Verdict::UnknownTable;
    }

    if columns
        .into_iter()
        .any(|column| indexes.contains(column.as_str()))
    {
        Verdict::Covered
    } else {
        Verdict::Uncovered
    }
}
