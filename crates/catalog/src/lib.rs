
use std::{fs::File, io, path::Path};

use ahash::RandomState;
use common::{AuditError, AuditResult};
use hashbrown::{HashMap, HashSet};

type Map<K, V> = HashMap<K, V, RandomState>;

/// Set of column names recorded as indexed for one table.
pub type ColumnSet = HashSet<String, RandomState>;

/// Answer to "what columns are indexed for table T?".
///
/// `known` is false when the table never appeared in the catalog source, which
/// is distinct from a table that appeared with an empty column set.
#[derive(Clone, Copy, Debug)]
pub struct TableIndexes<'a> {
    pub columns: &'a ColumnSet,
    pub known: bool,
}

impl TableIndexes<'_> {
    /// Exact, case-sensitive membership test.
    pub fn contains(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}

/// Immutable mapping from table name to its indexed columns.
#[derive(Clone, Debug, Default)]
pub struct IndexCatalog {
    tables: Map<String, ColumnSet>,
    empty: ColumnSet,
}

impl IndexCatalog {
    /// Build a catalog from `(table, column)` records.
    ///
    /// Every record must carry exactly two fields; the first malformed record
    /// aborts the load with `AuditError::CatalogFormat`.
    pub fn load<I, R, S>(records: I) -> AuditResult<Self>
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut builder = CatalogBuilder::default();
        for (idx, record) in records.into_iter().enumerate() {
            let fields: Vec<String> = record.into_iter().map(Into::into).collect();
            builder.push_record(idx as u64 + 1, fields)?;
        }
        Ok(builder.finish())
    }

    /// Read a headerless two-column CSV catalog.
    pub fn from_csv_reader<R: io::Read>(reader: R) -> AuditResult<Self> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        let mut builder = CatalogBuilder::default();
        for (idx, record) in csv_reader.records().enumerate() {
            let record =
                record.map_err(|err| AuditError::Catalog(format!("invalid index list: {err}")))?;
            let fields = record.iter().map(str::to_string).collect();
            builder.push_record(idx as u64 + 1, fields)?;
        }
        let catalog = builder.finish();
        tracing::info!(
            tables = catalog.table_count(),
            columns = catalog.column_count(),
            "loaded index catalog"
        );
        Ok(catalog)
    }

    /// Open and read a CSV catalog file.
    pub fn from_csv_path(path: &Path) -> AuditResult<Self> {
        let file = File::open(path).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => {
                AuditError::Catalog(format!("index list not found at {}", path.display()))
            }
            _ => AuditError::Io(err),
        })?;
        Self::from_csv_reader(io::BufReader::new(file))
    }

    /// Look up the indexed columns of `table` by exact name.
    pub fn lookup(&self, table: &str) -> TableIndexes<'_> {
        match self.tables.get(table) {
            Some(columns) => TableIndexes {
                columns,
                known: true,
            },
            None => TableIndexes {
                columns: &self.empty,
                known: false,
            },
        }
    }

    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    /// Number of distinct `(table, column)` pairs.
    pub fn column_count(&self) -> usize {
        self.tables.values().map(HashSet::len).sum()
    }
}

#[derive(Default)]
struct CatalogBuilder {
    tables: Map<String, ColumnSet>,
}

impl CatalogBuilder {
    fn push_record(&mut self, record: u64, fields: Vec<String>) -> AuditResult<()> {
        let [table, column]: [String; 2] =
            fields
                .try_into()
                .map_err(|fields: Vec<String>| AuditError::CatalogFormat {
                    record,
                    fields: fields.len(),
                })?;
        self.tables.entry(table).or_default().insert(column);
        Ok(())
    }

    fn finish(self) -> IndexCatalog {
        IndexCatalog {
            tables: self.tables,
            empty: ColumnSet::default(),
        }
    }
}
