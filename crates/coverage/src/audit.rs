//! Sequential statement pipelines: extract, check, emit, then read the next.

use std::io::{self, BufRead, Write};

use catalog::IndexCatalog;
use common::{AuditConfig, AuditError, AuditResult};
use parser::{Statement, StatementReader};
use serde::Serialize;

use crate::{
    check::{Verdict, check},
    extract::{ColumnRef, extract},
    report::{ReportEmitter, ReportStats},
};

/// Audit every statement read from `input` against `catalog`.
///
/// Each statement is checked and its report flushed before the next one is
/// read. Flagged statements go to `out` in input order. Table diagnostics and
/// the optional summary go to `diag`. The first parse failure or non-SELECT
/// statement aborts the run; output already written for earlier statements is
/// kept.
pub fn audit<I, O, D>(
    catalog: &IndexCatalog,
    input: I,
    config: &AuditConfig,
    out: O,
    diag: D,
) -> AuditResult<ReportStats>
where
    I: BufRead,
    O: Write,
    D: Write,
{
    let mut emitter = ReportEmitter::new(out, diag);

    let statements = StatementReader::new(config.dialect, input);
    let result = run_audit(catalog, statements, &mut emitter);
    let flushed = emitter.flush();
    result?;
    flushed?;

    if config.summary {
        emitter.write_summary(config.summary_style)?;
        emitter.flush()?;
    }
    Ok(emitter.stats())
}

fn run_audit<R: BufRead, O: Write, D: Write>(
    catalog: &IndexCatalog,
    statements: StatementReader<R>,
    emitter: &mut ReportEmitter<O, D>,
) -> AuditResult<()> {
    for stmt in statements {
        let select = stmt?.into_select()?;
        let columns = extract(select.predicate());
        let verdict = check(select.table(), &columns, catalog);

        tracing::debug!(
            table = select.table(),
            columns = columns.len(),
            %verdict,
            "checked statement"
        );
        if verdict == Verdict::UnknownTable {
            tracing::warn!(table = select.table(), "table missing from index catalog");
        }

        emitter.emit(&select, select.table(), verdict)?;
        emitter.flush()?;
    }
    Ok(())
}

#[derive(Serialize)]
struct ExtractedQuery<'a> {
    table: &'a str,
    columns: Vec<ColumnRef>,
}

/// Write one JSON line per statement naming its table and predicate columns.
///
/// Lines are flushed as statements are read. INSERT statements report their
/// target table with no columns. Returns the number of lines written.
pub fn extract_columns<I, O>(input: I, config: &AuditConfig, mut out: O) -> AuditResult<u64>
where
    I: BufRead,
    O: Write,
{
    let statements = StatementReader::new(config.dialect, input);
    let result = write_extracted(statements, &mut out);
    out.flush()?;
    result
}

fn write_extracted<R: BufRead, O: Write>(
    statements: StatementReader<R>,
    out: &mut O,
) -> AuditResult<u64> {
    let mut written = 0;
    for stmt in statements {
        let line = match stmt? {
            Statement::Select(select) => ExtractedQuery {
                table: select.table(),
                columns: extract(select.predicate()),
            }
            .to_json()?,
            Statement::Insert(insert) => ExtractedQuery {
                table: insert.table(),
                columns: Vec::new(),
            }
            .to_json()?,
            other => return Err(AuditError::UnsupportedStatement(other.to_string())),
        };
        writeln!(out, "{line}")?;
        out.flush()?;
        written += 1;
    }
    Ok(written)
}

impl ExtractedQuery<'_> {
    fn to_json(&self) -> AuditResult<String> {
        serde_json::to_string(self).map_err(|err| AuditError::Io(io::Error::from(err)))
    }
}
