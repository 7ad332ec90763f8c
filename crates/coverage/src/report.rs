use std::{fmt, io::Write};

use common::{
    AuditResult,
    pretty::{self, TableStyleKind},
};
use tabled::Tabled;

use crate::check::Verdict;

/// Per-verdict statement counts for one run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportStats {
    pub covered: u64,
    pub uncovered: u64,
    pub unknown_table: u64,
}

impl ReportStats {
    pub fn total(&self) -> u64 {
        self.covered + self.uncovered + self.unknown_table
    }

    /// Statements written to the primary stream.
    pub fn flagged(&self) -> u64 {
        self.uncovered + self.unknown_table
    }

    fn record(&mut self, verdict: Verdict) {
        match verdict {
            Verdict::Covered => self.covered += 1,
            Verdict::Uncovered => self.uncovered += 1,
            Verdict::UnknownTable => self.unknown_table += 1,
        }
    }
}

#[derive(Clone, Tabled)]
struct SummaryRow {
    verdict: String,
    statements: u64,
}

/// Writes flagged statements to the primary stream and table diagnostics to
/// the diagnostic stream.
pub struct ReportEmitter<O, D> {
    out: O,
    diag: D,
    stats: ReportStats,
}

impl<O: Write, D: Write> ReportEmitter<O, D> {
    pub fn new(out: O, diag: D) -> Self {
        Self {
            out,
            diag,
            stats: ReportStats::default(),
        }
    }

    /// Report one statement. `query` renders the canonical statement text.
    pub fn emit(
        &mut self,
        query: &dyn fmt::Display,
        table: &str,
        verdict: Verdict,
    ) -> AuditResult<()> {
        self.stats.record(verdict);
        if !verdict.is_flagged() {
            return Ok(());
        }
        if verdict == Verdict::UnknownTable {
            writeln!(
                self.diag,
                "table '{table}' has no index information: {query}"
            )?;
        }
        writeln!(self.out, "{query}")?;
        Ok(())
    }

    /// Write the verdict counters as a table on the diagnostic stream.
    pub fn write_summary(&mut self, style: TableStyleKind) -> AuditResult<()> {
        let rows: Vec<SummaryRow> = [
            (Verdict::Covered, self.stats.covered),
            (Verdict::Uncovered, self.stats.uncovered),
            (Verdict::UnknownTable, self.stats.unknown_table),
        ]
        .into_iter()
        .map(|(verdict, statements)| SummaryRow {
            verdict: verdict.to_string(),
            statements,
        })
        .collect();
        writeln!(
            self.diag,
            "{}",
            pretty::render_structured_rows(&rows, style)
        )?;
        Ok(())
    }

    pub fn stats(&self) -> ReportStats {
        self.stats
    }

    pub fn flush(&mut self) -> AuditResult<()> {
        self.out.flush()?;
        self.diag.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> (O, D) {
        (self.out, self.diag)
    }
}
