//! Reports SELECT statements whose WHERE clause uses no indexed column.
//!
//! Statements are read from stdin (or `--input`) and checked against a CSV
//! list of `(table, column)` pairs. Unindexed statements are printed to stdout.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use catalog::IndexCatalog;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use common::prelude::*;
use tracing_subscriber::EnvFilter;

fn main() {
    init_tracing();
    if let Err(err) = run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let args = Args::parse();

    match args.command {
        Command::Check {
            index,
            input,
            summary,
            style,
        } => {
            let catalog = IndexCatalog::from_csv_path(&index)
                .with_context(|| format!("failed to load index list {}", index.display()))?;
            let statements = open_input(input.input.as_deref())?;
            let config = AuditConfig::builder()
                .dialect(input.dialect.into())
                .summary(summary)
                .summary_style(style.into())
                .build();

            let stats = coverage::audit(
                &catalog,
                statements,
                &config,
                io::stdout().lock(),
                io::stderr().lock(),
            )?;
            tracing::info!(
                statements = stats.total(),
                flagged = stats.flagged(),
                "audit finished"
            );
        }
        Command::Extract { input } => {
            let statements = open_input(input.input.as_deref())?;
            let config = AuditConfig::builder().dialect(input.dialect.into()).build();
            coverage::extract_columns(statements, &config, io::stdout().lock())?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Open the statement source; nothing is read until the audit pulls statements.
fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) => {
            let file = File::open(path)
                .with_context(|| format!("failed to open statements file {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(io::stdin().lock())),
    }
}

#[derive(Parser, Debug)]
#[command(name = "index-audit")]
#[command(about = "Find SELECT statements that no index can serve", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print statements whose predicate references no indexed column
    Check {
        /// CSV file of `table,column` pairs, one per indexed column
        #[arg(short, long)]
        index: PathBuf,
        #[command(flatten)]
        input: InputArgs,
        /// Write verdict counts to stderr after the last statement
        #[arg(long)]
        summary: bool,
        /// Style used for the summary table
        #[arg(long, value_enum, default_value_t = CliTableStyle::Modern)]
        style: CliTableStyle,
    },
    /// Print each statement's table and predicate columns as JSON lines
    Extract {
        #[command(flatten)]
        input: InputArgs,
    },
}

#[derive(ClapArgs, Debug)]
struct InputArgs {
    /// Read statements from this file instead of stdin
    #[arg(long)]
    input: Option<PathBuf>,
    /// SQL dialect used to parse statements
    #[arg(long, value_enum, default_value_t = CliDialect::Mysql)]
    dialect: CliDialect,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliDialect {
    Generic,
    Mysql,
    Postgres,
}

impl From<CliDialect> for SqlDialect {
    fn from(value: CliDialect) -> Self {
        match value {
            CliDialect::Generic => SqlDialect::Generic,
            CliDialect::Mysql => SqlDialect::MySql,
            CliDialect::Postgres => SqlDialect::PostgreSql,
        }
    }
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum CliTableStyle {
    Modern,
    Ascii,
    Plain,
}

impl From<CliTableStyle> for TableStyleKind {
    fn from(value: CliTableStyle) -> Self {
        match value {
            CliTableStyle::Modern => TableStyleKind::Modern,
            CliTableStyle::Ascii => TableStyleKind::Ascii,
            CliTableStyle::Plain => TableStyleKind::Plain,
        }
    }
}
