pub mod analyze;
pub mod categories;
pub mod import;
pub mod init;
pub mod preview;
pub mod status;
pub mod transactions;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rusqlite::Connection;
use serde::Serialize;

use crate::columns::{ColumnMapping, Role};
use crate::db;
use crate::error::Result;
use crate::models::StatementType;
use crate::settings::get_data_dir;

pub(crate) fn open_store() -> Result<Connection> {
    db::open(&get_data_dir())
}

pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Parse one `--map role=column` argument.
fn parse_map_entry(s: &str) -> std::result::Result<(Role, String), String> {
    let (role, column) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ROLE=COLUMN, got '{s}'"))?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("no column given for '{}'", role.trim()));
    }
    Ok((role.parse()?, column.to_string()))
}

pub(crate) fn mapping_from_args(entries: &[(Role, String)]) -> Option<ColumnMapping> {
    if entries.is_empty() {
        return None;
    }
    let mut mapping = ColumnMapping::default();
    for (role, column) in entries {
        mapping.set(*role, Some(column.clone()));
    }
    Some(mapping)
}

#[derive(Parser)]
#[command(name = "spendwise", about = "Import bank and card statements, categorize spending, find savings.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Choose a data directory and initialize the database.
    Init {
        /// Path for spendwise data (default: ~/Documents/spendwise)
        #[arg(long = "data-dir")]
        data_dir: Option<String>,
    },
    /// Show a statement's columns, first rows and suggested column mapping.
    Preview {
        /// Path to a CSV, TSV, TXT, XLSX or XLS statement
        file: PathBuf,
        /// Number of rows to show (default from settings)
        #[arg(long)]
        rows: Option<usize>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Import one or more statements and store their expenses.
    Import {
        /// Statement files
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Sign convention: bank or credit (default from settings)
        #[arg(long = "statement-type")]
        statement_type: Option<StatementType>,
        /// Column override, e.g. --map date="Posted Date"
        #[arg(long, value_name = "ROLE=COLUMN", value_parser = parse_map_entry)]
        map: Vec<(Role, String)>,
        /// Bank or card name to store alongside the transactions
        #[arg(long)]
        bank: Option<String>,
        /// Parse and report without storing anything
        #[arg(long = "dry-run")]
        dry_run: bool,
        /// Print JSON instead of a summary
        #[arg(long)]
        json: bool,
    },
    /// Categorize stored transactions and summarize spending.
    Analyze {
        /// Number of top expenses to list (default from settings)
        #[arg(long)]
        top: Option<usize>,
        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },
    /// Manage stored transactions.
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommands,
    },
    /// Manage custom categories.
    Categories {
        #[command(subcommand)]
        command: CategoriesCommands,
    },
    /// Show current data directory and summary statistics.
    Status,
}

#[derive(Subcommand)]
pub enum TransactionsCommands {
    /// List stored transactions.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a transaction by hand.
    Add {
        /// Date, e.g. 2024-03-07 or 03/07/2024
        date: String,
        description: String,
        /// Amount; negative for money out
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Category (default: categorized by rules)
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete a transaction by ID.
    Delete { id: i64 },
    /// Edit fields of a stored transaction.
    Update {
        id: i64,
        #[arg(long)]
        date: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, allow_hyphen_values = true)]
        amount: Option<String>,
        /// New category; pass an empty string to clear it
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete every stored transaction.
    Clear,
}

#[derive(Subcommand)]
pub enum CategoriesCommands {
    /// List custom categories.
    List {
        #[arg(long)]
        json: bool,
    },
    /// Add a custom category.
    Add {
        /// Category name
        name: String,
        /// Comma-separated keywords matched against descriptions
        #[arg(long, value_delimiter = ',', required = true)]
        keywords: Vec<String>,
    },
    /// Delete a custom category by ID.
    Delete { id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_map_entry() {
        assert_eq!(
            parse_map_entry("date=Posted Date").unwrap(),
            (Role::Date, "Posted Date".to_string())
        );
        assert_eq!(parse_map_entry("Type=Kind").unwrap().0, Role::Type);
        assert!(parse_map_entry("date").is_err());
        assert!(parse_map_entry("date=").is_err());
        assert!(parse_map_entry("balance=Bal").is_err());
    }

    #[test]
    fn test_mapping_from_args() {
        assert_eq!(mapping_from_args(&[]), None);
        let m = mapping_from_args(&[(Role::Debit, "Out".to_string())]).unwrap();
        assert_eq!(m.debit.as_deref(), Some("Out"));
        assert_eq!(m.date, None);
    }

    #[test]
    fn test_cli_parses_import() {
        let cli = Cli::try_parse_from([
            "spendwise",
            "import",
            "a.csv",
            "b.xlsx",
            "--statement-type",
            "credit",
            "--map",
            "amount=Charge",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Import {
                files,
                statement_type,
                map,
                dry_run,
                ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(statement_type, Some(StatementType::Credit));
                assert_eq!(map, vec![(Role::Amount, "Charge".to_string())]);
                assert!(dry_run);
            }
            _ => panic!("expected import"),
        }
    }
}
