use std::path::PathBuf;

use colored::Colorize;
use rusqlite::Connection;
use serde::Serialize;
use tracing::warn;

use crate::categorizer::{categorize_transactions, RuleTable};
use crate::columns::Role;
use crate::db::{add_transactions, load_rules, AddResult};
use crate::error::{Result, SpendError};
use crate::importer::{import_files, FileOutcome};
use crate::models::StatementType;
use crate::settings::load_settings;

use super::{mapping_from_args, open_store, print_json};

#[derive(Serialize)]
struct FileReport {
    file: String,
    transactions: usize,
    categorized: usize,
    skipped_rows: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    stored: Option<AddResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl FileReport {
    fn failed(file: String, error: String) -> Self {
        Self {
            file,
            transactions: 0,
            categorized: 0,
            skipped_rows: 0,
            stored: None,
            error: Some(error),
        }
    }
}

/// Categorize and store one file's transactions. A store failure is
/// recorded against the file so the rest of the batch still runs.
fn report_for(outcome: &FileOutcome, rules: &RuleTable, store: Option<&Connection>, bank: Option<&str>) -> FileReport {
    let file = outcome.file_name();
    let parsed = match &outcome.result {
        Ok(parsed) => parsed,
        Err(e) => return FileReport::failed(file, e.to_string()),
    };

    let mut txns = parsed.transactions.clone();
    let categorize = categorize_transactions(rules, &mut txns);
    let stored = match store.map(|conn| add_transactions(conn, &txns, Some(file.as_str()), bank)) {
        Some(Ok(result)) => Some(result),
        Some(Err(e)) => {
            warn!(file = %file, error = %e, "failed to store transactions");
            return FileReport::failed(file, e.to_string());
        }
        None => None,
    };

    FileReport {
        file,
        transactions: txns.len(),
        categorized: categorize.categorized,
        skipped_rows: parsed.skipped.len(),
        stored,
        error: None,
    }
}

pub fn run(
    files: &[PathBuf],
    statement_type: Option<StatementType>,
    map: &[(Role, String)],
    bank: Option<&str>,
    dry_run: bool,
    json: bool,
) -> Result<()> {
    let statement_type = statement_type.unwrap_or_else(|| load_settings().statement_type);
    let mapping = mapping_from_args(map);
    let batch = import_files(files, mapping.as_ref(), statement_type);

    let store = if dry_run { None } else { Some(open_store()?) };
    let rules = match &store {
        Some(conn) => RuleTable::with_custom(&load_rules(conn)?),
        None => RuleTable::default(),
    };

    let reports: Vec<FileReport> = batch
        .files
        .iter()
        .map(|outcome| report_for(outcome, &rules, store.as_ref(), bank))
        .collect();

    if json {
        print_json(&reports)?;
    } else {
        for r in &reports {
            match (&r.error, &r.stored) {
                (Some(err), _) => println!("{}: {}", r.file, err.red()),
                (None, Some(s)) => println!(
                    "{}: {} added, {} skipped (duplicates), {} rows ignored, {} categorized",
                    r.file, s.added, s.skipped, r.skipped_rows, r.categorized
                ),
                (None, None) => println!(
                    "{}: {} transactions, {} rows ignored, {} categorized (dry run)",
                    r.file, r.transactions, r.skipped_rows, r.categorized
                ),
            }
        }
    }

    if reports.iter().all(|r| r.error.is_some()) {
        return Err(SpendError::Other("No file produced any transactions".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use crate::importer::parse_table;
    use crate::table::Table;

    fn outcome(name: &str) -> FileOutcome {
        let table = Table::new(
            vec!["Date".into(), "Description".into(), "Amount".into()],
            vec![vec!["2024-01-05".into(), "Corner Coffee".into(), "-4.50".into()]],
        );
        FileOutcome {
            path: PathBuf::from(name),
            result: Ok(parse_table(&table, None, StatementType::Bank)),
        }
    }

    #[test]
    fn test_report_stores_and_categorizes() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open(dir.path()).unwrap();
        let report = report_for(&outcome("a.csv"), &RuleTable::default(), Some(&conn), None);
        assert!(report.error.is_none());
        assert_eq!(report.categorized, 1);
        assert_eq!(report.stored.unwrap().added, 1);
        assert_eq!(db::list_transactions(&conn).unwrap()[0].category.as_deref(), Some("food"));
    }

    #[test]
    fn test_store_failure_is_recorded_per_file() {
        let dir = tempfile::tempdir().unwrap();
        let conn = db::open(dir.path()).unwrap();
        conn.execute_batch("DROP TABLE transactions").unwrap();

        let reports: Vec<FileReport> = [outcome("a.csv"), outcome("b.csv")]
            .iter()
            .map(|o| report_for(o, &RuleTable::default(), Some(&conn), None))
            .collect();
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|r| r.error.is_some() && r.stored.is_none()));
        assert_eq!(reports[1].file, "b.csv");
    }

    #[test]
    fn test_dry_run_report_stores_nothing() {
        let report = report_for(&outcome("a.csv"), &RuleTable::default(), None, None);
        assert!(report.stored.is_none());
        assert_eq!(report.transactions, 1);
    }
}
