use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{info, warn};

use crate::columns::{infer_mapping, resolve_mapping, ColumnMapping};
use crate::error::{Result, SpendError};
use crate::extractor::{extract_rows, SkippedRow};
use crate::models::{StatementType, Transaction};
use crate::normalizer::{apply_sign_policy, classify_statement, clean, drop_income, SignPolicy};
use crate::table::{read_table, Table};

/// Everything one statement produced: canonical expenses plus an account of
/// what was left out and why.
#[derive(Debug, Clone, Serialize)]
pub struct ParsedStatement {
    pub transactions: Vec<Transaction>,
    pub skipped: Vec<SkippedRow>,
    pub mapping: ColumnMapping,
    pub policy: SignPolicy,
}

// ---------------------------------------------------------------------------
// Single statement
// ---------------------------------------------------------------------------

pub fn parse_table(
    table: &Table,
    mapping: Option<&ColumnMapping>,
    statement_type: StatementType,
) -> ParsedStatement {
    let mapping = resolve_mapping(mapping, &table.headers);
    let extraction = extract_rows(table, &mapping);
    let mut skipped = extraction.skipped;
    let mut candidates = extraction.accepted;

    let policy = classify_statement(statement_type, &candidates);
    apply_sign_policy(policy, &mut candidates);

    let (expenses, income) = drop_income(candidates);
    skipped.extend(income);
    skipped.sort_by_key(|s| s.row);

    let transactions = clean(expenses.into_iter().map(|c| c.into_transaction()).collect());

    ParsedStatement {
        transactions,
        skipped,
        mapping,
        policy,
    }
}

pub fn parse_statement(
    path: &Path,
    mapping: Option<&ColumnMapping>,
    statement_type: StatementType,
) -> Result<ParsedStatement> {
    let table = read_table(path)?;
    Ok(parse_table(&table, mapping, statement_type))
}

// ---------------------------------------------------------------------------
// Preview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct Preview {
    pub columns: Vec<String>,
    pub sample_rows: Vec<Vec<String>>,
    pub suggested_mapping: ColumnMapping,
}

/// Headers, the first `max_rows` rows and the inferred mapping, so a caller
/// can confirm or correct the columns before importing.
pub fn preview_statement(path: &Path, max_rows: usize) -> Result<Preview> {
    let table = read_table(path)?;
    Ok(Preview {
        suggested_mapping: infer_mapping(&table.headers),
        sample_rows: table.rows.iter().take(max_rows).cloned().collect(),
        columns: table.headers,
    })
}

// ---------------------------------------------------------------------------
// Batches
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub result: Result<ParsedStatement>,
}

impl FileOutcome {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[derive(Debug, Default)]
pub struct BatchImport {
    pub files: Vec<FileOutcome>,
}

impl BatchImport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&FileOutcome, &ParsedStatement)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().ok().map(|p| (f, p)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&FileOutcome, &SpendError)> {
        self.files
            .iter()
            .filter_map(|f| f.result.as_ref().err().map(|e| (f, e)))
    }

    pub fn transaction_count(&self) -> usize {
        self.succeeded().map(|(_, p)| p.transactions.len()).sum()
    }
}

fn import_one(path: &Path, mapping: Option<&ColumnMapping>, statement_type: StatementType) -> Result<ParsedStatement> {
    let parsed = parse_statement(path, mapping, statement_type)?;
    if parsed.transactions.is_empty() {
        return Err(SpendError::NoTransactions(path.display().to_string()));
    }
    Ok(parsed)
}

/// Run the pipeline over each file in turn. A failing file is recorded
/// and the rest still run.
pub fn import_files<P: AsRef<Path>>(
    paths: &[P],
    mapping: Option<&ColumnMapping>,
    statement_type: StatementType,
) -> BatchImport {
    let mut batch = BatchImport::default();
    for path in paths {
        let path = path.as_ref();
        let result = import_one(path, mapping, statement_type);
        match &result {
            Ok(parsed) => info!(
                file = %path.display(),
                transactions = parsed.transactions.len(),
                skipped = parsed.skipped.len(),
                policy = ?parsed.policy,
                "parsed statement"
            ),
            Err(e) => warn!(file = %path.display(), error = %e, "statement failed"),
        }
        batch.files.push(FileOutcome {
            path: path.to_path_buf(),
            result,
        });
    }
    batch
}
