//! Row extraction: one raw table row → one candidate expense, or a reason
//! the row was skipped.

use std::fmt;

use serde::Serialize;
use tracing::debug;

use crate::columns::{ColumnMapping, Role};
use crate::error::ParseError;
use crate::models::Transaction;
use crate::parse::{parse_amount, parse_date};
use crate::table::Table;

/// A transaction pulled from one row, before statement-wide sign
/// normalization and dedup.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub row: usize,
    pub date: String,
    pub description: String,
    pub amount: f64,
}

impl Candidate {
    pub fn into_transaction(self) -> Transaction {
        Transaction::new(self.date, self.description, self.amount)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum SkipReason {
    MissingDate,
    InvalidDate(String),
    InvalidAmount(String),
    NoAmount,
    Income,
}

impl From<ParseError> for SkipReason {
    fn from(e: ParseError) -> Self {
        match e {
            ParseError::InvalidDate(raw) => Self::InvalidDate(raw),
            other => Self::InvalidAmount(other.to_string()),
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDate => f.write_str("no date"),
            Self::InvalidDate(raw) => write!(f, "unparseable date {raw:?}"),
            Self::InvalidAmount(msg) => write!(f, "{msg}"),
            Self::NoAmount => f.write_str("no amount"),
            Self::Income => f.write_str("income or credit line"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedRow {
    pub row: usize,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, Default)]
pub struct Extraction {
    pub accepted: Vec<Candidate>,
    pub skipped: Vec<SkippedRow>,
}

// ---------------------------------------------------------------------------
// Amount resolution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Outflow,
    Inflow,
}

/// Candidate amount plus whatever the row told us about its direction,
/// threaded through the resolution steps in order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AmountResolution {
    pub amount: Option<f64>,
    pub direction: Option<Direction>,
}

/// The amount-bearing cells of one row; blank means absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct AmountCells<'a> {
    pub amount: &'a str,
    pub debit: &'a str,
    pub credit: &'a str,
    pub kind: &'a str,
}

fn parse_present(cell: &str) -> Result<Option<f64>, ParseError> {
    if cell.trim().is_empty() {
        Ok(None)
    } else {
        parse_amount(cell).map(Some)
    }
}

impl AmountResolution {
    /// Run every step in precedence order.
    pub fn resolve(cells: &AmountCells<'_>) -> Result<Self, ParseError> {
        let debit = parse_present(cells.debit)?;
        let credit = parse_present(cells.credit)?;
        let amount = parse_present(cells.amount)?;

        Ok(Self::default()
            .with_debit(debit)
            .with_credit(credit)
            .with_type(cells.kind)
            .with_amount_column(amount)
            .with_split_columns(debit, credit))
    }

    fn is_resolved(&self) -> bool {
        self.amount.is_some()
    }

    fn with_debit(self, debit: Option<f64>) -> Self {
        match debit {
            Some(v) if v != 0.0 => Self {
                amount: Some(-v.abs()),
                direction: Some(Direction::Outflow),
            },
            _ => self,
        }
    }

    fn with_credit(self, credit: Option<f64>) -> Self {
        match credit {
            Some(v) if v != 0.0 && !self.is_resolved() => Self {
                amount: Some(v.abs()),
                direction: Some(Direction::Inflow),
            },
            _ => self,
        }
    }

    fn with_type(self, kind: &str) -> Self {
        if self.is_resolved() || kind.trim().is_empty() {
            return self;
        }
        let kind = kind.to_lowercase();
        let direction = if kind.contains("credit") || kind.contains("deposit") {
            Some(Direction::Inflow)
        } else if kind.contains("debit") || kind.contains("withdrawal") {
            Some(Direction::Outflow)
        } else {
            self.direction
        };
        Self { direction, ..self }
    }

    /// A unified amount cell overrides any amount resolved so far.
    fn with_amount_column(self, amount: Option<f64>) -> Self {
        match amount {
            Some(v) => Self {
                amount: Some(v),
                ..self
            },
            None => self,
        }
    }

    fn with_split_columns(self, debit: Option<f64>, credit: Option<f64>) -> Self {
        if self.is_resolved() {
            return self;
        }
        let debit = debit.unwrap_or(0.0);
        let credit = credit.unwrap_or(0.0);
        if debit == 0.0 && credit == 0.0 {
            return self;
        }
        let direction = if credit != 0.0 && debit == 0.0 {
            Some(Direction::Inflow)
        } else {
            self.direction
        };
        Self {
            amount: Some(credit - debit),
            direction,
        }
    }

    /// The signed amount this row contributes, or why it contributes none.
    pub fn finish(self) -> Result<f64, SkipReason> {
        let amount = self.amount.ok_or(SkipReason::NoAmount)?;
        match self.direction {
            Some(Direction::Inflow) => Err(SkipReason::Income),
            Some(Direction::Outflow) => Ok(-amount.abs()),
            None => Ok(amount),
        }
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

pub fn extract_row(
    table: &Table,
    index: usize,
    row: &[String],
    mapping: &ColumnMapping,
) -> Result<Candidate, SkipReason> {
    let cell = |role: Role| table.cell(row, mapping.get(role));

    let date_raw = cell(Role::Date);
    if date_raw.trim().is_empty() {
        return Err(SkipReason::MissingDate);
    }
    let date = parse_date(date_raw)?;

    let cells = AmountCells {
        amount: cell(Role::Amount),
        debit: cell(Role::Debit),
        credit: cell(Role::Credit),
        kind: cell(Role::Type),
    };
    let amount = AmountResolution::resolve(&cells)?.finish()?;

    let description = match cell(Role::Description).trim() {
        "" => "Unknown".to_string(),
        d => d.to_string(),
    };

    Ok(Candidate {
        row: index,
        date,
        description,
        amount,
    })
}

/// Extract every row, keeping going past bad ones.
pub fn extract_rows(table: &Table, mapping: &ColumnMapping) -> Extraction {
    let mut out = Extraction::default();
    for (index, row) in table.rows.iter().enumerate() {
        match extract_row(table, index, row, mapping) {
            Ok(candidate) => out.accepted.push(candidate),
            Err(reason) => {
                debug!(row = index, %reason, "skipping row");
                out.skipped.push(SkippedRow { row: index, reason });
            }
        }
    }
    out
}
