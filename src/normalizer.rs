//! Statement-wide sign normalization and candidate cleanup.
//!
//! Whether a positive number is a charge or a payment depends on the
//! statement as a whole, so this runs in two passes: classify the statement,
//! then apply the chosen policy to every candidate.

use std::collections::HashSet;

use serde::Serialize;

use crate::extractor::{Candidate, SkipReason, SkippedRow};
use crate::models::{StatementType, Transaction};

pub const CREDIT_KEYWORDS: &[&str] = &[
    "payment",
    "credit",
    "refund",
    "reversal",
    "chargeback",
    "return",
    "adjustment",
];

/// Amounts at or below this magnitude are rounding noise.
pub const MIN_MAGNITUDE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignPolicy {
    /// Caller said this is a card statement.
    ExplicitCredit,
    /// Negatives already present; signs are meaningful.
    TrustExisting,
    /// Every amount is non-negative; treat it like a card statement.
    InferredCredit,
}

impl SignPolicy {
    fn uses_keyword_heuristic(&self) -> bool {
        matches!(self, Self::ExplicitCredit | Self::InferredCredit)
    }
}

pub fn is_credit_line(description: &str) -> bool {
    let d = description.to_lowercase();
    CREDIT_KEYWORDS.iter().any(|k| d.contains(k))
}

/// Pass one: decide the sign policy for a whole statement.
pub fn classify_statement(statement_type: StatementType, candidates: &[Candidate]) -> SignPolicy {
    if statement_type == StatementType::Credit {
        return SignPolicy::ExplicitCredit;
    }
    if candidates.is_empty() || candidates.iter().any(|c| c.amount < 0.0) {
        SignPolicy::TrustExisting
    } else {
        SignPolicy::InferredCredit
    }
}

/// Pass two: rewrite amounts according to `policy`.
pub fn apply_sign_policy(policy: SignPolicy, candidates: &mut [Candidate]) {
    if !policy.uses_keyword_heuristic() {
        return;
    }
    for c in candidates.iter_mut() {
        c.amount = if is_credit_line(&c.description) {
            c.amount.abs()
        } else {
            -c.amount.abs()
        };
    }
}

/// Split off candidates that are money in; only expenses leave the pipeline.
pub fn drop_income(candidates: Vec<Candidate>) -> (Vec<Candidate>, Vec<SkippedRow>) {
    let (expenses, income): (Vec<_>, Vec<_>) = candidates.into_iter().partition(|c| c.amount < 0.0);
    let skipped = income
        .into_iter()
        .map(|c| SkippedRow {
            row: c.row,
            reason: SkipReason::Income,
        })
        .collect();
    (expenses, skipped)
}

/// Drop blank and noise rows, dedup on `(date, description, amount)` keeping
/// the first, and sort by date. The sort is stable.
pub fn clean(transactions: Vec<Transaction>) -> Vec<Transaction> {
    let mut seen = HashSet::new();
    let mut cleaned: Vec<Transaction> = transactions
        .into_iter()
        .filter(|t| !t.description.is_empty() && t.amount.abs() > MIN_MAGNITUDE)
        .filter(|t| seen.insert((t.date.clone(), t.description.clone(), t.amount.to_bits())))
        .collect();
    cleaned.sort_by(|a, b| a.date.cmp(&b.date));
    cleaned
}
