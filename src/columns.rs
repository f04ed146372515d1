//! Column inference: which physical header holds each logical field.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

static HEADER_SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\s_-]+").expect("static regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Date,
    Description,
    Amount,
    Debit,
    Credit,
    Type,
}

impl Role {
    pub const ALL: [Role; 6] = [
        Role::Date,
        Role::Description,
        Role::Amount,
        Role::Debit,
        Role::Credit,
        Role::Type,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Debit => "debit",
            Self::Credit => "credit",
            Self::Type => "type",
        }
    }

    /// Candidate header names, most specific first.
    pub fn candidates(&self) -> &'static [&'static str] {
        match self {
            Self::Date => &[
                "date",
                "transaction date",
                "posting date",
                "posted date",
                "trans date",
                "transaction_date",
                "posting_date",
                "post date",
            ],
            Self::Description => &[
                "description",
                "details",
                "merchant",
                "payee",
                "name",
                "memo",
                "transaction",
                "transaction description",
            ],
            Self::Amount => &["amount", "amt", "value"],
            Self::Debit => &["debit", "withdrawal", "charge", "outflow"],
            Self::Credit => &["credit", "deposit", "payment", "inflow"],
            Self::Type => &["type", "transaction type", "trans type", "debit/credit"],
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Role::ALL
            .into_iter()
            .find(|r| r.key() == s)
            .ok_or_else(|| format!("unknown column role '{s}'"))
    }
}

/// Logical role → physical column name for one source table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMapping {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<String>,
    pub debit: Option<String>,
    pub credit: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

impl ColumnMapping {
    pub fn get(&self, role: Role) -> Option<&str> {
        let slot = match role {
            Role::Date => &self.date,
            Role::Description => &self.description,
            Role::Amount => &self.amount,
            Role::Debit => &self.debit,
            Role::Credit => &self.credit,
            Role::Type => &self.kind,
        };
        slot.as_deref().filter(|c| !c.is_empty())
    }

    pub fn set(&mut self, role: Role, column: Option<String>) {
        let column = column.filter(|c| !c.is_empty());
        match role {
            Role::Date => self.date = column,
            Role::Description => self.description = column,
            Role::Amount => self.amount = column,
            Role::Debit => self.debit = column,
            Role::Credit => self.credit = column,
            Role::Type => self.kind = column,
        }
    }

    /// Resolved `(role, column)` pairs in role order.
    pub fn resolved(&self) -> impl Iterator<Item = (Role, &str)> + '_ {
        Role::ALL
            .into_iter()
            .filter_map(move |r| self.get(r).map(|c| (r, c)))
    }

    pub fn is_empty(&self) -> bool {
        self.resolved().next().is_none()
    }

    /// Whether every column this mapping names exists in `headers`.
    pub fn fits(&self, headers: &[String]) -> bool {
        self.resolved()
            .all(|(_, col)| headers.iter().any(|h| h == col))
    }
}

pub fn normalize_header(header: &str) -> String {
    HEADER_SEPARATORS
        .replace_all(&header.trim().to_lowercase(), " ")
        .trim()
        .to_string()
}

/// Infer a mapping from header names. Unmatched roles stay unresolved.
pub fn infer_mapping(headers: &[String]) -> ColumnMapping {
    let normalized: Vec<(String, &String)> = headers
        .iter()
        .map(|h| (normalize_header(h), h))
        .collect();

    let mut mapping = ColumnMapping::default();
    for role in Role::ALL {
        mapping.set(role, find_match(&normalized, role.candidates()).cloned());
    }
    debug!(?mapping, "inferred column mapping");
    mapping
}

fn find_match<'a>(normalized: &[(String, &'a String)], candidates: &[&str]) -> Option<&'a String> {
    // Exact matches first, in candidate order
    for cand in candidates {
        if let Some((_, orig)) = normalized.iter().find(|(n, _)| n == cand) {
            return Some(orig);
        }
    }
    // Then the first header containing any candidate
    normalized
        .iter()
        .find(|(n, _)| candidates.iter().any(|c| n.contains(c)))
        .map(|(_, orig)| *orig)
}

/// Use `explicit` when it fits this table, otherwise infer from the headers.
///
/// A mapping saved for one file must never silently apply to a structurally
/// different one, so any missing column discards the whole explicit mapping.
pub fn resolve_mapping(explicit: Option<&ColumnMapping>, headers: &[String]) -> ColumnMapping {
    match explicit {
        Some(m) if !m.is_empty() && m.fits(headers) => {
            let mut honored = ColumnMapping::default();
            for (role, col) in m.resolved() {
                honored.set(role, Some(col.to_string()));
            }
            honored
        }
        Some(m) if !m.is_empty() => {
            warn!(?m, "column mapping does not match this file; inferring columns instead");
            infer_mapping(headers)
        }
        _ => infer_mapping(headers),
    }
}
