use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A canonical transaction. Negative amounts are money out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(default)]
    pub category: Option<String>,
}

impl Transaction {
    pub fn new(date: impl Into<String>, description: impl Into<String>, amount: f64) -> Self {
        Self {
            id: None,
            date: date.into(),
            description: description.into(),
            amount,
            category: None,
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.amount < 0.0
    }

    /// `YYYY-MM` prefix of the canonical date.
    pub fn month(&self) -> &str {
        self.date.get(..7).unwrap_or(&self.date)
    }
}

/// Which sign convention the source statement follows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatementType {
    #[default]
    Bank,
    Credit,
}

impl StatementType {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Bank => "bank",
            Self::Credit => "credit",
        }
    }
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StatementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "bank" => Ok(Self::Bank),
            "credit" => Ok(Self::Credit),
            other => Err(format!("unknown statement type '{other}' (expected bank or credit)")),
        }
    }
}

/// A named set of lowercase keyword substrings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub name: String,
    pub keywords: Vec<String>,
}

impl CategoryRule {
    pub fn new<I, S>(name: &str, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name: name.trim().to_lowercase(),
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    /// Build a rule from the store's comma-joined keyword column.
    pub fn from_stored(name: &str, keywords: &str) -> Self {
        Self::new(name, keywords.split(','))
    }

    pub fn joined_keywords(&self) -> String {
        self.keywords.join(",")
    }

    pub fn matches(&self, normalized_description: &str) -> bool {
        self.keywords
            .iter()
            .any(|k| normalized_description.contains(k.as_str()))
    }
}
