use tracing::debug;

use crate::models::{CategoryRule, Transaction};

pub const INCOME: &str = "income";
pub const OTHER: &str = "other";

/// Built-in categories in match order.
const BUILTIN_RULES: &[(&str, &[&str])] = &[
    ("food", &["restaurant", "food", "grocery", "coffee", "bar", "dining", "market", "bazar", "bazaar"]),
    ("transport", &["gas", "uber", "lyft", "taxi", "subway", "bus", "parking", "toll"]),
    ("shopping", &["amazon", "walmart", "target", "costco", "store", "shop", "retail"]),
    ("entertainment", &["netflix", "spotify", "movie", "theater", "concert", "gaming"]),
    (
        "utilities",
        &[
            "utility", "electric", "gas", "water", "internet", "phone", "cable", "wireless", "mobile",
            "cell", "mint mobile", "coserv", "sewer", "trash",
        ],
    ),
    ("healthcare", &["pharmacy", "doctor", "hospital", "medical", "dental"]),
    ("housing", &["rent", "mortgage", "insurance", "property"]),
    ("education", &["tuition", "college", "university", "school", "529", "contribution", "student loan"]),
    ("subscriptions", &["subscription", "membership", "recurring", "linkedin", "adobe", "icloud"]),
    ("cash", &["atm", "cash", "withdrawal"]),
];

pub fn builtin_rules() -> Vec<CategoryRule> {
    BUILTIN_RULES
        .iter()
        .map(|(name, keywords)| CategoryRule::new(name, keywords.iter()))
        .collect()
}

fn normalize_description(description: &str) -> String {
    description.to_lowercase().replace('&', " ")
}

/// The ordered rule list one categorization pass consults.
///
/// User rules come first in the order supplied, followed by the built-ins.
/// A built-in whose name matches any user rule is left out entirely.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::with_custom(&[])
    }
}

impl RuleTable {
    pub fn with_custom(custom: &[CategoryRule]) -> Self {
        let builtins = builtin_rules()
            .into_iter()
            .filter(|b| !custom.iter().any(|c| c.name == b.name));
        let rules = custom.iter().cloned().chain(builtins).collect();
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Category for an expense description; `"other"` when nothing matches.
    pub fn classify(&self, description: &str) -> &str {
        let normalized = normalize_description(description);
        self.rules
            .iter()
            .find(|r| r.matches(&normalized))
            .map(|r| r.name.as_str())
            .unwrap_or(OTHER)
    }

    /// Category for a transaction: money in is always `"income"`.
    pub fn category_for(&self, txn: &Transaction) -> String {
        if txn.amount >= 0.0 {
            INCOME.to_string()
        } else {
            self.classify(&txn.description).to_string()
        }
    }
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub already_categorized: usize,
}

/// Assign a category to every transaction that lacks one. Existing
/// categories are never touched, so running this twice is a no-op.
pub fn categorize_transactions(rules: &RuleTable, transactions: &mut [Transaction]) -> CategorizeResult {
    let mut categorized = 0usize;
    let mut already_categorized = 0usize;

    for txn in transactions.iter_mut() {
        if txn.category.is_some() {
            already_categorized += 1;
            continue;
        }
        let category = rules.category_for(txn);
        debug!(description = %txn.description, %category, "categorized");
        txn.category = Some(category);
        categorized += 1;
    }

    CategorizeResult {
        categorized,
        already_categorized,
    }
}
