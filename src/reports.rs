use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::categorizer::{categorize_transactions, RuleTable, OTHER};
use crate::models::Transaction;

pub const DEFAULT_TOP_EXPENSES: usize = 10;

#[derive(Debug, Clone, Copy)]
pub struct AnalysisOptions {
    pub top_expenses: usize,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            top_expenses: DEFAULT_TOP_EXPENSES,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    ReduceFrequency,
    ReviewSubscriptions,
    FindAlternatives,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    #[serde(rename = "type")]
    pub kind: RecommendationKind,
    pub message: String,
    pub potential_savings: f64,
    pub priority: Priority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionSummary {
    pub average_amount: f64,
    pub annual_cost: f64,
    pub frequency: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Analysis {
    pub total_expenses: f64,
    pub category_breakdown: BTreeMap<String, f64>,
    pub monthly_trends: BTreeMap<String, BTreeMap<String, f64>>,
    pub recommendations: Vec<Recommendation>,
    pub top_expenses: Vec<Transaction>,
    pub subscription_analysis: BTreeMap<String, SubscriptionSummary>,
}

fn category_of(txn: &Transaction) -> &str {
    txn.category.as_deref().unwrap_or(OTHER)
}

fn expenses(transactions: &[Transaction]) -> impl Iterator<Item = &Transaction> {
    transactions.iter().filter(|t| t.is_expense())
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

pub fn total_expenses(transactions: &[Transaction]) -> f64 {
    expenses(transactions).map(|t| t.amount.abs()).sum()
}

pub fn category_breakdown(transactions: &[Transaction]) -> BTreeMap<String, f64> {
    let mut totals = BTreeMap::new();
    for t in expenses(transactions) {
        *totals.entry(category_of(t).to_string()).or_insert(0.0) += t.amount.abs();
    }
    totals
}

pub fn monthly_trends(transactions: &[Transaction]) -> BTreeMap<String, BTreeMap<String, f64>> {
    let mut months: BTreeMap<String, BTreeMap<String, f64>> = BTreeMap::new();
    for t in expenses(transactions) {
        *months
            .entry(t.month().to_string())
            .or_default()
            .entry(category_of(t).to_string())
            .or_insert(0.0) += t.amount.abs();
    }
    months
}

/// The `limit` largest expenses by magnitude; ties keep input order.
pub fn top_expenses(transactions: &[Transaction], limit: usize) -> Vec<Transaction> {
    let mut list: Vec<Transaction> = expenses(transactions).cloned().collect();
    list.sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs()));
    list.truncate(limit);
    list
}

pub fn subscription_analysis(transactions: &[Transaction]) -> BTreeMap<String, SubscriptionSummary> {
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for t in expenses(transactions) {
        if t.description.to_lowercase().contains("subscription") {
            groups.entry(t.description.as_str()).or_default().push(t.amount.abs());
        }
    }
    groups
        .into_iter()
        .map(|(description, amounts)| {
            let average_amount = amounts.iter().sum::<f64>() / amounts.len() as f64;
            (
                description.to_string(),
                SubscriptionSummary {
                    average_amount,
                    annual_cost: average_amount * 12.0,
                    frequency: amounts.len(),
                },
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Recommendations
// ---------------------------------------------------------------------------

fn recommend(category: &str, amount: f64, share: f64) -> Option<Recommendation> {
    let (kind, message, potential_savings, priority) = match category {
        "food" if share > 15.0 => (
            RecommendationKind::ReduceFrequency,
            format!("Food expenses are {share:.1}% of your budget. Consider cooking more meals at home."),
            amount * 0.2,
            if share > 20.0 { Priority::High } else { Priority::Medium },
        ),
        "subscriptions" if amount > 100.0 => (
            RecommendationKind::ReviewSubscriptions,
            format!("You spend ${amount:.2} on subscriptions. Review for unused services."),
            amount * 0.3,
            Priority::Medium,
        ),
        "entertainment" if share > 10.0 => (
            RecommendationKind::FindAlternatives,
            "Entertainment costs are high. Look for free or cheaper alternatives.".to_string(),
            amount * 0.25,
            Priority::Medium,
        ),
        _ => return None,
    };
    Some(Recommendation {
        category: category.to_string(),
        kind,
        message,
        potential_savings,
        priority,
    })
}

/// Advice per category, largest potential savings first.
pub fn generate_recommendations(breakdown: &BTreeMap<String, f64>, total_expenses: f64) -> Vec<Recommendation> {
    let mut recs: Vec<Recommendation> = breakdown
        .iter()
        .filter_map(|(category, &amount)| {
            let share = if total_expenses > 0.0 {
                amount / total_expenses * 100.0
            } else {
                0.0
            };
            recommend(category, amount, share)
        })
        .collect();
    recs.sort_by(|a, b| b.potential_savings.total_cmp(&a.potential_savings));
    recs
}

// ---------------------------------------------------------------------------
// Entry points
// ---------------------------------------------------------------------------

/// Summarize an already-categorized transaction list.
pub fn analyze(transactions: &[Transaction], options: &AnalysisOptions) -> Analysis {
    let total = total_expenses(transactions);
    let breakdown = category_breakdown(transactions);
    Analysis {
        total_expenses: total,
        recommendations: generate_recommendations(&breakdown, total),
        category_breakdown: breakdown,
        monthly_trends: monthly_trends(transactions),
        top_expenses: top_expenses(transactions, options.top_expenses),
        subscription_analysis: subscription_analysis(transactions),
    }
}

/// Categorize whatever lacks a category, then summarize.
pub fn analyze_expenses(
    transactions: &mut [Transaction],
    rules: &RuleTable,
    options: &AnalysisOptions,
) -> Analysis {
    categorize_transactions(rules, transactions);
    analyze(transactions, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn txn(date: &str, description: &str, amount: f64, category: &str) -> Transaction {
        Transaction::new(date, description, amount).with_category(category)
    }

    fn sample() -> Vec<Transaction> {
        vec![
            txn("2024-01-03", "Grocery Outlet", -120.0, "food"),
            txn("2024-01-10", "Paycheck", 2500.0, "income"),
            txn("2024-01-15", "Netflix Subscription", -15.0, "entertainment"),
            txn("2024-02-01", "Rent", -1000.0, "housing"),
            txn("2024-02-15", "Netflix Subscription", -17.0, "entertainment"),
            txn("2024-02-20", "Cafe", -120.0, "food"),
        ]
    }

    #[test]
    fn test_totals_exclude_income() {
        let txns = sample();
        assert_eq!(total_expenses(&txns), 1272.0);
        let breakdown = category_breakdown(&txns);
        assert_eq!(breakdown.get("food"), Some(&240.0));
        assert_eq!(breakdown.get("entertainment"), Some(&32.0));
        assert!(!breakdown.contains_key("income"));
    }

    #[test]
    fn test_monthly_trends() {
        let trends = monthly_trends(&sample());
        assert_eq!(trends.len(), 2);
        assert_eq!(trends["2024-01"]["food"], 120.0);
        assert_eq!(trends["2024-01"]["entertainment"], 15.0);
        assert_eq!(trends["2024-02"]["housing"], 1000.0);
        assert!(!trends["2024-01"].contains_key("income"));
    }

    #[test]
    fn test_top_expenses_stable_descending() {
        let top = top_expenses(&sample(), 3);
        let descs: Vec<&str> = top.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descs, vec!["Rent", "Grocery Outlet", "Cafe"]);
        assert_eq!(top_expenses(&sample(), 100).len(), 5);
    }

    #[test]
    fn test_subscription_groups() {
        let subs = subscription_analysis(&sample());
        assert_eq!(subs.len(), 1);
        let netflix = &subs["Netflix Subscription"];
        assert_eq!(netflix.frequency, 2);
        assert_eq!(netflix.average_amount, 16.0);
        assert_eq!(netflix.annual_cost, 192.0);
    }

    #[test]
    fn test_food_recommendation_high_priority() {
        let breakdown = BTreeMap::from([("food".to_string(), 300.0), ("other".to_string(), 700.0)]);
        let recs = generate_recommendations(&breakdown, 1000.0);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].category, "food");
        assert_eq!(recs[0].priority, Priority::High);
        assert_eq!(recs[0].potential_savings, 60.0);
        assert_eq!(recs[0].kind, RecommendationKind::ReduceFrequency);
    }

    #[test]
    fn test_food_recommendation_medium_priority() {
        let breakdown = BTreeMap::from([("food".to_string(), 180.0), ("other".to_string(), 820.0)]);
        let recs = generate_recommendations(&breakdown, 1000.0);
        assert_eq!(recs[0].priority, Priority::Medium);
    }

    #[test]
    fn test_recommendations_sorted_by_savings() {
        let breakdown = BTreeMap::from([
            ("entertainment".to_string(), 400.0),
            ("food".to_string(), 200.0),
            ("subscriptions".to_string(), 150.0),
            ("housing".to_string(), 250.0),
        ]);
        let recs = generate_recommendations(&breakdown, 1000.0);
        let cats: Vec<&str> = recs.iter().map(|r| r.category.as_str()).collect();
        assert_eq!(cats, vec!["entertainment", "subscriptions", "food"]);
    }

    #[test]
    fn test_zero_total_is_guarded() {
        let breakdown = BTreeMap::from([("food".to_string(), 0.0)]);
        assert!(generate_recommendations(&breakdown, 0.0).is_empty());
        let empty = analyze(&[], &AnalysisOptions::default());
        assert_eq!(empty.total_expenses, 0.0);
        assert!(empty.recommendations.is_empty());
    }

    #[test]
    fn test_analyze_expenses_categorizes_first() {
        let mut txns = vec![
            Transaction::new("2024-03-01", "Corner Coffee", -40.0),
            Transaction::new("2024-03-02", "Adobe Subscription", -60.0),
        ];
        let analysis = analyze_expenses(&mut txns, &RuleTable::default(), &AnalysisOptions::default());
        assert_eq!(analysis.category_breakdown["food"], 40.0);
        assert_eq!(analysis.category_breakdown["subscriptions"], 60.0);
        assert_eq!(txns[0].category.as_deref(), Some("food"));
        // food is 40% of spend
        assert_eq!(analysis.recommendations.len(), 1);
        assert_eq!(analysis.recommendations[0].potential_savings, 8.0);
    }
}
