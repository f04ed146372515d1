use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categorizer::RuleTable;
use crate::db::{list_transactions, load_rules};
use crate::error::Result;
use crate::fmt::{money, percent};
use crate::reports::{analyze_expenses, Analysis, AnalysisOptions, Priority};
use crate::settings::load_settings;

use super::{open_store, print_json};

pub fn run(top: Option<usize>, json: bool) -> Result<()> {
    let conn = open_store()?;
    let options = AnalysisOptions {
        top_expenses: top.unwrap_or_else(|| load_settings().top_expenses),
    };
    let rules = RuleTable::with_custom(&load_rules(&conn)?);
    let mut txns = list_transactions(&conn)?;
    let analysis = analyze_expenses(&mut txns, &rules, &options);

    if json {
        return print_json(&analysis);
    }
    if txns.is_empty() {
        println!("No transactions stored. Run `spendwise import <file>` first.");
        return Ok(());
    }

    print_breakdown(&analysis);
    print_monthly(&analysis);
    print_top(&analysis);
    print_subscriptions(&analysis);
    print_recommendations(&analysis);
    Ok(())
}

fn print_breakdown(a: &Analysis) {
    let mut by_amount: Vec<(&String, &f64)> = a.category_breakdown.iter().collect();
    by_amount.sort_by(|x, y| y.1.total_cmp(x.1));

    let mut table = Table::new();
    table.set_header(vec!["Category", "Amount", "Share"]);
    for (category, amount) in by_amount {
        table.add_row(vec![
            Cell::new(category),
            Cell::new(money(*amount)),
            Cell::new(percent(*amount, a.total_expenses)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(money(a.total_expenses).bold()),
        Cell::new(""),
    ]);
    println!("Spending by Category\n{table}");
}

fn print_monthly(a: &Analysis) {
    let mut table = Table::new();
    table.set_header(vec!["Month", "Category", "Amount"]);
    for (month, categories) in &a.monthly_trends {
        for (category, amount) in categories {
            table.add_row(vec![Cell::new(month), Cell::new(category), Cell::new(money(*amount))]);
        }
    }
    println!("\nMonthly Trends\n{table}");
}

fn print_top(a: &Analysis) {
    let mut table = Table::new();
    table.set_header(vec!["Date", "Description", "Category", "Amount"]);
    for t in &a.top_expenses {
        table.add_row(vec![
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(t.category.as_deref().unwrap_or("")),
            Cell::new(money(t.amount.abs()).red()),
        ]);
    }
    println!("\nTop Expenses\n{table}");
}

fn print_subscriptions(a: &Analysis) {
    if a.subscription_analysis.is_empty() {
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Subscription", "Average", "Annual", "Charges"]);
    for (name, s) in &a.subscription_analysis {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(money(s.average_amount)),
            Cell::new(money(s.annual_cost)),
            Cell::new(s.frequency),
        ]);
    }
    println!("\nSubscriptions\n{table}");
}

fn print_recommendations(a: &Analysis) {
    if a.recommendations.is_empty() {
        println!("\nNo recommendations. Spending looks balanced.");
        return;
    }
    println!("\nRecommendations");
    for r in &a.recommendations {
        let tag = match r.priority {
            Priority::High => "HIGH".red().bold(),
            Priority::Medium => "MEDIUM".yellow().bold(),
        };
        println!(
            "  [{tag}] {} (save up to {})",
            r.message,
            money(r.potential_savings).green()
        );
    }
}
