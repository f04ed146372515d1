use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::categorizer::RuleTable;
use crate::db::{
    add_transactions, clear_transactions, delete_transaction, list_transactions, load_rules,
    update_transaction, TransactionUpdate,
};
use crate::error::{Result, SpendError};
use crate::fmt::money;
use crate::models::Transaction;
use crate::parse::{parse_amount, parse_date};

use super::{open_store, print_json};

pub fn list(json: bool) -> Result<()> {
    let conn = open_store()?;
    let txns = list_transactions(&conn)?;
    if json {
        return print_json(&txns);
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Date", "Description", "Category", "Amount"]);
    for t in &txns {
        let amount = if t.is_expense() {
            money(t.amount).red().to_string()
        } else {
            money(t.amount).green().to_string()
        };
        table.add_row(vec![
            Cell::new(t.id.unwrap_or_default()),
            Cell::new(&t.date),
            Cell::new(&t.description),
            Cell::new(t.category.as_deref().unwrap_or("")),
            Cell::new(amount),
        ]);
    }
    println!("Transactions ({})\n{table}", txns.len());
    Ok(())
}

pub fn add(date: &str, description: &str, amount: &str, category: Option<&str>) -> Result<()> {
    let conn = open_store()?;
    let mut txn = Transaction::new(parse_date(date)?, description.trim(), parse_amount(amount)?);
    txn.category = match category.map(str::trim) {
        Some(c) if !c.is_empty() => Some(c.to_string()),
        _ => {
            let rules = RuleTable::with_custom(&load_rules(&conn)?);
            Some(rules.category_for(&txn))
        }
    };

    let result = add_transactions(&conn, std::slice::from_ref(&txn), Some("manual"), None)?;
    if result.added == 0 {
        return Err(SpendError::Other(format!(
            "Not added: '{}' on {} already exists or is incomplete",
            txn.description, txn.date
        )));
    }
    println!(
        "Added {} {} ({})",
        txn.description,
        money(txn.amount),
        txn.category.as_deref().unwrap_or("")
    );
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_store()?;
    if !delete_transaction(&conn, id)? {
        return Err(SpendError::UnknownTransaction(id));
    }
    println!("Deleted transaction {id}");
    Ok(())
}

pub fn update(
    id: i64,
    date: Option<String>,
    description: Option<String>,
    amount: Option<String>,
    category: Option<String>,
) -> Result<()> {
    let conn = open_store()?;
    let update = TransactionUpdate {
        date: date.as_deref().map(parse_date).transpose()?,
        description,
        amount: amount.as_deref().map(parse_amount).transpose()?,
        category,
    };
    update_transaction(&conn, id, &update)?;
    println!("Updated transaction {id}");
    Ok(())
}

pub fn clear() -> Result<()> {
    let conn = open_store()?;
    let removed = clear_transactions(&conn)?;
    println!("Removed {removed} transactions");
    Ok(())
}
