use comfy_table::{Cell, Table};

use crate::categorizer::RuleTable;
use crate::db::{add_category_rule, delete_category_rule, list_category_rules, StoredRule};
use crate::error::{Result, SpendError};

use super::{open_store, print_json};

pub fn list(json: bool) -> Result<()> {
    let conn = open_store()?;
    let rules = list_category_rules(&conn)?;
    if json {
        return print_json(&rules);
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Keywords"]);
    for rule in &rules {
        table.add_row(vec![Cell::new(rule.id), Cell::new(&rule.name), Cell::new(&rule.keywords)]);
    }
    println!("Custom Categories\n{table}");

    let custom: Vec<_> = rules.iter().map(StoredRule::to_rule).collect();
    let table = RuleTable::with_custom(&custom);
    let order: Vec<&str> = table.rules().iter().map(|r| r.name.as_str()).collect();
    println!("Match order: {}", order.join(", "));
    Ok(())
}

pub fn add(name: &str, keywords: &[String]) -> Result<()> {
    let conn = open_store()?;
    let rule = add_category_rule(&conn, name, keywords)?;
    println!("Added category {} [{}] with id {}", rule.name, rule.keywords, rule.id);
    Ok(())
}

pub fn delete(id: i64) -> Result<()> {
    let conn = open_store()?;
    if !delete_category_rule(&conn, id)? {
        return Err(SpendError::Other(format!("Category not found: {id}")));
    }
    println!("Deleted category {id}");
    Ok(())
}
