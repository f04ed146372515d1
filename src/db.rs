use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use tracing::info;

use crate::error::{Result, SpendError};
use crate::models::{CategoryRule, Transaction};

pub const DB_FILE: &str = "spendwise.db";

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    category TEXT,
    bank TEXT,
    source TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

CREATE TABLE IF NOT EXISTS category_rules (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    keywords TEXT NOT NULL,
    created_at TEXT DEFAULT (datetime('now'))
);
";

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    Ok(())
}

/// Open the database in `data_dir`, creating the schema if needed.
pub fn open(data_dir: &Path) -> Result<Connection> {
    std::fs::create_dir_all(data_dir)?;
    let conn = get_connection(&data_dir.join(DB_FILE))?;
    init_db(&conn)?;
    Ok(conn)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AddResult {
    pub received: usize,
    pub added: usize,
    pub skipped: usize,
}

fn already_stored(conn: &Connection, txn: &Transaction) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transactions WHERE date = ?1 AND description = ?2 AND (amount = ?3 OR amount = ?4)",
    )?;
    Ok(stmt.exists(params![txn.date, txn.description, txn.amount, -txn.amount])?)
}

/// Insert transactions, skipping any already stored with the same date,
/// description and magnitude.
pub fn add_transactions(
    conn: &Connection,
    transactions: &[Transaction],
    source: Option<&str>,
    bank: Option<&str>,
) -> Result<AddResult> {
    let mut result = AddResult {
        received: transactions.len(),
        ..Default::default()
    };

    for txn in transactions {
        let description = txn.description.trim();
        if txn.date.is_empty() || description.is_empty() {
            continue;
        }
        let txn = Transaction {
            description: description.to_string(),
            ..txn.clone()
        };
        if already_stored(conn, &txn)? {
            result.skipped += 1;
            continue;
        }
        conn.execute(
            "INSERT INTO transactions (date, description, amount, category, bank, source) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![txn.date, txn.description, txn.amount, txn.category, bank, source],
        )?;
        result.added += 1;
    }

    info!(added = result.added, skipped = result.skipped, "stored transactions");
    Ok(result)
}

pub fn list_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, date, description, amount, category FROM transactions ORDER BY date, id",
    )?;
    let rows = stmt
        .query_map([], |row| {
            Ok(Transaction {
                id: Some(row.get(0)?),
                date: row.get(1)?,
                description: row.get(2)?,
                amount: row.get(3)?,
                category: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn delete_transaction(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM transactions WHERE id = ?1", [id])?;
    Ok(n > 0)
}

pub fn clear_transactions(conn: &Connection) -> Result<usize> {
    Ok(conn.execute("DELETE FROM transactions", [])?)
}

/// Field edits for one stored transaction; `None` leaves a field alone.
/// An empty `category` clears the assignment.
#[derive(Debug, Clone, Default)]
pub struct TransactionUpdate {
    pub date: Option<String>,
    pub description: Option<String>,
    pub amount: Option<f64>,
    pub category: Option<String>,
}

pub fn update_transaction(conn: &Connection, id: i64, update: &TransactionUpdate) -> Result<()> {
    let mut fields: Vec<&str> = Vec::new();
    let mut values: Vec<rusqlite::types::Value> = Vec::new();

    if let Some(category) = &update.category {
        fields.push("category = ?");
        values.push(match category.trim() {
            "" => rusqlite::types::Value::Null,
            c => c.to_string().into(),
        });
    }
    if let Some(description) = &update.description {
        fields.push("description = ?");
        values.push(description.trim().to_string().into());
    }
    if let Some(amount) = update.amount {
        fields.push("amount = ?");
        values.push(amount.into());
    }
    if let Some(date) = &update.date {
        fields.push("date = ?");
        values.push(date.clone().into());
    }

    if fields.is_empty() {
        return Err(SpendError::Other("No fields to update".to_string()));
    }

    values.push(id.into());
    let sql = format!("UPDATE transactions SET {} WHERE id = ?", fields.join(", "));
    let n = conn.execute(&sql, rusqlite::params_from_iter(values))?;
    if n == 0 {
        return Err(SpendError::UnknownTransaction(id));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Category rules
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoredRule {
    pub id: i64,
    pub name: String,
    pub keywords: String,
}

impl StoredRule {
    pub fn to_rule(&self) -> CategoryRule {
        CategoryRule::from_stored(&self.name, &self.keywords)
    }
}

pub fn list_category_rules(conn: &Connection) -> Result<Vec<StoredRule>> {
    let mut stmt = conn.prepare("SELECT id, name, keywords FROM category_rules ORDER BY name")?;
    let rows = stmt
        .query_map([], |row| {
            Ok(StoredRule {
                id: row.get(0)?,
                name: row.get(1)?,
                keywords: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// User rules in the order the categorizer should try them.
pub fn load_rules(conn: &Connection) -> Result<Vec<CategoryRule>> {
    Ok(list_category_rules(conn)?.iter().map(StoredRule::to_rule).collect())
}

pub fn add_category_rule(conn: &Connection, name: &str, keywords: &[String]) -> Result<StoredRule> {
    let name = name.trim();
    let parsed = CategoryRule::new(name, keywords);
    if name.is_empty() || parsed.keywords.is_empty() {
        return Err(SpendError::InvalidRule("name and keywords are required".to_string()));
    }

    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM category_rules WHERE lower(name) = lower(?1)",
            [name],
            |r| r.get(0),
        )
        .optional()?;
    if existing.is_some() {
        return Err(SpendError::DuplicateRule(name.to_string()));
    }

    let joined = parsed.joined_keywords();
    conn.execute(
        "INSERT INTO category_rules (name, keywords) VALUES (?1, ?2)",
        params![name, joined],
    )?;
    Ok(StoredRule {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        keywords: joined,
    })
}

pub fn delete_category_rule(conn: &Connection, id: i64) -> Result<bool> {
    let n = conn.execute("DELETE FROM category_rules WHERE id = ?1", [id])?;
    Ok(n > 0)
}
