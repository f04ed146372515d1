use crate::db::{get_connection, DB_FILE};
use crate::error::Result;
use crate::settings::load_settings;

pub fn run() -> Result<()> {
    let settings = load_settings();
    let data_dir = std::path::PathBuf::from(&settings.data_dir);
    let db_path = data_dir.join(DB_FILE);

    println!("Data dir:        {}", data_dir.display());
    println!("Database:        {}", db_path.display());
    println!("Statement type:  {}", settings.statement_type);

    if db_path.exists() {
        let conn = get_connection(&db_path)?;
        let transactions: i64 = conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0))?;
        let uncategorized: i64 = conn.query_row(
            "SELECT count(*) FROM transactions WHERE category IS NULL",
            [],
            |r| r.get(0),
        )?;
        let rules: i64 = conn.query_row("SELECT count(*) FROM category_rules", [], |r| r.get(0))?;

        println!();
        println!("Transactions:    {transactions}");
        println!("Uncategorized:   {uncategorized}");
        println!("Custom rules:    {rules}");
    } else {
        println!();
        println!("Database not found. Run `spendwise init` to set up.");
    }

    Ok(())
}
