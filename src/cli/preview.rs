use std::path::Path;

use comfy_table::{Cell, Table};

use crate::columns::Role;
use crate::error::Result;
use crate::importer::preview_statement;
use crate::settings::load_settings;

use super::print_json;

pub fn run(file: &Path, rows: Option<usize>, json: bool) -> Result<()> {
    let rows = rows.unwrap_or_else(|| load_settings().preview_rows);
    let preview = preview_statement(file, rows)?;

    if json {
        return print_json(&preview);
    }

    let mut table = Table::new();
    table.set_header(preview.columns.clone());
    for row in &preview.sample_rows {
        table.add_row(row.iter().map(Cell::new));
    }
    println!("{}\n{table}", file.display());

    let mut mapping = Table::new();
    mapping.set_header(vec!["Role", "Column"]);
    for role in Role::ALL {
        let column = preview.suggested_mapping.get(role).unwrap_or("-");
        mapping.add_row(vec![Cell::new(role), Cell::new(column)]);
    }
    println!("Suggested mapping\n{mapping}");
    Ok(())
}
