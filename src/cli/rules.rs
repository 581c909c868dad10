use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::db_path;
use crate::store;

pub fn add(pattern: &str, category: &str, account: &str, case_sensitive: bool) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let category = store::find_category(&conn, category)?;
    let account = store::find_account(&conn, account)?;
    store::create_rule(&conn, pattern, case_sensitive, category.id, account.id)?;
    println!("Added rule: \"{pattern}\" -> {} ({})", category.name, account.name);
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;

    let mut stmt = conn.prepare(
        "SELECT r.id, r.pattern, r.case_sensitive, c.name, a.name \
         FROM rules r \
         JOIN categories c ON r.category_id = c.id \
         JOIN accounts a ON r.account_id = a.id \
         ORDER BY r.id",
    )?;
    let rows: Vec<(i64, String, bool, String, String)> = stmt
        .query_map([], |row| {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Pattern", "Case", "Category", "Account"]);
    let total = rows.len();
    for (id, pattern, case_sensitive, category, account) in rows {
        table.add_row(vec![
            Cell::new(id),
            Cell::new(pattern),
            Cell::new(if case_sensitive { "exact" } else { "any" }),
            Cell::new(category),
            Cell::new(account),
        ]);
    }
    println!("Rules ({total})\n{table}");
    Ok(())
}
