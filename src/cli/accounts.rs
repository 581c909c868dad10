use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::settings::db_path;
use crate::store;

pub fn add(name: &str, group: &str) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let account = store::create_account(&conn, name, group)?;
    println!("Added account: {} (id {})", account.name, account.id);
    Ok(())
}

pub fn list() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let accounts = store::list_accounts(&conn)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Name", "Group", "Transactions"]);
    for account in accounts {
        let count = store::count_transactions(&conn, account.id)?;
        table.add_row(vec![
            Cell::new(account.id),
            Cell::new(account.name),
            Cell::new(account.account_group),
            Cell::new(count),
        ]);
    }
    println!("Accounts\n{table}");
    Ok(())
}
