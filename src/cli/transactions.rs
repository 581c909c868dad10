use comfy_table::{Cell, Table};

use crate::db::get_connection;
use crate::error::Result;
use crate::fmt::{money, short_date};
use crate::settings::db_path;
use crate::store;

pub fn list(account: &str, page: u32, per_page: u32) -> Result<()> {
    let conn = get_connection(&db_path())?;
    let account = store::find_account(&conn, account)?;
    let transactions = store::list_transactions(&conn, account.id, page, per_page)?;
    let total = store::count_transactions(&conn, account.id)?;

    let mut table = Table::new();
    table.set_header(vec!["ID", "Posted", "Description", "Amount", "Verified"]);
    for txn in &transactions {
        table.add_row(vec![
            Cell::new(txn.id),
            Cell::new(short_date(txn.post_date)),
            Cell::new(&txn.description),
            Cell::new(money(txn.amount)),
            Cell::new(if txn.verified_at.is_some() { "yes" } else { "" }),
        ]);
    }
    println!(
        "{}: page {} ({} of {} transactions)",
        account.name,
        page,
        transactions.len(),
        total
    );
    println!("{table}");
    Ok(())
}
