use crate::categorizer::categorize_transactions;
use crate::db::get_connection;
use crate::error::Result;
use crate::settings::db_path;

pub fn run() -> Result<()> {
    let conn = get_connection(&db_path())?;
    let result = categorize_transactions(&conn)?;
    println!(
        "{} categorized, {} still uncategorized",
        result.categorized, result.unmatched
    );
    Ok(())
}
