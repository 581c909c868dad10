use std::path::Path;

use crate::categorizer::categorize_transactions;
use crate::db::get_connection;
use crate::error::{Result, TallyError};
use crate::importer::import_statement;
use crate::settings::db_path;
use crate::store;

pub fn run(file: &str, account: &str, format: Option<&str>, json: bool) -> Result<()> {
    let path = Path::new(file);
    let data = std::fs::read(path)?;
    let filename = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(file)
        .to_string();

    let mut conn = get_connection(&db_path())?;
    let account = store::find_account(&conn, account)?;
    let summary = import_statement(&mut conn, account.id, &filename, &data, format)?;

    if json {
        let rendered = serde_json::to_string_pretty(&summary)
            .map_err(|e| TallyError::Settings(e.to_string()))?;
        println!("{rendered}");
        return Ok(());
    }

    if summary.duplicate_file {
        println!("This file has already been imported (duplicate checksum).");
        return Ok(());
    }

    println!(
        "{} parsed, {} imported, {} skipped (duplicates)",
        summary.parsed, summary.inserted, summary.skipped
    );

    let cat_result = categorize_transactions(&conn)?;
    if cat_result.categorized > 0 || cat_result.unmatched > 0 {
        println!(
            "{} categorized, {} uncategorized",
            cat_result.categorized, cat_result.unmatched
        );
    }

    Ok(())
}
