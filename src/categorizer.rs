use rusqlite::Connection;

use crate::error::Result;
use crate::models::Rule;
use crate::store;

fn matches(rule: &Rule, description: &str) -> bool {
    if rule.case_sensitive {
        description.contains(&rule.pattern)
    } else {
        description.to_uppercase().contains(&rule.pattern.to_uppercase())
    }
}

pub struct CategorizeResult {
    pub categorized: usize,
    pub unmatched: usize,
}

/// Assign categories to uncategorized transactions by substring rules.
/// Rules are per-account: a rule only ever touches transactions of the
/// account it was created for. First matching rule wins.
pub fn categorize_transactions(conn: &Connection) -> Result<CategorizeResult> {
    let rules = store::list_rules(conn)?;

    let mut txn_stmt = conn
        .prepare("SELECT id, description, account_id FROM transactions WHERE category_id IS NULL")?;
    let uncategorized: Vec<(i64, String, i64)> = txn_stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)))?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let mut categorized = 0usize;
    let mut unmatched = 0usize;

    for (txn_id, description, account_id) in &uncategorized {
        let hit = rules
            .iter()
            .find(|rule| rule.account_id == *account_id && matches(rule, description));
        match hit {
            Some(rule) => {
                conn.execute(
                    "UPDATE transactions SET category_id = ?1 WHERE id = ?2",
                    rusqlite::params![rule.category_id, txn_id],
                )?;
                categorized += 1;
            }
            None => unmatched += 1,
        }
    }

    Ok(CategorizeResult {
        categorized,
        unmatched,
    })
}
