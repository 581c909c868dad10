//! Storage boundary: accounts, uploaded statement files, and transactions.
//!
//! Every function takes an explicit `&Connection`; there is no process-wide
//! session. Batch inserts are expected to run inside a caller-owned sqlite
//! transaction so a statement import commits all-or-nothing.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use rusqlite::Connection;

use crate::error::{Result, TallyError};
use crate::models::{unique_key, Account, Category, NewTransaction, Rule, Transaction};

const DT_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn dt_to_sql(dt: NaiveDateTime) -> String {
    dt.format(DT_FORMAT).to_string()
}

fn dt_from_sql(idx: usize, raw: &str) -> rusqlite::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, DT_FORMAT).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

fn opt_dt_from_sql(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<NaiveDateTime>> {
    raw.map(|s| dt_from_sql(idx, &s)).transpose()
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

pub fn create_account(conn: &Connection, name: &str, group: &str) -> Result<Account> {
    conn.execute(
        "INSERT INTO accounts (name, account_group) VALUES (?1, ?2)",
        rusqlite::params![name, group],
    )?;
    Ok(Account {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        account_group: group.to_string(),
    })
}

pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let mut stmt = conn.prepare("SELECT id, name, account_group FROM accounts ORDER BY id")?;
    let accounts = stmt
        .query_map([], |row| {
            Ok(Account {
                id: row.get(0)?,
                name: row.get(1)?,
                account_group: row.get(2)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(accounts)
}

pub fn find_account(conn: &Connection, name: &str) -> Result<Account> {
    let mut stmt = conn.prepare("SELECT id, name, account_group FROM accounts WHERE name = ?1")?;
    stmt.query_row([name], |row| {
        Ok(Account {
            id: row.get(0)?,
            name: row.get(1)?,
            account_group: row.get(2)?,
        })
    })
    .map_err(|_| TallyError::UnknownAccount(name.to_string()))
}

pub fn account_exists(conn: &Connection, account_id: i64) -> Result<bool> {
    let mut stmt = conn.prepare_cached("SELECT 1 FROM accounts WHERE id = ?1")?;
    Ok(stmt.exists([account_id])?)
}

// ---------------------------------------------------------------------------
// Uploaded statement files
// ---------------------------------------------------------------------------

/// Persist one uploaded statement verbatim. File rows are an audit trail:
/// immutable after insert, never deleted, kept even when parsing later fails.
pub fn insert_file(
    conn: &Connection,
    filename: &str,
    data: &[u8],
    checksum: &str,
    account_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO transaction_files (filename, data, checksum, account_id) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![filename, data, checksum, account_id],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Checksum lookup is per account, like every other duplicate identity in
/// this system: the same statement imported into a different account is a
/// legitimate new upload.
pub fn file_exists_by_checksum(conn: &Connection, checksum: &str, account_id: i64) -> Result<bool> {
    let mut stmt = conn.prepare_cached(
        "SELECT 1 FROM transaction_files WHERE checksum = ?1 AND account_id = ?2",
    )?;
    Ok(stmt.exists(rusqlite::params![checksum, account_id])?)
}

// ---------------------------------------------------------------------------
// Transactions
// ---------------------------------------------------------------------------

/// Unique keys of the account's stored transactions with `post_date` inside
/// `[from, to]`. The batch being imported only needs keys in its own date
/// range to find cross-batch duplicates.
pub fn existing_unique_keys(
    conn: &Connection,
    account_id: i64,
    from: NaiveDateTime,
    to: NaiveDateTime,
) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare_cached(
        "SELECT post_date, description, amount FROM transactions \
         WHERE account_id = ?1 AND post_date >= ?2 AND post_date <= ?3",
    )?;
    let keys = stmt
        .query_map(
            rusqlite::params![account_id, dt_to_sql(from), dt_to_sql(to)],
            |row| {
                let raw: String = row.get(0)?;
                let post_date = dt_from_sql(0, &raw)?;
                let description: String = row.get(1)?;
                let amount: f64 = row.get(2)?;
                Ok(unique_key(post_date, &description, amount, account_id))
            },
        )?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(keys)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

/// Insert a batch of records. Run inside a sqlite transaction: a failure on
/// any row leaves nothing committed. A uniqueness violation (two imports
/// racing on the same rows) maps to `DuplicateConflict`, which callers treat
/// as a recoverable duplicate rather than a storage failure.
pub fn insert_batch(conn: &Connection, records: &[NewTransaction]) -> Result<usize> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO transactions (init_date, post_date, description, amount, account_id, source_file_id) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for record in records {
        stmt.execute(rusqlite::params![
            record.init_date.map(dt_to_sql),
            dt_to_sql(record.post_date),
            record.description,
            record.amount,
            record.account_id,
            record.source_file_id,
        ])
        .map_err(|e| {
            if is_unique_violation(&e) {
                TallyError::DuplicateConflict
            } else {
                TallyError::Db(e)
            }
        })?;
    }
    Ok(records.len())
}

/// Page through an account's transactions, newest posting first.
pub fn list_transactions(
    conn: &Connection,
    account_id: i64,
    page: u32,
    per_page: u32,
) -> Result<Vec<Transaction>> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, init_date, post_date, description, amount, verified_at, account_id, category_id, source_file_id \
         FROM transactions WHERE account_id = ?1 \
         ORDER BY post_date DESC, id DESC LIMIT ?2 OFFSET ?3",
    )?;
    let offset = i64::from(page) * i64::from(per_page);
    let transactions = stmt
        .query_map(rusqlite::params![account_id, per_page, offset], |row| {
            let init_raw: Option<String> = row.get(1)?;
            let post_raw: String = row.get(2)?;
            let verified_raw: Option<String> = row.get(5)?;
            Ok(Transaction {
                id: row.get(0)?,
                init_date: opt_dt_from_sql(1, init_raw)?,
                post_date: dt_from_sql(2, &post_raw)?,
                description: row.get(3)?,
                amount: row.get(4)?,
                verified_at: opt_dt_from_sql(5, verified_raw)?,
                account_id: row.get(6)?,
                category_id: row.get(7)?,
                source_file_id: row.get(8)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(transactions)
}

pub fn count_transactions(conn: &Connection, account_id: i64) -> Result<i64> {
    let mut stmt = conn.prepare_cached("SELECT count(*) FROM transactions WHERE account_id = ?1")?;
    Ok(stmt.query_row([account_id], |row| row.get(0))?)
}

// ---------------------------------------------------------------------------
// Categories and rules
// ---------------------------------------------------------------------------

pub fn find_category(conn: &Connection, name: &str) -> Result<Category> {
    let mut stmt =
        conn.prepare("SELECT id, name, supercategory_id FROM categories WHERE name = ?1")?;
    stmt.query_row([name], |row| {
        Ok(Category {
            id: row.get(0)?,
            name: row.get(1)?,
            supercategory_id: row.get(2)?,
        })
    })
    .map_err(|_| TallyError::UnknownCategory(name.to_string()))
}

pub fn create_rule(
    conn: &Connection,
    pattern: &str,
    case_sensitive: bool,
    category_id: i64,
    account_id: i64,
) -> Result<i64> {
    conn.execute(
        "INSERT INTO rules (pattern, case_sensitive, category_id, account_id) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![pattern, case_sensitive, category_id, account_id],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn list_rules(conn: &Connection) -> Result<Vec<Rule>> {
    let mut stmt = conn
        .prepare("SELECT id, pattern, case_sensitive, category_id, account_id FROM rules ORDER BY id")?;
    let rules = stmt
        .query_map([], |row| {
            Ok(Rule {
                id: row.get(0)?,
                pattern: row.get(1)?,
                case_sensitive: row.get(2)?,
                category_id: row.get(3)?,
                account_id: row.get(4)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rules)
}
