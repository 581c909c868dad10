use std::path::Path;

use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS accounts (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    account_group TEXT NOT NULL DEFAULT '',
    created_at TEXT DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS transaction_files (
    id INTEGER PRIMARY KEY,
    filename TEXT NOT NULL,
    data BLOB NOT NULL,
    checksum TEXT NOT NULL,
    account_id INTEGER NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);

CREATE TABLE IF NOT EXISTS supercategories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS categories (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL,
    supercategory_id INTEGER,
    FOREIGN KEY (supercategory_id) REFERENCES supercategories(id)
);

CREATE TABLE IF NOT EXISTS transactions (
    id INTEGER PRIMARY KEY,
    init_date TEXT,
    post_date TEXT NOT NULL,
    description TEXT NOT NULL,
    amount REAL NOT NULL,
    verified_at TEXT,
    account_id INTEGER NOT NULL,
    category_id INTEGER,
    source_file_id INTEGER,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (account_id) REFERENCES accounts(id),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (source_file_id) REFERENCES transaction_files(id),
    UNIQUE (post_date, description, amount, account_id)
);

CREATE TABLE IF NOT EXISTS rules (
    id INTEGER PRIMARY KEY,
    pattern TEXT NOT NULL,
    case_sensitive INTEGER NOT NULL DEFAULT 0,
    category_id INTEGER NOT NULL,
    account_id INTEGER NOT NULL,
    created_at TEXT DEFAULT (datetime('now')),
    FOREIGN KEY (category_id) REFERENCES categories(id),
    FOREIGN KEY (account_id) REFERENCES accounts(id)
);
";

// (supercategory, category)
const DEFAULT_CATEGORIES: &[(&str, &str)] = &[
    ("Income", "Salary"),
    ("Income", "Interest"),
    ("Income", "Other Income"),
    ("Essentials", "Groceries"),
    ("Essentials", "Rent & Mortgage"),
    ("Essentials", "Utilities"),
    ("Essentials", "Insurance"),
    ("Essentials", "Medical"),
    ("Lifestyle", "Dining Out"),
    ("Lifestyle", "Entertainment"),
    ("Lifestyle", "Travel"),
    ("Lifestyle", "Shopping"),
    ("Lifestyle", "Subscriptions"),
    ("Transfers", "Credit Card Payment"),
    ("Transfers", "Savings Transfer"),
    ("Transfers", "Cash Withdrawal"),
];

pub fn get_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_db(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;

    let count: i64 = conn.query_row("SELECT count(*) FROM categories", [], |row| row.get(0))?;
    if count == 0 {
        for (supercategory, category) in DEFAULT_CATEGORIES {
            let super_id: Option<i64> = conn
                .query_row(
                    "SELECT id FROM supercategories WHERE name = ?1",
                    [supercategory],
                    |row| row.get(0),
                )
                .ok();
            let super_id = match super_id {
                Some(id) => id,
                None => {
                    conn.execute("INSERT INTO supercategories (name) VALUES (?1)", [supercategory])?;
                    conn.last_insert_rowid()
                }
            };
            conn.execute(
                "INSERT INTO categories (name, supercategory_id) VALUES (?1, ?2)",
                rusqlite::params![category, super_id],
            )?;
        }
    }
    Ok(())
}
