//! Statement import orchestration: persist the uploaded file, parse it,
//! stamp ownership, resolve duplicates, and commit the surviving rows in one
//! all-or-nothing transaction.

use rusqlite::Connection;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{Result, TallyError};
use crate::formats::{self, StatementFormat};
use crate::models::NewTransaction;
use crate::parser::parse_statement;
use crate::store;

/// Outcome of one import call. Serializable so the consuming layer can hand
/// it back as JSON.
#[derive(Debug, Serialize)]
pub struct ImportSummary {
    pub parsed: usize,
    pub inserted: usize,
    pub skipped: usize,
    /// The exact same file bytes were already uploaded to this account;
    /// nothing was parsed.
    pub duplicate_file: bool,
}

impl ImportSummary {
    fn duplicate_file() -> Self {
        Self {
            parsed: 0,
            inserted: 0,
            skipped: 0,
            duplicate_file: true,
        }
    }
}

fn compute_checksum(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Import a raw statement into `account_id`.
///
/// The file row commits on its own before parsing starts: an upload is an
/// audit artifact worth keeping even when its contents turn out to be
/// malformed. Everything downstream of parsing (stamping, duplicate
/// resolution, row inserts) commits atomically or not at all.
///
/// Duplicate policy: within a batch the first occurrence of a unique key
/// wins and later ones count as skipped; across batches, keys already stored
/// for the account inside the batch's date range are skipped. A uniqueness
/// violation that still surfaces at commit (a racing import) rolls the
/// batch back and reports it as skipped duplicates.
pub fn import_statement(
    conn: &mut Connection,
    account_id: i64,
    filename: &str,
    data: &[u8],
    format: Option<&str>,
) -> Result<ImportSummary> {
    if !store::account_exists(conn, account_id)? {
        return Err(TallyError::UnknownAccount(account_id.to_string()));
    }

    let checksum = compute_checksum(data);
    if store::file_exists_by_checksum(conn, &checksum, account_id)? {
        return Ok(ImportSummary::duplicate_file());
    }

    let format = resolve_format(data, format)?;
    let file_id = store::insert_file(conn, filename, data, &checksum, account_id)?;

    let batch = parse_statement(data, format)?;
    let parsed = batch.len();
    if batch.is_empty() {
        // Header-only statement: a valid, no-op import.
        return Ok(ImportSummary {
            parsed: 0,
            inserted: 0,
            skipped: 0,
            duplicate_file: false,
        });
    }

    let stamped: Vec<NewTransaction> = batch
        .into_iter()
        .map(|row| NewTransaction::from_parsed(row, account_id, file_id))
        .collect();

    let mut from = stamped[0].post_date;
    let mut to = stamped[0].post_date;
    for record in &stamped {
        from = from.min(record.post_date);
        to = to.max(record.post_date);
    }
    let mut seen = store::existing_unique_keys(conn, account_id, from, to)?;

    let mut survivors = Vec::with_capacity(stamped.len());
    let mut skipped = 0usize;
    for record in stamped {
        if seen.insert(record.unique_key()) {
            survivors.push(record);
        } else {
            skipped += 1;
        }
    }

    commit_survivors(conn, parsed, skipped, &survivors)
}

/// Commit the post-dedup batch all-or-nothing. A uniqueness violation here
/// means a racing import stored matching rows after the key scan; the batch
/// rolls back and the collision is reported as duplicates, not a failure.
fn commit_survivors(
    conn: &mut Connection,
    parsed: usize,
    skipped: usize,
    survivors: &[NewTransaction],
) -> Result<ImportSummary> {
    let tx = conn.transaction()?;
    match store::insert_batch(&tx, survivors) {
        Ok(inserted) => {
            tx.commit()?;
            Ok(ImportSummary {
                parsed,
                inserted,
                skipped,
                duplicate_file: false,
            })
        }
        Err(TallyError::DuplicateConflict) => Ok(ImportSummary {
            parsed,
            inserted: 0,
            skipped: parsed,
            duplicate_file: false,
        }),
        Err(e) => Err(e),
    }
}

fn resolve_format(data: &[u8], key: Option<&str>) -> Result<StatementFormat> {
    match key {
        Some(key) => formats::by_key(key).ok_or_else(|| TallyError::UnknownFormat(key.to_string())),
        None => formats::detect_format(data).ok_or(TallyError::NoFormatDetected),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{get_connection, init_db};

    fn test_db() -> (tempfile::TempDir, Connection) {
        let dir = tempfile::tempdir().unwrap();
        let conn = get_connection(&dir.path().join("test.db")).unwrap();
        init_db(&conn).unwrap();
        (dir, conn)
    }

    fn add_account(conn: &Connection) -> i64 {
        store::create_account(conn, "Checking", "Bank").unwrap().id
    }

    fn txn_count(conn: &Connection) -> i64 {
        conn.query_row("SELECT count(*) FROM transactions", [], |r| r.get(0)).unwrap()
    }

    const STATEMENT: &[u8] = b"Date,Description,Amount\n\
        2024-01-01,Coffee Shop,-4.50\n\
        2024-01-02,Paycheck,2000.00\n\
        2024-01-01,Coffee Shop,-4.50\n";

    #[test]
    fn test_import_skips_intra_batch_duplicate() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        let summary =
            import_statement(&mut conn, account_id, "stmt.csv", STATEMENT, Some("generic")).unwrap();
        assert_eq!(summary.parsed, 3);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped, 1);
        assert!(!summary.duplicate_file);
        assert_eq!(txn_count(&conn), 2);
    }

    #[test]
    fn test_reimport_same_file_short_circuits() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        import_statement(&mut conn, account_id, "stmt.csv", STATEMENT, Some("generic")).unwrap();
        let second =
            import_statement(&mut conn, account_id, "stmt.csv", STATEMENT, Some("generic")).unwrap();
        assert!(second.duplicate_file);
        assert_eq!(second.inserted, 0);
        assert_eq!(txn_count(&conn), 2);
    }

    #[test]
    fn test_cross_batch_duplicates_are_skipped() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        import_statement(&mut conn, account_id, "jan.csv", STATEMENT, Some("generic")).unwrap();
        // Byte-different file re-stating one stored row plus one new row.
        let overlap = b"Date,Description,Amount\n\
            2024-01-02,Paycheck,2000.00\n\
            2024-01-03,Bookstore,-15.00\n";
        let summary =
            import_statement(&mut conn, account_id, "feb.csv", overlap, Some("generic")).unwrap();
        assert_eq!(summary.parsed, 2);
        assert_eq!(summary.inserted, 1);
        assert_eq!(summary.skipped, 1);
        assert_eq!(txn_count(&conn), 3);
    }

    #[test]
    fn test_identical_bytes_into_second_account_still_import() {
        let (_dir, mut conn) = test_db();
        let first = add_account(&conn);
        let second = store::create_account(&conn, "Savings", "Bank").unwrap().id;
        import_statement(&mut conn, first, "stmt.csv", STATEMENT, Some("generic")).unwrap();
        // Byte-for-byte the same upload; only a re-upload to the SAME
        // account is a duplicate file.
        let summary =
            import_statement(&mut conn, second, "stmt.csv", STATEMENT, Some("generic")).unwrap();
        assert!(!summary.duplicate_file);
        assert_eq!(summary.parsed, 3);
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(txn_count(&conn), 4);
    }

    #[test]
    fn test_commit_conflict_reported_as_skipped_duplicates() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        let file_id = store::insert_file(&conn, "stmt.csv", b"raw", "abc123", account_id).unwrap();
        let row = |description: &str| NewTransaction {
            init_date: None,
            post_date: chrono::NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap(),
            description: description.to_string(),
            amount: -4.5,
            account_id,
            source_file_id: file_id,
        };
        // Another import commits a matching row between the key scan and
        // this batch's commit.
        store::insert_batch(&conn, &[row("Coffee Shop")]).unwrap();

        let survivors = vec![row("Bookstore"), row("Coffee Shop")];
        let summary = commit_survivors(&mut conn, 2, 0, &survivors).unwrap();
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.skipped, 2);
        // All-or-nothing: the non-conflicting row must not have slipped in.
        assert_eq!(txn_count(&conn), 1);
    }

    #[test]
    fn test_same_rows_different_account_are_not_duplicates() {
        let (_dir, mut conn) = test_db();
        let first = add_account(&conn);
        let second = store::create_account(&conn, "Savings", "Bank").unwrap().id;
        import_statement(&mut conn, first, "a.csv", STATEMENT, Some("generic")).unwrap();
        // Same rows, different bytes so the checksum short-circuit stays out
        // of the way.
        let restated = b"Date,Description,Amount\n\
            2024-01-01,Coffee Shop,-4.50\n\
            2024-01-02,Paycheck,2000.00\n";
        let summary =
            import_statement(&mut conn, second, "b.csv", restated, Some("generic")).unwrap();
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn test_unknown_account_rejected_before_any_write() {
        let (_dir, mut conn) = test_db();
        let err =
            import_statement(&mut conn, 42, "stmt.csv", STATEMENT, Some("generic")).unwrap_err();
        assert!(matches!(err, TallyError::UnknownAccount(_)));
        let files: i64 =
            conn.query_row("SELECT count(*) FROM transaction_files", [], |r| r.get(0)).unwrap();
        assert_eq!(files, 0);
    }

    #[test]
    fn test_parse_failure_keeps_file_inserts_nothing() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        let bad = b"Date,Description,Amount\n\
            2024-01-01,One,-1.00\n\
            2024-01-02,Two,-2.00\n\
            not-a-date,Three,-3.00\n";
        let err = import_statement(&mut conn, account_id, "bad.csv", bad, Some("generic")).unwrap_err();
        assert!(matches!(err, TallyError::RowParse { row: 3, .. }));
        assert_eq!(txn_count(&conn), 0);
        // The upload itself stays as an audit artifact.
        let files: i64 =
            conn.query_row("SELECT count(*) FROM transaction_files", [], |r| r.get(0)).unwrap();
        assert_eq!(files, 1);
    }

    #[test]
    fn test_header_only_import_is_noop() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        let empty = b"Date,Description,Amount\n";
        let summary =
            import_statement(&mut conn, account_id, "empty.csv", empty, Some("generic")).unwrap();
        assert_eq!(summary.parsed, 0);
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.skipped, 0);
        assert_eq!(txn_count(&conn), 0);
    }

    #[test]
    fn test_format_auto_detected() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        let summary = import_statement(&mut conn, account_id, "stmt.csv", STATEMENT, None).unwrap();
        assert_eq!(summary.inserted, 2);
    }

    #[test]
    fn test_unknown_format_key() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        let err =
            import_statement(&mut conn, account_id, "stmt.csv", STATEMENT, Some("bogus")).unwrap_err();
        assert!(matches!(err, TallyError::UnknownFormat(_)));
    }

    #[test]
    fn test_transactions_stamped_with_source_file() {
        let (_dir, mut conn) = test_db();
        let account_id = add_account(&conn);
        import_statement(&mut conn, account_id, "stmt.csv", STATEMENT, Some("generic")).unwrap();
        let orphans: i64 = conn
            .query_row(
                "SELECT count(*) FROM transactions WHERE source_file_id IS NULL OR account_id != ?1",
                [account_id],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
