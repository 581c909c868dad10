use chrono::NaiveDateTime;

/// Identity string for a transaction, mirroring the storage-level
/// `UNIQUE (post_date, description, amount, account_id)` constraint
/// one-to-one. Two transactions are duplicates iff their keys are equal.
pub fn unique_key(
    post_date: NaiveDateTime,
    description: &str,
    amount: f64,
    account_id: i64,
) -> String {
    format!(
        "{}|{}|{}|{}",
        post_date.and_utc().timestamp(),
        description,
        amount,
        account_id
    )
}

#[derive(Debug, Clone)]
pub struct Account {
    pub id: i64,
    pub name: String,
    pub account_group: String,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub id: i64,
    pub init_date: Option<NaiveDateTime>,
    pub post_date: NaiveDateTime,
    pub description: String,
    pub amount: f64,
    pub verified_at: Option<NaiveDateTime>,
    pub account_id: i64,
    pub category_id: Option<i64>,
    pub source_file_id: Option<i64>,
}

impl Transaction {
    #[allow(dead_code)]
    pub fn unique_key(&self) -> String {
        unique_key(self.post_date, &self.description, self.amount, self.account_id)
    }
}

/// One normalized statement row, straight out of the CSV parser.
/// Account and source file are stamped on later by the importer; the
/// parser is account-agnostic.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransaction {
    pub init_date: Option<NaiveDateTime>,
    pub post_date: NaiveDateTime,
    pub description: String,
    pub amount: f64,
}

/// A parsed row stamped with its owning account and source file,
/// ready for batch insert.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    pub init_date: Option<NaiveDateTime>,
    pub post_date: NaiveDateTime,
    pub description: String,
    pub amount: f64,
    pub account_id: i64,
    pub source_file_id: i64,
}

impl NewTransaction {
    pub fn from_parsed(parsed: ParsedTransaction, account_id: i64, source_file_id: i64) -> Self {
        Self {
            init_date: parsed.init_date,
            post_date: parsed.post_date,
            description: parsed.description,
            amount: parsed.amount,
            account_id,
            source_file_id,
        }
    }

    pub fn unique_key(&self) -> String {
        unique_key(self.post_date, &self.description, self.amount, self.account_id)
    }
}

#[allow(dead_code)]
#[derive(Debug, Clone)]
pub struct Category {
    pub id: i64,
    pub name: String,
    pub supercategory_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub id: i64,
    pub pattern: String,
    pub case_sensitive: bool,
    pub category_id: i64,
    pub account_id: i64,
}
