//! Per-bank statement format descriptions.
//!
//! Each supported export is a `StatementFormat` variant carrying a column
//! spec: which headers hold the dates, description and amount, how dates are
//! written, and whether the amount's sign has to be flipped (credit-card
//! exports that list debits as positive numbers).

/// Column layout for one statement format.
pub struct ColumnSpec {
    pub post_date: &'static str,
    /// Column holding the date the transaction was initiated, where the
    /// export carries one. Absent for single-date formats.
    pub init_date: Option<&'static str>,
    pub description: &'static str,
    pub amount: &'static str,
    pub date_format: &'static str,
    /// Negate parsed amounts so debits end up negative.
    pub flip_sign: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StatementFormat {
    /// Plain `Date,Description,Amount` export, ISO dates, debits negative.
    Generic,
    /// Checking export with both posted and initiated dates, M/D/Y dates.
    Checking,
    /// Credit-card export; lists debits as positive, so the sign flips.
    CreditCard,
}

const ALL_FORMATS: &[StatementFormat] = &[
    StatementFormat::Checking,
    StatementFormat::CreditCard,
    StatementFormat::Generic,
];

impl StatementFormat {
    pub fn key(&self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Checking => "checking",
            Self::CreditCard => "credit_card",
        }
    }

    #[allow(dead_code)]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Generic => "Generic CSV",
            Self::Checking => "Checking statement",
            Self::CreditCard => "Credit card statement",
        }
    }

    pub fn columns(&self) -> ColumnSpec {
        match self {
            Self::Generic => ColumnSpec {
                post_date: "Date",
                init_date: None,
                description: "Description",
                amount: "Amount",
                date_format: "%Y-%m-%d",
                flip_sign: false,
            },
            Self::Checking => ColumnSpec {
                post_date: "Posted Date",
                init_date: Some("Transaction Date"),
                description: "Description",
                amount: "Amount",
                date_format: "%m/%d/%Y",
                flip_sign: false,
            },
            Self::CreditCard => ColumnSpec {
                post_date: "Post Date",
                init_date: Some("Trans Date"),
                description: "Description",
                amount: "Amount",
                date_format: "%m/%d/%Y",
                flip_sign: true,
            },
        }
    }

    /// Header sniff: does this format's required column set appear in the
    /// file's header row?
    fn detect(&self, headers: &csv::StringRecord) -> bool {
        let spec = self.columns();
        let has = |name: &str| headers.iter().any(|h| h.trim().eq_ignore_ascii_case(name));
        has(spec.post_date) && has(spec.description) && has(spec.amount)
    }
}

pub fn by_key(key: &str) -> Option<StatementFormat> {
    ALL_FORMATS.iter().find(|f| f.key() == key).copied()
}

/// Pick the first format whose header columns are all present. Checking and
/// credit card are tried before generic since their date headers are more
/// specific than a bare `Date`.
pub fn detect_format(data: &[u8]) -> Option<StatementFormat> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(data);
    let headers = rdr.headers().ok()?.clone();
    ALL_FORMATS.iter().find(|f| f.detect(&headers)).copied()
}
