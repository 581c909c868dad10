//! CSV normalization stage: turns raw statement bytes into an ordered batch
//! of `ParsedTransaction` records.
//!
//! Parsing is all-or-nothing. A missing required column or an unparseable
//! date/amount fails the whole batch with the offending column (and 1-based
//! data-row index) named; there is no skip-and-continue. A header-only file
//! is a valid empty batch.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{Result, TallyError};
use crate::formats::StatementFormat;
use crate::models::ParsedTransaction;

/// Parse a statement amount: strips surrounding quotes/whitespace, thousands
/// commas and a currency symbol, and reads `(123.45)` as a negative.
pub fn parse_amount(raw: &str) -> Option<f64> {
    let s = raw.replace(',', "").replace('"', "").replace('$', "");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if let Some(inner) = s.strip_prefix('(').and_then(|v| v.strip_suffix(')')) {
        return inner.trim().parse::<f64>().ok().map(|v| -v);
    }
    s.parse().ok()
}

/// Parse a statement date in the format's layout, to midnight of that day.
pub fn parse_statement_date(raw: &str, date_format: &str) -> Option<NaiveDateTime> {
    NaiveDate::parse_from_str(raw.trim(), date_format)
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn parse_statement(data: &[u8], format: StatementFormat) -> Result<Vec<ParsedTransaction>> {
    let spec = format.columns();
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = rdr.headers()?.clone();
    let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

    let idx_post = find(spec.post_date)
        .ok_or_else(|| TallyError::MissingColumn(spec.post_date.to_string()))?;
    let idx_desc = find(spec.description)
        .ok_or_else(|| TallyError::MissingColumn(spec.description.to_string()))?;
    let idx_amount = find(spec.amount)
        .ok_or_else(|| TallyError::MissingColumn(spec.amount.to_string()))?;
    // The initiation date is optional per-format AND per-file; some exports
    // of the same format drop the column entirely.
    let idx_init = spec.init_date.and_then(|name| find(name));

    let row_err = |row: usize, field: &str, value: &str| TallyError::RowParse {
        row,
        field: field.to_string(),
        value: value.to_string(),
    };

    let mut batch = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let row = i + 1;
        let record = result?;

        let raw_post = record.get(idx_post).unwrap_or("");
        let post_date = parse_statement_date(raw_post, spec.date_format)
            .ok_or_else(|| row_err(row, spec.post_date, raw_post))?;

        let init_date = match idx_init {
            Some(idx) => {
                let raw = record.get(idx).unwrap_or("");
                if raw.is_empty() {
                    None
                } else {
                    Some(
                        parse_statement_date(raw, spec.date_format)
                            .ok_or_else(|| row_err(row, spec.init_date.unwrap_or("init date"), raw))?,
                    )
                }
            }
            None => None,
        };

        let description = record.get(idx_desc).unwrap_or("").to_string();

        let raw_amount = record.get(idx_amount).unwrap_or("");
        let mut amount =
            parse_amount(raw_amount).ok_or_else(|| row_err(row, spec.amount, raw_amount))?;
        if spec.flip_sign {
            amount = -amount;
        }

        batch.push(ParsedTransaction {
            init_date,
            post_date,
            description,
            amount,
        });
    }

    Ok(batch)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn dt(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("\"500.00\""), Some(500.0));
        assert_eq!(parse_amount("  -42.50  "), Some(-42.5));
        assert_eq!(parse_amount("0"), Some(0.0));
        assert_eq!(parse_amount("(500.00)"), Some(-500.0));
        assert_eq!(parse_amount("$1,234.56"), Some(1234.56));
        assert_eq!(parse_amount("not_a_number"), None);
        assert_eq!(parse_amount(""), None);
    }

    #[test]
    fn test_parse_statement_date() {
        assert_eq!(parse_statement_date("2024-01-15", "%Y-%m-%d"), Some(dt(2024, 1, 15)));
        assert_eq!(parse_statement_date("01/15/2024", "%m/%d/%Y"), Some(dt(2024, 1, 15)));
        assert_eq!(parse_statement_date("01/15/2024", "%Y-%m-%d"), None);
        assert_eq!(parse_statement_date("02/30/2024", "%m/%d/%Y"), None);
    }

    #[test]
    fn test_parse_generic_statement() {
        let data = b"Date,Description,Amount\n\
                     2024-01-01,Coffee Shop,-4.50\n\
                     2024-01-02,Paycheck,2000.00\n";
        let batch = parse_statement(data, StatementFormat::Generic).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].post_date, dt(2024, 1, 1));
        assert_eq!(batch[0].description, "Coffee Shop");
        assert_eq!(batch[0].amount, -4.5);
        assert_eq!(batch[0].init_date, None);
        assert_eq!(batch[1].amount, 2000.0);
    }

    #[test]
    fn test_parse_preserves_file_order() {
        // Deliberately not in post_date order.
        let data = b"Date,Description,Amount\n\
                     2024-01-05,Later,-1.00\n\
                     2024-01-01,Earlier,-2.00\n\
                     2024-01-03,Middle,-3.00\n";
        let batch = parse_statement(data, StatementFormat::Generic).unwrap();
        let descriptions: Vec<&str> = batch.iter().map(|t| t.description.as_str()).collect();
        assert_eq!(descriptions, vec!["Later", "Earlier", "Middle"]);
    }

    #[test]
    fn test_parse_header_only_file_is_empty_batch() {
        let data = b"Date,Description,Amount\n";
        let batch = parse_statement(data, StatementFormat::Generic).unwrap();
        assert!(batch.is_empty());
    }

    #[test]
    fn test_parse_missing_amount_column() {
        let data = b"Date,Description\n2024-01-01,Coffee Shop\n";
        let err = parse_statement(data, StatementFormat::Generic).unwrap_err();
        match err {
            TallyError::MissingColumn(col) => assert_eq!(col, "Amount"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_date_names_row() {
        let data = b"Date,Description,Amount\n\
                     2024-01-01,One,-1.00\n\
                     2024-01-02,Two,-2.00\n\
                     not-a-date,Three,-3.00\n";
        let err = parse_statement(data, StatementFormat::Generic).unwrap_err();
        match err {
            TallyError::RowParse { row, field, value } => {
                assert_eq!(row, 3);
                assert_eq!(field, "Date");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected RowParse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_malformed_amount_names_row() {
        let data = b"Date,Description,Amount\n2024-01-01,One,oops\n";
        let err = parse_statement(data, StatementFormat::Generic).unwrap_err();
        match err {
            TallyError::RowParse { row, field, .. } => {
                assert_eq!(row, 1);
                assert_eq!(field, "Amount");
            }
            other => panic!("expected RowParse, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_checking_with_init_date() {
        let data = b"Posted Date,Transaction Date,Description,Amount\n\
                     01/03/2024,01/01/2024,GROCERY MART,-82.17\n\
                     01/04/2024,,ATM WITHDRAWAL,-60.00\n";
        let batch = parse_statement(data, StatementFormat::Checking).unwrap();
        assert_eq!(batch.len(), 2);
        assert_eq!(batch[0].post_date, dt(2024, 1, 3));
        assert_eq!(batch[0].init_date, Some(dt(2024, 1, 1)));
        assert_eq!(batch[1].init_date, None);
    }

    #[test]
    fn test_parse_checking_without_init_date_column() {
        let data = b"Posted Date,Description,Amount\n01/03/2024,GROCERY MART,-82.17\n";
        let batch = parse_statement(data, StatementFormat::Checking).unwrap();
        assert_eq!(batch.len(), 1);
        assert_eq!(batch[0].init_date, None);
    }

    #[test]
    fn test_parse_credit_card_flips_sign() {
        let data = b"Post Date,Trans Date,Description,Amount\n\
                     01/03/2024,01/01/2024,RESTAURANT,54.20\n\
                     01/05/2024,01/05/2024,PAYMENT THANK YOU,(200.00)\n";
        let batch = parse_statement(data, StatementFormat::CreditCard).unwrap();
        assert_eq!(batch[0].amount, -54.2);
        assert_eq!(batch[1].amount, 200.0);
    }

    #[test]
    fn test_parse_quoted_thousands_amount() {
        let data = b"Date,Description,Amount\n2024-01-31,MOBILE DEPOSIT,\"2,000.00\"\n";
        let batch = parse_statement(data, StatementFormat::Generic).unwrap();
        assert_eq!(batch[0].amount, 2000.0);
    }
}
