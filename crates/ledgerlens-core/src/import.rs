//! CSV import of ledger exports
//!
//! Header-driven: columns are located by name, so their order does not matter.
//! Required columns are `txn_id`, `user_id`, `amount`, `direction` and
//! `value_date`; `account_id`, `narration`, `merchant` and `category` are
//! optional. Value dates are stored verbatim and validated when loaded.

use std::io::Read;

use csv::{ReaderBuilder, StringRecord};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Direction, NewTransaction};

const REQUIRED_COLUMNS: [&str; 5] = ["txn_id", "user_id", "amount", "direction", "value_date"];

/// Column positions resolved from the header row
struct Columns {
    txn_id: usize,
    user_id: usize,
    amount: usize,
    direction: usize,
    value_date: usize,
    account_id: Option<usize>,
    narration: Option<usize>,
    merchant: Option<usize>,
    category: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let missing: Vec<&str> = REQUIRED_COLUMNS
            .iter()
            .copied()
            .filter(|c| find(*c).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::Import(format!(
                "Missing required column(s): {}",
                missing.join(", ")
            )));
        }

        let required = |name: &str| {
            find(name).ok_or_else(|| Error::Import(format!("Missing required column: {}", name)))
        };

        Ok(Self {
            txn_id: required("txn_id")?,
            user_id: required("user_id")?,
            amount: required("amount")?,
            direction: required("direction")?,
            value_date: required("value_date")?,
            account_id: find("account_id"),
            narration: find("narration"),
            merchant: find("merchant"),
            category: find("category"),
        })
    }
}

fn field<'r>(record: &'r StringRecord, idx: usize) -> &'r str {
    record.get(idx).unwrap_or("").trim()
}

fn optional_field(record: &StringRecord, idx: Option<usize>) -> String {
    idx.map(|i| field(record, i).to_string()).unwrap_or_default()
}

/// Parse a ledger CSV export into ingestion rows
///
/// Errors name the offending line (the header is line 1).
pub fn parse_ledger_csv<R: Read>(reader: R) -> Result<Vec<NewTransaction>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let columns = Columns::from_headers(&headers)?;
    let mut transactions = Vec::new();

    for (i, result) in rdr.records().enumerate() {
        let record = result?;
        let line = i + 2;

        let id = field(&record, columns.txn_id);
        if id.is_empty() {
            return Err(Error::Import(format!("Line {}: missing txn_id", line)));
        }
        let user_id = field(&record, columns.user_id);
        if user_id.is_empty() {
            return Err(Error::Import(format!("Line {}: missing user_id", line)));
        }

        let amount = parse_amount(field(&record, columns.amount))
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;
        if amount < 0.0 {
            return Err(Error::Import(format!(
                "Line {}: negative amount {} (direction carries the sign)",
                line, amount
            )));
        }

        let direction: Direction = field(&record, columns.direction)
            .parse()
            .map_err(|e| Error::Import(format!("Line {}: {}", line, e)))?;

        let category = Some(optional_field(&record, columns.category)).filter(|c| !c.is_empty());

        transactions.push(NewTransaction {
            id: id.to_string(),
            user_id: user_id.to_string(),
            account_id: optional_field(&record, columns.account_id),
            amount,
            direction,
            value_date: field(&record, columns.value_date).to_string(),
            narration: optional_field(&record, columns.narration),
            merchant: optional_field(&record, columns.merchant),
            category,
        });
    }

    debug!("Parsed {} ledger transactions", transactions.len());
    Ok(transactions)
}

/// Parse an amount, allowing currency symbols and thousands separators
fn parse_amount(s: &str) -> std::result::Result<f64, String> {
    let cleaned = s.trim().replace([',', ' ', '₹', '$'], "");

    cleaned
        .parse::<f64>()
        .ok()
        .filter(|a| a.is_finite())
        .ok_or_else(|| format!("Unable to parse amount: {}", s))
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "txn_id,user_id,account_id,amount,direction,value_date,narration,merchant";

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,250.50").unwrap(), 1250.5);
        assert_eq!(parse_amount("₹ 649").unwrap(), 649.0);
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
    }

    #[test]
    fn test_parse_ledger_csv() {
        let data = format!(
            "{}\n\
             t1,user-1,XXXX1234,649.00,DEBIT,2026-03-02T08:00:00Z,UPI/NETFLIX,NETFLIX\n\
             t2,user-1,XXXX1234,85000,CR,2026-03-01,NEFT/ACME PAYROLL,\n",
            HEADER
        );

        let txns = parse_ledger_csv(data.as_bytes()).unwrap();
        assert_eq!(txns.len(), 2);

        assert_eq!(txns[0].id, "t1");
        assert_eq!(txns[0].amount, 649.0);
        assert_eq!(txns[0].direction, Direction::Debit);
        assert_eq!(txns[0].merchant, "NETFLIX");
        assert_eq!(txns[0].category, None);

        assert_eq!(txns[1].direction, Direction::Credit);
        assert_eq!(txns[1].value_date, "2026-03-01");
        assert_eq!(txns[1].merchant, "");
    }

    #[test]
    fn test_columns_located_by_name() {
        let data = "Merchant,Direction,Amount,Value_Date,User_ID,Txn_ID,Category\n\
                    SWIGGY,debit,320,2026-03-05,user-2,s1,Food\n";

        let txns = parse_ledger_csv(data.as_bytes()).unwrap();
        assert_eq!(txns[0].user_id, "user-2");
        assert_eq!(txns[0].merchant, "SWIGGY");
        assert_eq!(txns[0].account_id, "");
        assert_eq!(txns[0].category.as_deref(), Some("Food"));
    }

    #[test]
    fn test_missing_required_column() {
        let data = "txn_id,user_id,amount\nt1,user-1,10\n";
        let err = parse_ledger_csv(data.as_bytes()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("direction"));
        assert!(msg.contains("value_date"));
    }

    #[test]
    fn test_negative_amount_names_line() {
        let data = format!(
            "{}\n\
             t1,user-1,XXXX1234,10,DEBIT,2026-03-02,,UBER\n\
             t2,user-1,XXXX1234,-10,DEBIT,2026-03-02,,UBER\n",
            HEADER
        );
        let err = parse_ledger_csv(data.as_bytes()).unwrap_err();
        assert!(matches!(err, Error::Import(_)));
        assert!(err.to_string().contains("Line 3"));
    }

    #[test]
    fn test_unknown_direction_rejected() {
        let data = format!("{}\nt1,user-1,X,10,SIDEWAYS,2026-03-02,,UBER\n", HEADER);
        let err = parse_ledger_csv(data.as_bytes()).unwrap_err();
        assert!(err.to_string().contains("Line 2"));
        assert!(err.to_string().contains("SIDEWAYS"));
    }
}
