//! Rule-based transaction categorization
//!
//! Matches upper-cased merchant and narration text against an ordered keyword
//! table. Order matters: the first category with a matching keyword wins, so
//! "AMAZON PRIME" lands in Shopping before Subscriptions is consulted.
//!
//! The result depends only on immutable transaction fields, so
//! re-categorizing a transaction always yields the same label.

use crate::models::{Direction, Transaction};

/// Label for transactions that match no rule
pub const DEFAULT_CATEGORY: &str = "Others";

/// Ordered category → keyword table
pub const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "Food",
        &[
            "ZOMATO",
            "SWIGGY",
            "KFC",
            "MCDONALD",
            "DOMINOS",
            "PIZZA",
            "BURGER",
            "EATFIT",
            "FAASOS",
            "BEHROOZ",
            "BIRYANI",
            "RESTAURANT",
        ],
    ),
    (
        "Groceries",
        &[
            "BIG BASKET",
            "BLINKIT",
            "ZEPTO",
            "SPENCER",
            "MORE",
            "DMART",
            "FRESH",
            "NATURES BASKET",
            "GROCER",
        ],
    ),
    (
        "Transport",
        &[
            "UBER",
            "OLA",
            "AUTORICKSHAW",
            "METRO",
            "TRAIN",
            "IRCTC",
            "RED BUS",
            "FUEL",
            "PETROL",
            "DIESEL",
        ],
    ),
    (
        "Shopping",
        &[
            "AMAZON", "FLIPKART", "MYNTRA", "AJIO", "NYKAA", "TATA CLIQ", "SHOPPING",
        ],
    ),
    (
        "Bills",
        &[
            "ELECTRICITY",
            "WATER BILL",
            "GAS BILL",
            "BESCOM",
            "RECHARGE",
            "POSTPAID",
            "PREPAID",
            "DTH",
            "BILLDESK",
        ],
    ),
    (
        "Subscriptions",
        &[
            "NETFLIX",
            "PRIME",
            "AMAZON PRIME",
            "SPOTIFY",
            "APPLE MUSIC",
            "YOUTUBE",
            "HOTSTAR",
            "SONY LIV",
            "ZEE5",
            "GAANA",
            "WYNK",
        ],
    ),
    (
        "Entertainment",
        &["BOOKMYSHOW", "MOVIE", "THEATRE", "CINEMA", "PVR", "INOX"],
    ),
    (
        "Travel",
        &[
            "MAKEMYTRIP",
            "GOIBIBO",
            "AGODA",
            "AIR INDIA",
            "INDIGO",
            "VISTARA",
            "YATRA",
            "TRAVEL",
        ],
    ),
    (
        "Health",
        &[
            "PHARMA",
            "APOLLO",
            "1MG",
            "PHARMACY",
            "DIAGNOSTIC",
            "HOSPITAL",
            "CLINIC",
            "MEDICINE",
        ],
    ),
    (
        "Education",
        &[
            "COURSERA",
            "UDACITY",
            "UDEMY",
            "BYJUS",
            "UNACADEMY",
            "VEDANTU",
            "EDUCATION",
            "SCHOOL",
            "COLLEGE",
        ],
    ),
    (
        "Investments",
        &[
            "GROWW",
            "ZERODHA",
            "UPSTOX",
            "MUTUAL FUND",
            "SIP",
            "COIN",
            "STOCK",
            "EQUITY",
        ],
    ),
    ("Rent", &["RENT", "NO BROKER", "NOBROKER", "HOUSING", "PROP"]),
    (
        "Salary",
        &["SALARY", "PAYROLL", "CREDIT SALARY", "HR", "PAYOUT"],
    ),
    ("Refunds", &["REFUND", "REVERSAL", "REVERSED"]),
];

/// Credit-only fallback tokens for income that slipped past the table
const SALARY_HINTS: &[&str] = &["SALARY", "PAYROLL", "WAGES", "STIPEND"];
const REFUND_HINTS: &[&str] = &["REFUND", "REVERSAL", "CASHBACK", "CHARGEBACK"];

/// Categorize from the raw fields
pub fn categorize_transaction(
    merchant: &str,
    narration: &str,
    direction: Direction,
) -> &'static str {
    let blob = format!("{} {}", merchant.to_uppercase(), narration.to_uppercase());

    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|kw| blob.contains(kw)) {
            return category;
        }
    }

    if direction == Direction::Credit {
        if SALARY_HINTS.iter().any(|kw| blob.contains(kw)) {
            return "Salary";
        }
        if REFUND_HINTS.iter().any(|kw| blob.contains(kw)) {
            return "Refunds";
        }
    }

    DEFAULT_CATEGORY
}

/// Categorize a transaction (ignores any category already set)
pub fn categorize(tx: &Transaction) -> &'static str {
    categorize_transaction(&tx.merchant, &tx.narration, tx.direction)
}

/// Set the category on every transaction in the batch
pub fn categorize_batch(mut transactions: Vec<Transaction>) -> Vec<Transaction> {
    for tx in &mut transactions {
        tx.category = categorize(tx).to_string();
    }
    transactions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{credit, debit};

    #[test]
    fn test_first_matching_category_wins() {
        assert_eq!(
            categorize_transaction("AMAZON PRIME", "", Direction::Debit),
            "Shopping"
        );
        assert_eq!(
            categorize_transaction("NETFLIX", "Netflix Subscription", Direction::Debit),
            "Subscriptions"
        );
    }

    #[test]
    fn test_matches_narration_case_insensitively() {
        assert_eq!(
            categorize_transaction("", "upi/swiggy order 4411", Direction::Debit),
            "Food"
        );
        assert_eq!(
            categorize_transaction("Zepto", "", Direction::Debit),
            "Groceries"
        );
    }

    #[test]
    fn test_credit_fallbacks() {
        assert_eq!(
            categorize_transaction("ACME LTD", "monthly wages", Direction::Credit),
            "Salary"
        );
        assert_eq!(
            categorize_transaction("", "card cashback", Direction::Credit),
            "Refunds"
        );
        // Fallbacks do not apply to debits
        assert_eq!(
            categorize_transaction("ACME LTD", "monthly wages", Direction::Debit),
            DEFAULT_CATEGORY
        );
    }

    #[test]
    fn test_unmatched_defaults_to_others() {
        assert_eq!(
            categorize_transaction("LOCAL KIRANA", "", Direction::Debit),
            DEFAULT_CATEGORY
        );
    }

    #[test]
    fn test_batch_sets_categories() {
        let txns = vec![
            debit("t1", "UBER", 250.0, "2026-01-03T09:00:00Z"),
            credit("t2", "", 50_000.0, "2026-01-01T09:00:00Z"),
        ];
        let out = categorize_batch(txns);
        assert_eq!(out[0].category, "Transport");
        assert_eq!(out[1].category, DEFAULT_CATEGORY);
    }

    #[test]
    fn test_categorize_is_idempotent() {
        let once = categorize_batch(vec![
            debit("t1", "BOOKMYSHOW", 400.0, "2026-01-03T20:00:00Z"),
            debit("t2", "", 90.0, "2026-01-04T10:00:00Z"),
        ]);
        let twice = categorize_batch(once.clone());
        assert_eq!(once, twice);
    }
}
