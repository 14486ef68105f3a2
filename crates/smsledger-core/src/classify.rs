//! Amount and direction classification
//!
//! Debit rules are evaluated before credit rules. The first matching rule is
//! authoritative: there is no cross-checking against other rules that would
//! also match with a different amount.

use crate::models::Direction;
use crate::patterns::{PatternCategory, PatternTable};

/// Outcome of a successful classification
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub direction: Direction,
    /// Parsed amount; NaN when the captured text is not a number
    pub amount: f64,
    /// Index of the winning rule within its category
    pub rule: usize,
}

/// Classify a message body. `None` means neither cascade matched.
pub fn classify(body: &str, table: &PatternTable) -> Option<Classification> {
    [
        (PatternCategory::Debit, Direction::Debit),
        (PatternCategory::Credit, Direction::Credit),
    ]
    .into_iter()
    .find_map(|(category, direction)| {
        table
            .first_capture(category, body)
            .map(|m| Classification {
                direction,
                amount: parse_amount(m.value).unwrap_or(f64::NAN),
                rule: m.rule,
            })
    })
}

/// Parse a captured amount, dropping thousands separators.
///
/// Handles both western (1,500,000.00) and Indian (15,00,000.00) grouping.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::PatternRule;

    fn table() -> PatternTable {
        PatternTable::builtin().unwrap()
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("1,500.00"), Some(1500.0));
        assert_eq!(parse_amount("15,00,000"), Some(1_500_000.0));
        assert_eq!(parse_amount(" 42 "), Some(42.0));
        assert_eq!(parse_amount(","), None);
        assert_eq!(parse_amount("abc"), None);
    }

    #[test]
    fn test_debit_amount_before_verb() {
        let body = "Rs. 1500.00 debited from a/c 1234 on 12-02-26 to ZOMATO.";
        let c = classify(body, &table()).unwrap();
        assert_eq!(c.direction, Direction::Debit);
        assert_eq!(c.amount, 1500.0);
    }

    #[test]
    fn test_debit_verb_before_amount() {
        let body = "Paid Rs. 2000.00 for electricity bill via Amazon Pay.";
        let c = classify(body, &table()).unwrap();
        assert_eq!(c.direction, Direction::Debit);
        assert_eq!(c.amount, 2000.0);
    }

    #[test]
    fn test_debit_phrasings() {
        let t = table();
        let cases = [
            ("INR 250.75 spent on your card XX4321 at DMART", 250.75),
            ("Rs 3,000 withdrawn at ATM from a/c XX1111", 3000.0),
            ("ATM withdrawal of Rs 2,000 from a/c 5555", 2000.0),
            ("Purchase of INR 999 on card ending 4321", 999.0),
            ("Your a/c XX1234 is debited for ₹1,24,500.50 on 01-03", 124_500.5),
            ("A/c 1234 debited on 12-02 towards loan Rs 300", 300.0),
        ];
        for (body, amount) in cases {
            let c = classify(body, &t).unwrap_or_else(|| panic!("unclassified: {}", body));
            assert_eq!(c.direction, Direction::Debit, "{}", body);
            assert_eq!(c.amount, amount, "{}", body);
        }
    }

    #[test]
    fn test_credit_phrasings() {
        let t = table();
        let cases = [
            ("Rs 5,000.00 credited to your a/c XX9876 by NEFT", 5000.0),
            ("Your account has received Rs 750 from RAMESH", 750.0),
            ("Refund of Rs 120 processed for order 123", 120.0),
            ("INR 49 has been reversed to your card", 49.0),
            ("Cashback of Rs 25 added to your wallet", 25.0),
            ("Salary deposited Rs 45,000 in a/c 1234", 45_000.0),
        ];
        for (body, amount) in cases {
            let c = classify(body, &t).unwrap_or_else(|| panic!("unclassified: {}", body));
            assert_eq!(c.direction, Direction::Credit, "{}", body);
            assert_eq!(c.amount, amount, "{}", body);
        }
    }

    #[test]
    fn test_multiline_bodies() {
        let t = table();
        let c = classify("A/c XX1234 debited\non 12-02 for Rs 300", &t).unwrap();
        assert_eq!(c.direction, Direction::Debit);
        assert_eq!(c.amount, 300.0);

        let c = classify("A/c XX1234 credited\nwith salary of INR 45,000", &t).unwrap();
        assert_eq!(c.direction, Direction::Credit);
        assert_eq!(c.amount, 45_000.0);

        let c = classify("Cashback\nRs 25 for your order", &t).unwrap();
        assert_eq!(c.direction, Direction::Credit);
        assert_eq!(c.amount, 25.0);
    }

    #[test]
    fn test_emi_rule_precedes_generic_debit() {
        // Both the EMI rule and the amount-before-verb rule match; the EMI
        // rule is first in the table and wins with its own amount.
        let c = classify("Rs 120 debited towards EMI of Rs 4,500 for loan 77", &table()).unwrap();
        assert_eq!(c.rule, 0);
        assert_eq!(c.amount, 4500.0);
    }

    #[test]
    fn test_debit_wins_over_credit() {
        let body = "Rs 500 debited from a/c 1234 and Rs 500 credited to a/c 9876";
        let c = classify(body, &table()).unwrap();
        assert_eq!(c.direction, Direction::Debit);
    }

    #[test]
    fn test_unclassified() {
        assert!(classify("Your OTP is 123456.", &table()).is_none());
        assert!(classify("Balance in a/c 1234 is Rs 10,000", &table()).is_none());
    }

    #[test]
    fn test_unparseable_capture_is_nan() {
        let table = PatternTable::new(
            vec![PatternRule::new(PatternCategory::Debit, r"debited (\S+)", 1).unwrap()],
            Vec::new(),
            Vec::new(),
        );
        let c = classify("debited lots", &table).unwrap();
        assert!(c.amount.is_nan());
    }

    #[test]
    fn test_huge_amount_is_not_finite() {
        let digits = "9".repeat(400);
        let c = classify(&format!("Rs {} debited", digits), &table()).unwrap();
        assert!(!c.amount.is_finite());
    }
}
