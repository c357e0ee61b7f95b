//! Invoice numbering, totals and status tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{
    format_money, invoice_total, line_total, stock_covers, InvoiceNumber, InvoiceStatus,
    DEFAULT_INVOICE_PREFIX,
};

// ============================================================================
// Property Test Strategies
// ============================================================================

/// Prices with two decimal places between 0.01 and 9999.99
fn price_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn line_strategy() -> impl Strategy<Value = (i32, Decimal)> {
    (1i32..100, price_strategy())
}

fn prefix_strategy() -> impl Strategy<Value = String> {
    "[A-Z]{2,5}(-[A-Z]{2,4})?"
}

// ============================================================================
// Property-Based Tests
// ============================================================================

proptest! {
    /// The next number continues the yearly count and pads to the minimum width
    #[test]
    fn test_number_follows_yearly_count(
        issued in 0i64..999_998,
        customer_id in 1i64..9999,
    ) {
        let number = InvoiceNumber::next(DEFAULT_INVOICE_PREFIX, issued, customer_id);
        let text = number.to_string();

        prop_assert_eq!(number.sequence, issued + 1);
        prop_assert!(text.starts_with("INV-"));
        prop_assert_eq!(text.len(), "INV-".len() + 6 + 1 + 4);
        prop_assert_eq!(InvoiceNumber::parse(&text).unwrap(), number);
    }

    /// Customised prefixes, including ones containing dashes, parse back
    #[test]
    fn test_custom_prefix_parses(
        prefix in prefix_strategy(),
        sequence in 1i64..5_000_000,
        customer_id in 1i64..100_000,
    ) {
        let number = InvoiceNumber::new(prefix.clone(), sequence, customer_id);
        let parsed = InvoiceNumber::parse(&number.to_string()).unwrap();
        prop_assert_eq!(parsed.prefix, prefix);
        prop_assert_eq!(parsed.sequence, sequence);
        prop_assert_eq!(parsed.customer_id, customer_id);
    }

    /// Total is the sum of quantity × unit price and keeps cent precision
    #[test]
    fn test_total_is_sum_of_lines(lines in prop::collection::vec(line_strategy(), 0..20)) {
        let total = invoice_total(lines.iter().copied());
        let expected: Decimal = lines.iter().map(|(q, p)| *p * Decimal::from(*q)).sum();

        prop_assert_eq!(total, expected);
        prop_assert!(total >= Decimal::ZERO);
        prop_assert!(total.scale() <= 2);
    }

    #[test]
    fn test_line_total_scales_with_quantity(quantity in 1i32..1000, price in price_strategy()) {
        prop_assert_eq!(line_total(quantity + 1, price) - line_total(quantity, price), price);
    }

    #[test]
    fn test_format_money_has_two_decimals(price in price_strategy()) {
        let text = format_money(price);
        prop_assert!(text.starts_with('$'));
        let decimals = text.rsplit('.').next().unwrap();
        prop_assert_eq!(decimals.len(), 2);
    }

    /// Stock covers a cart exactly when every line fits
    #[test]
    fn test_stock_covers(lines in prop::collection::vec((1i32..50, 0i32..50), 0..10)) {
        let expected = lines.iter().all(|(requested, stock)| requested <= stock);
        prop_assert_eq!(stock_covers(&lines), expected);
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[test]
fn test_first_invoice_of_year() {
    assert_eq!(
        InvoiceNumber::next("INV", 0, 7).to_string(),
        "INV-000001-0007"
    );
}

#[test]
fn test_paid_invoice_cannot_be_paid_again() {
    let paid = InvoiceStatus::Unpaid
        .transition_to(InvoiceStatus::Paid)
        .unwrap();
    assert!(paid.transition_to(InvoiceStatus::Paid).is_err());
}

#[test]
fn test_status_names_match_lookup_table() {
    assert_eq!(InvoiceStatus::from_name("unpaid").unwrap(), InvoiceStatus::Unpaid);
    assert_eq!(InvoiceStatus::from_name("paid").unwrap(), InvoiceStatus::Paid);
    assert!(InvoiceStatus::from_name("void").is_err());
}
