//! Cart total and quantity tests

use proptest::prelude::*;
use rust_decimal::Decimal;
use shared::{validate_quantity, Cart, CartLine, CartStatus};

fn cart_line_strategy() -> impl Strategy<Value = CartLine> {
    (1i64..10_000, 1i32..100, 1i64..100_000).prop_map(|(item_id, quantity, cents)| {
        CartLine::new(item_id, format!("Item {}", item_id), quantity, Decimal::new(cents, 2))
    })
}

proptest! {
    /// Cart total equals the sum of line totals
    #[test]
    fn test_cart_total(lines in prop::collection::vec(cart_line_strategy(), 0..15)) {
        let expected: Decimal = lines.iter().map(|l| l.unit_price * Decimal::from(l.quantity)).sum();
        let count = lines.len();
        let cart = Cart::from_lines(lines);

        prop_assert_eq!(cart.total, expected);
        prop_assert_eq!(cart.lines.len(), count);
    }

    /// A quantity is accepted exactly when it is positive and in stock
    #[test]
    fn test_quantity_bounds(quantity in -5i32..200, stock in 0i32..150) {
        let accepted = validate_quantity(quantity, stock).is_ok();
        prop_assert_eq!(accepted, quantity >= 1 && quantity <= stock);
    }

    /// Merging into an existing line is checked against stock as a whole
    #[test]
    fn test_merged_quantity_respects_stock(
        existing in 1i32..50,
        added in 1i32..50,
        stock in 0i32..100,
    ) {
        let merged = existing + added;
        prop_assert_eq!(validate_quantity(merged, stock).is_ok(), merged <= stock);
    }
}

#[test]
fn test_zero_quantity_rejected() {
    assert!(validate_quantity(0, 10).is_err());
}

#[test]
fn test_out_of_stock_item_rejected() {
    assert!(validate_quantity(1, 0).is_err());
}

#[test]
fn test_converted_rows_stay_converted() {
    let converted = CartStatus::Active.convert().unwrap();
    assert_eq!(converted, CartStatus::Converted);
    assert!(converted.convert().is_err());
}
