//! Shopping cart models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::invoice::line_total;

/// One active cart line with its computed total
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartLine {
    pub item_id: i64,
    pub description: String,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl CartLine {
    pub fn new(item_id: i64, description: String, quantity: i32, unit_price: Decimal) -> Self {
        Self {
            item_id,
            description,
            quantity,
            unit_price,
            line_total: line_total(quantity, unit_price),
        }
    }
}

/// The active cart of a customer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Cart {
    pub lines: Vec<CartLine>,
    pub total: Decimal,
}

impl Cart {
    pub fn from_lines(lines: Vec<CartLine>) -> Self {
        let total = lines.iter().map(|l| l.line_total).sum();
        Self { lines, total }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_total_is_sum_of_lines() {
        let cart = Cart::from_lines(vec![
            CartLine::new(1, "Widget".into(), 2, Decimal::new(1050, 2)),
            CartLine::new(2, "Bolt".into(), 10, Decimal::new(25, 2)),
        ]);
        assert_eq!(cart.lines[0].line_total, Decimal::new(2100, 2));
        assert_eq!(cart.total, Decimal::new(2350, 2));
    }

    #[test]
    fn test_empty_cart() {
        let cart = Cart::from_lines(Vec::new());
        assert!(cart.lines.is_empty());
        assert_eq!(cart.total, Decimal::ZERO);
    }
}
