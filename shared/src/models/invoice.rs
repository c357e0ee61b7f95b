//! Invoice, invoice numbering and cart status models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Default prefix for generated invoice numbers
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Payment status of an invoice (`statuses` lookup table)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    Unpaid,
    Paid,
}

impl InvoiceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Unpaid => "unpaid",
            InvoiceStatus::Paid => "paid",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        match name {
            "unpaid" => Ok(InvoiceStatus::Unpaid),
            "paid" => Ok(InvoiceStatus::Paid),
            other => Err(DomainError::UnknownInvoiceStatus(other.to_string())),
        }
    }

    /// Only unpaid → paid is allowed
    pub fn transition_to(self, next: InvoiceStatus) -> Result<InvoiceStatus, DomainError> {
        match (self, next) {
            (InvoiceStatus::Unpaid, InvoiceStatus::Paid) => Ok(next),
            (from, to) => Err(DomainError::InvalidTransition {
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            }),
        }
    }
}

impl TryFrom<String> for InvoiceStatus {
    type Error = DomainError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        InvoiceStatus::from_name(&name)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of a cart row (`cart_status` lookup table)
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CartStatus {
    Active,
    Converted,
}

impl CartStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CartStatus::Active => "active",
            CartStatus::Converted => "converted",
        }
    }

    pub fn from_name(name: &str) -> Result<Self, DomainError> {
        match name {
            "active" => Ok(CartStatus::Active),
            "converted" => Ok(CartStatus::Converted),
            other => Err(DomainError::UnknownCartStatus(other.to_string())),
        }
    }

    /// Conversion is one-way: only active rows may be converted
    pub fn convert(self) -> Result<CartStatus, DomainError> {
        match self {
            CartStatus::Active => Ok(CartStatus::Converted),
            CartStatus::Converted => Err(DomainError::InvalidTransition {
                from: "converted".to_string(),
                to: "converted".to_string(),
            }),
        }
    }
}

impl TryFrom<String> for CartStatus {
    type Error = DomainError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        CartStatus::from_name(&name)
    }
}

/// Parsed form of an invoice number such as `INV-000042-0007`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumber {
    pub prefix: String,
    /// Position of the invoice within its year, starting at 1
    pub sequence: i64,
    pub customer_id: i64,
}

impl InvoiceNumber {
    pub fn new(prefix: impl Into<String>, sequence: i64, customer_id: i64) -> Self {
        Self {
            prefix: prefix.into(),
            sequence,
            customer_id,
        }
    }

    /// Next number given how many invoices already exist in the current year
    pub fn next(prefix: impl Into<String>, invoices_this_year: i64, customer_id: i64) -> Self {
        Self::new(prefix, invoices_this_year + 1, customer_id)
    }

    pub fn parse(s: &str) -> Result<Self, DomainError> {
        let malformed = || DomainError::MalformedInvoiceNumber(s.to_string());

        let mut parts = s.rsplitn(3, '-');
        let customer = parts.next().ok_or_else(malformed)?;
        let sequence = parts.next().ok_or_else(malformed)?;
        let prefix = parts.next().ok_or_else(malformed)?;

        if prefix.is_empty() || sequence.len() < 6 || customer.len() < 4 {
            return Err(malformed());
        }
        if !sequence.chars().all(|c| c.is_ascii_digit())
            || !customer.chars().all(|c| c.is_ascii_digit())
        {
            return Err(malformed());
        }

        Ok(Self {
            prefix: prefix.to_string(),
            sequence: sequence.parse().map_err(|_| malformed())?,
            customer_id: customer.parse().map_err(|_| malformed())?,
        })
    }
}

impl std::fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}-{:06}-{:04}",
            self.prefix, self.sequence, self.customer_id
        )
    }
}

/// Total for one invoice line
pub fn line_total(quantity: i32, unit_price: Decimal) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Invoice total from `(quantity, unit_price)` pairs
pub fn invoice_total<I>(lines: I) -> Decimal
where
    I: IntoIterator<Item = (i32, Decimal)>,
{
    lines
        .into_iter()
        .map(|(quantity, price)| line_total(quantity, price))
        .sum()
}

/// Format an amount the way invoices print it (`$12.50`)
pub fn format_money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_invoice_number_format() {
        let number = InvoiceNumber::next(DEFAULT_INVOICE_PREFIX, 41, 7);
        assert_eq!(number.to_string(), "INV-000042-0007");
    }

    #[test]
    fn test_invoice_number_wide_ids() {
        // Padding is a minimum width, larger values are printed in full
        let number = InvoiceNumber::new("INV", 1_234_567, 12345);
        assert_eq!(number.to_string(), "INV-1234567-12345");
        assert_eq!(InvoiceNumber::parse("INV-1234567-12345").unwrap(), number);
    }

    #[test]
    fn test_invoice_number_parse() {
        let parsed = InvoiceNumber::parse("INV-000003-0012").unwrap();
        assert_eq!(parsed.prefix, "INV");
        assert_eq!(parsed.sequence, 3);
        assert_eq!(parsed.customer_id, 12);
    }

    #[test]
    fn test_invoice_number_parse_custom_prefix() {
        let parsed = InvoiceNumber::parse("ACME-INV-000001-0001").unwrap();
        assert_eq!(parsed.prefix, "ACME-INV");
    }

    #[test]
    fn test_invoice_number_parse_rejects_garbage() {
        assert!(InvoiceNumber::parse("INV-12-1").is_err());
        assert!(InvoiceNumber::parse("000001-0001").is_err());
        assert!(InvoiceNumber::parse("INV-00000a-0001").is_err());
        assert!(InvoiceNumber::parse("").is_err());
    }

    #[test]
    fn test_status_transitions() {
        assert_eq!(
            InvoiceStatus::Unpaid.transition_to(InvoiceStatus::Paid),
            Ok(InvoiceStatus::Paid)
        );
        assert!(InvoiceStatus::Paid.transition_to(InvoiceStatus::Paid).is_err());
        assert!(InvoiceStatus::Paid.transition_to(InvoiceStatus::Unpaid).is_err());
    }

    #[test]
    fn test_cart_conversion_is_one_way() {
        assert_eq!(CartStatus::Active.convert(), Ok(CartStatus::Converted));
        assert!(CartStatus::Converted.convert().is_err());
    }

    #[test]
    fn test_cart_status_from_lookup_name() {
        assert_eq!(CartStatus::try_from("active".to_string()), Ok(CartStatus::Active));
        assert_eq!(CartStatus::from_name("converted"), Ok(CartStatus::Converted));
        assert!(CartStatus::from_name("abandoned").is_err());
    }

    #[test]
    fn test_totals() {
        assert_eq!(line_total(3, dec("2.50")), dec("7.50"));
        let total = invoice_total(vec![(3, dec("2.50")), (1, dec("10.00")), (2, dec("0.99"))]);
        assert_eq!(total, dec("19.48"));
        assert_eq!(invoice_total(Vec::new()), Decimal::ZERO);
    }

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(dec("7.5")), "$7.50");
        assert_eq!(format_money(dec("1234.567")), "$1234.57");
        assert_eq!(format_money(Decimal::ZERO), "$0.00");
    }
}
