//! Validation utilities for the Invoice Management System

use rust_decimal::Decimal;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate username format (3-50 chars, alphanumeric, `.`, `_` or `-`)
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.len() < 3 {
        return Err("Username must be at least 3 characters");
    }
    if username.len() > 50 {
        return Err("Username must be at most 50 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
    {
        return Err("Username may only contain letters, digits, '.', '_' and '-'");
    }
    Ok(())
}

/// Validate email format (basic check, at most 255 chars)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.chars().count() > 255 {
        return Err("Email must be at most 255 characters");
    }
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate a first or last name (1-100 chars)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name is required");
    }
    if name.chars().count() > 100 {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

/// Validate phone number: 7-15 digits, optional leading `+`, spaces and dashes
/// allowed, at most 20 chars in all
pub fn validate_phone(phone: &str) -> Result<(), &'static str> {
    if phone.chars().count() > 20 {
        return Err("Phone number must be at most 20 characters");
    }
    let trimmed = phone.trim();
    let body = trimmed.strip_prefix('+').unwrap_or(trimmed);
    if !body
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '-')
    {
        return Err("Phone number may only contain digits, spaces and dashes");
    }
    let digits = body.chars().filter(|c| c.is_ascii_digit()).count();
    if !(7..=15).contains(&digits) {
        return Err("Phone number must have between 7 and 15 digits");
    }
    Ok(())
}

// ============================================================================
// Inventory Validations
// ============================================================================

/// Validate item price (positive, at most 2 decimal places)
pub fn validate_price(price: Decimal) -> Result<(), &'static str> {
    if price <= Decimal::ZERO {
        return Err("Price must be positive");
    }
    if price.normalize().scale() > 2 {
        return Err("Price may have at most 2 decimal places");
    }
    Ok(())
}

/// Validate stock level
pub fn validate_stock(stock: i32) -> Result<(), &'static str> {
    if stock < 0 {
        return Err("Stock cannot be negative");
    }
    Ok(())
}

/// Validate a cart quantity against the stock currently available
pub fn validate_quantity(quantity: i32, available_stock: i32) -> Result<(), &'static str> {
    if quantity < 1 {
        return Err("Quantity must be at least 1");
    }
    if quantity > available_stock {
        return Err("Quantity exceeds available stock");
    }
    Ok(())
}

/// Check that every `(requested, in_stock)` pair can be fulfilled
pub fn stock_covers(lines: &[(i32, i32)]) -> bool {
    lines.iter().all(|(requested, stock)| requested <= stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_username() {
        assert!(validate_username("jdoe").is_ok());
        assert!(validate_username("vendor_01").is_ok());
        assert!(validate_username("a.b-c").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
    }

    #[test]
    fn test_validate_email_valid() {
        assert!(validate_email("test@example.com").is_ok());
        assert!(validate_email("user.name@domain.co.uk").is_ok());
    }

    #[test]
    fn test_validate_email_invalid() {
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
        assert!(validate_email("@.").is_err());
        let long = format!("{}@example.com", "a".repeat(250));
        assert_eq!(validate_email(&long), Err("Email must be at most 255 characters"));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("Ada").is_ok());
        assert!(validate_name(&"é".repeat(100)).is_ok());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("12345678").is_ok());
        assert!(validate_password("short").is_err());
    }

    #[test]
    fn test_validate_phone() {
        assert!(validate_phone("5551234567").is_ok());
        assert!(validate_phone("+1 555-123-4567").is_ok());
        assert!(validate_phone("12345").is_err());
        assert!(validate_phone("555-CALL-NOW").is_err());
        // 12 digits but 23 characters with the separators
        assert!(validate_phone("1-2-3-4-5-6-7-8-9-0-1-2").is_err());
    }

    #[test]
    fn test_validate_price() {
        assert!(validate_price(Decimal::from_str("0.01").unwrap()).is_ok());
        assert!(validate_price(Decimal::from_str("19.90").unwrap()).is_ok());
        assert!(validate_price(Decimal::ZERO).is_err());
        assert!(validate_price(Decimal::from_str("-1").unwrap()).is_err());
        assert!(validate_price(Decimal::from_str("1.005").unwrap()).is_err());
    }

    #[test]
    fn test_validate_stock() {
        assert!(validate_stock(0).is_ok());
        assert!(validate_stock(100).is_ok());
        assert!(validate_stock(-1).is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1, 1).is_ok());
        assert!(validate_quantity(0, 10).is_err());
        assert!(validate_quantity(11, 10).is_err());
    }

    #[test]
    fn test_stock_covers() {
        assert!(stock_covers(&[(1, 1), (2, 5)]));
        assert!(!stock_covers(&[(1, 1), (6, 5)]));
        assert!(stock_covers(&[]));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn cent_prices_are_valid(cents in 1i64..10_000_000) {
                prop_assert!(validate_price(Decimal::new(cents, 2)).is_ok());
            }

            #[test]
            fn accepted_phones_fit_the_column(phone in "[+]?[0-9 -]{0,30}") {
                if validate_phone(&phone).is_ok() {
                    prop_assert!(phone.chars().count() <= 20);
                }
            }

            #[test]
            fn sub_cent_prices_are_rejected(mills in 1i64..10_000_000) {
                prop_assume!(mills % 10 != 0);
                prop_assert!(validate_price(Decimal::new(mills, 3)).is_err());
            }
        }
    }
}
