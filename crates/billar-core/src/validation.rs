//! # Validation Module
//!
//! Input validation utilities for Billar POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                   │
//! │                                                                         │
//! │  Layer 1: Operation boundary (billar-service)                           │
//! │  ├── THIS MODULE: field checks before any query runs                    │
//! │  └── Errors surface as operator feedback, never as crashes              │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                             │
//! │  ├── NOT NULL constraints                                               │
//! │  ├── UNIQUE constraints (product code, username)                        │
//! │  └── CHECK constraints (stock ≥ 0, qty > 0)                             │
//! │                                                                         │
//! │  Defense in depth: both layers catch different mistakes                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use billar_core::validation::{validate_product_code, validate_quantity};
//!
//! validate_product_code("FER-750").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::money::Money;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a product business code.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 50 characters
/// - Only alphanumeric characters, hyphens, underscores
///
/// ## Example
/// ```rust
/// use billar_core::validation::validate_product_code;
///
/// assert!(validate_product_code("FER-750").is_ok());
/// assert!(validate_product_code("").is_err());
/// assert!(validate_product_code("A".repeat(100).as_str()).is_err());
/// ```
pub fn validate_product_code(code: &str) -> ValidationResult<()> {
    let code = code.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "code".to_string(),
        });
    }

    if code.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "code".to_string(),
            max: 50,
        });
    }

    // Check for valid characters (alphanumeric, hyphen, underscore)
    if !code
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "code".to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - Must be between 1 and 200 characters
///
/// ## Example
/// ```rust
/// use billar_core::validation::validate_product_name;
///
/// assert!(validate_product_name("Fernet Branca 750ml").is_ok());
/// assert!(validate_product_name("").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates and normalizes a username.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 50 characters
/// - Only alphanumeric characters, dots, hyphens, underscores
///
/// ## Returns
/// The trimmed, lowercased username. All lookups and uniqueness checks use
/// this normalized form, so `Caro` and `caro` are the same account.
pub fn validate_username(username: &str) -> ValidationResult<String> {
    let username = username.trim();

    if username.is_empty() {
        return Err(ValidationError::Required {
            field: "username".to_string(),
        });
    }

    if username.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "username".to_string(),
            max: 50,
        });
    }

    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: "username".to_string(),
            reason: "must contain only letters, numbers, dots, hyphens, and underscores"
                .to_string(),
        });
    }

    Ok(username.to_lowercase())
}

/// Validates a password for account creation.
///
/// ## Rules
/// - At least 4 characters (short PINs are common behind the bar)
pub fn validate_password(password: &str) -> ValidationResult<()> {
    if password.len() < 4 {
        return Err(ValidationError::TooShort {
            field: "password".to_string(),
            min: 4,
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
///
/// Zero is rejected everywhere a quantity appears: a sale of nothing is
/// meaningless, and a restock of zero would divide by zero when deriving
/// the unit cost.
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    Ok(())
}

/// Validates a monetary amount that must not be negative.
///
/// Zero is allowed: giveaway prices and zero-cost lines are legitimate.
///
/// ## Example
/// ```rust
/// use billar_core::money::Money;
/// use billar_core::validation::validate_amount;
///
/// assert!(validate_amount("price", Money::from_units(9000)).is_ok());
/// assert!(validate_amount("price", Money::zero()).is_ok());
/// assert!(validate_amount("price", Money::from_scaled(-1)).is_err());
/// ```
pub fn validate_amount(field: &str, amount: Money) -> ValidationResult<()> {
    if amount.is_negative() {
        return Err(ValidationError::MustNotBeNegative {
            field: field.to_string(),
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "iva".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_product_code() {
        // Valid codes
        assert!(validate_product_code("FER-750").is_ok());
        assert!(validate_product_code("ABC123").is_ok());
        assert!(validate_product_code("coca_15").is_ok());

        // Invalid codes
        assert!(validate_product_code("").is_err());
        assert!(validate_product_code("   ").is_err());
        assert!(validate_product_code("has space").is_err());
        assert!(validate_product_code(&"A".repeat(100)).is_err());
    }

    #[test]
    fn test_validate_product_name() {
        assert!(validate_product_name("Fernet Branca 750ml").is_ok());
        assert!(validate_product_name("").is_err());
        assert!(validate_product_name(&"A".repeat(300)).is_err());
    }

    #[test]
    fn test_validate_username_normalizes_case() {
        assert_eq!(validate_username("  Caro  ").unwrap(), "caro");
        assert_eq!(validate_username("Admin").unwrap(), "admin");

        assert!(validate_username("").is_err());
        assert!(validate_username("has space").is_err());
        assert!(validate_username(&"x".repeat(60)).is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("1234").is_ok());
        assert!(validate_password("longer password").is_ok());
        assert!(validate_password("123").is_err());
        assert!(validate_password("").is_err());
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert!(validate_amount("price", Money::from_units(9000)).is_ok());
        assert!(validate_amount("price", Money::zero()).is_ok());
        assert!(validate_amount("invoice total", Money::from_scaled(-1)).is_err());
    }

    #[test]
    fn test_validate_tax_bps() {
        assert!(validate_tax_bps(0).is_ok());
        assert!(validate_tax_bps(2100).is_ok());
        assert!(validate_tax_bps(10000).is_ok());
        assert!(validate_tax_bps(10001).is_err());
    }
}
