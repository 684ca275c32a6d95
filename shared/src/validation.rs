//! Validation helpers shared by the services and the HTTP layer

/// Validate an order line quantity (must be strictly positive)
pub fn validate_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate a manual stock adjustment delta.
///
/// Zero is an input error, not a valid no-op: every adjustment must move
/// stock in some direction so the ledger entry has a meaningful type.
pub fn validate_stock_delta(delta: i32) -> Result<(), &'static str> {
    if delta == 0 {
        return Err("Stock adjustment must not be zero");
    }
    Ok(())
}

/// Validate a free-text reason for a stock adjustment
pub fn validate_reason(reason: &str) -> Result<(), &'static str> {
    let trimmed = reason.trim();
    if trimmed.is_empty() {
        return Err("Reason must not be empty");
    }
    if trimmed.len() > 255 {
        return Err("Reason must be at most 255 characters");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    if email.contains('@') && email.contains('.') && email.len() >= 5 {
        Ok(())
    } else {
        Err("Invalid email format")
    }
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.len() < 8 {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(99).is_ok());
        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_stock_delta() {
        assert!(validate_stock_delta(10).is_ok());
        assert!(validate_stock_delta(-10).is_ok());
        assert!(validate_stock_delta(0).is_err());
    }

    #[test]
    fn test_validate_reason() {
        assert!(validate_reason("spoilage").is_ok());
        assert!(validate_reason("  ").is_err());
        assert!(validate_reason(&"x".repeat(256)).is_err());
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("cashier@cafe.com").is_ok());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("no@domain").is_err());
    }

    #[test]
    fn test_validate_password() {
        assert!(validate_password("password123").is_ok());
        assert!(validate_password("short").is_err());
    }
}
