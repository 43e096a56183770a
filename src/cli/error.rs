// Error handling utilities for consistent error messages and exit codes

use std::process;
use crate::models::NewProduct;

/// Exit with a user error (exit code 1)
/// User errors are for invalid input, missing orders, etc.
pub fn user_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    process::exit(1);
}

/// Validate that a string is not empty
pub fn validate_non_empty(value: &str, field_name: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} cannot be empty", field_name))
    } else {
        Ok(())
    }
}

/// Validate an order id supplied on the command line
pub fn validate_order_id(id: &str) -> Result<(), String> {
    validate_non_empty(id, "Order ID")?;
    if id.chars().any(char::is_whitespace) {
        return Err(format!("Invalid order ID: '{}'. Order IDs cannot contain whitespace.", id));
    }
    Ok(())
}

/// Validate a price or total: finite and not negative
pub fn validate_amount(amount: f64, field_name: &str) -> Result<f64, String> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(amount)
    } else {
        Err(format!("Invalid {}: {}. Must be a non-negative number.", field_name, amount))
    }
}

/// Parse a product spec of the form `Title=Price` or `Title=Price=ImageUrl`
pub fn parse_product_spec(spec: &str) -> Result<NewProduct, String> {
    let mut parts = spec.splitn(3, '=');
    let title = parts.next().unwrap_or("").trim();
    let price_str = parts.next().ok_or_else(|| {
        format!("Invalid product '{}'. Expected Title=Price or Title=Price=ImageUrl.", spec)
    })?;
    let image = parts.next().map(str::trim).filter(|s| !s.is_empty());

    validate_non_empty(title, "Product title")?;
    let price = price_str
        .trim()
        .trim_start_matches('$')
        .parse::<f64>()
        .map_err(|_| format!("Invalid price '{}' for product '{}'.", price_str.trim(), title))?;
    let price = validate_amount(price, "price")?;

    let mut product = NewProduct::new(title, price);
    product.image = image.map(str::to_string);
    Ok(product)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_non_empty() {
        assert!(validate_non_empty("test", "field").is_ok());
        assert!(validate_non_empty("", "field").is_err());
        assert!(validate_non_empty("   ", "field").is_err());
    }

    #[test]
    fn test_validate_order_id() {
        assert!(validate_order_id("order_1").is_ok());
        assert!(validate_order_id("").is_err());
        assert!(validate_order_id("two words").is_err());
    }

    #[test]
    fn test_validate_amount() {
        assert_eq!(validate_amount(0.0, "price"), Ok(0.0));
        assert_eq!(validate_amount(12.5, "price"), Ok(12.5));
        assert!(validate_amount(-1.0, "price").is_err());
        assert!(validate_amount(f64::NAN, "price").is_err());
    }

    #[test]
    fn test_parse_product_spec() {
        let product = parse_product_spec("Desk Lamp=19.99").unwrap();
        assert_eq!(product.title, "Desk Lamp");
        assert_eq!(product.price, 19.99);
        assert_eq!(product.image, None);

        let product = parse_product_spec("Rug=$80=https://img.example/rug.png").unwrap();
        assert_eq!(product.price, 80.0);
        assert_eq!(product.image.as_deref(), Some("https://img.example/rug.png"));
    }

    #[test]
    fn test_parse_product_spec_errors() {
        assert!(parse_product_spec("Lamp").is_err());
        assert!(parse_product_spec("=5").is_err());
        assert!(parse_product_spec("Lamp=cheap").is_err());
        assert!(parse_product_spec("Lamp=-3").is_err());
    }
}
