//! # Validation Module
//!
//! Input validation for checkout carts, offline records and stock operations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: HTTP (axum Json extractor)                                    │
//! │  └── Type validation (deserialization)                                  │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                   │
//! │  ├── Cart shape, quantities, prices                                     │
//! │  └── Offline record shape, batch size                                   │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: SQLite                                                        │
//! │  ├── CHECK (quantity >= 0)                                              │
//! │  ├── UNIQUE (merchant_id, local_id)                                     │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use stockwise_core::validation::{validate_quantity, validate_batch_size};
//!
//! assert!(validate_quantity(5).is_ok());
//! assert!(validate_batch_size(10, 500).is_ok());
//! ```

use crate::dto::{CheckoutLine, OfflineSaleRecord};
use crate::error::ValidationError;
use crate::{MAX_CART_ITEMS, MAX_ITEM_QUANTITY, MAX_LOCAL_ID_LEN, MAX_NOTES_LEN, MAX_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a required identifier (shop id, item id, local id).
pub fn validate_id(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.len() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

pub fn validate_notes(notes: Option<&str>) -> ValidationResult<()> {
    match notes {
        Some(n) if n.len() > MAX_NOTES_LEN => Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        }),
        _ => Ok(()),
    }
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a price in cents. Zero is allowed (free items).
///
/// ```rust
/// use stockwise_core::validation::validate_price_cents;
///
/// assert!(validate_price_cents(1099).is_ok());
/// assert!(validate_price_cents(0).is_ok());
/// assert!(validate_price_cents(-100).is_err());
/// assert!(validate_price_cents(i64::MAX / 2).is_err());
/// ```
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE_CENTS).contains(&cents) {
        return Err(ValidationError::OutOfRange {
            field: "unitPriceCents".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates a signed stock adjustment. Zero changes nothing and is rejected.
pub fn validate_adjustment_delta(delta: i64) -> ValidationResult<()> {
    if delta == 0 || delta.abs() > MAX_ITEM_QUANTITY * 1000 {
        return Err(ValidationError::OutOfRange {
            field: "delta".to_string(),
            min: -MAX_ITEM_QUANTITY * 1000,
            max: MAX_ITEM_QUANTITY * 1000,
        });
    }

    Ok(())
}

/// Validates a stock-in or transfer quantity. Bulk receipts are allowed
/// past the per-line cart limit.
pub fn validate_stock_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY * 1000 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY * 1000,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points (0% to 100%).
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10000,
        });
    }

    Ok(())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates a checkout cart before any database work.
///
/// ## Rules
/// - At least one line, at most MAX_CART_ITEMS
/// - Every line has an item id and a valid quantity
/// - Client-supplied unit prices are within 0..=MAX_PRICE_CENTS
pub fn validate_cart(lines: &[CheckoutLine]) -> ValidationResult<()> {
    if lines.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if lines.len() > MAX_CART_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_CART_ITEMS,
        });
    }

    for line in lines {
        validate_id("itemId", &line.item_id, MAX_LOCAL_ID_LEN)?;
        validate_quantity(line.quantity)?;
        if let Some(price) = line.unit_price_cents {
            validate_price_cents(price)?;
        }
    }

    Ok(())
}

/// Validates one offline record. Failures are local to that record.
pub fn validate_offline_record(record: &OfflineSaleRecord) -> ValidationResult<()> {
    validate_id("localId", &record.local_id, MAX_LOCAL_ID_LEN)?;
    validate_id("shopId", &record.shop_id, MAX_LOCAL_ID_LEN)?;

    if record.items.is_empty() {
        return Err(ValidationError::Required {
            field: "items".to_string(),
        });
    }

    if record.items.len() > MAX_CART_ITEMS {
        return Err(ValidationError::TooMany {
            field: "items".to_string(),
            max: MAX_CART_ITEMS,
        });
    }

    for line in &record.items {
        validate_id("itemId", &line.item_id, MAX_LOCAL_ID_LEN)?;
        validate_quantity(line.quantity)?;
    }

    validate_notes(record.notes.as_deref())
}

/// Rejects batches above the configured limit before any record is touched.
pub fn validate_batch_size(len: usize, max: usize) -> ValidationResult<()> {
    if len > max {
        return Err(ValidationError::TooMany {
            field: "sales".to_string(),
            max,
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
    use crate::dto::OfflineSaleLine;
    use crate::types::PaymentType;
    use chrono::Utc;

    fn line(item: &str, qty: i64) -> CheckoutLine {
        CheckoutLine {
            item_id: item.to_string(),
            quantity: qty,
            unit_price_cents: None,
        }
    }

    fn record(local_id: &str, items: Vec<OfflineSaleLine>) -> OfflineSaleRecord {
        OfflineSaleRecord {
            local_id: local_id.to_string(),
            shop_id: "shop-1".to_string(),
            items,
            total_amount_cents: 0,
            payment_type: PaymentType::Cash,
            timestamp: Utc::now(),
            customer_id: None,
            notes: None,
        }
    }

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(validate_quantity(0).is_err());
        assert!(validate_quantity(-1).is_err());
        assert!(validate_quantity(1000).is_err());
    }

    #[test]
    fn test_validate_cart() {
        assert!(validate_cart(&[line("a", 2), line("b", 1)]).is_ok());

        assert!(matches!(
            validate_cart(&[]),
            Err(ValidationError::Required { .. })
        ));
        assert!(validate_cart(&[line("", 1)]).is_err());
        assert!(validate_cart(&[line("a", 0)]).is_err());

        let mut priced = line("a", 1);
        priced.unit_price_cents = Some(-1);
        assert!(validate_cart(&[priced]).is_err());

        let mut inflated = line("a", 3);
        inflated.unit_price_cents = Some(i64::MAX / 2);
        assert!(matches!(
            validate_cart(&[inflated]),
            Err(ValidationError::OutOfRange { .. })
        ));

        let mut ceiling = line("a", MAX_ITEM_QUANTITY);
        ceiling.unit_price_cents = Some(MAX_PRICE_CENTS);
        assert!(validate_cart(&[ceiling]).is_ok());

        let big: Vec<_> = (0..=MAX_CART_ITEMS).map(|i| line(&i.to_string(), 1)).collect();
        assert!(matches!(
            validate_cart(&big),
            Err(ValidationError::TooMany { .. })
        ));
    }

    #[test]
    fn test_validate_offline_record() {
        let ok = record(
            "local-1",
            vec![OfflineSaleLine {
                item_id: "a".to_string(),
                quantity: 1,
            }],
        );
        assert!(validate_offline_record(&ok).is_ok());

        assert!(validate_offline_record(&record("local-2", vec![])).is_err());
        assert!(validate_offline_record(&record(
            "  ",
            vec![OfflineSaleLine {
                item_id: "a".to_string(),
                quantity: 1,
            }]
        ))
        .is_err());
    }

    #[test]
    fn test_validate_batch_size() {
        assert!(validate_batch_size(0, 500).is_ok());
        assert!(validate_batch_size(500, 500).is_ok());
        assert!(validate_batch_size(501, 500).is_err());
    }

    #[test]
    fn test_validate_adjustment_delta() {
        assert!(validate_adjustment_delta(-3).is_ok());
        assert!(validate_adjustment_delta(12).is_ok());
        assert!(validate_adjustment_delta(0).is_err());
    }

    #[test]
    fn test_validate_stock_quantity() {
        assert!(validate_stock_quantity(5000).is_ok());
        assert!(validate_stock_quantity(0).is_err());
        assert!(validate_stock_quantity(-1).is_err());
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(825).is_ok());
        assert!(validate_tax_rate_bps(10001).is_err());
    }
}
