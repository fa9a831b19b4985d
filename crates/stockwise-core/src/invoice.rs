//! # Invoice Numbers and Totals
//!
//! The sequence value itself comes from the database (`invoice_sequences`,
//! bumped atomically inside the checkout transaction). This module only
//! formats it and computes the amounts printed on the invoice.

use crate::money::Money;

/// Default invoice number prefix.
pub const DEFAULT_INVOICE_PREFIX: &str = "INV";

/// Formats a sequence value as `{prefix}-{seq:08}`.
///
/// Zero padding keeps lexical order equal to numeric order up to 10^8.
///
/// ```rust
/// use stockwise_core::invoice::format_invoice_number;
///
/// assert_eq!(format_invoice_number("INV", 42), "INV-00000042");
/// ```
pub fn format_invoice_number(prefix: &str, seq: i64) -> String {
    format!("{}-{:08}", prefix, seq)
}

/// Amounts for a sale and its invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    /// Tax contained in `total`.
    pub tax: Money,
    /// subtotal − discount
    pub total: Money,
}

impl SaleTotals {
    /// Prices are tax-inclusive: tax is extracted from the total, never
    /// added on top of it.
    pub fn compute(subtotal: Money, discount: Money, tax_rate_bps: u32) -> Self {
        let total = subtotal - discount;
        Self {
            subtotal,
            discount,
            tax: total.included_tax(tax_rate_bps),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format() {
        assert_eq!(format_invoice_number("INV", 1), "INV-00000001");
        assert_eq!(format_invoice_number("SW", 123_456_789), "SW-123456789");
    }

    #[test]
    fn test_totals() {
        let t = SaleTotals::compute(Money::from_cents(2000), Money::from_cents(200), 0);
        assert_eq!(t.total.cents(), 1800);
        assert!(t.tax.is_zero());

        let t = SaleTotals::compute(Money::from_cents(2000), Money::from_cents(200), 825);
        assert_eq!(t.total.cents(), 1800);
        assert_eq!(t.tax.cents(), 137);
    }
}
