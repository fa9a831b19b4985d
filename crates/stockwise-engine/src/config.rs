//! Engine configuration.

use std::time::Duration;

use stockwise_core::invoice::DEFAULT_INVOICE_PREFIX;
use stockwise_core::validation::{validate_tax_rate_bps, ValidationResult};
use stockwise_core::{ValidationError, DEFAULT_MAX_SYNC_BATCH};

/// Knobs for checkout, sync and inventory operations.
///
/// ## Example
/// ```rust
/// use std::time::Duration;
/// use stockwise_engine::EngineConfig;
///
/// let config = EngineConfig::default()
///     .request_timeout(Duration::from_secs(10))
///     .invoice_prefix("SW");
/// assert_eq!(config.invoice_prefix, "SW");
/// ```
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Deadline for one checkout, sync batch or inventory operation.
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Invoice numbers are `{prefix}-{seq:08}`.
    /// Default: "INV"
    pub invoice_prefix: String,

    /// Tax rate contained in sale totals, in basis points.
    /// Default: 0
    pub invoice_tax_rate_bps: u32,

    /// Batches with more records are rejected before any work.
    /// Default: 500
    pub max_sync_batch_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            request_timeout: Duration::from_secs(30),
            invoice_prefix: DEFAULT_INVOICE_PREFIX.to_string(),
            invoice_tax_rate_bps: 0,
            max_sync_batch_size: DEFAULT_MAX_SYNC_BATCH,
        }
    }
}

impl EngineConfig {
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn invoice_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.invoice_prefix = prefix.into();
        self
    }

    pub fn invoice_tax_rate_bps(mut self, bps: u32) -> Self {
        self.invoice_tax_rate_bps = bps;
        self
    }

    pub fn max_sync_batch_size(mut self, max: usize) -> Self {
        self.max_sync_batch_size = max;
        self
    }

    pub fn validate(&self) -> ValidationResult<()> {
        if self.invoice_prefix.trim().is_empty() {
            return Err(ValidationError::Required {
                field: "invoice_prefix".to_string(),
            });
        }
        if self.max_sync_batch_size == 0 {
            return Err(ValidationError::MustBePositive {
                field: "max_sync_batch_size".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ValidationError::MustBePositive {
                field: "request_timeout".to_string(),
            });
        }
        validate_tax_rate_bps(self.invoice_tax_rate_bps)
    }
}
