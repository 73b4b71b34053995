//! VAT processing service.

use rust_decimal::Decimal;
use tracing::{debug, info};
use vatrec_shared::VatConfig;

use super::aggregation::Aggregator;
use super::batch::Batch;
use super::types::{ProcessingResult, TransactionRow};
use super::validation::Validator;

/// Validates and aggregates transaction batches.
///
/// Holds only configuration; each call builds a fresh result.
#[derive(Debug, Clone)]
pub struct VatProcessor {
    validator: Validator,
    max_amount: Decimal,
}

impl Default for VatProcessor {
    fn default() -> Self {
        Self::new(&VatConfig::default())
    }
}

impl VatProcessor {
    /// Creates a processor from configuration.
    #[must_use]
    pub fn new(config: &VatConfig) -> Self {
        Self {
            validator: Validator::new(config),
            max_amount: config.max_amount,
        }
    }

    /// Processes one batch.
    ///
    /// Validation and aggregation are independent passes over the same
    /// coerced rows; a rejected batch still carries a full summary.
    #[must_use]
    pub fn process(
        &self,
        rows: &[TransactionRow],
        company_name: &str,
        org_number: &str,
        period: &str,
    ) -> ProcessingResult {
        debug!(rows = rows.len(), %period, "Processing VAT batch");

        let batch = Batch::from_rows_with_limit(rows, self.max_amount);
        let validation = self
            .validator
            .validate(&batch, company_name, org_number, period);
        let summary = Aggregator::aggregate(batch.transactions());

        info!(
            rows = batch.len(),
            rates = summary.by_rate.len(),
            is_valid = validation.is_valid(),
            errors = validation.errors().count(),
            warnings = validation.warnings().count(),
            "VAT batch processed"
        );

        ProcessingResult {
            company_name: company_name.to_string(),
            org_number: org_number.to_string(),
            period: period.to_string(),
            summary,
            validation,
        }
    }
}

/// Processes one batch with the default configuration.
#[must_use]
pub fn process(
    rows: &[TransactionRow],
    company_name: &str,
    org_number: &str,
    period: &str,
) -> ProcessingResult {
    VatProcessor::default().process(rows, company_name, org_number, period)
}
