//! Batch validation.
//!
//! Checks never abort: every finding becomes a [`ValidationIssue`] with a
//! severity and a stable code. Batch-level checks run first, then per-row
//! checks in row order, and issues keep that order.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use vatrec_shared::VatConfig;

use super::batch::{Batch, BatchRow};
use super::org_number::OrgNumber;
use super::period::ReportingPeriod;
use super::types::Column;

/// How much an issue matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocks the batch from being a final report.
    Error,
    /// Advisory only.
    Warning,
}

/// Stable, machine-readable issue codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum IssueCode {
    /// Organization number malformed or failing its checksum.
    InvalidOrgNumber,
    /// Period not `YYYY-MM` or out of range.
    InvalidPeriod,
    /// Company name blank.
    MissingCompanyName,
    /// A required column is absent from the batch.
    MissingColumns,
    /// The batch has no rows.
    EmptyBatch,
    /// `amount` differs from `subAmount + vat` beyond tolerance.
    AmountMismatch,
    /// `vat` and `amount` have opposite signs.
    VatSignMismatch,
    /// VAT rate negative or outside the known set.
    UnusualVatRate,
    /// A cell was blank or unparseable and treated as zero.
    InvalidValue,
}

impl IssueCode {
    /// Returns the code as it appears on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidOrgNumber => "INVALID_ORG_NUMBER",
            Self::InvalidPeriod => "INVALID_PERIOD",
            Self::MissingCompanyName => "MISSING_COMPANY_NAME",
            Self::MissingColumns => "MISSING_COLUMNS",
            Self::EmptyBatch => "EMPTY_BATCH",
            Self::AmountMismatch => "AMOUNT_MISMATCH",
            Self::VatSignMismatch => "VAT_SIGN_MISMATCH",
            Self::UnusualVatRate => "UNUSUAL_VAT_RATE",
            Self::InvalidValue => "INVALID_VALUE",
        }
    }
}

impl std::fmt::Display for IssueCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Error or warning.
    #[serde(skip)]
    pub severity: Severity,
    /// Stable code.
    pub code: IssueCode,
    /// Human-readable description.
    pub message: String,
    /// Transaction id the issue refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// Field the issue refers to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

impl ValidationIssue {
    /// Creates an error.
    #[must_use]
    pub fn error(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            code,
            message: message.into(),
            reference: None,
            field: None,
        }
    }

    /// Creates a warning.
    #[must_use]
    pub fn warning(code: IssueCode, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(code, message)
        }
    }

    /// Attaches a transaction reference.
    #[must_use]
    pub fn with_reference(mut self, reference: impl Into<String>) -> Self {
        self.reference = Some(reference.into());
        self
    }

    /// Attaches a field name.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }
}

/// All findings for a batch, in the order the checks ran.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    /// Appends an issue.
    pub fn push(&mut self, issue: ValidationIssue) {
        self.issues.push(issue);
    }

    /// Returns true iff there are no errors.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    /// Returns every issue in check order.
    #[must_use]
    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }

    /// Iterates over errors.
    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.by_severity(Severity::Error)
    }

    /// Iterates over warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.by_severity(Severity::Warning)
    }

    /// Returns true if any issue carries `code`.
    #[must_use]
    pub fn has_code(&self, code: IssueCode) -> bool {
        self.issues.iter().any(|issue| issue.code == code)
    }

    fn by_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues
            .iter()
            .filter(move |issue| issue.severity == severity)
    }
}

impl Serialize for ValidationResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Wire<'a> {
            is_valid: bool,
            errors: Vec<&'a ValidationIssue>,
            warnings: Vec<&'a ValidationIssue>,
        }

        Wire {
            is_valid: self.is_valid(),
            errors: self.errors().collect(),
            warnings: self.warnings().collect(),
        }
        .serialize(serializer)
    }
}

/// Runs the batch checks.
#[derive(Debug, Clone)]
pub struct Validator {
    tolerance: Decimal,
    known_rates: BTreeSet<i64>,
    min_year: i32,
    max_year: i32,
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(&VatConfig::default())
    }
}

impl Validator {
    /// Creates a validator from configuration.
    #[must_use]
    pub fn new(config: &VatConfig) -> Self {
        Self {
            tolerance: config.tolerance.abs(),
            known_rates: config.known_rates.iter().copied().collect(),
            min_year: config.min_year,
            max_year: config.max_year,
        }
    }

    /// Validates a batch and its report metadata.
    #[must_use]
    pub fn validate(
        &self,
        batch: &Batch,
        company_name: &str,
        org_number: &str,
        period: &str,
    ) -> ValidationResult {
        let mut result = ValidationResult::default();

        if let Err(e) = OrgNumber::parse(org_number) {
            result.push(
                ValidationIssue::error(IssueCode::InvalidOrgNumber, e.to_string())
                    .with_field("orgNumber"),
            );
        }

        if let Err(e) = ReportingPeriod::parse(period, self.min_year, self.max_year) {
            result.push(
                ValidationIssue::error(IssueCode::InvalidPeriod, e.to_string()).with_field("period"),
            );
        }

        if company_name.trim().is_empty() {
            result.push(
                ValidationIssue::error(IssueCode::MissingCompanyName, "Company name is missing")
                    .with_field("companyName"),
            );
        }

        let missing = batch.missing_required_columns();
        if !missing.is_empty() {
            let names: Vec<&str> = missing.iter().map(|c| c.name()).collect();
            result.push(
                ValidationIssue::error(
                    IssueCode::MissingColumns,
                    format!("Missing required columns: {}", names.join(", ")),
                )
                .with_field(names.join(",")),
            );
        }

        if batch.is_empty() {
            result.push(ValidationIssue::warning(
                IssueCode::EmptyBatch,
                "Batch contains no transactions",
            ));
        }

        for row in batch.rows() {
            self.check_row(row, &mut result);
        }

        result
    }

    fn check_row(&self, row: &BatchRow, result: &mut ValidationResult) {
        let tx = &row.transaction;

        for problem in &row.problems {
            result.push(
                ValidationIssue::warning(IssueCode::InvalidValue, problem.describe(&tx.id))
                    .with_reference(&tx.id)
                    .with_field(problem.column.name()),
            );
        }

        if row.arithmetic_complete {
            let expected = tx.recomputed_gross();
            let difference = (tx.amount - expected).abs();
            if difference > self.tolerance {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::AmountMismatch,
                        format!(
                            "Transaction {}: amount {} differs from subAmount + vat ({expected}) by {difference}",
                            tx.id, tx.amount
                        ),
                    )
                    .with_reference(&tx.id)
                    .with_field(Column::Amount.name()),
                );
            }

            if !tx.vat.is_zero()
                && !tx.amount.is_zero()
                && tx.vat.is_sign_negative() != tx.amount.is_sign_negative()
            {
                result.push(
                    ValidationIssue::warning(
                        IssueCode::VatSignMismatch,
                        format!(
                            "Transaction {}: vat {} has the opposite sign of amount {}",
                            tx.id, tx.vat, tx.amount
                        ),
                    )
                    .with_reference(&tx.id)
                    .with_field(Column::Vat.name()),
                );
            }
        }

        if tx.vat_rate < 0 || !self.known_rates.contains(&tx.vat_rate) {
            let message = if tx.vat_rate < 0 {
                format!("Transaction {}: negative VAT rate {}%", tx.id, tx.vat_rate)
            } else {
                format!("Transaction {}: unusual VAT rate {}%", tx.id, tx.vat_rate)
            };
            result.push(
                ValidationIssue::warning(IssueCode::UnusualVatRate, message)
                    .with_reference(&tx.id)
                    .with_field(Column::VatRate.name()),
            );
        }
    }
}
