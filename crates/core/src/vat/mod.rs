//! VAT reconciliation.
//!
//! This module turns one batch of transaction rows into a VAT summary and
//! a validation outcome:
//! - Boundary coercion of loosely typed rows
//! - Validation of metadata and rows into errors and warnings
//! - Aggregation by VAT rate and by sales/costs
//! - BAS account mapping for the breakdown

pub mod aggregation;
pub mod bas;
pub mod batch;
pub mod cell;
pub mod error;
pub mod org_number;
pub mod period;
pub mod service;
pub mod types;
pub mod validation;

#[cfg(test)]
mod tests;

pub use aggregation::Aggregator;
pub use batch::{Batch, BatchRow, CellProblem, CellProblemKind, magnitude_ceiling};
pub use cell::NumericCell;
pub use error::VatError;
pub use org_number::{OrgNumber, OrgNumberError};
pub use period::{PeriodError, ReportingPeriod};
pub use service::{VatProcessor, process};
pub use types::{
    BreakdownLine, Column, ProcessingResult, Transaction, TransactionKind, TransactionRow,
    VatAmounts, VatSummary,
};
pub use validation::{IssueCode, Severity, ValidationIssue, ValidationResult, Validator};
