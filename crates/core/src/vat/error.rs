//! VAT engine error types.
//!
//! Only input that cannot be coerced into rows at all is an error. Findings
//! on well-formed rows are reported through validation instead.

use thiserror::Error;

/// Errors that can occur before a batch reaches the engine.
#[derive(Debug, Error)]
pub enum VatError {
    /// The transaction list is not a list.
    #[error("Transactions must be a list of row objects")]
    NotAList,

    /// A row is not an object.
    #[error("Row {row} is not an object")]
    RowNotObject {
        /// 1-based row number.
        row: usize,
    },

    /// A row object could not be read.
    #[error("Row {row} could not be read: {reason}")]
    MalformedRow {
        /// 1-based row number.
        row: usize,
        /// Underlying reason.
        reason: String,
    },

    /// Tabular input has no header row.
    #[error("Tabular input has no header row")]
    MissingHeader,

    /// Tabular input could not be parsed.
    #[error("Tabular input could not be read: {0}")]
    Csv(#[from] csv::Error),

    /// A spreadsheet workbook could not be opened or read.
    #[error("Workbook could not be read: {0}")]
    Workbook(#[from] calamine::Error),
}
