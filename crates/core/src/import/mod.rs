//! Input adapters.
//!
//! Each adapter turns one wire shape into [`TransactionRow`]s for the VAT
//! engine. Adapters reject only input that has no row structure at all;
//! bad cells are left for validation to report.
//!
//! [`TransactionRow`]: crate::vat::TransactionRow

mod columns;
pub mod csv;
pub mod json;
pub mod normalized;
pub mod workbook;

pub use self::csv::CsvTransactionLoader;
pub use self::json::rows_from_value;
pub use self::normalized::{NormalizedTransaction, rows_from_normalized};
pub use self::workbook::WorkbookTransactionLoader;
