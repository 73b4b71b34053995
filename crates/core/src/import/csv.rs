//! Delimited text exports.
//!
//! Spreadsheet exports arrive comma- or semicolon-separated, with English
//! or Swedish headers.

use std::io::Read;

use tracing::debug;

use super::columns::Header;
use crate::vat::{TransactionRow, VatError};

/// Loads transaction rows from delimited text with a header row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvTransactionLoader {
    delimiter: Option<u8>,
}

impl CsvTransactionLoader {
    /// Creates a loader that detects the delimiter from the header line.
    #[must_use]
    pub const fn new() -> Self {
        Self { delimiter: None }
    }

    /// Forces a delimiter.
    #[must_use]
    pub const fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Loads rows from a reader.
    ///
    /// # Errors
    ///
    /// Returns [`VatError::Csv`] if the input is not readable text and
    /// [`VatError::MissingHeader`] if it has no header row.
    pub fn load<R: Read>(&self, mut reader: R) -> Result<Vec<TransactionRow>, VatError> {
        let mut input = String::new();
        reader
            .read_to_string(&mut input)
            .map_err(|e| VatError::Csv(csv::Error::from(e)))?;
        self.load_str(&input)
    }

    /// Loads rows from text.
    ///
    /// # Errors
    ///
    /// Returns [`VatError::MissingHeader`] if the text has no header row and
    /// [`VatError::Csv`] if a record cannot be read.
    pub fn load_str(&self, input: &str) -> Result<Vec<TransactionRow>, VatError> {
        let delimiter = self.delimiter.unwrap_or_else(|| detect_delimiter(input));
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input.as_bytes());

        let header = Header::new(reader.headers()?.iter())?;

        let mut rows = Vec::new();
        for record in reader.records() {
            if let Some(row) = header.row(record?.iter()) {
                rows.push(row);
            }
        }

        debug!(
            rows = rows.len(),
            delimiter = %char::from(delimiter),
            "Loaded delimited transaction rows"
        );
        Ok(rows)
    }
}

/// Semicolon when the header line has more semicolons than commas.
fn detect_delimiter(input: &str) -> u8 {
    let header = input.lines().find(|line| !line.trim().is_empty()).unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas { b';' } else { b',' }
}
