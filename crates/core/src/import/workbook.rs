//! Spreadsheet workbooks (`.xlsx`, `.xls`, `.ods`).
//!
//! The first sheet is read unless one is named. The first non-blank row is
//! the header; headers use the same aliases as delimited exports.

use std::io::Cursor;

use calamine::{Data, Reader, open_workbook_auto_from_rs};
use tracing::debug;

use super::columns::Header;
use crate::vat::{TransactionRow, VatError};

/// Loads transaction rows from a workbook held in memory.
#[derive(Debug, Clone, Default)]
pub struct WorkbookTransactionLoader {
    sheet: Option<String>,
}

impl WorkbookTransactionLoader {
    /// Creates a loader that reads the first sheet.
    #[must_use]
    pub const fn new() -> Self {
        Self { sheet: None }
    }

    /// Reads the named sheet instead of the first one.
    #[must_use]
    pub fn with_sheet(mut self, name: impl Into<String>) -> Self {
        self.sheet = Some(name.into());
        self
    }

    /// Loads rows from workbook bytes.
    ///
    /// # Errors
    ///
    /// Returns [`VatError::Workbook`] if the bytes are not a readable
    /// workbook or the named sheet does not exist, and
    /// [`VatError::MissingHeader`] if the sheet has no header row.
    pub fn load(&self, bytes: &[u8]) -> Result<Vec<TransactionRow>, VatError> {
        let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;

        let range = match &self.sheet {
            Some(name) => workbook.worksheet_range(name)?,
            None => workbook
                .worksheet_range_at(0)
                .ok_or(VatError::MissingHeader)??,
        };

        let mut lines = range
            .rows()
            .map(|cells| cells.iter().map(cell_text).collect::<Vec<String>>())
            .skip_while(|cells| cells.iter().all(|c| c.trim().is_empty()));

        let header_cells = lines.next().ok_or(VatError::MissingHeader)?;
        let header = Header::new(header_cells.iter().map(String::as_str))?;

        let rows: Vec<TransactionRow> = lines
            .filter_map(|cells| header.row(cells.iter().map(String::as_str)))
            .collect();

        debug!(
            rows = rows.len(),
            sheet = self.sheet.as_deref().unwrap_or("<first>"),
            "Loaded workbook transaction rows"
        );
        Ok(rows)
    }
}

/// Renders a cell as text for the lenient numeric parser.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vat::NumericCell;
    use rust_decimal_macros::dec;
    use rust_xlsxwriter::Workbook;
    use serde_json::Value;

    fn workbook_bytes(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
        let mut workbook = Workbook::new();
        for (name, rows) in sheets {
            let worksheet = workbook.add_worksheet();
            worksheet.set_name(*name).unwrap();
            for (r, row) in rows.iter().enumerate() {
                for (c, value) in row.iter().enumerate() {
                    let (r, c) = (u32::try_from(r).unwrap(), u16::try_from(c).unwrap());
                    match value.parse::<f64>() {
                        Ok(number) => worksheet.write_number(r, c, number).unwrap(),
                        Err(_) => worksheet.write_string(r, c, *value).unwrap(),
                    };
                }
            }
        }
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_loads_first_sheet_with_aliases() {
        let bytes = workbook_bytes(&[(
            "Transaktioner",
            vec![
                vec!["id", "Belopp", "Netto", "Moms", "Momssats", "Beskrivning", "kWh", "Station"],
                vec!["TX001", "81.45", "65.16", "16.29", "25", "Elbilsladdning", "20.5", "Station 1"],
                vec!["TX003", "-507.7", "-406.16", "-101.54", "25", "Plattformsavgift", "", ""],
            ],
        )]);
        let rows = WorkbookTransactionLoader::new().load(&bytes).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id.as_deref(), Some("TX001"));
        assert_eq!(rows[0].amount, NumericCell::Value(dec!(81.45)));
        assert_eq!(rows[0].vat_rate, NumericCell::Value(dec!(25)));
        assert_eq!(rows[0].kwh, NumericCell::Value(dec!(20.5)));
        assert_eq!(rows[0].extra["Station"], Value::String("Station 1".into()));
        assert_eq!(rows[1].amount, NumericCell::Value(dec!(-507.7)));
        assert_eq!(rows[1].kwh, NumericCell::Missing);
    }

    #[test]
    fn test_header_may_follow_blank_rows() {
        let bytes = workbook_bytes(&[(
            "Blad1",
            vec![vec![""], vec!["amount", "vat"], vec!["10", "2"]],
        )]);
        let rows = WorkbookTransactionLoader::new().load(&bytes).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].vat, NumericCell::Value(dec!(2)));
    }

    #[test]
    fn test_named_sheet() {
        let bytes = workbook_bytes(&[
            ("Info", vec![vec!["Rapport"]]),
            ("Data", vec![vec!["amount", "vat"], vec!["125", "25"]]),
        ]);
        let rows = WorkbookTransactionLoader::new()
            .with_sheet("Data")
            .load(&bytes)
            .unwrap();
        assert_eq!(rows[0].amount, NumericCell::Value(dec!(125)));
    }

    #[test]
    fn test_unknown_sheet_is_an_error() {
        let bytes = workbook_bytes(&[("Data", vec![vec!["amount"], vec!["1"]])]);
        let err = WorkbookTransactionLoader::new()
            .with_sheet("Saknas")
            .load(&bytes)
            .unwrap_err();
        assert!(matches!(err, VatError::Workbook(_)));
    }

    #[test]
    fn test_empty_sheet_has_no_header() {
        let bytes = workbook_bytes(&[("Tom", Vec::new())]);
        let err = WorkbookTransactionLoader::new().load(&bytes).unwrap_err();
        assert!(matches!(err, VatError::MissingHeader));
    }

    #[test]
    fn test_non_workbook_bytes_are_rejected() {
        let err = WorkbookTransactionLoader::new()
            .load(b"amount,vat\n1,2\n")
            .unwrap_err();
        assert!(matches!(err, VatError::Workbook(_)));
    }
}
