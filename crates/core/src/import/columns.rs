//! Header aliasing shared by the tabular loaders.
//!
//! Headers are matched case-insensitively, ignoring spaces, dashes and
//! underscores. English and Swedish spellings map to the same column;
//! anything unrecognized is kept verbatim in `extra`.

use serde_json::Value;

use crate::vat::{Column, NumericCell, TransactionRow, VatError};

/// Where a header's values go.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Field {
    Cell(Column),
    Id,
    Name,
    Extra(String),
}

impl Field {
    fn for_header(header: &str) -> Self {
        let key: String = header
            .trim_start_matches('\u{feff}')
            .chars()
            .filter(|c| !matches!(c, ' ' | '_' | '-'))
            .flat_map(char::to_lowercase)
            .collect();

        match key.as_str() {
            "amount" | "belopp" | "gross" | "brutto" => Self::Cell(Column::Amount),
            "subamount" | "netamount" | "netto" | "net" => Self::Cell(Column::SubAmount),
            "vat" | "moms" | "vatamount" | "momsbelopp" => Self::Cell(Column::Vat),
            "vatrate" | "momssats" | "rate" => Self::Cell(Column::VatRate),
            "kwh" => Self::Cell(Column::Kwh),
            "id" | "transactionid" => Self::Id,
            "transactionname" | "description" | "name" | "reference" | "beskrivning" => Self::Name,
            _ => Self::Extra(header.trim_start_matches('\u{feff}').trim().to_string()),
        }
    }
}

/// A parsed header row.
#[derive(Debug, Clone)]
pub(crate) struct Header {
    fields: Vec<Field>,
}

impl Header {
    /// Maps header names to fields.
    ///
    /// Fails with [`VatError::MissingHeader`] when every name is blank.
    pub(crate) fn new<'a, I>(names: I) -> Result<Self, VatError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let fields: Vec<Field> = names.into_iter().map(Field::for_header).collect();
        if fields
            .iter()
            .all(|f| matches!(f, Field::Extra(name) if name.is_empty()))
        {
            return Err(VatError::MissingHeader);
        }
        Ok(Self { fields })
    }

    /// Builds a row from cells in header order. Blank records yield `None`.
    pub(crate) fn row<'a, I>(&self, cells: I) -> Option<TransactionRow>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut row = TransactionRow::default();
        let mut blank = true;

        for (field, raw) in self.fields.iter().zip(cells) {
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }
            blank = false;

            match field {
                Field::Cell(column) => {
                    let cell = row.cell_mut(*column);
                    if !cell.is_present() {
                        *cell = NumericCell::parse(raw);
                    }
                }
                Field::Id => {
                    if row.id.is_none() {
                        row.id = Some(raw.to_string());
                    }
                }
                Field::Name => {
                    if row.transaction_name.is_none() {
                        row.transaction_name = Some(raw.to_string());
                    }
                }
                Field::Extra(name) => {
                    if !name.is_empty() {
                        row.extra.insert(name.clone(), Value::String(raw.to_string()));
                    }
                }
            }
        }

        (!blank).then_some(row)
    }
}
