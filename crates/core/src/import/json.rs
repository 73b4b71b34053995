//! JSON row lists.

use serde::Deserialize;
use serde_json::Value;

use crate::vat::{TransactionRow, VatError};

/// Reads a JSON array of row objects.
///
/// # Errors
///
/// Returns [`VatError::NotAList`] when `value` is not an array and
/// [`VatError::RowNotObject`] when an element is not an object.
pub fn rows_from_value(value: &Value) -> Result<Vec<TransactionRow>, VatError> {
    let Value::Array(items) = value else {
        return Err(VatError::NotAList);
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| {
            if !item.is_object() {
                return Err(VatError::RowNotObject { row: index + 1 });
            }
            TransactionRow::deserialize(item).map_err(|e| VatError::MalformedRow {
                row: index + 1,
                reason: e.to_string(),
            })
        })
        .collect()
}
