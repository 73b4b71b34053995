//! Normalized transactions produced by upstream document analysis.
//!
//! These use snake_case names and carry a `type` hint. Amounts may all be
//! given as positive numbers with `type` saying which side they belong to;
//! the engine classifies by sign, so cost lines are turned negative here.

use serde::Deserialize;
use serde_json::Value;

use crate::vat::cell::lenient_text;
use crate::vat::{Column, NumericCell, TransactionRow};

/// One transaction in the normalized shape.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NormalizedTransaction {
    /// Gross amount.
    #[serde(default)]
    pub amount: NumericCell,
    /// Net amount.
    #[serde(default)]
    pub net_amount: NumericCell,
    /// VAT portion.
    #[serde(default)]
    pub vat_amount: NumericCell,
    /// VAT rate, in percent or as a fraction.
    #[serde(default)]
    pub vat_rate: NumericCell,
    /// Free-text label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
    /// Booking date as given.
    #[serde(default, deserialize_with = "lenient_text")]
    pub date: Option<String>,
    /// `sale` (default) or a cost marker such as `cost` or `purchase`.
    #[serde(default, rename = "type", deserialize_with = "lenient_text")]
    pub kind: Option<String>,
}

impl NormalizedTransaction {
    /// Returns true when `type` marks the line as a cost.
    #[must_use]
    pub fn is_cost(&self) -> bool {
        self.kind.as_deref().is_some_and(|kind| {
            let kind = kind.to_lowercase();
            ["cost", "costs", "purchase", "expense", "kostnad", "inköp"].contains(&kind.as_str())
        })
    }

    /// Converts into an engine row. `date` and `type` are kept as extras.
    #[must_use]
    pub fn into_row(self) -> TransactionRow {
        let is_cost = self.is_cost();
        let mut row = TransactionRow {
            id: None,
            amount: self.amount,
            sub_amount: self.net_amount,
            vat: self.vat_amount,
            vat_rate: self.vat_rate,
            transaction_name: self.description,
            ..TransactionRow::default()
        };

        if is_cost && row.amount.value().is_some_and(|v| v.is_sign_positive() && !v.is_zero()) {
            for column in [Column::Amount, Column::SubAmount, Column::Vat] {
                let cell = row.cell_mut(column);
                if let NumericCell::Value(v) = cell {
                    *v = -*v;
                }
            }
        }

        if let Some(date) = self.date {
            row.extra.insert("date".to_string(), Value::String(date));
        }
        if let Some(kind) = self.kind {
            row.extra.insert("type".to_string(), Value::String(kind));
        }
        row
    }
}

/// Converts a list of normalized transactions into engine rows.
#[must_use]
pub fn rows_from_normalized(transactions: Vec<NormalizedTransaction>) -> Vec<TransactionRow> {
    transactions
        .into_iter()
        .map(NormalizedTransaction::into_row)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn parse(value: Value) -> NormalizedTransaction {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_sale_maps_fields() {
        let row = parse(json!({
            "amount": 81.45,
            "net_amount": 65.16,
            "vat_amount": 16.29,
            "vat_rate": 0.25,
            "description": "Laddning",
            "date": "2025-12-03",
            "type": "sale"
        }))
        .into_row();

        assert_eq!(row.amount, NumericCell::Value(dec!(81.45)));
        assert_eq!(row.sub_amount, NumericCell::Value(dec!(65.16)));
        assert_eq!(row.vat, NumericCell::Value(dec!(16.29)));
        assert_eq!(row.vat_rate, NumericCell::Value(dec!(0.25)));
        assert_eq!(row.transaction_name.as_deref(), Some("Laddning"));
        assert_eq!(row.extra["date"], json!("2025-12-03"));
        assert_eq!(row.extra["type"], json!("sale"));
    }

    #[test]
    fn test_positive_cost_is_negated() {
        let row = parse(json!({
            "amount": 507.70,
            "net_amount": 406.16,
            "vat_amount": 101.54,
            "vat_rate": 25,
            "type": "cost"
        }))
        .into_row();

        assert_eq!(row.amount, NumericCell::Value(dec!(-507.70)));
        assert_eq!(row.sub_amount, NumericCell::Value(dec!(-406.16)));
        assert_eq!(row.vat, NumericCell::Value(dec!(-101.54)));
    }

    #[test]
    fn test_signed_cost_is_kept() {
        let row = parse(json!({
            "amount": -20.32,
            "net_amount": -20.32,
            "vat_amount": 0,
            "vat_rate": 0,
            "type": "Cost"
        }))
        .into_row();

        assert_eq!(row.amount, NumericCell::Value(dec!(-20.32)));
    }

    #[rstest]
    #[case("INKÖP")]
    #[case("Inköp")]
    #[case("Kostnad")]
    #[case("PURCHASE")]
    #[case("expense")]
    fn test_cost_markers_ignore_case(#[case] kind: &str) {
        let tx = parse(json!({ "amount": 125, "net_amount": 100, "vat_amount": 25, "type": kind }));
        assert!(tx.is_cost());
        assert_eq!(tx.into_row().amount, NumericCell::Value(dec!(-125)));
    }

    #[rstest]
    #[case("sale")]
    #[case("försäljning")]
    #[case("inköpt")]
    fn test_other_kinds_are_not_costs(#[case] kind: &str) {
        assert!(!parse(json!({ "amount": 1, "type": kind })).is_cost());
    }

    #[test]
    fn test_null_fields_are_missing() {
        let tx = parse(json!({ "amount": 10, "date": null }));
        assert!(tx.date.is_none());
        assert!(!tx.is_cost());
        let row = tx.into_row();
        assert_eq!(row.vat, NumericCell::Missing);
        assert!(row.extra.is_empty());
    }

    #[test]
    fn test_rows_from_normalized_keeps_order() {
        let rows = rows_from_normalized(vec![
            parse(json!({ "amount": 1 })),
            parse(json!({ "amount": 2 })),
        ]);
        assert_eq!(rows[1].amount, NumericCell::Value(dec!(2)));
    }
}
