//! Boundary coercion from raw rows to typed transactions.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

use super::cell::NumericCell;
use super::types::{Column, Transaction, TransactionRow};

/// Why a cell was coerced to zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellProblemKind {
    /// Blank cell in a column the batch otherwise provides.
    Empty,
    /// Text that is not a number.
    Invalid(String),
    /// A VAT rate that is not a whole percentage.
    FractionalRate(Decimal),
    /// A value beyond the accepted magnitude.
    TooLarge {
        /// The value as given.
        value: Decimal,
        /// The accepted magnitude.
        limit: Decimal,
    },
}

/// A cell that could not be used as given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellProblem {
    /// Column of the cell.
    pub column: Column,
    /// What was wrong.
    pub kind: CellProblemKind,
}

impl CellProblem {
    /// Describes the problem for a given row.
    #[must_use]
    pub fn describe(&self, row_id: &str) -> String {
        match &self.kind {
            CellProblemKind::Empty => {
                format!("Transaction {row_id}: '{}' is empty, treated as 0", self.column)
            }
            CellProblemKind::Invalid(raw) => format!(
                "Transaction {row_id}: '{}' value '{raw}' is not a number, treated as 0",
                self.column
            ),
            CellProblemKind::FractionalRate(rate) => format!(
                "Transaction {row_id}: VAT rate {rate} is not a whole percentage, treated as 0"
            ),
            CellProblemKind::TooLarge { value, limit } => format!(
                "Transaction {row_id}: '{}' value {value} exceeds {limit} in magnitude, treated as 0",
                self.column
            ),
        }
    }
}

/// A coerced row with the problems found on the way.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchRow {
    /// The typed transaction.
    pub transaction: Transaction,
    /// Cells that were coerced.
    pub problems: Vec<CellProblem>,
    /// True if `amount`, `subAmount` and `vat` were all real values.
    pub arithmetic_complete: bool,
}

/// Hard ceiling on the magnitude of amount and energy cells.
///
/// Sums of in-range cells stay far below `Decimal::MAX` for any batch that
/// fits in memory.
#[must_use]
pub fn magnitude_ceiling() -> Decimal {
    Decimal::new(1_000_000_000_000_000, 0)
}

/// A batch of rows coerced once at the boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    rows: Vec<BatchRow>,
    present_columns: BTreeSet<Column>,
}

impl Batch {
    /// Coerces raw rows with the default magnitude limit.
    #[must_use]
    pub fn from_rows(rows: &[TransactionRow]) -> Self {
        Self::from_rows_with_limit(rows, magnitude_ceiling())
    }

    /// Coerces raw rows. Never fails; bad cells become zero and are recorded.
    ///
    /// `max_magnitude` is capped at [`magnitude_ceiling`].
    #[must_use]
    pub fn from_rows_with_limit(rows: &[TransactionRow], max_magnitude: Decimal) -> Self {
        let limit = max_magnitude.abs().min(magnitude_ceiling());
        let present_columns: BTreeSet<Column> = Column::REQUIRED
            .into_iter()
            .chain([Column::Kwh])
            .filter(|&column| rows.iter().any(|row| row.cell(column).is_present()))
            .collect();

        let rows = rows
            .iter()
            .enumerate()
            .map(|(index, row)| coerce_row(index, row, &present_columns, limit))
            .collect();

        Self {
            rows,
            present_columns,
        }
    }

    /// Returns the number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the batch has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the coerced rows in input order.
    #[must_use]
    pub fn rows(&self) -> &[BatchRow] {
        &self.rows
    }

    /// Iterates over the typed transactions in input order.
    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.rows.iter().map(|row| &row.transaction)
    }

    /// Required columns that no row provides. Empty for an empty batch.
    #[must_use]
    pub fn missing_required_columns(&self) -> Vec<Column> {
        if self.is_empty() {
            return Vec::new();
        }
        Column::REQUIRED
            .into_iter()
            .filter(|column| !self.present_columns.contains(column))
            .collect()
    }
}

fn coerce_row(
    index: usize,
    row: &TransactionRow,
    present: &BTreeSet<Column>,
    limit: Decimal,
) -> BatchRow {
    let mut problems = Vec::new();

    let amount = coerce_money(row, Column::Amount, present, limit, &mut problems);
    let sub_amount = coerce_money(row, Column::SubAmount, present, limit, &mut problems);
    let vat = coerce_money(row, Column::Vat, present, limit, &mut problems);
    let vat_rate = match row.cell(Column::VatRate) {
        NumericCell::Value(raw) => whole_rate(*raw).unwrap_or_else(|| {
            problems.push(CellProblem {
                column: Column::VatRate,
                kind: CellProblemKind::FractionalRate(*raw),
            });
            0
        }),
        _ => {
            coerce_money(row, Column::VatRate, present, limit, &mut problems);
            0
        }
    };

    let kwh = match &row.kwh {
        NumericCell::Value(v) if v.abs() > limit => {
            problems.push(CellProblem {
                column: Column::Kwh,
                kind: CellProblemKind::TooLarge { value: *v, limit },
            });
            None
        }
        NumericCell::Value(v) => Some(*v),
        NumericCell::Invalid(raw) => {
            problems.push(CellProblem {
                column: Column::Kwh,
                kind: CellProblemKind::Invalid(raw.clone()),
            });
            None
        }
        NumericCell::Missing => None,
    };

    let arithmetic_complete = [Column::Amount, Column::SubAmount, Column::Vat]
        .into_iter()
        .all(|column| row.cell(column).value().is_some_and(|v| v.abs() <= limit));

    BatchRow {
        transaction: Transaction {
            id: row
                .id
                .clone()
                .unwrap_or_else(|| format!("row-{}", index + 1)),
            amount,
            sub_amount,
            vat,
            vat_rate,
            transaction_name: row.transaction_name.clone().unwrap_or_default(),
            kwh,
            extra: row.extra.clone(),
        },
        problems,
        arithmetic_complete,
    }
}

fn coerce_money(
    row: &TransactionRow,
    column: Column,
    present: &BTreeSet<Column>,
    limit: Decimal,
    problems: &mut Vec<CellProblem>,
) -> Decimal {
    match row.cell(column) {
        NumericCell::Value(v) if v.abs() > limit => {
            problems.push(CellProblem {
                column,
                kind: CellProblemKind::TooLarge { value: *v, limit },
            });
            Decimal::ZERO
        }
        NumericCell::Value(v) => *v,
        NumericCell::Invalid(raw) => {
            problems.push(CellProblem {
                column,
                kind: CellProblemKind::Invalid(raw.clone()),
            });
            Decimal::ZERO
        }
        NumericCell::Missing => {
            if present.contains(&column) {
                problems.push(CellProblem {
                    column,
                    kind: CellProblemKind::Empty,
                });
            }
            Decimal::ZERO
        }
    }
}

/// Accepts `25`, `25.0` and the fractional spelling `0.25`.
fn whole_rate(raw: Decimal) -> Option<i64> {
    if raw.fract().is_zero() {
        return raw.to_i64();
    }
    if raw > Decimal::ZERO && raw < Decimal::ONE {
        let percent = raw * Decimal::ONE_HUNDRED;
        if percent.fract().is_zero() {
            return percent.to_i64();
        }
    }
    None
}
