//! VAT data types.

use std::collections::BTreeMap;
use std::ops::{Add, AddAssign};

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use super::cell::{NumericCell, lenient_text};
use super::validation::ValidationResult;

/// Decimal places used when amounts are presented.
pub const PRESENTATION_SCALE: u32 = 2;

/// Rounds a sum for presentation. Intermediate sums are never rounded.
#[must_use]
pub fn present(amount: Decimal) -> Decimal {
    let mut rounded =
        amount.round_dp_with_strategy(PRESENTATION_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(PRESENTATION_SCALE);
    if rounded.is_zero() {
        rounded.set_sign_positive(true);
    }
    rounded
}

fn serialize_presented<S>(amount: &Decimal, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    Serialize::serialize(&present(*amount), serializer)
}

/// Columns the engine reads from each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    /// Gross amount.
    Amount,
    /// Net amount.
    SubAmount,
    /// VAT portion.
    Vat,
    /// VAT rate in percent.
    VatRate,
    /// Delivered energy.
    Kwh,
}

impl Column {
    /// Columns that every non-empty batch must expose.
    pub const REQUIRED: [Self; 4] = [Self::Amount, Self::SubAmount, Self::Vat, Self::VatRate];

    /// Returns the column name as it appears in input rows.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Amount => "amount",
            Self::SubAmount => "subAmount",
            Self::Vat => "vat",
            Self::VatRate => "vatRate",
            Self::Kwh => "kwh",
        }
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A raw input row as received at the boundary.
///
/// Known columns are typed; anything else lands in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionRow {
    /// Row identifier, unique within a batch.
    #[serde(default, deserialize_with = "lenient_text")]
    pub id: Option<String>,
    /// Gross amount; positive for sales, negative for costs.
    #[serde(default)]
    pub amount: NumericCell,
    /// Net amount.
    #[serde(default)]
    pub sub_amount: NumericCell,
    /// VAT portion.
    #[serde(default)]
    pub vat: NumericCell,
    /// VAT rate in percent.
    #[serde(default)]
    pub vat_rate: NumericCell,
    /// Human-readable label.
    #[serde(default, deserialize_with = "lenient_text")]
    pub transaction_name: Option<String>,
    /// Delivered energy in kWh, absent for non-energy lines.
    #[serde(default, alias = "kWh")]
    pub kwh: NumericCell,
    /// Unknown columns, kept verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl TransactionRow {
    /// Returns the cell for a known column.
    #[must_use]
    pub const fn cell(&self, column: Column) -> &NumericCell {
        match column {
            Column::Amount => &self.amount,
            Column::SubAmount => &self.sub_amount,
            Column::Vat => &self.vat,
            Column::VatRate => &self.vat_rate,
            Column::Kwh => &self.kwh,
        }
    }

    /// Returns a mutable cell for a known column.
    pub fn cell_mut(&mut self, column: Column) -> &mut NumericCell {
        match column {
            Column::Amount => &mut self.amount,
            Column::SubAmount => &mut self.sub_amount,
            Column::Vat => &mut self.vat,
            Column::VatRate => &mut self.vat_rate,
            Column::Kwh => &mut self.kwh,
        }
    }
}

/// A transaction after boundary coercion. Every monetary field is a value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Row identifier (`row-<n>` when the input had none).
    pub id: String,
    /// Gross amount.
    pub amount: Decimal,
    /// Net amount.
    pub sub_amount: Decimal,
    /// VAT portion.
    pub vat: Decimal,
    /// VAT rate in percent.
    pub vat_rate: i64,
    /// Human-readable label.
    pub transaction_name: String,
    /// Delivered energy in kWh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kwh: Option<Decimal>,
    /// Unknown columns.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Value>,
}

impl Transaction {
    /// Gross recomputed from net and VAT.
    #[must_use]
    pub fn recomputed_gross(&self) -> Decimal {
        self.sub_amount + self.vat
    }

    /// Which side of the report this transaction falls on.
    #[must_use]
    pub fn kind(&self) -> Option<TransactionKind> {
        TransactionKind::of(self.amount)
    }
}

/// Sales or costs, decided by the sign of the gross amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    /// Positive amount.
    Sale,
    /// Negative amount.
    Cost,
}

impl TransactionKind {
    /// Classifies an amount; zero belongs to neither side.
    #[must_use]
    pub fn of(amount: Decimal) -> Option<Self> {
        if amount > Decimal::ZERO {
            Some(Self::Sale)
        } else if amount < Decimal::ZERO {
            Some(Self::Cost)
        } else {
            None
        }
    }
}

/// Net, VAT and gross accumulated together.
///
/// Gross is always recomputed as net + VAT.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VatAmounts {
    /// Amount excluding VAT.
    #[serde(serialize_with = "serialize_presented")]
    pub net: Decimal,
    /// VAT portion.
    #[serde(serialize_with = "serialize_presented")]
    pub vat: Decimal,
    /// Net plus VAT.
    #[serde(serialize_with = "serialize_presented")]
    pub gross: Decimal,
}

impl VatAmounts {
    /// Creates amounts from net and VAT.
    #[must_use]
    pub fn new(net: Decimal, vat: Decimal) -> Self {
        Self {
            net,
            vat,
            gross: net + vat,
        }
    }

    /// Adds one transaction's net and VAT.
    pub fn record(&mut self, transaction: &Transaction) {
        *self += Self::new(transaction.sub_amount, transaction.vat);
    }

    /// Returns the amounts rounded for presentation.
    #[must_use]
    pub fn presented(&self) -> Self {
        Self {
            net: present(self.net),
            vat: present(self.vat),
            gross: present(self.gross),
        }
    }

    /// Returns true if every field is zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.net.is_zero() && self.vat.is_zero() && self.gross.is_zero()
    }
}

impl Add for VatAmounts {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self {
            net: self.net + rhs.net,
            vat: self.vat + rhs.vat,
            gross: self.gross + rhs.gross,
        }
    }
}

impl AddAssign for VatAmounts {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

/// One line of the VAT breakdown, mapped to BAS accounts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownLine {
    /// VAT rate in percent.
    pub rate: i64,
    /// Sales or costs.
    pub kind: TransactionKind,
    /// Accumulated amounts.
    #[serde(flatten)]
    pub amounts: VatAmounts,
    /// Number of transactions on this line.
    pub transaction_count: usize,
    /// BAS account for the net amount.
    pub bas_account: &'static str,
    /// BAS account for the VAT amount, when one applies.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vat_account: Option<&'static str>,
}

/// Aggregated VAT figures for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VatSummary {
    /// Amounts per VAT rate, ascending by rate.
    pub by_rate: BTreeMap<i64, VatAmounts>,
    /// Amounts across all rates.
    pub totals: VatAmounts,
    /// Amounts for transactions with a positive gross amount.
    pub sales_total: VatAmounts,
    /// Amounts for transactions with a negative gross amount.
    pub costs_total: VatAmounts,
    /// Number of transactions aggregated.
    pub transaction_count: usize,
    /// Number of sales.
    pub sales_count: usize,
    /// Number of costs.
    pub costs_count: usize,
    /// Sum of delivered energy.
    #[serde(serialize_with = "serialize_presented")]
    pub total_kwh: Decimal,
    /// Per kind and rate, mapped to BAS accounts.
    pub breakdown: Vec<BreakdownLine>,
}

/// The complete outcome of processing one batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    /// Company name as supplied.
    pub company_name: String,
    /// Organization number as supplied.
    pub org_number: String,
    /// Reporting period as supplied (`YYYY-MM`).
    pub period: String,
    /// Aggregated figures, populated even when validation failed.
    pub summary: VatSummary,
    /// Validation outcome.
    pub validation: ValidationResult,
}

impl ProcessingResult {
    /// Returns true if the result may be treated as a final report.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }
}
