//! BAS chart-of-accounts mapping for VAT breakdown lines.

use super::types::TransactionKind;

/// Other external services; used for every cost line.
pub const COST_ACCOUNT: &str = "6590";
/// Input VAT.
pub const INPUT_VAT_ACCOUNT: &str = "2640";

/// Returns the account for the net amount of a breakdown line.
#[must_use]
pub const fn net_account(kind: TransactionKind, rate: i64) -> &'static str {
    match kind {
        TransactionKind::Cost => COST_ACCOUNT,
        TransactionKind::Sale => match rate {
            12 => "3002",
            6 => "3003",
            0 => "3011",
            _ => "3001",
        },
    }
}

/// Returns the VAT account for a breakdown line, if VAT is booked.
#[must_use]
pub const fn vat_account(kind: TransactionKind, rate: i64) -> Option<&'static str> {
    match (kind, rate) {
        (_, 0) => None,
        (TransactionKind::Cost, _) => Some(INPUT_VAT_ACCOUNT),
        (TransactionKind::Sale, 25) => Some("2611"),
        (TransactionKind::Sale, 12) => Some("2621"),
        (TransactionKind::Sale, 6) => Some("2631"),
        (TransactionKind::Sale, _) => None,
    }
}
