//! VAT aggregation.
//!
//! Gross is recomputed as net + VAT everywhere, so a row whose `amount`
//! disagrees with its parts is normalized rather than propagated. Sums are
//! kept at full precision; rounding happens only when presented.

use std::collections::BTreeMap;

use super::bas;
use super::types::{BreakdownLine, Transaction, TransactionKind, VatAmounts, VatSummary};

/// Groups transactions by rate and by side of the report.
pub struct Aggregator;

impl Aggregator {
    /// Aggregates transactions in input order.
    #[must_use]
    pub fn aggregate<'a, I>(transactions: I) -> VatSummary
    where
        I: IntoIterator<Item = &'a Transaction>,
    {
        let mut summary = VatSummary::default();
        let mut lines: BTreeMap<(TransactionKind, i64), (VatAmounts, usize)> = BTreeMap::new();

        for tx in transactions {
            summary.transaction_count += 1;
            summary.by_rate.entry(tx.vat_rate).or_default().record(tx);

            if let Some(kwh) = tx.kwh {
                summary.total_kwh += kwh;
            }

            let Some(kind) = tx.kind() else {
                continue;
            };

            match kind {
                TransactionKind::Sale => {
                    summary.sales_total.record(tx);
                    summary.sales_count += 1;
                }
                TransactionKind::Cost => {
                    summary.costs_total.record(tx);
                    summary.costs_count += 1;
                }
            }

            let line = lines.entry((kind, tx.vat_rate)).or_default();
            line.0.record(tx);
            line.1 += 1;
        }

        summary.totals = summary
            .by_rate
            .values()
            .fold(VatAmounts::default(), |acc, amounts| acc + *amounts);

        summary.breakdown = lines
            .into_iter()
            .map(|((kind, rate), (amounts, transaction_count))| BreakdownLine {
                rate,
                kind,
                amounts,
                transaction_count,
                bas_account: bas::net_account(kind, rate),
                vat_account: if amounts.vat.is_zero() {
                    None
                } else {
                    bas::vat_account(kind, rate)
                },
            })
            .collect();

        summary
    }
}
