//! Scenario and property-based tests for VAT processing.

use std::collections::BTreeSet;

use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal_macros::dec;
use serde_json::json;

use vatrec_shared::VatConfig;

use super::service::{VatProcessor, process};
use super::types::{TransactionRow, VatAmounts};
use super::validation::IssueCode;

const COMPANY: &str = "Test AB";
const ORG: &str = "556016-0680";
const PERIOD: &str = "2025-12";

fn ev_charging_rows() -> Vec<TransactionRow> {
    serde_json::from_value(json!([
        {
            "id": "TX001",
            "amount": 81.45,
            "subAmount": 65.16,
            "vat": 16.29,
            "vatRate": 25,
            "transactionName": "Elbilsladdning - Station 1",
            "kwh": 20.5
        },
        {
            "id": "TX002",
            "amount": 233.65,
            "subAmount": 233.65,
            "vat": 0.00,
            "vatRate": 0,
            "transactionName": "Roaming intäkter - Hubject",
            "kwh": 30.0
        },
        {
            "id": "TX003",
            "amount": -507.70,
            "subAmount": -406.16,
            "vat": -101.54,
            "vatRate": 25,
            "transactionName": "Plattformsavgift - Monta"
        },
        {
            "id": "TX004",
            "amount": -20.32,
            "subAmount": -20.32,
            "vat": 0.00,
            "vatRate": 0,
            "transactionName": "Övriga kostnader (momsfri)"
        }
    ]))
    .unwrap()
}

#[test]
fn test_ev_charging_scenario() {
    let result = process(&ev_charging_rows(), COMPANY, ORG, PERIOD);
    let summary = &result.summary;

    assert_eq!(
        summary.totals,
        VatAmounts::new(dec!(-127.67), dec!(-85.25))
    );
    assert_eq!(summary.totals.gross, dec!(-212.92));
    assert_eq!(summary.sales_total, VatAmounts::new(dec!(298.81), dec!(16.29)));
    assert_eq!(summary.sales_total.gross, dec!(315.10));
    assert_eq!(summary.costs_total, VatAmounts::new(dec!(-426.48), dec!(-101.54)));
    assert_eq!(summary.by_rate[&25], VatAmounts::new(dec!(-341.00), dec!(-85.25)));
    assert_eq!(summary.by_rate[&0], VatAmounts::new(dec!(213.33), dec!(0)));
    assert_eq!(summary.total_kwh, dec!(50.5));
    assert_eq!(summary.sales_count, 2);
    assert_eq!(summary.costs_count, 2);

    assert!(result.is_valid());
    assert_eq!(result.validation.errors().count(), 0);
    assert!(result.validation.issues().is_empty());
}

#[test]
fn test_ev_charging_scenario_wire_shape() {
    let result = process(&ev_charging_rows(), COMPANY, ORG, PERIOD);
    let value = serde_json::to_value(&result).unwrap();

    assert_eq!(value["companyName"], json!(COMPANY));
    assert_eq!(value["orgNumber"], json!(ORG));
    assert_eq!(value["period"], json!(PERIOD));
    assert_eq!(
        value["summary"]["totals"],
        json!({ "net": "-127.67", "vat": "-85.25", "gross": "-212.92" })
    );
    assert_eq!(
        value["summary"]["byRate"]["25"],
        json!({ "net": "-341.00", "vat": "-85.25", "gross": "-426.25" })
    );
    assert_eq!(value["summary"]["salesTotal"]["gross"], json!("315.10"));
    assert_eq!(value["validation"]["isValid"], json!(true));
    assert_eq!(value["validation"]["errors"], json!([]));
    assert_eq!(value["summary"]["breakdown"][0]["basAccount"], json!("3011"));
}

#[test]
fn test_invalid_org_number_still_summarizes() {
    let result = process(&ev_charging_rows(), COMPANY, "invalid", PERIOD);
    let errors: Vec<_> = result.validation.errors().collect();

    assert!(!result.is_valid());
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, IssueCode::InvalidOrgNumber);
    assert_eq!(result.summary.by_rate.len(), 2);
    assert_eq!(result.summary.totals.net, dec!(-127.67));
    assert_eq!(result.summary.transaction_count, 4);
}

#[test]
fn test_empty_batch_scenario() {
    let result = process(&[], COMPANY, ORG, PERIOD);

    assert!(result.is_valid());
    assert!(result.validation.has_code(IssueCode::EmptyBatch));
    assert!(result.summary.by_rate.is_empty());
    assert!(result.summary.totals.is_zero());
    assert!(result.summary.sales_total.is_zero());
    assert!(result.summary.costs_total.is_zero());
    assert_eq!(result.summary.total_kwh, Decimal::ZERO);
}

#[test]
fn test_missing_columns_still_aggregates() {
    let rows: Vec<TransactionRow> = serde_json::from_value(json!([
        { "id": "A", "amount": 125, "subAmount": 100, "vatRate": 25 },
        { "id": "B", "amount": -50, "subAmount": -40, "vatRate": 25 }
    ]))
    .unwrap();
    let result = process(&rows, COMPANY, ORG, PERIOD);

    assert!(!result.is_valid());
    assert!(result.validation.has_code(IssueCode::MissingColumns));
    assert!(!result.validation.has_code(IssueCode::AmountMismatch));
    assert_eq!(result.summary.totals, VatAmounts::new(dec!(60), dec!(0)));
}

#[test]
fn test_unparseable_cell_does_not_fail_batch() {
    let rows: Vec<TransactionRow> = serde_json::from_value(json!([
        { "id": "A", "amount": "oops", "subAmount": 100, "vat": 25, "vatRate": 25 },
        { "id": "B", "amount": 10, "subAmount": 10, "vat": 0, "vatRate": 0 }
    ]))
    .unwrap();
    let result = process(&rows, COMPANY, ORG, PERIOD);

    assert!(result.is_valid());
    assert!(result.validation.has_code(IssueCode::InvalidValue));
    // Row A has amount 0: counted per rate, excluded from sales and costs.
    assert_eq!(result.summary.by_rate[&25].gross, dec!(125));
    assert_eq!(result.summary.sales_total.gross, dec!(10));
}

#[test]
fn test_oversized_amounts_do_not_overflow() {
    let huge = "50000000000000000000000000000";
    let rows: Vec<TransactionRow> = serde_json::from_value(json!([
        { "id": "A", "amount": huge, "subAmount": huge, "vat": 0, "vatRate": 0 },
        { "id": "B", "amount": huge, "subAmount": huge, "vat": 0, "vatRate": 0 },
        { "id": "C", "amount": 10, "subAmount": 10, "vat": 0, "vatRate": 0 }
    ]))
    .unwrap();
    let result = process(&rows, COMPANY, ORG, PERIOD);

    assert!(result.is_valid());
    let flagged: Vec<_> = result
        .validation
        .warnings()
        .filter(|w| w.code == IssueCode::InvalidValue)
        .filter_map(|w| w.reference.as_deref())
        .collect();
    assert_eq!(flagged, vec!["A", "A", "B", "B"]);
    assert_eq!(result.summary.totals.gross, dec!(10));
    assert_eq!(result.summary.transaction_count, 3);
}

#[test]
fn test_configured_amount_limit() {
    let config = VatConfig {
        max_amount: dec!(1000),
        ..VatConfig::default()
    };
    let rows: Vec<TransactionRow> = serde_json::from_value(json!([
        { "id": "A", "amount": 1250, "subAmount": 1000, "vat": 250, "vatRate": 25 }
    ]))
    .unwrap();
    let result = VatProcessor::new(&config).process(&rows, COMPANY, ORG, PERIOD);

    assert!(result.validation.has_code(IssueCode::InvalidValue));
    assert_eq!(result.summary.totals, VatAmounts::new(dec!(1000), dec!(250)));
}

/// Strategy for one row: net and VAT in cents, a rate, and how the gross relates.
fn row_strategy() -> impl Strategy<Value = TransactionRow> {
    (
        -1_000_000i64..1_000_000i64,
        -250_000i64..250_000i64,
        prop::sample::select(vec![0i64, 6, 12, 25, 18, -1]),
        prop_oneof![Just(0i64), Just(0i64), -500i64..500i64],
        any::<bool>(),
    )
        .prop_map(|(net, vat, rate, noise, zero_amount)| {
            let net = Decimal::new(net, 2);
            let vat = Decimal::new(vat, 2);
            let amount = if zero_amount {
                Decimal::ZERO
            } else {
                net + vat + Decimal::new(noise, 2)
            };
            TransactionRow {
                amount: amount.into(),
                sub_amount: net.into(),
                vat: vat.into(),
                vat_rate: Decimal::from(rate).into(),
                ..TransactionRow::default()
            }
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Processing the same input twice yields identical results.
    #[test]
    fn prop_processing_is_idempotent(rows in prop::collection::vec(row_strategy(), 0..40)) {
        let first = process(&rows, COMPANY, ORG, PERIOD);
        let second = process(&rows, COMPANY, ORG, PERIOD);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    /// Net + VAT equals gross, and sales + costs + zero-amount rows equal the totals.
    #[test]
    fn prop_amounts_are_conserved(rows in prop::collection::vec(row_strategy(), 0..40)) {
        let result = process(&rows, COMPANY, ORG, PERIOD);
        let summary = &result.summary;

        prop_assert_eq!(summary.totals.net + summary.totals.vat, summary.totals.gross);

        let zero_rows = rows
            .iter()
            .filter(|row| row.amount.or_zero().is_zero())
            .fold(VatAmounts::default(), |acc, row| {
                acc + VatAmounts::new(row.sub_amount.or_zero(), row.vat.or_zero())
            });
        prop_assert_eq!(summary.sales_total + summary.costs_total + zero_rows, summary.totals);
    }

    /// Every transaction lands in exactly one rate group.
    #[test]
    fn prop_rate_groups_partition_the_batch(rows in prop::collection::vec(row_strategy(), 0..40)) {
        let result = process(&rows, COMPANY, ORG, PERIOD);
        let summary = &result.summary;

        let input_rates: BTreeSet<i64> = rows
            .iter()
            .map(|row| row.vat_rate.value().and_then(|r| r.to_i64()).unwrap_or_default())
            .collect();
        let grouped_rates: BTreeSet<i64> = summary.by_rate.keys().copied().collect();
        prop_assert_eq!(input_rates, grouped_rates);

        let input_net: Decimal = rows.iter().map(|row| row.sub_amount.or_zero()).sum();
        let grouped_net: Decimal = summary.by_rate.values().map(|a| a.net).sum();
        prop_assert_eq!(input_net, grouped_net);

        prop_assert_eq!(summary.transaction_count, rows.len());
        let line_count: usize = summary.breakdown.iter().map(|l| l.transaction_count).sum();
        prop_assert_eq!(line_count, summary.sales_count + summary.costs_count);
    }

    /// Validation never blocks on row-level findings alone.
    #[test]
    fn prop_row_findings_are_warnings(rows in prop::collection::vec(row_strategy(), 1..40)) {
        let result = process(&rows, COMPANY, ORG, PERIOD);
        prop_assert!(result.is_valid());
    }
}
