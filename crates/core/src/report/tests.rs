//! Property-based tests for the derivation engine.

use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::report::derivation::DerivationEngine;
use crate::report::types::{CategoryMap, CurrentAssets, LineItems, TaxInput};
use crate::report::{
    CurrentLiabilities, Equity, ExpenseItems, FixedAssets, LongTermLiabilities, RevenueItems,
};

/// Non-negative amount with up to two decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..1_000_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Signed amount for earnings.
fn arb_signed_amount() -> impl Strategy<Value = Decimal> {
    (-1_000_000_000_000i64..1_000_000_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

/// Rate in [0, 1] with four decimal places.
fn arb_rate() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000).prop_map(|bp| Decimal::new(bp, 4))
}

fn arb_category<C: CategoryMap + std::fmt::Debug>() -> impl Strategy<Value = C> {
    prop::collection::vec(arb_amount(), C::KEYS.len()).prop_map(|amounts| C::from_amounts(&amounts))
}

fn arb_line_items() -> impl Strategy<Value = LineItems> {
    (
        arb_category::<RevenueItems>(),
        arb_category::<ExpenseItems>(),
        arb_category::<CurrentAssets>(),
        arb_category::<FixedAssets>(),
        arb_category::<CurrentLiabilities>(),
        arb_category::<LongTermLiabilities>(),
        (arb_amount(), arb_signed_amount(), arb_signed_amount()),
        arb_amount(),
    )
        .prop_map(
            |(revenue, expenses, current, fixed, current_l, long_term, equity, deductions)| {
                let mut items = LineItems {
                    revenue,
                    expenses,
                    equity: Equity {
                        capital: equity.0,
                        retained_earnings: equity.1,
                        current_earnings: equity.2,
                    },
                    tax: TaxInput {
                        rate: None,
                        deductions,
                    },
                    ..LineItems::default()
                };
                items.assets.current = current;
                items.assets.fixed = fixed;
                items.liabilities.current = current_l;
                items.liabilities.long_term = long_term;
                items
            },
        )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Totals are the sums of their parts.
    #[test]
    fn prop_summation_identities(items in arb_line_items(), rate in arb_rate()) {
        let d = DerivationEngine::derive(&items, rate);
        prop_assert_eq!(d.total_assets, d.total_current_assets + d.total_fixed_assets);
        prop_assert_eq!(
            d.total_liabilities,
            d.total_current_liabilities + d.total_long_term_liabilities
        );
        prop_assert_eq!(d.gross_profit, d.total_revenue - d.total_expenses);
        prop_assert_eq!(
            d.total_equity,
            items.equity.capital + items.equity.retained_earnings + items.equity.current_earnings
        );
    }

    /// Tax is the floored taxable income times the rate.
    #[test]
    fn prop_tax_formula(items in arb_line_items(), rate in arb_rate()) {
        let d = DerivationEngine::derive(&items, rate);
        let taxable = (d.gross_profit - items.tax.deductions).max(Decimal::ZERO);
        prop_assert_eq!(d.taxable_income, taxable);
        prop_assert_eq!(d.tax_amount, taxable * rate);
        prop_assert!(d.tax_amount >= Decimal::ZERO);
        prop_assert_eq!(d.net_profit, d.gross_profit - d.tax_amount);
        if d.gross_profit <= items.tax.deductions {
            prop_assert_eq!(d.tax_amount, Decimal::ZERO);
        }
    }

    /// Derivation is deterministic.
    #[test]
    fn prop_idempotent(items in arb_line_items(), rate in arb_rate()) {
        let first = DerivationEngine::derive(&items, rate);
        let second = DerivationEngine::derive(&items, rate);
        prop_assert_eq!(first, second);
        prop_assert_eq!(first.tax().amount.serialize(), second.tax().amount.serialize());
    }

    /// Balanced exactly when the gap is under one unit.
    #[test]
    fn prop_balance_tolerance(
        liabilities in arb_amount(),
        equity in arb_amount(),
        gap_thousandths in -5_000i64..5_000,
    ) {
        let gap = Decimal::new(gap_thousandths, 3);
        let assets = liabilities + equity + gap;
        prop_assert_eq!(
            DerivationEngine::is_balanced(assets, liabilities, equity),
            gap.abs() < Decimal::ONE
        );
    }

    /// Ratios are zero exactly when their denominator is zero.
    #[test]
    fn prop_ratio_zero_denominator(numerator in arb_signed_amount()) {
        prop_assert_eq!(DerivationEngine::ratio(numerator, Decimal::ZERO), Decimal::ZERO);
    }

    /// The persisted blocks agree with the full derivation.
    #[test]
    fn prop_persisted_blocks_match(items in arb_line_items(), rate in arb_rate()) {
        let d = DerivationEngine::derive(&items, rate);
        let sheet = d.balance_sheet();
        prop_assert_eq!(sheet.total_assets, d.total_assets);
        prop_assert_eq!(sheet.is_balanced, d.is_balanced);
        let tax = d.tax();
        prop_assert_eq!(tax.net_taxable, d.taxable_income);
        prop_assert_eq!(tax.income, d.gross_profit);
    }
}
