//! Derivation engine: totals, tax, balance check, and ratios.
//!
//! Every function here is pure. Identical line items and rate always yield
//! identical figures.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::report::types::{BalanceSheet, CategoryMap, LineItems, Tax};
use crate::settings::{HospitalSettings, TaxSettings};

/// Corporate tax rate used when neither the report nor the hospital sets one.
pub const DEFAULT_TAX_RATE: Decimal = Decimal::from_parts(25, 0, 0, false, 2);

/// Sum of every amount in one category.
pub fn sum_category<C: CategoryMap>(category: &C) -> Decimal {
    category.amounts().into_iter().sum()
}

/// Picks the tax rate: explicit report rate, then hospital setting, then default.
pub fn resolve_tax_rate(explicit: Option<Decimal>, settings: Option<&HospitalSettings>) -> Decimal {
    explicit
        .or_else(|| settings.map(|s| s.tax_settings.corporate_tax_rate))
        .unwrap_or(DEFAULT_TAX_RATE)
}

/// Every figure derived from one report's line items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Derivation {
    /// Sum of revenue.
    pub total_revenue: Decimal,
    /// Sum of expenses.
    pub total_expenses: Decimal,
    /// Revenue minus expenses.
    pub gross_profit: Decimal,
    /// Sum of current assets.
    pub total_current_assets: Decimal,
    /// Sum of fixed assets.
    pub total_fixed_assets: Decimal,
    /// Current plus fixed assets.
    pub total_assets: Decimal,
    /// Sum of current liabilities.
    pub total_current_liabilities: Decimal,
    /// Sum of long-term liabilities.
    pub total_long_term_liabilities: Decimal,
    /// Current plus long-term liabilities.
    pub total_liabilities: Decimal,
    /// Capital plus retained and current earnings.
    pub total_equity: Decimal,
    /// Rate applied.
    pub tax_rate: Decimal,
    /// Deductions applied.
    pub deductions: Decimal,
    /// Gross profit minus deductions, floored at zero.
    pub taxable_income: Decimal,
    /// Taxable income times rate.
    pub tax_amount: Decimal,
    /// Gross profit minus tax.
    pub net_profit: Decimal,
    /// Net profit over revenue.
    pub profit_margin: Decimal,
    /// Current assets over current liabilities.
    pub current_ratio: Decimal,
    /// Liabilities over equity.
    pub debt_to_equity_ratio: Decimal,
    /// Assets equal liabilities plus equity within one unit.
    pub is_balanced: bool,
}

impl Derivation {
    /// The persisted tax block.
    #[must_use]
    pub const fn tax(&self) -> Tax {
        Tax {
            income: self.gross_profit,
            rate: self.tax_rate,
            amount: self.tax_amount,
            deductions: self.deductions,
            net_taxable: self.taxable_income,
        }
    }

    /// The persisted balance-sheet block.
    #[must_use]
    pub const fn balance_sheet(&self) -> BalanceSheet {
        BalanceSheet {
            total_assets: self.total_assets,
            total_liabilities: self.total_liabilities,
            total_equity: self.total_equity,
            is_balanced: self.is_balanced,
        }
    }
}

/// Flat-rate tax breakdown for one report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxBreakdown {
    /// Corporate income tax.
    pub corporate_tax: Decimal,
    /// VAT on total revenue.
    pub vat_on_revenue: Decimal,
    /// Withholding tax on total revenue.
    pub withholding_tax: Decimal,
    /// Sum of the three taxes.
    pub total_tax_burden: Decimal,
    /// Taxable income minus corporate tax.
    pub net_income_after_tax: Decimal,
}

/// Stateless calculator over line items.
pub struct DerivationEngine;

impl DerivationEngine {
    /// Derives every figure from `items` at the given tax `rate`.
    #[must_use]
    pub fn derive(items: &LineItems, rate: Decimal) -> Derivation {
        let total_revenue = sum_category(&items.revenue);
        let total_expenses = sum_category(&items.expenses);
        let gross_profit = total_revenue - total_expenses;

        let total_current_assets = sum_category(&items.assets.current);
        let total_fixed_assets = sum_category(&items.assets.fixed);
        let total_assets = total_current_assets + total_fixed_assets;

        let total_current_liabilities = sum_category(&items.liabilities.current);
        let total_long_term_liabilities = sum_category(&items.liabilities.long_term);
        let total_liabilities = total_current_liabilities + total_long_term_liabilities;

        let total_equity = sum_category(&items.equity);

        let deductions = items.tax.deductions;
        let taxable_income = Self::taxable_income(gross_profit, deductions);
        let tax_amount = taxable_income * rate;
        let net_profit = gross_profit - tax_amount;

        Derivation {
            total_revenue,
            total_expenses,
            gross_profit,
            total_current_assets,
            total_fixed_assets,
            total_assets,
            total_current_liabilities,
            total_long_term_liabilities,
            total_liabilities,
            total_equity,
            tax_rate: rate,
            deductions,
            taxable_income,
            tax_amount,
            net_profit,
            profit_margin: Self::ratio(net_profit, total_revenue),
            current_ratio: Self::ratio(total_current_assets, total_current_liabilities),
            debt_to_equity_ratio: Self::ratio(total_liabilities, total_equity),
            is_balanced: Self::is_balanced(total_assets, total_liabilities, total_equity),
        }
    }

    /// `max(0, gross_profit - deductions)`.
    #[must_use]
    pub fn taxable_income(gross_profit: Decimal, deductions: Decimal) -> Decimal {
        (gross_profit - deductions).max(Decimal::ZERO)
    }

    /// `|assets - (liabilities + equity)| < 1`.
    #[must_use]
    pub fn is_balanced(assets: Decimal, liabilities: Decimal, equity: Decimal) -> bool {
        (assets - (liabilities + equity)).abs() < Decimal::ONE
    }

    /// `numerator / denominator`, zero when the denominator is zero.
    #[must_use]
    pub fn ratio(numerator: Decimal, denominator: Decimal) -> Decimal {
        if denominator.is_zero() {
            return Decimal::ZERO;
        }
        numerator.checked_div(denominator).unwrap_or(Decimal::ZERO)
    }

    /// Corporate tax plus flat VAT and withholding on revenue.
    #[must_use]
    pub fn tax_breakdown(derivation: &Derivation, rates: &TaxSettings) -> TaxBreakdown {
        let corporate_tax = derivation.tax_amount;
        let vat_on_revenue = derivation.total_revenue * rates.vat_rate;
        let withholding_tax = derivation.total_revenue * rates.withholding_tax_rate;

        TaxBreakdown {
            corporate_tax,
            vat_on_revenue,
            withholding_tax,
            total_tax_burden: corporate_tax + vat_on_revenue + withholding_tax,
            net_income_after_tax: derivation.taxable_income - corporate_tax,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::types::{Equity, ExpenseItems, RevenueItems, TaxInput};
    use rust_decimal_macros::dec;

    /// Revenue 5.7B, expenses 3.5B, deductions 0.5B.
    fn scenario() -> LineItems {
        let mut items = LineItems::default();
        items.revenue = RevenueItems {
            patient_care: dec!(2500000000),
            emergency_services: dec!(800000000),
            surgery: dec!(1200000000),
            laboratory: dec!(400000000),
            pharmacy: dec!(600000000),
            other: dec!(200000000),
        };
        items.expenses = ExpenseItems {
            salaries: dec!(1800000000),
            medical_supplies: dec!(900000000),
            equipment: dec!(300000000),
            utilities: dec!(200000000),
            maintenance: dec!(150000000),
            insurance: dec!(100000000),
            other: dec!(50000000),
        };
        items.tax = TaxInput {
            rate: Some(dec!(0.25)),
            deductions: dec!(500000000),
        };
        items
    }

    #[test]
    fn test_end_to_end_scenario() {
        let d = DerivationEngine::derive(&scenario(), dec!(0.25));

        assert_eq!(d.total_revenue, dec!(5700000000));
        assert_eq!(d.total_expenses, dec!(3500000000));
        assert_eq!(d.gross_profit, dec!(2200000000));
        assert_eq!(d.taxable_income, dec!(1700000000));
        assert_eq!(d.tax_amount, dec!(425000000));
        assert_eq!(d.net_profit, dec!(1775000000));

        let tax = d.tax();
        assert_eq!(tax.income, dec!(2200000000));
        assert_eq!(tax.net_taxable, dec!(1700000000));
        assert_eq!(tax.amount, dec!(425000000));
    }

    #[test]
    fn test_taxable_income_floors_at_zero() {
        assert_eq!(
            DerivationEngine::taxable_income(dec!(100), dec!(250)),
            Decimal::ZERO
        );
        assert_eq!(
            DerivationEngine::taxable_income(dec!(-100), Decimal::ZERO),
            Decimal::ZERO
        );
    }

    #[test]
    fn test_balance_boundary() {
        assert!(DerivationEngine::is_balanced(dec!(100), dec!(60), dec!(40)));
        assert!(DerivationEngine::is_balanced(dec!(100.999), dec!(60), dec!(40)));
        assert!(DerivationEngine::is_balanced(dec!(99.001), dec!(60), dec!(40)));
        assert!(!DerivationEngine::is_balanced(dec!(101), dec!(60), dec!(40)));
        assert!(!DerivationEngine::is_balanced(dec!(99), dec!(60), dec!(40)));
    }

    #[test]
    fn test_zero_denominators_yield_zero_ratios() {
        let d = DerivationEngine::derive(&LineItems::default(), DEFAULT_TAX_RATE);
        assert_eq!(d.profit_margin, Decimal::ZERO);
        assert_eq!(d.current_ratio, Decimal::ZERO);
        assert_eq!(d.debt_to_equity_ratio, Decimal::ZERO);
        assert!(d.is_balanced);
    }

    #[test]
    fn test_ratios() {
        let mut items = scenario();
        items.assets.current.cash = dec!(300);
        items.liabilities.current.accounts_payable = dec!(150);
        items.equity = Equity {
            capital: dec!(100),
            retained_earnings: dec!(50),
            current_earnings: dec!(0),
        };

        let d = DerivationEngine::derive(&items, dec!(0.25));
        assert_eq!(d.current_ratio, dec!(2));
        assert_eq!(d.debt_to_equity_ratio, dec!(1));
        assert_eq!(
            d.profit_margin,
            dec!(1775000000) / dec!(5700000000)
        );
    }

    #[test]
    fn test_negative_earnings_reduce_equity() {
        let mut items = LineItems::default();
        items.equity = Equity {
            capital: dec!(1000),
            retained_earnings: dec!(-300),
            current_earnings: dec!(-200),
        };
        assert_eq!(
            DerivationEngine::derive(&items, DEFAULT_TAX_RATE).total_equity,
            dec!(500)
        );
    }

    #[test]
    fn test_resolve_tax_rate_precedence() {
        let mut settings = HospitalSettings::defaults_for("hospital-1", "RS Test");
        settings.tax_settings.corporate_tax_rate = dec!(0.22);

        assert_eq!(resolve_tax_rate(Some(dec!(0.1)), Some(&settings)), dec!(0.1));
        assert_eq!(resolve_tax_rate(None, Some(&settings)), dec!(0.22));
        assert_eq!(resolve_tax_rate(None, None), dec!(0.25));
    }

    #[test]
    fn test_tax_breakdown() {
        let d = DerivationEngine::derive(&scenario(), dec!(0.25));
        let breakdown = DerivationEngine::tax_breakdown(&d, &TaxSettings::default());

        assert_eq!(breakdown.corporate_tax, dec!(425000000));
        assert_eq!(breakdown.vat_on_revenue, dec!(627000000));
        assert_eq!(breakdown.withholding_tax, dec!(114000000));
        assert_eq!(breakdown.total_tax_burden, dec!(1166000000));
        assert_eq!(breakdown.net_income_after_tax, dec!(1275000000));
    }

    #[test]
    fn test_sum_category() {
        let revenue = RevenueItems {
            surgery: dec!(10.5),
            other: dec!(0.5),
            ..RevenueItems::default()
        };
        assert_eq!(sum_category(&revenue), dec!(11));
    }
}
