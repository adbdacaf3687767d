//! Dashboard aggregation over approved reports.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::lifecycle::{ReportStatus, newest_period_first};
use crate::report::{DerivationEngine, FinancialReport};

const HUNDRED: Decimal = Decimal::ONE_HUNDRED;

/// Headline figures of the latest approved report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    /// Total revenue.
    pub total_revenue: Decimal,
    /// Total expenses.
    pub total_expenses: Decimal,
    /// Net profit after tax.
    pub net_profit: Decimal,
    /// Total assets.
    pub total_assets: Decimal,
    /// Total liabilities.
    pub total_liabilities: Decimal,
    /// Total equity.
    pub total_equity: Decimal,
    /// Corporate tax amount.
    pub tax_amount: Decimal,
    /// Revenue change against the previous approved period, in percent.
    pub revenue_growth: Decimal,
    /// Net profit over revenue.
    pub profit_margin: Decimal,
    /// Current assets over current liabilities.
    pub current_ratio: Decimal,
    /// Liabilities over equity.
    pub debt_to_equity_ratio: Decimal,
    /// Number of approved reports considered.
    pub report_count: usize,
    /// Period label of the latest approved report.
    pub period: Option<String>,
}

/// Computes [`DashboardStats`] from a hospital's reports.
pub struct DashboardAggregator;

impl DashboardAggregator {
    /// Aggregates `reports`, ignoring anything not approved.
    ///
    /// Growth compares the latest report with the previous approved report
    /// of the same type. With no approved reports every figure is zero.
    #[must_use]
    pub fn compute(reports: &[FinancialReport]) -> DashboardStats {
        let mut approved: Vec<&FinancialReport> = reports
            .iter()
            .filter(|r| r.status == ReportStatus::Approved)
            .collect();
        approved.sort_by(|a, b| newest_period_first(a, b));

        let Some(latest) = approved.first() else {
            return DashboardStats::default();
        };
        let current = latest.figures();
        let revenue_growth = approved
            .iter()
            .skip(1)
            .find(|r| r.report_type == latest.report_type)
            .map_or(Decimal::ZERO, |previous| {
                Self::growth(current.total_revenue, previous.figures().total_revenue)
            });

        DashboardStats {
            total_revenue: current.total_revenue,
            total_expenses: current.total_expenses,
            net_profit: current.net_profit,
            total_assets: current.total_assets,
            total_liabilities: current.total_liabilities,
            total_equity: current.total_equity,
            tax_amount: current.tax_amount,
            revenue_growth,
            profit_margin: current.profit_margin,
            current_ratio: current.current_ratio,
            debt_to_equity_ratio: current.debt_to_equity_ratio,
            report_count: approved.len(),
            period: Some(latest.period.clone()),
        }
    }

    /// `(current - previous) / previous * 100`, zero when `previous` is zero.
    #[must_use]
    pub fn growth(current: Decimal, previous: Decimal) -> Decimal {
        DerivationEngine::ratio(current - previous, previous)
            .checked_mul(HUNDRED)
            .unwrap_or(Decimal::ZERO)
    }
}
