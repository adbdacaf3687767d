//! Financial reports: line-item schema, periods, and derived figures.
//!
//! # Modules
//!
//! - `types` - Line-item categories and derived blocks
//! - `period` - Report type, period labels, and the uniqueness key
//! - `model` - The persisted report and its create/edit payloads
//! - `derivation` - Totals, tax, balance check, and ratios

pub mod derivation;
pub mod model;
pub mod period;
pub mod types;

#[cfg(test)]
mod tests;

pub use derivation::{
    DEFAULT_TAX_RATE, Derivation, DerivationEngine, TaxBreakdown, resolve_tax_rate, sum_category,
};
pub use model::{FinancialReport, ReportDraft, ReportPatch};
pub use period::{PeriodKey, ReportPeriod, ReportType};
pub use types::{
    Assets, BalanceSheet, CategoryMap, CurrentAssets, CurrentLiabilities, Equity, ExpenseItems,
    FixedAssets, LineItems, Liabilities, LongTermLiabilities, RevenueItems, Tax, TaxInput,
};
