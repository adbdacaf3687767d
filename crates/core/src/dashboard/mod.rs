//! Dashboard figures for a hospital.
//!
//! The dashboard reads only approved reports. Figures come from the latest
//! approved period; revenue growth compares it with the one before.

mod aggregator;

pub use aggregator::{DashboardAggregator, DashboardStats};
