//! Age-based archive policy.

use chrono::NaiveDate;

use crate::lifecycle::types::ReportStatus;
use crate::report::FinancialReport;
use crate::report::period::add_months;
use crate::validation::{ValidationError, require_range};

/// Shortest archive age in months.
pub const MIN_ARCHIVE_AFTER_MONTHS: u32 = 1;
/// Longest archive age in months.
pub const MAX_ARCHIVE_AFTER_MONTHS: u32 = 120;

/// Decides when approved reports are old enough to archive.
pub struct ArchivePolicy;

impl ArchivePolicy {
    /// Rejects archive ages outside `1..=120` months.
    pub fn check_months(
        field: &'static str,
        archive_after_months: u32,
    ) -> Result<(), ValidationError> {
        require_range(
            field,
            i64::from(archive_after_months),
            i64::from(MIN_ARCHIVE_AFTER_MONTHS),
            i64::from(MAX_ARCHIVE_AFTER_MONTHS),
        )
    }

    /// Date on which `report` becomes due, if it ever does.
    #[must_use]
    pub fn due_date(report: &FinancialReport, archive_after_months: u32) -> Option<NaiveDate> {
        if report.status != ReportStatus::Approved {
            return None;
        }
        add_months(report.report_period().end_date()?, archive_after_months)
    }

    /// True once an approved report's period ended `archive_after_months` ago.
    #[must_use]
    pub fn is_due(report: &FinancialReport, archive_after_months: u32, today: NaiveDate) -> bool {
        Self::due_date(report, archive_after_months).is_some_and(|due| due <= today)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{LineItems, ReportDraft, ReportPeriod};
    use chrono::Utc;
    use hospifin_shared::types::UserId;
    use rust_decimal_macros::dec;

    fn report(period: ReportPeriod, status: ReportStatus) -> FinancialReport {
        let mut report = FinancialReport::new_draft(
            "hospital-1".into(),
            ReportDraft::new(period, LineItems::default()),
            dec!(0.25),
            UserId::new(),
            Utc::now(),
        );
        report.status = status;
        report
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_due_on_period_end_plus_months() {
        let r = report(ReportPeriod::monthly(2024, 1), ReportStatus::Approved);
        assert_eq!(ArchivePolicy::due_date(&r, 24), Some(date(2026, 1, 31)));
        assert!(!ArchivePolicy::is_due(&r, 24, date(2026, 1, 30)));
        assert!(ArchivePolicy::is_due(&r, 24, date(2026, 1, 31)));
    }

    #[test]
    fn test_quarterly_and_annual_use_period_end() {
        let q = report(ReportPeriod::quarterly(2023, 1), ReportStatus::Approved);
        assert_eq!(ArchivePolicy::due_date(&q, 12), Some(date(2024, 3, 31)));

        let a = report(ReportPeriod::annual(2022), ReportStatus::Approved);
        assert_eq!(ArchivePolicy::due_date(&a, 1), Some(date(2023, 1, 31)));
    }

    #[test]
    fn test_month_bounds() {
        assert!(ArchivePolicy::check_months("olderThanMonths", 0).is_err());
        assert!(ArchivePolicy::check_months("olderThanMonths", 1).is_ok());
        assert!(ArchivePolicy::check_months("olderThanMonths", 120).is_ok());
        assert!(ArchivePolicy::check_months("olderThanMonths", 121).is_err());
    }

    #[test]
    fn test_only_approved_reports_are_due() {
        for status in [
            ReportStatus::Draft,
            ReportStatus::Submitted,
            ReportStatus::Archived,
        ] {
            let r = report(ReportPeriod::monthly(2020, 1), status);
            assert!(!ArchivePolicy::is_due(&r, 1, date(2030, 1, 1)));
        }
    }
}
