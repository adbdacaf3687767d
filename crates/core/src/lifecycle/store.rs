//! Persistence abstraction for financial reports.

use async_trait::async_trait;
use hospifin_shared::types::ReportId;

use crate::error::DomainError;
use crate::lifecycle::types::ReportStatus;
use crate::report::{FinancialReport, PeriodKey, ReportType};

/// Filters and paging for report queries. Results are newest period first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportQuery {
    /// Hospital whose reports are listed.
    pub hospital_id: String,
    /// Only this report type.
    pub report_type: Option<ReportType>,
    /// Only this status.
    pub status: Option<ReportStatus>,
    /// Only this year.
    pub year: Option<i32>,
    /// Maximum number of rows; `None` returns all.
    pub limit: Option<u64>,
    /// Rows to skip.
    pub offset: u64,
}

impl ReportQuery {
    /// All reports of a hospital, unpaged.
    pub fn for_hospital(hospital_id: impl Into<String>) -> Self {
        Self {
            hospital_id: hospital_id.into(),
            report_type: None,
            status: None,
            year: None,
            limit: None,
            offset: 0,
        }
    }

    /// Restricts to one status.
    #[must_use]
    pub const fn with_status(mut self, status: ReportStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Applies paging.
    #[must_use]
    pub const fn paged(mut self, limit: u64, offset: u64) -> Self {
        self.limit = Some(limit);
        self.offset = offset;
        self
    }

    /// Returns true if `report` passes every filter (paging aside).
    #[must_use]
    pub fn matches(&self, report: &FinancialReport) -> bool {
        report.hospital_id == self.hospital_id
            && self.report_type.is_none_or(|t| t == report.report_type)
            && self.status.is_none_or(|s| s == report.status)
            && self.year.is_none_or(|y| y == report.year)
    }
}

/// Repository interface for reports.
///
/// Implementations must enforce period uniqueness on `insert` themselves,
/// so two racing creates cannot both succeed.
#[async_trait]
pub trait ReportStore: Send + Sync {
    /// Finds a report by ID.
    async fn find_by_id(&self, id: ReportId) -> Result<Option<FinancialReport>, DomainError>;

    /// Finds the non-archived report for a period key.
    async fn find_active_for_period(
        &self,
        key: &PeriodKey,
    ) -> Result<Option<FinancialReport>, DomainError>;

    /// Inserts a new report; `DuplicatePeriod` if its key is taken.
    async fn insert(&self, report: &FinancialReport) -> Result<(), DomainError>;

    /// Overwrites an existing report; `NotFound` if it does not exist.
    async fn save(&self, report: &FinancialReport) -> Result<(), DomainError>;

    /// Deletes a report; returns false if it did not exist.
    async fn delete(&self, id: ReportId) -> Result<bool, DomainError>;

    /// Lists reports matching `query`, newest period first.
    async fn query(&self, query: &ReportQuery) -> Result<Vec<FinancialReport>, DomainError>;

    /// Counts reports matching `query`, ignoring paging.
    async fn count(&self, query: &ReportQuery) -> Result<u64, DomainError>;
}
