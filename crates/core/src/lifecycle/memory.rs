//! In-memory report store.

use std::cmp::Ordering;
use std::collections::HashMap;

use async_trait::async_trait;
use hospifin_shared::types::ReportId;
use tokio::sync::RwLock;

use crate::error::DomainError;
use crate::lifecycle::store::{ReportQuery, ReportStore};
use crate::lifecycle::types::ReportStatus;
use crate::report::{FinancialReport, PeriodKey};

/// A `ReportStore` kept in process memory.
///
/// Uniqueness is checked under the write lock, so concurrent inserts for the
/// same period cannot both succeed.
#[derive(Debug, Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<ReportId, FinancialReport>>,
}

impl InMemoryReportStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored reports.
    pub async fn len(&self) -> usize {
        self.reports.read().await.len()
    }

    /// Returns true if no reports are stored.
    pub async fn is_empty(&self) -> bool {
        self.reports.read().await.is_empty()
    }
}

/// Newest period first, then newest creation first.
pub fn newest_period_first(a: &FinancialReport, b: &FinancialReport) -> Ordering {
    b.report_period()
        .end_date()
        .cmp(&a.report_period().end_date())
        .then_with(|| b.created_at.cmp(&a.created_at))
}

fn is_active_for(report: &FinancialReport, key: &PeriodKey) -> bool {
    report.status != ReportStatus::Archived && report.period_key() == *key
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn find_by_id(&self, id: ReportId) -> Result<Option<FinancialReport>, DomainError> {
        Ok(self.reports.read().await.get(&id).cloned())
    }

    async fn find_active_for_period(
        &self,
        key: &PeriodKey,
    ) -> Result<Option<FinancialReport>, DomainError> {
        Ok(self
            .reports
            .read()
            .await
            .values()
            .find(|r| is_active_for(r, key))
            .cloned())
    }

    async fn insert(&self, report: &FinancialReport) -> Result<(), DomainError> {
        let mut reports = self.reports.write().await;
        if reports.contains_key(&report.id) {
            return Err(DomainError::Conflict(format!(
                "report {} already exists",
                report.id
            )));
        }
        let key = report.period_key();
        if report.status != ReportStatus::Archived
            && reports.values().any(|r| is_active_for(r, &key))
        {
            return Err(DomainError::DuplicatePeriod { key });
        }
        reports.insert(report.id, report.clone());
        Ok(())
    }

    async fn save(&self, report: &FinancialReport) -> Result<(), DomainError> {
        let mut reports = self.reports.write().await;
        match reports.get_mut(&report.id) {
            Some(slot) => {
                *slot = report.clone();
                Ok(())
            }
            None => Err(DomainError::not_found("report", report.id)),
        }
    }

    async fn delete(&self, id: ReportId) -> Result<bool, DomainError> {
        Ok(self.reports.write().await.remove(&id).is_some())
    }

    async fn query(&self, query: &ReportQuery) -> Result<Vec<FinancialReport>, DomainError> {
        let reports = self.reports.read().await;
        let mut matching: Vec<FinancialReport> = reports
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        matching.sort_by(newest_period_first);

        let offset = usize::try_from(query.offset).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |l| usize::try_from(l).unwrap_or(usize::MAX));
        Ok(matching.into_iter().skip(offset).take(limit).collect())
    }

    async fn count(&self, query: &ReportQuery) -> Result<u64, DomainError> {
        let reports = self.reports.read().await;
        let count = reports.values().filter(|r| query.matches(r)).count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}
