//! Report orchestration: guards, derivation, and persistence in one place.
//!
//! Each mutation is a single read-modify-write of one record. Concurrent
//! edits to the same report are last-write-wins.

use chrono::{NaiveDate, Utc};
use hospifin_shared::types::{PageRequest, PageResponse, ReportId};
use serde::Deserialize;

use crate::access::{Actor, Permission};
use crate::dashboard::{DashboardAggregator, DashboardStats};
use crate::error::{DomainError, DomainResult};
use crate::export::ReportExporter;
use crate::lifecycle::archive::ArchivePolicy;
use crate::lifecycle::service::LifecycleService;
use crate::lifecycle::store::{ReportQuery, ReportStore};
use crate::lifecycle::types::{LifecycleAction, LifecycleTransition, ReportStatus};
use crate::report::{
    DerivationEngine, FinancialReport, ReportDraft, ReportPatch, ReportType, TaxBreakdown,
    resolve_tax_rate,
};
use crate::settings::{HospitalSettings, TaxSettings};

/// Optional list filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportFilter {
    /// Only this report type.
    pub report_type: Option<ReportType>,
    /// Only this status.
    pub status: Option<ReportStatus>,
    /// Only this year.
    pub year: Option<i32>,
}

impl ReportFilter {
    fn query(self, hospital_id: &str) -> ReportQuery {
        ReportQuery {
            report_type: self.report_type,
            status: self.status,
            year: self.year,
            ..ReportQuery::for_hospital(hospital_id)
        }
    }
}

/// Applies an accepted transition's audit data to a report.
pub fn apply_transition(report: &mut FinancialReport, transition: LifecycleTransition) {
    match transition {
        LifecycleTransition::Edit { .. } | LifecycleTransition::Delete => {}
        LifecycleTransition::Submit {
            new_status,
            submitted_at,
            ..
        } => {
            report.status = new_status;
            report.rejection_reason = None;
            report.updated_at = submitted_at;
        }
        LifecycleTransition::Approve {
            new_status,
            approved_by,
            approved_at,
        } => {
            report.status = new_status;
            report.approved_by = Some(approved_by);
            report.approved_at = Some(approved_at);
            report.updated_at = approved_at;
        }
        LifecycleTransition::Reject { new_status, reason } => {
            report.status = new_status;
            report.rejection_reason = Some(reason);
            report.updated_at = Utc::now();
        }
        LifecycleTransition::Archive {
            new_status,
            archived_at,
        } => {
            report.status = new_status;
            report.updated_at = archived_at;
        }
    }
}

/// Runs report operations for an actor against a store.
#[derive(Debug)]
pub struct ReportManager<S> {
    store: S,
}

impl<S: ReportStore> ReportManager<S> {
    /// Creates a manager over `store`.
    pub const fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub const fn store(&self) -> &S {
        &self.store
    }

    /// Creates a draft for the actor's hospital.
    ///
    /// The tax rate comes from the draft, else `settings`, else the default.
    pub async fn create(
        &self,
        actor: &Actor,
        draft: ReportDraft,
        settings: Option<&HospitalSettings>,
    ) -> DomainResult<FinancialReport> {
        LifecycleService::create(actor.role)?;
        draft.validate()?;
        if draft
            .hospital_id
            .as_deref()
            .is_some_and(|h| h != actor.hospital_id)
        {
            return Err(DomainError::NotAllowed(
                "reports can only be created for your own hospital".to_string(),
            ));
        }

        let rate = resolve_tax_rate(draft.line_items.tax.rate, settings);
        let report = FinancialReport::new_draft(
            actor.hospital_id.clone(),
            draft,
            rate,
            actor.user_id,
            Utc::now(),
        );

        let key = report.period_key();
        if self.store.find_active_for_period(&key).await?.is_some() {
            return Err(DomainError::DuplicatePeriod { key });
        }
        self.store.insert(&report).await?;
        Ok(report)
    }

    /// Fetches one report of the actor's hospital.
    pub async fn get(&self, actor: &Actor, id: ReportId) -> DomainResult<FinancialReport> {
        actor.require_view()?;
        self.load(actor, id).await
    }

    /// Lists the actor's hospital reports, newest period first.
    pub async fn list(
        &self,
        actor: &Actor,
        filter: ReportFilter,
        page: &PageRequest,
    ) -> DomainResult<PageResponse<FinancialReport>> {
        actor.require_view()?;
        let query = filter
            .query(&actor.hospital_id)
            .paged(page.limit(), page.offset());
        let total = self.store.count(&query).await?;
        let reports = self.store.query(&query).await?;
        Ok(PageResponse::new(reports, page, total))
    }

    /// Edits line items or notes and recomputes every derived field.
    pub async fn edit(
        &self,
        actor: &Actor,
        id: ReportId,
        patch: ReportPatch,
    ) -> DomainResult<FinancialReport> {
        LifecycleService::authorize(actor.role, LifecycleAction::Edit)?;
        patch.validate()?;
        let mut report = self.load(actor, id).await?;
        LifecycleService::edit(report.status, actor.role)?;

        report.apply_patch(patch, Utc::now());
        self.store.save(&report).await?;
        Ok(report)
    }

    /// Submits a draft for approval.
    pub async fn submit(&self, actor: &Actor, id: ReportId) -> DomainResult<FinancialReport> {
        LifecycleService::authorize(actor.role, LifecycleAction::Submit)?;
        let mut report = self.load(actor, id).await?;
        let transition = LifecycleService::submit(report.status, actor.role, actor.user_id)?;
        apply_transition(&mut report, transition);
        self.store.save(&report).await?;
        Ok(report)
    }

    /// Approves a submitted report.
    pub async fn approve(&self, actor: &Actor, id: ReportId) -> DomainResult<FinancialReport> {
        LifecycleService::authorize(actor.role, LifecycleAction::Approve)?;
        let mut report = self.load(actor, id).await?;
        let transition = LifecycleService::approve(report.status, actor.role, actor.user_id)?;
        apply_transition(&mut report, transition);
        self.store.save(&report).await?;
        Ok(report)
    }

    /// Sends a submitted report back to draft.
    pub async fn reject(
        &self,
        actor: &Actor,
        id: ReportId,
        reason: &str,
    ) -> DomainResult<FinancialReport> {
        LifecycleService::authorize(actor.role, LifecycleAction::Reject)?;
        let mut report = self.load(actor, id).await?;
        let transition = LifecycleService::reject(report.status, actor.role, reason)?;
        apply_transition(&mut report, transition);
        self.store.save(&report).await?;
        Ok(report)
    }

    /// Archives a report.
    pub async fn archive(&self, actor: &Actor, id: ReportId) -> DomainResult<FinancialReport> {
        LifecycleService::authorize(actor.role, LifecycleAction::Archive)?;
        let mut report = self.load(actor, id).await?;
        let transition = LifecycleService::archive(report.status, actor.role)?;
        apply_transition(&mut report, transition);
        self.store.save(&report).await?;
        Ok(report)
    }

    /// Deletes a draft.
    pub async fn delete(&self, actor: &Actor, id: ReportId) -> DomainResult<()> {
        LifecycleService::authorize(actor.role, LifecycleAction::Delete)?;
        let report = self.load(actor, id).await?;
        LifecycleService::delete(report.status, actor.role)?;
        if self.store.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::not_found("report", id))
        }
    }

    /// Archives every approved report whose period ended at least
    /// `archive_after_months` before `today`. Returns the archived IDs.
    pub async fn archive_stale(
        &self,
        actor: &Actor,
        archive_after_months: u32,
        today: NaiveDate,
    ) -> DomainResult<Vec<ReportId>> {
        LifecycleService::authorize(actor.role, LifecycleAction::Archive)?;
        ArchivePolicy::check_months("olderThanMonths", archive_after_months)?;
        let query =
            ReportQuery::for_hospital(actor.hospital_id.clone()).with_status(ReportStatus::Approved);

        let mut archived = Vec::new();
        for mut report in self.store.query(&query).await? {
            if !ArchivePolicy::is_due(&report, archive_after_months, today) {
                continue;
            }
            let transition = LifecycleService::archive(report.status, actor.role)?;
            apply_transition(&mut report, transition);
            self.store.save(&report).await?;
            archived.push(report.id);
        }
        Ok(archived)
    }

    /// Dashboard snapshot over the hospital's approved reports.
    pub async fn dashboard(&self, actor: &Actor) -> DomainResult<DashboardStats> {
        actor.require_view()?;
        let reports = self
            .store
            .query(&ReportQuery::for_hospital(actor.hospital_id.clone()))
            .await?;
        Ok(DashboardAggregator::compute(&reports))
    }

    /// Flat-rate tax breakdown of one report.
    pub async fn tax_breakdown(
        &self,
        actor: &Actor,
        id: ReportId,
        settings: Option<&HospitalSettings>,
    ) -> DomainResult<TaxBreakdown> {
        let report = self.get(actor, id).await?;
        let default_rates = TaxSettings::default();
        let rates = settings.map_or(&default_rates, |s| &s.tax_settings);
        Ok(DerivationEngine::tax_breakdown(&report.figures(), rates))
    }

    /// Renders the matching reports with `exporter`.
    pub async fn export(
        &self,
        actor: &Actor,
        exporter: &dyn ReportExporter,
        filter: ReportFilter,
    ) -> DomainResult<Vec<u8>> {
        actor.require(Permission::ExportReports)?;
        let reports = self.store.query(&filter.query(&actor.hospital_id)).await?;
        exporter
            .export(&reports)
            .map_err(|e| DomainError::Export(e.to_string()))
    }

    async fn load(&self, actor: &Actor, id: ReportId) -> DomainResult<FinancialReport> {
        match self.store.find_by_id(id).await? {
            Some(report) if report.hospital_id == actor.hospital_id => Ok(report),
            _ => Err(DomainError::not_found("report", id)),
        }
    }
}
