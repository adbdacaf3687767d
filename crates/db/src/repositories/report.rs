//! PostgreSQL-backed report store.
//!
//! The partial unique index `uq_reports_active_period` guarantees at most one
//! non-archived report per hospital and period even under concurrent inserts.

use async_trait::async_trait;
use chrono::Utc;
use hospifin_core::DomainError;
use hospifin_core::lifecycle::{ReportQuery, ReportStatus, ReportStore};
use hospifin_core::report::{FinancialReport, PeriodKey, ReportType};
use hospifin_shared::types::{ReportId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr,
};
use tracing::debug;

use crate::entities::{
    financial_reports,
    sea_orm_active_enums::{ReportStatus as DbReportStatus, ReportType as DbReportType},
};
use crate::repositories::{from_json, storage_error, to_json};

/// Report repository implementing [`ReportStore`].
#[derive(Debug, Clone)]
pub struct ReportRepository {
    db: DatabaseConnection,
}

impl ReportRepository {
    /// Creates a new report repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn filtered(query: &ReportQuery) -> Select<financial_reports::Entity> {
        let mut select = financial_reports::Entity::find()
            .filter(financial_reports::Column::HospitalId.eq(query.hospital_id.as_str()));
        if let Some(report_type) = query.report_type {
            select = select.filter(financial_reports::Column::ReportType.eq(to_db_type(report_type)));
        }
        if let Some(status) = query.status {
            select = select.filter(financial_reports::Column::Status.eq(to_db_status(status)));
        }
        if let Some(year) = query.year {
            select = select.filter(financial_reports::Column::Year.eq(year));
        }
        select
    }
}

#[async_trait]
impl ReportStore for ReportRepository {
    async fn find_by_id(&self, id: ReportId) -> Result<Option<FinancialReport>, DomainError> {
        financial_reports::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| storage_error("loading report", &e))?
            .map(to_domain)
            .transpose()
    }

    async fn find_active_for_period(
        &self,
        key: &PeriodKey,
    ) -> Result<Option<FinancialReport>, DomainError> {
        let period = key.period;
        let month = to_i32(period.month);
        let quarter = to_i32(period.quarter);

        financial_reports::Entity::find()
            .filter(financial_reports::Column::HospitalId.eq(key.hospital_id.as_str()))
            .filter(financial_reports::Column::ReportType.eq(to_db_type(period.report_type)))
            .filter(financial_reports::Column::Year.eq(period.year))
            .filter(optional_eq(financial_reports::Column::Month, month))
            .filter(optional_eq(financial_reports::Column::Quarter, quarter))
            .filter(financial_reports::Column::Status.ne(DbReportStatus::Archived))
            .one(&self.db)
            .await
            .map_err(|e| storage_error("looking up report period", &e))?
            .map(to_domain)
            .transpose()
    }

    async fn insert(&self, report: &FinancialReport) -> Result<(), DomainError> {
        let model = to_active_model(report)?;
        match model.insert(&self.db).await {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(DomainError::DuplicatePeriod {
                key: report.period_key(),
            }),
            Err(e) => Err(storage_error("inserting report", &e)),
        }
    }

    async fn save(&self, report: &FinancialReport) -> Result<(), DomainError> {
        let model = to_active_model(report)?;
        match model.update(&self.db).await {
            Ok(_) => {
                debug!(report_id = %report.id, status = %report.status, "report row updated");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(DomainError::not_found("report", report.id)),
            Err(e) => Err(storage_error("saving report", &e)),
        }
    }

    async fn delete(&self, id: ReportId) -> Result<bool, DomainError> {
        let result = financial_reports::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error("deleting report", &e))?;
        Ok(result.rows_affected > 0)
    }

    async fn query(&self, query: &ReportQuery) -> Result<Vec<FinancialReport>, DomainError> {
        let mut select = Self::filtered(query)
            .order_by_desc(financial_reports::Column::PeriodEnd)
            .order_by_desc(financial_reports::Column::CreatedAt)
            .offset(query.offset);
        if let Some(limit) = query.limit {
            select = select.limit(limit);
        }

        select
            .all(&self.db)
            .await
            .map_err(|e| storage_error("listing reports", &e))?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn count(&self, query: &ReportQuery) -> Result<u64, DomainError> {
        Self::filtered(query)
            .count(&self.db)
            .await
            .map_err(|e| storage_error("counting reports", &e))
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

fn optional_eq(column: financial_reports::Column, value: Option<i32>) -> Condition {
    match value {
        Some(v) => Condition::all().add(column.eq(v)),
        None => Condition::all().add(column.is_null()),
    }
}

/// Convert domain report type to database enum.
const fn to_db_type(report_type: ReportType) -> DbReportType {
    match report_type {
        ReportType::Monthly => DbReportType::Monthly,
        ReportType::Quarterly => DbReportType::Quarterly,
        ReportType::Annual => DbReportType::Annual,
    }
}

/// Convert database report type to domain enum.
const fn from_db_type(report_type: DbReportType) -> ReportType {
    match report_type {
        DbReportType::Monthly => ReportType::Monthly,
        DbReportType::Quarterly => ReportType::Quarterly,
        DbReportType::Annual => ReportType::Annual,
    }
}

/// Convert domain status to database enum.
pub(crate) const fn to_db_status(status: ReportStatus) -> DbReportStatus {
    match status {
        ReportStatus::Draft => DbReportStatus::Draft,
        ReportStatus::Submitted => DbReportStatus::Submitted,
        ReportStatus::Approved => DbReportStatus::Approved,
        ReportStatus::Archived => DbReportStatus::Archived,
    }
}

/// Convert database status to domain enum.
const fn from_db_status(status: DbReportStatus) -> ReportStatus {
    match status {
        DbReportStatus::Draft => ReportStatus::Draft,
        DbReportStatus::Submitted => ReportStatus::Submitted,
        DbReportStatus::Approved => ReportStatus::Approved,
        DbReportStatus::Archived => ReportStatus::Archived,
    }
}

fn to_i32(value: Option<u32>) -> Option<i32> {
    value.and_then(|v| i32::try_from(v).ok())
}

fn to_u32(value: Option<i32>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

/// Convert domain report to an active model with every column set.
pub(crate) fn to_active_model(
    report: &FinancialReport,
) -> Result<financial_reports::ActiveModel, DomainError> {
    let period_end = report
        .report_period()
        .end_date()
        .ok_or_else(|| DomainError::Storage(format!("report {} has no period end", report.id)))?;

    Ok(financial_reports::ActiveModel {
        id: Set(report.id.into_inner()),
        hospital_id: Set(report.hospital_id.clone()),
        report_type: Set(to_db_type(report.report_type)),
        period: Set(report.period.clone()),
        year: Set(report.year),
        month: Set(to_i32(report.month)),
        quarter: Set(to_i32(report.quarter)),
        period_end: Set(period_end),
        revenue: Set(to_json("revenue", &report.revenue)?),
        expenses: Set(to_json("expenses", &report.expenses)?),
        assets: Set(to_json("assets", &report.assets)?),
        liabilities: Set(to_json("liabilities", &report.liabilities)?),
        equity: Set(to_json("equity", &report.equity)?),
        tax: Set(to_json("tax", &report.tax)?),
        balance_sheet: Set(to_json("balance_sheet", &report.balance_sheet)?),
        status: Set(to_db_status(report.status)),
        created_by: Set(report.created_by.into_inner()),
        approved_by: Set(report.approved_by.map(UserId::into_inner)),
        approved_at: Set(report.approved_at.map(Into::into)),
        rejection_reason: Set(report.rejection_reason.clone()),
        notes: Set(report.notes.clone()),
        created_at: Set(report.created_at.into()),
        updated_at: Set(report.updated_at.into()),
    })
}

/// Convert database model to domain report.
pub(crate) fn to_domain(model: financial_reports::Model) -> Result<FinancialReport, DomainError> {
    Ok(FinancialReport {
        id: ReportId::from_uuid(model.id),
        hospital_id: model.hospital_id,
        report_type: from_db_type(model.report_type),
        period: model.period,
        year: model.year,
        month: to_u32(model.month),
        quarter: to_u32(model.quarter),
        revenue: from_json("revenue", model.revenue)?,
        expenses: from_json("expenses", model.expenses)?,
        assets: from_json("assets", model.assets)?,
        liabilities: from_json("liabilities", model.liabilities)?,
        equity: from_json("equity", model.equity)?,
        tax: from_json("tax", model.tax)?,
        balance_sheet: from_json("balance_sheet", model.balance_sheet)?,
        status: from_db_status(model.status),
        created_by: UserId::from_uuid(model.created_by),
        approved_by: model.approved_by.map(UserId::from_uuid),
        approved_at: model.approved_at.map(|t| t.with_timezone(&Utc)),
        rejection_reason: model.rejection_reason,
        notes: model.notes,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use hospifin_core::report::{LineItems, ReportDraft, ReportPeriod, RevenueItems};
    use rust_decimal_macros::dec;
    use sea_orm::ActiveValue;

    use super::*;

    fn report() -> FinancialReport {
        let items = LineItems {
            revenue: RevenueItems {
                patient_care: dec!(2500000000),
                ..RevenueItems::default()
            },
            ..LineItems::default()
        };
        FinancialReport::new_draft(
            "hospital-1".to_string(),
            ReportDraft::new(ReportPeriod::quarterly(2024, 2), items),
            dec!(0.25),
            UserId::new(),
            Utc::now(),
        )
    }

    #[test]
    fn test_active_model_columns() {
        let report = report();
        let model = to_active_model(&report).unwrap();

        assert_eq!(model.quarter, ActiveValue::Set(Some(2)));
        assert_eq!(model.month, ActiveValue::Set(None));
        assert_eq!(
            model.period_end,
            ActiveValue::Set(chrono::NaiveDate::from_ymd_opt(2024, 6, 30).unwrap())
        );
        assert_eq!(model.status, ActiveValue::Set(DbReportStatus::Draft));

        let ActiveValue::Set(revenue) = model.revenue else {
            panic!("revenue column not set");
        };
        assert_eq!(revenue["patientCare"], "2500000000");
    }

    #[test]
    fn test_status_mapping_is_total() {
        for status in ReportStatus::ALL {
            assert_eq!(from_db_status(to_db_status(status)), status);
        }
    }
}
