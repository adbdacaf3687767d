//! Financial report routes.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use hospifin_core::DomainError;
use hospifin_core::export::ExportFormat;
use hospifin_core::lifecycle::{ReportFilter, ReportStatus};
use hospifin_core::report::{Derivation, FinancialReport, ReportDraft, ReportPatch, ReportType, TaxBreakdown};
use hospifin_shared::types::{PageRequest, PageResponse, ReportId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use crate::AppState;
use crate::error::ApiResult;
use crate::middleware::auth::CurrentActor;

/// Creates the report router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/reports", get(list_reports).post(create_report))
        .route("/reports/export", get(export_reports))
        .route("/reports/archive-stale", post(archive_stale))
        .route(
            "/reports/{id}",
            get(get_report).patch(update_report).delete(delete_report),
        )
        .route("/reports/{id}/submit", post(submit_report))
        .route("/reports/{id}/approve", post(approve_report))
        .route("/reports/{id}/reject", post(reject_report))
        .route("/reports/{id}/archive", post(archive_report))
        .route("/reports/{id}/tax-breakdown", get(tax_breakdown))
}

/// Filters for listing and exporting. Paging is read separately.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Only this report type.
    pub report_type: Option<ReportType>,
    /// Only this status.
    pub status: Option<ReportStatus>,
    /// Only this year.
    pub year: Option<i32>,
    /// Export layout.
    pub format: Option<ExportFormat>,
}

impl ListParams {
    const fn filter(&self) -> ReportFilter {
        ReportFilter {
            report_type: self.report_type,
            status: self.status,
            year: self.year,
        }
    }
}

/// A report with every derived figure.
#[derive(Debug, Serialize)]
pub struct ReportView {
    /// The stored report.
    #[serde(flatten)]
    pub report: FinancialReport,
    /// Figures recomputed from its line items.
    pub figures: Derivation,
}

impl From<FinancialReport> for ReportView {
    fn from(report: FinancialReport) -> Self {
        let figures = report.figures();
        Self { report, figures }
    }
}

/// Body of a rejection.
#[derive(Debug, Deserialize)]
pub struct RejectRequest {
    /// Why the report is sent back.
    pub reason: String,
}

/// Parameters of a bulk archive.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStaleParams {
    /// Age in months; defaults to the hospital's reporting setting.
    pub older_than_months: Option<u32>,
}

/// Result of a bulk archive.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveStaleResponse {
    /// IDs of the archived reports.
    pub archived: Vec<ReportId>,
    /// How many were archived.
    pub count: usize,
}

/// GET /reports - List reports of the caller's hospital.
async fn list_reports(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ListParams>,
    Query(page): Query<PageRequest>,
) -> ApiResult<Json<PageResponse<FinancialReport>>> {
    let page = state.reports().list(&actor, params.filter(), &page).await?;
    Ok(Json(page))
}

/// POST /reports - Create a draft.
async fn create_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Json(body): Json<Value>,
) -> ApiResult<(StatusCode, Json<ReportView>)> {
    let draft = ReportDraft::from_json(&body).map_err(DomainError::from)?;
    let settings = state.settings().find(&actor.hospital_id).await?;
    let report = state
        .reports()
        .create(&actor, draft, settings.as_ref())
        .await?;

    info!(
        report_id = %report.id,
        hospital_id = %report.hospital_id,
        user_id = %actor.user_id,
        period = %report.report_period().label(),
        "report created"
    );
    Ok((StatusCode::CREATED, Json(report.into())))
}

/// GET /reports/{id} - One report with derived figures.
async fn get_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
) -> ApiResult<Json<ReportView>> {
    let report = state.reports().get(&actor, id).await?;
    Ok(Json(report.into()))
}

/// PATCH /reports/{id} - Edit line items or notes.
async fn update_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
    Json(body): Json<Value>,
) -> ApiResult<Json<ReportView>> {
    let patch = ReportPatch::from_json(&body).map_err(DomainError::from)?;
    let report = state.reports().edit(&actor, id, patch).await?;
    info!(report_id = %id, user_id = %actor.user_id, "report updated");
    Ok(Json(report.into()))
}

/// DELETE /reports/{id} - Delete a draft.
async fn delete_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
) -> ApiResult<StatusCode> {
    state.reports().delete(&actor, id).await?;
    info!(report_id = %id, user_id = %actor.user_id, "report deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /reports/{id}/submit - Submit a draft for approval.
async fn submit_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
) -> ApiResult<Json<ReportView>> {
    let report = state.reports().submit(&actor, id).await?;
    info!(report_id = %id, user_id = %actor.user_id, "report submitted");
    Ok(Json(report.into()))
}

/// POST /reports/{id}/approve - Approve a submitted report.
async fn approve_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
) -> ApiResult<Json<ReportView>> {
    let report = state.reports().approve(&actor, id).await?;
    info!(report_id = %id, user_id = %actor.user_id, "report approved");
    Ok(Json(report.into()))
}

/// POST /reports/{id}/reject - Send a submitted report back to draft.
async fn reject_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
    Json(body): Json<RejectRequest>,
) -> ApiResult<Json<ReportView>> {
    let report = state.reports().reject(&actor, id, &body.reason).await?;
    info!(report_id = %id, user_id = %actor.user_id, "report rejected");
    Ok(Json(report.into()))
}

/// POST /reports/{id}/archive - Archive a report.
async fn archive_report(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
) -> ApiResult<Json<ReportView>> {
    let report = state.reports().archive(&actor, id).await?;
    info!(report_id = %id, user_id = %actor.user_id, "report archived");
    Ok(Json(report.into()))
}

/// POST /reports/archive-stale - Archive approved reports past the age limit.
async fn archive_stale(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ArchiveStaleParams>,
) -> ApiResult<Json<ArchiveStaleResponse>> {
    let months = match params.older_than_months {
        Some(months) => months,
        None => {
            state
                .settings()
                .find_or_default(&actor.hospital_id)
                .await?
                .reporting_settings
                .archive_after_months
        }
    };

    let archived = state
        .reports()
        .archive_stale(&actor, months, Utc::now().date_naive())
        .await?;

    info!(
        hospital_id = %actor.hospital_id,
        user_id = %actor.user_id,
        months,
        count = archived.len(),
        "stale reports archived"
    );
    Ok(Json(ArchiveStaleResponse {
        count: archived.len(),
        archived,
    }))
}

/// GET /reports/{id}/tax-breakdown - Flat-rate tax estimates.
async fn tax_breakdown(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Path(id): Path<ReportId>,
) -> ApiResult<Json<TaxBreakdown>> {
    let settings = state.settings().find(&actor.hospital_id).await?;
    let breakdown = state
        .reports()
        .tax_breakdown(&actor, id, settings.as_ref())
        .await?;
    Ok(Json(breakdown))
}

/// GET /reports/export - Download matching reports as CSV.
async fn export_reports(
    State(state): State<AppState>,
    CurrentActor(actor): CurrentActor,
    Query(params): Query<ListParams>,
) -> ApiResult<impl IntoResponse> {
    let exporter = params.format.unwrap_or_default().exporter();
    let body = state
        .reports()
        .export(&actor, exporter.as_ref(), params.filter())
        .await?;

    let disposition = format!(
        "attachment; filename=\"financial-reports.{}\"",
        exporter.file_extension()
    );
    Ok((
        [
            (header::CONTENT_TYPE, exporter.content_type().to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}
