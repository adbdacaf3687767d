//! Scenario tests for `ReportManager` over the in-memory store.

use chrono::NaiveDate;
use hospifin_shared::types::{PageRequest, ReportId, UserId};
use rust_decimal_macros::dec;

use crate::access::{Actor, Role};
use crate::error::DomainError;
use crate::export::SummaryCsvExporter;
use crate::lifecycle::{InMemoryReportStore, ReportFilter, ReportManager, ReportStatus};
use crate::report::{
    ExpenseItems, LineItems, ReportDraft, ReportPatch, ReportPeriod, RevenueItems, TaxInput,
};
use crate::settings::HospitalSettings;

fn actor(role: Role) -> Actor {
    Actor::new(UserId::new(), role, "hospital-1")
}

fn items(patient_care: rust_decimal::Decimal) -> LineItems {
    LineItems {
        revenue: RevenueItems {
            patient_care,
            ..RevenueItems::default()
        },
        expenses: ExpenseItems {
            salaries: dec!(400),
            ..ExpenseItems::default()
        },
        ..LineItems::default()
    }
}

fn monthly(month: u32) -> ReportDraft {
    ReportDraft::new(ReportPeriod::monthly(2024, month), items(dec!(1000)))
}

fn manager() -> ReportManager<InMemoryReportStore> {
    ReportManager::new(InMemoryReportStore::new())
}

async fn approved(
    manager: &ReportManager<InMemoryReportStore>,
    admin: &Actor,
    draft: ReportDraft,
) -> ReportId {
    let report = manager.create(admin, draft, None).await.unwrap();
    manager.submit(admin, report.id).await.unwrap();
    manager.approve(admin, report.id).await.unwrap();
    report.id
}

#[tokio::test]
async fn test_second_report_for_same_period_is_rejected() {
    let manager = manager();
    let finance = actor(Role::Finance);

    let first = manager.create(&finance, monthly(1), None).await.unwrap();
    let err = manager.create(&finance, monthly(1), None).await.unwrap_err();

    assert!(matches!(err, DomainError::DuplicatePeriod { .. }));
    let stored = manager.get(&finance, first.id).await.unwrap();
    assert_eq!(stored.status, ReportStatus::Draft);
    assert_eq!(manager.store().len().await, 1);
}

#[tokio::test]
async fn test_archived_period_can_be_recreated() {
    let manager = manager();
    let admin = actor(Role::Admin);
    let id = approved(&manager, &admin, monthly(1)).await;
    manager.archive(&admin, id).await.unwrap();

    assert!(manager.create(&admin, monthly(1), None).await.is_ok());
}

#[tokio::test]
async fn test_submit_then_approve_locks_out_finance() {
    let manager = manager();
    let finance = actor(Role::Finance);
    let admin = actor(Role::Admin);

    let report = manager.create(&finance, monthly(2), None).await.unwrap();
    manager.submit(&finance, report.id).await.unwrap();
    let report = manager.approve(&admin, report.id).await.unwrap();

    assert_eq!(report.status, ReportStatus::Approved);
    assert!(report.approved_at.is_some());
    assert_eq!(report.approved_by, Some(admin.user_id));

    let patch = ReportPatch {
        notes: Some(Some("late adjustment".to_string())),
        ..ReportPatch::default()
    };
    let err = manager
        .edit(&finance, report.id, patch.clone())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::InvalidTransition { .. }));

    let edited = manager.edit(&admin, report.id, patch).await.unwrap();
    assert_eq!(edited.notes.as_deref(), Some("late adjustment"));
    assert_eq!(edited.status, ReportStatus::Approved);
}

#[tokio::test]
async fn test_approve_on_draft_and_double_submit_fail() {
    let manager = manager();
    let admin = actor(Role::Admin);
    let report = manager.create(&admin, monthly(3), None).await.unwrap();

    assert!(matches!(
        manager.approve(&admin, report.id).await,
        Err(DomainError::InvalidTransition { .. })
    ));
    manager.submit(&admin, report.id).await.unwrap();
    assert!(matches!(
        manager.submit(&admin, report.id).await,
        Err(DomainError::InvalidTransition { .. })
    ));
}

#[tokio::test]
async fn test_viewer_cannot_create() {
    let manager = manager();
    let err = manager
        .create(&actor(Role::Viewer), monthly(1), None)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::PermissionDenied { .. }));
    assert!(manager.store().is_empty().await);
}

#[tokio::test]
async fn test_other_hospital_sees_not_found() {
    let manager = manager();
    let report = manager
        .create(&actor(Role::Finance), monthly(1), None)
        .await
        .unwrap();

    let outsider = Actor::new(UserId::new(), Role::Admin, "hospital-2");
    assert!(matches!(
        manager.get(&outsider, report.id).await,
        Err(DomainError::NotFound { .. })
    ));
    assert!(matches!(
        manager.delete(&outsider, report.id).await,
        Err(DomainError::NotFound { .. })
    ));
}

#[tokio::test]
async fn test_edit_recomputes_derived_fields() {
    let manager = manager();
    let finance = actor(Role::Finance);
    let report = manager.create(&finance, monthly(1), None).await.unwrap();
    assert_eq!(report.tax.income, dec!(600));

    let patch = ReportPatch {
        revenue: Some(RevenueItems {
            patient_care: dec!(2000),
            ..RevenueItems::default()
        }),
        tax: Some(TaxInput {
            rate: None,
            deductions: dec!(100),
        }),
        ..ReportPatch::default()
    };
    let edited = manager.edit(&finance, report.id, patch).await.unwrap();
    assert_eq!(edited.tax.income, dec!(1600));
    assert_eq!(edited.tax.net_taxable, dec!(1500));
    assert_eq!(edited.tax.amount, dec!(375));
    assert_eq!(edited.tax.rate, dec!(0.25));
}

#[tokio::test]
async fn test_tax_rate_falls_back_to_hospital_settings() {
    let manager = manager();
    let finance = actor(Role::Finance);
    let mut settings = HospitalSettings::defaults_for("hospital-1", "RS Test");
    settings.tax_settings.corporate_tax_rate = dec!(0.22);

    let report = manager
        .create(&finance, monthly(1), Some(&settings))
        .await
        .unwrap();
    assert_eq!(report.tax.rate, dec!(0.22));
    assert_eq!(report.tax.amount, dec!(132));
}

#[tokio::test]
async fn test_reject_requires_reason_and_returns_to_draft() {
    let manager = manager();
    let finance = actor(Role::Finance);
    let admin = actor(Role::Admin);
    let report = manager.create(&finance, monthly(1), None).await.unwrap();
    manager.submit(&finance, report.id).await.unwrap();

    assert!(manager.reject(&admin, report.id, "   ").await.is_err());
    let rejected = manager
        .reject(&admin, report.id, "salaries missing")
        .await
        .unwrap();
    assert_eq!(rejected.status, ReportStatus::Draft);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("salaries missing"));

    let resubmitted = manager.submit(&finance, report.id).await.unwrap();
    assert!(resubmitted.rejection_reason.is_none());
}

#[tokio::test]
async fn test_delete_only_drafts() {
    let manager = manager();
    let admin = actor(Role::Admin);
    let draft = manager.create(&admin, monthly(1), None).await.unwrap();
    let done = approved(&manager, &admin, monthly(2)).await;

    assert!(matches!(
        manager.delete(&actor(Role::Finance), draft.id).await,
        Err(DomainError::PermissionDenied { .. })
    ));
    manager.delete(&admin, draft.id).await.unwrap();
    assert!(matches!(
        manager.delete(&admin, done).await,
        Err(DomainError::InvalidTransition { .. })
    ));
    assert_eq!(manager.store().len().await, 1);
}

#[tokio::test]
async fn test_list_pages_newest_period_first() {
    let manager = manager();
    let finance = actor(Role::Finance);
    for month in 1..=5 {
        manager.create(&finance, monthly(month), None).await.unwrap();
    }

    let page = PageRequest {
        page: 1,
        per_page: 2,
    };
    let result = manager
        .list(&finance, ReportFilter::default(), &page)
        .await
        .unwrap();
    assert_eq!(result.meta.total, 5);
    assert_eq!(result.meta.total_pages, 3);
    let months: Vec<_> = result.data.iter().map(|r| r.month).collect();
    assert_eq!(months, vec![Some(5), Some(4)]);

    let filter = ReportFilter {
        status: Some(ReportStatus::Approved),
        ..ReportFilter::default()
    };
    let none = manager.list(&finance, filter, &page).await.unwrap();
    assert!(none.data.is_empty());
}

#[tokio::test]
async fn test_archive_stale_only_old_approved_reports() {
    let manager = manager();
    let admin = actor(Role::Admin);
    let old = approved(&manager, &admin, monthly(1)).await;
    let recent = approved(
        &manager,
        &admin,
        ReportDraft::new(ReportPeriod::monthly(2025, 6), items(dec!(1000))),
    )
    .await;
    manager.create(&admin, monthly(2), None).await.unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
    let archived = manager.archive_stale(&admin, 24, today).await.unwrap();
    assert_eq!(archived, vec![old]);

    let recent = manager.get(&admin, recent).await.unwrap();
    assert_eq!(recent.status, ReportStatus::Approved);
}

#[tokio::test]
async fn test_archive_stale_rejects_out_of_range_age() {
    let manager = manager();
    let admin = actor(Role::Admin);
    let id = approved(&manager, &admin, monthly(1)).await;
    let period_end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();

    for months in [0, 121] {
        let err = manager
            .archive_stale(&admin, months, period_end)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)), "{months}: {err:?}");
    }

    let report = manager.get(&admin, id).await.unwrap();
    assert_eq!(report.status, ReportStatus::Approved);
}

#[tokio::test]
async fn test_dashboard_reads_approved_reports() {
    let manager = manager();
    let admin = actor(Role::Admin);
    approved(&manager, &admin, monthly(1)).await;
    approved(
        &manager,
        &admin,
        ReportDraft::new(ReportPeriod::monthly(2024, 2), items(dec!(1500))),
    )
    .await;
    manager.create(&admin, monthly(3), None).await.unwrap();

    let stats = manager.dashboard(&actor(Role::Viewer)).await.unwrap();
    assert_eq!(stats.total_revenue, dec!(1500));
    assert_eq!(stats.revenue_growth, dec!(50));
    assert_eq!(stats.report_count, 2);
}

#[tokio::test]
async fn test_export_and_tax_breakdown() {
    let manager = manager();
    let finance = actor(Role::Finance);
    let report = manager.create(&finance, monthly(1), None).await.unwrap();

    let csv = manager
        .export(&actor(Role::Viewer), &SummaryCsvExporter, ReportFilter::default())
        .await
        .unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 2);

    let breakdown = manager.tax_breakdown(&finance, report.id, None).await.unwrap();
    assert_eq!(breakdown.corporate_tax, dec!(150));
    assert_eq!(breakdown.vat_on_revenue, dec!(110));
    assert_eq!(breakdown.withholding_tax, dec!(20));
}
