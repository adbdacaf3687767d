//! Review schedule rules.

use chrono::{DateTime, Utc};
use hospifin_shared::types::ReviewScheduleId;

use crate::access::{Actor, Permission};
use crate::error::{DomainError, DomainResult};
use crate::report::FinancialReport;
use crate::review::types::{NewReview, ReviewSchedule, ReviewStatus};
use crate::validation::{ValidationError, require_max_len};

/// Maximum length of review notes.
pub const MAX_REVIEW_NOTES_LEN: usize = 500;

/// Stateless review schedule operations.
pub struct ReviewService;

impl ReviewService {
    /// Checks that `actor` may schedule reviews at all, before any lookups.
    pub fn authorize_schedule(actor: &Actor) -> DomainResult<()> {
        actor.require(Permission::EditReport)
    }

    /// Schedules a review of `report`. Requires `edit_report`.
    pub fn schedule(
        actor: &Actor,
        report: &FinancialReport,
        request: NewReview,
        now: DateTime<Utc>,
    ) -> DomainResult<ReviewSchedule> {
        Self::authorize_schedule(actor)?;
        if report.hospital_id != actor.hospital_id || report.id != request.report_id {
            return Err(DomainError::not_found("report", request.report_id));
        }
        let notes = Self::clean_notes(request.notes)?;

        Ok(ReviewSchedule {
            id: ReviewScheduleId::new(),
            report_id: report.id,
            hospital_id: report.hospital_id.clone(),
            scheduled_date: request.scheduled_date,
            review_type: request.review_type,
            assigned_to: request.assigned_to,
            status: ReviewStatus::Pending,
            notes,
            completed_at: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Moves `review` to `status`, optionally replacing its notes.
    ///
    /// Allowed for holders of `edit_report` and for the assignee. Completing
    /// stamps `completed_at`.
    pub fn update_status(
        actor: &Actor,
        review: &mut ReviewSchedule,
        status: ReviewStatus,
        notes: Option<String>,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        Self::authorize_update(actor, review)?;
        if !review.status.can_transition_to(status) {
            return Err(DomainError::InvalidReviewTransition {
                from: review.status,
                to: status,
            });
        }
        if notes.is_some() {
            review.notes = Self::clean_notes(notes)?;
        }

        review.status = status;
        if status == ReviewStatus::Completed {
            review.completed_at = Some(now);
        }
        review.updated_at = now;
        Ok(())
    }

    /// Deleting a schedule requires `edit_report`.
    pub fn authorize_delete(actor: &Actor, review: &ReviewSchedule) -> DomainResult<()> {
        actor.require(Permission::EditReport)?;
        Self::check_hospital(actor, review)
    }

    /// An open review whose date has passed.
    #[must_use]
    pub fn is_overdue(review: &ReviewSchedule, now: DateTime<Utc>) -> bool {
        review.status.is_open() && review.scheduled_date < now
    }

    /// Flags `review` as overdue when it is. Returns whether it changed.
    pub fn mark_overdue(review: &mut ReviewSchedule, now: DateTime<Utc>) -> bool {
        if !Self::is_overdue(review, now) {
            return false;
        }
        review.status = ReviewStatus::Overdue;
        review.updated_at = now;
        true
    }

    fn authorize_update(actor: &Actor, review: &ReviewSchedule) -> DomainResult<()> {
        Self::check_hospital(actor, review)?;
        if review.assigned_to == actor.user_id {
            return Ok(());
        }
        actor.require(Permission::EditReport)
    }

    fn check_hospital(actor: &Actor, review: &ReviewSchedule) -> DomainResult<()> {
        if review.hospital_id == actor.hospital_id {
            Ok(())
        } else {
            Err(DomainError::not_found("review", review.id))
        }
    }

    fn clean_notes(notes: Option<String>) -> Result<Option<String>, ValidationError> {
        let notes = notes
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty());
        if let Some(n) = &notes {
            require_max_len("notes", n, MAX_REVIEW_NOTES_LEN)?;
        }
        Ok(notes)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use hospifin_shared::types::UserId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::access::Role;
    use crate::report::{LineItems, ReportDraft, ReportPeriod};
    use crate::review::types::ReviewType;

    fn report() -> FinancialReport {
        FinancialReport::new_draft(
            "hospital-1".to_string(),
            ReportDraft::new(ReportPeriod::monthly(2024, 1), LineItems::default()),
            dec!(0.25),
            UserId::new(),
            Utc::now(),
        )
    }

    fn scheduled(assignee: UserId) -> ReviewSchedule {
        let report = report();
        let admin = Actor::new(UserId::new(), Role::Admin, "hospital-1");
        let request = NewReview {
            report_id: report.id,
            scheduled_date: Utc::now() + Duration::days(7),
            review_type: ReviewType::Monthly,
            assigned_to: assignee,
            notes: Some("  check pharmacy revenue  ".to_string()),
        };
        ReviewService::schedule(&admin, &report, request, Utc::now()).unwrap()
    }

    #[test]
    fn test_schedule_starts_pending() {
        let review = scheduled(UserId::new());
        assert_eq!(review.status, ReviewStatus::Pending);
        assert_eq!(review.notes.as_deref(), Some("check pharmacy revenue"));
        assert!(review.completed_at.is_none());
    }

    #[test]
    fn test_viewer_cannot_schedule() {
        let report = report();
        let viewer = Actor::new(UserId::new(), Role::Viewer, "hospital-1");
        let request = NewReview {
            report_id: report.id,
            scheduled_date: Utc::now(),
            review_type: ReviewType::Audit,
            assigned_to: viewer.user_id,
            notes: None,
        };
        assert!(matches!(
            ReviewService::schedule(&viewer, &report, request, Utc::now()),
            Err(DomainError::PermissionDenied { .. })
        ));
    }

    #[rstest]
    #[case(Role::Viewer, false)]
    #[case(Role::Finance, true)]
    #[case(Role::Admin, true)]
    fn test_authorize_schedule(#[case] role: Role, #[case] ok: bool) {
        let actor = Actor::new(UserId::new(), role, "hospital-1");
        match ReviewService::authorize_schedule(&actor) {
            Ok(()) => assert!(ok),
            Err(err) => {
                assert!(!ok);
                assert!(matches!(err, DomainError::PermissionDenied { .. }));
            }
        }
    }

    #[rstest]
    #[case(ReviewStatus::Pending, ReviewStatus::InProgress, true)]
    #[case(ReviewStatus::Pending, ReviewStatus::Completed, true)]
    #[case(ReviewStatus::Pending, ReviewStatus::Overdue, true)]
    #[case(ReviewStatus::InProgress, ReviewStatus::Completed, true)]
    #[case(ReviewStatus::InProgress, ReviewStatus::Pending, false)]
    #[case(ReviewStatus::Overdue, ReviewStatus::InProgress, true)]
    #[case(ReviewStatus::Completed, ReviewStatus::InProgress, false)]
    #[case(ReviewStatus::Completed, ReviewStatus::Overdue, false)]
    #[case(ReviewStatus::Pending, ReviewStatus::Pending, false)]
    fn test_transitions(#[case] from: ReviewStatus, #[case] to: ReviewStatus, #[case] ok: bool) {
        assert_eq!(from.can_transition_to(to), ok);
    }

    #[test]
    fn test_assignee_may_complete() {
        let viewer = Actor::new(UserId::new(), Role::Viewer, "hospital-1");
        let mut review = scheduled(viewer.user_id);
        let now = Utc::now();

        ReviewService::update_status(&viewer, &mut review, ReviewStatus::InProgress, None, now)
            .unwrap();
        ReviewService::update_status(&viewer, &mut review, ReviewStatus::Completed, None, now)
            .unwrap();

        assert_eq!(review.completed_at, Some(now));
        assert_eq!(review.notes.as_deref(), Some("check pharmacy revenue"));
    }

    #[test]
    fn test_other_viewer_cannot_update() {
        let mut review = scheduled(UserId::new());
        let viewer = Actor::new(UserId::new(), Role::Viewer, "hospital-1");
        assert!(matches!(
            ReviewService::update_status(
                &viewer,
                &mut review,
                ReviewStatus::Completed,
                None,
                Utc::now()
            ),
            Err(DomainError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_completed_is_terminal() {
        let finance = Actor::new(UserId::new(), Role::Finance, "hospital-1");
        let mut review = scheduled(UserId::new());
        let now = Utc::now();
        ReviewService::update_status(&finance, &mut review, ReviewStatus::Completed, None, now)
            .unwrap();

        let err = ReviewService::update_status(
            &finance,
            &mut review,
            ReviewStatus::InProgress,
            None,
            now,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::InvalidReviewTransition { .. }));
    }

    #[test]
    fn test_long_notes_rejected() {
        let finance = Actor::new(UserId::new(), Role::Finance, "hospital-1");
        let mut review = scheduled(UserId::new());
        let notes = Some("n".repeat(MAX_REVIEW_NOTES_LEN + 1));
        assert!(matches!(
            ReviewService::update_status(
                &finance,
                &mut review,
                ReviewStatus::InProgress,
                notes,
                Utc::now()
            ),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(review.status, ReviewStatus::Pending);
    }

    #[test]
    fn test_mark_overdue() {
        let mut review = scheduled(UserId::new());
        let before_due = review.scheduled_date - Duration::days(1);
        assert!(!ReviewService::mark_overdue(&mut review, before_due));

        let after_due = review.scheduled_date + Duration::days(1);
        assert!(ReviewService::mark_overdue(&mut review, after_due));
        assert_eq!(review.status, ReviewStatus::Overdue);
        assert!(!ReviewService::is_overdue(&review, after_due));
    }

    #[test]
    fn test_wire_names() {
        assert_eq!(
            serde_json::to_value(ReviewStatus::InProgress).unwrap(),
            "in-progress"
        );
        assert_eq!(ReviewStatus::parse("in-progress"), Some(ReviewStatus::InProgress));
        assert_eq!(ReviewType::parse("audit"), Some(ReviewType::Audit));
    }
}
