//! Review schedule repository.

use chrono::{DateTime, Utc};
use hospifin_core::DomainError;
use hospifin_core::review::{ReviewSchedule, ReviewService, ReviewStatus, ReviewType};
use hospifin_shared::types::{ReportId, ReviewScheduleId, UserId};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::Deserialize;
use tracing::info;

use crate::entities::{
    review_schedules,
    sea_orm_active_enums::{ReviewStatus as DbReviewStatus, ReviewType as DbReviewType},
};
use crate::repositories::storage_error;

/// Optional review list filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewFilter {
    /// Only this status.
    pub status: Option<ReviewStatus>,
    /// Only reviews assigned to this user.
    pub assigned_to: Option<UserId>,
    /// Only reviews of this report.
    pub report_id: Option<ReportId>,
}

/// Review schedule repository.
#[derive(Debug, Clone)]
pub struct ReviewRepository {
    db: DatabaseConnection,
}

impl ReviewRepository {
    /// Creates a new review repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a review by ID.
    pub async fn find_by_id(
        &self,
        id: ReviewScheduleId,
    ) -> Result<Option<ReviewSchedule>, DomainError> {
        review_schedules::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map(|m| m.map(to_domain))
            .map_err(|e| storage_error("loading review", &e))
    }

    /// Lists a hospital's reviews, earliest date first.
    pub async fn list(
        &self,
        hospital_id: &str,
        filter: ReviewFilter,
    ) -> Result<Vec<ReviewSchedule>, DomainError> {
        let mut select = review_schedules::Entity::find()
            .filter(review_schedules::Column::HospitalId.eq(hospital_id));
        if let Some(status) = filter.status {
            select = select.filter(review_schedules::Column::Status.eq(to_db_status(status)));
        }
        if let Some(user) = filter.assigned_to {
            select = select.filter(review_schedules::Column::AssignedTo.eq(user.into_inner()));
        }
        if let Some(report) = filter.report_id {
            select = select.filter(review_schedules::Column::ReportId.eq(report.into_inner()));
        }

        select
            .order_by_asc(review_schedules::Column::ScheduledDate)
            .all(&self.db)
            .await
            .map(|models| models.into_iter().map(to_domain).collect())
            .map_err(|e| storage_error("listing reviews", &e))
    }

    /// Stores a new review.
    pub async fn insert(&self, review: &ReviewSchedule) -> Result<(), DomainError> {
        to_active_model(review)
            .insert(&self.db)
            .await
            .map_err(|e| storage_error("scheduling review", &e))?;
        info!(review_id = %review.id, report_id = %review.report_id, assigned_to = %review.assigned_to, "review scheduled");
        Ok(())
    }

    /// Overwrites a stored review.
    pub async fn save(&self, review: &ReviewSchedule) -> Result<(), DomainError> {
        match to_active_model(review).update(&self.db).await {
            Ok(_) => {
                info!(review_id = %review.id, status = %review.status, "review updated");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => Err(DomainError::not_found("review", review.id)),
            Err(e) => Err(storage_error("saving review", &e)),
        }
    }

    /// Deletes a review. Returns whether it existed.
    pub async fn delete(&self, id: ReviewScheduleId) -> Result<bool, DomainError> {
        let result = review_schedules::Entity::delete_by_id(id.into_inner())
            .exec(&self.db)
            .await
            .map_err(|e| storage_error("deleting review", &e))?;
        Ok(result.rows_affected > 0)
    }

    /// Flags every open review of the hospital whose date has passed.
    /// Returns how many changed.
    pub async fn mark_overdue(
        &self,
        hospital_id: &str,
        now: DateTime<Utc>,
    ) -> Result<usize, DomainError> {
        let open = review_schedules::Entity::find()
            .filter(review_schedules::Column::HospitalId.eq(hospital_id))
            .filter(
                review_schedules::Column::Status
                    .is_in([DbReviewStatus::Pending, DbReviewStatus::InProgress]),
            )
            .filter(review_schedules::Column::ScheduledDate.lt(now))
            .all(&self.db)
            .await
            .map_err(|e| storage_error("loading open reviews", &e))?;

        let mut changed = 0;
        for model in open {
            let mut review = to_domain(model);
            if ReviewService::mark_overdue(&mut review, now) {
                self.save(&review).await?;
                changed += 1;
            }
        }
        Ok(changed)
    }
}

/// Convert domain status to database enum.
const fn to_db_status(status: ReviewStatus) -> DbReviewStatus {
    match status {
        ReviewStatus::Pending => DbReviewStatus::Pending,
        ReviewStatus::InProgress => DbReviewStatus::InProgress,
        ReviewStatus::Completed => DbReviewStatus::Completed,
        ReviewStatus::Overdue => DbReviewStatus::Overdue,
    }
}

/// Convert database status to domain enum.
const fn from_db_status(status: DbReviewStatus) -> ReviewStatus {
    match status {
        DbReviewStatus::Pending => ReviewStatus::Pending,
        DbReviewStatus::InProgress => ReviewStatus::InProgress,
        DbReviewStatus::Completed => ReviewStatus::Completed,
        DbReviewStatus::Overdue => ReviewStatus::Overdue,
    }
}

const fn to_db_type(review_type: ReviewType) -> DbReviewType {
    match review_type {
        ReviewType::Monthly => DbReviewType::Monthly,
        ReviewType::Quarterly => DbReviewType::Quarterly,
        ReviewType::Annual => DbReviewType::Annual,
        ReviewType::Audit => DbReviewType::Audit,
    }
}

const fn from_db_type(review_type: DbReviewType) -> ReviewType {
    match review_type {
        DbReviewType::Monthly => ReviewType::Monthly,
        DbReviewType::Quarterly => ReviewType::Quarterly,
        DbReviewType::Annual => ReviewType::Annual,
        DbReviewType::Audit => ReviewType::Audit,
    }
}

fn to_active_model(review: &ReviewSchedule) -> review_schedules::ActiveModel {
    review_schedules::ActiveModel {
        id: Set(review.id.into_inner()),
        report_id: Set(review.report_id.into_inner()),
        hospital_id: Set(review.hospital_id.clone()),
        scheduled_date: Set(review.scheduled_date.into()),
        review_type: Set(to_db_type(review.review_type)),
        assigned_to: Set(review.assigned_to.into_inner()),
        status: Set(to_db_status(review.status)),
        notes: Set(review.notes.clone()),
        completed_at: Set(review.completed_at.map(Into::into)),
        created_at: Set(review.created_at.into()),
        updated_at: Set(review.updated_at.into()),
    }
}

fn to_domain(model: review_schedules::Model) -> ReviewSchedule {
    ReviewSchedule {
        id: ReviewScheduleId::from_uuid(model.id),
        report_id: ReportId::from_uuid(model.report_id),
        hospital_id: model.hospital_id,
        scheduled_date: model.scheduled_date.with_timezone(&Utc),
        review_type: from_db_type(model.review_type),
        assigned_to: UserId::from_uuid(model.assigned_to),
        status: from_db_status(model.status),
        notes: model.notes,
        completed_at: model.completed_at.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
