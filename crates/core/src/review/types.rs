//! Review schedule types.

use std::fmt;

use chrono::{DateTime, Utc};
use hospifin_shared::types::{ReportId, ReviewScheduleId, UserId};
use serde::{Deserialize, Serialize};

/// Kind of review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    /// Monthly review.
    Monthly,
    /// Quarterly review.
    Quarterly,
    /// Annual review.
    Annual,
    /// External or internal audit.
    Audit,
}

impl ReviewType {
    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annual => "annual",
            Self::Audit => "audit",
        }
    }

    /// Parses a wire name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "monthly" => Some(Self::Monthly),
            "quarterly" => Some(Self::Quarterly),
            "annual" => Some(Self::Annual),
            "audit" => Some(Self::Audit),
            _ => None,
        }
    }
}

/// Status of a review schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReviewStatus {
    /// Not started.
    Pending,
    /// Being worked on.
    InProgress,
    /// Done.
    Completed,
    /// Past its date without completion.
    Overdue,
}

impl ReviewStatus {
    /// Every status.
    pub const ALL: [Self; 4] = [
        Self::Pending,
        Self::InProgress,
        Self::Completed,
        Self::Overdue,
    ];

    /// Returns the wire name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Completed => "completed",
            Self::Overdue => "overdue",
        }
    }

    /// Parses a wire name.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == s)
    }

    /// Whether the review still awaits work.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Whether `self` may move to `next`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::Completed | Self::Overdue)
                | (Self::InProgress, Self::Completed | Self::Overdue)
                | (Self::Overdue, Self::InProgress | Self::Completed)
        )
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A review scheduled for one report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewSchedule {
    /// Schedule ID.
    pub id: ReviewScheduleId,
    /// Reviewed report.
    pub report_id: ReportId,
    /// Hospital of the reviewed report.
    pub hospital_id: String,
    /// When the review is due.
    pub scheduled_date: DateTime<Utc>,
    /// Kind of review.
    pub review_type: ReviewType,
    /// Assigned reviewer.
    pub assigned_to: UserId,
    /// Current status.
    pub status: ReviewStatus,
    /// Reviewer notes.
    pub notes: Option<String>,
    /// Set when the review is completed.
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

/// Request to schedule a review.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewReview {
    /// Report to review.
    pub report_id: ReportId,
    /// Due date.
    pub scheduled_date: DateTime<Utc>,
    /// Kind of review.
    pub review_type: ReviewType,
    /// Reviewer.
    pub assigned_to: UserId,
    /// Initial notes.
    #[serde(default)]
    pub notes: Option<String>,
}
