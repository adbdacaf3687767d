//! Lifecycle domain types for financial reports.

use chrono::{DateTime, Utc};
use hospifin_shared::types::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::access::Permission;

/// Report status in the approval lifecycle.
///
/// The valid transitions are:
/// - Draft → Submitted (submit)
/// - Submitted → Approved (approve)
/// - Submitted → Draft (reject)
/// - any but Archived → Archived (archive)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportStatus {
    /// Being prepared; editable.
    Draft,
    /// Waiting for an admin decision.
    Submitted,
    /// Approved by an admin.
    Approved,
    /// Retired; never mutated again.
    Archived,
}

impl ReportStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 4] = [Self::Draft, Self::Submitted, Self::Approved, Self::Archived];

    /// Returns the string representation of the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Submitted => "submitted",
            Self::Approved => "approved",
            Self::Archived => "archived",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "submitted" => Some(Self::Submitted),
            "approved" => Some(Self::Approved),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }

    /// Returns true if non-admins may still edit the report.
    #[must_use]
    pub const fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }

    /// Returns true for the terminal status.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Archived)
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An action a user can take on a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleAction {
    /// Create a new draft.
    Create,
    /// Change line items or notes.
    Edit,
    /// Send a draft for approval.
    Submit,
    /// Approve a submitted report.
    Approve,
    /// Send a submitted report back to draft.
    Reject,
    /// Retire a report.
    Archive,
    /// Remove a draft.
    Delete,
}

impl LifecycleAction {
    /// Returns the string representation of the action.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Edit => "edit",
            Self::Submit => "submit",
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::Archive => "archive",
            Self::Delete => "delete",
        }
    }

    /// The permission an actor needs to attempt the action.
    #[must_use]
    pub const fn required_permission(&self) -> Permission {
        match self {
            Self::Create => Permission::CreateReport,
            Self::Edit => Permission::EditReport,
            Self::Submit => Permission::SubmitForApproval,
            Self::Approve | Self::Reject => Permission::ApproveReport,
            Self::Archive => Permission::ArchiveReports,
            Self::Delete => Permission::DeleteReport,
        }
    }
}

impl fmt::Display for LifecycleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An accepted lifecycle transition with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleTransition {
    /// Edit accepted; status unchanged.
    Edit {
        /// The unchanged status.
        status: ReportStatus,
    },
    /// Draft submitted.
    Submit {
        /// The new status.
        new_status: ReportStatus,
        /// Who submitted.
        submitted_by: UserId,
        /// When.
        submitted_at: DateTime<Utc>,
    },
    /// Submitted report approved.
    Approve {
        /// The new status.
        new_status: ReportStatus,
        /// Approving admin.
        approved_by: UserId,
        /// When.
        approved_at: DateTime<Utc>,
    },
    /// Submitted report sent back to draft.
    Reject {
        /// The new status.
        new_status: ReportStatus,
        /// Reason given by the admin.
        reason: String,
    },
    /// Report archived.
    Archive {
        /// The new status.
        new_status: ReportStatus,
        /// When.
        archived_at: DateTime<Utc>,
    },
    /// Draft removed.
    Delete,
}

impl LifecycleTransition {
    /// Status after the transition; `None` once the report is deleted.
    #[must_use]
    pub const fn new_status(&self) -> Option<ReportStatus> {
        match self {
            Self::Edit { status } => Some(*status),
            Self::Submit { new_status, .. }
            | Self::Approve { new_status, .. }
            | Self::Reject { new_status, .. }
            | Self::Archive { new_status, .. } => Some(*new_status),
            Self::Delete => None,
        }
    }
}
