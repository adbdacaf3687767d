//! Lifecycle service for report state transitions.
//!
//! Every guard checks permission first and state second, so a viewer who
//! tries to approve a draft is told about the permission, not the state.

use chrono::Utc;
use hospifin_shared::types::UserId;

use crate::access::{Role, has_permission};
use crate::error::DomainError;
use crate::lifecycle::types::{LifecycleAction, LifecycleTransition, ReportStatus};
use crate::validation::{ValidationError, require_max_len};

/// Maximum length of a rejection reason.
pub const MAX_REASON_LEN: usize = 500;

/// Stateless service for report lifecycle transitions.
pub struct LifecycleService;

impl LifecycleService {
    /// Fails with `PermissionDenied` unless `role` may attempt `action`.
    pub fn authorize(role: Role, action: LifecycleAction) -> Result<(), DomainError> {
        let permission = action.required_permission();
        if has_permission(role, permission) {
            Ok(())
        } else {
            Err(DomainError::PermissionDenied { role, permission })
        }
    }

    /// Create a new report; the result is always `Draft`.
    pub fn create(role: Role) -> Result<ReportStatus, DomainError> {
        Self::authorize(role, LifecycleAction::Create)?;
        Ok(ReportStatus::Draft)
    }

    /// Edit a report.
    ///
    /// Drafts are editable by anyone with `edit_report`; admins may also
    /// edit submitted and approved reports. Archived reports never change.
    pub fn edit(current: ReportStatus, role: Role) -> Result<LifecycleTransition, DomainError> {
        Self::authorize(role, LifecycleAction::Edit)?;
        let allowed = current.is_editable() || (role.is_admin() && !current.is_terminal());
        if !allowed {
            return Err(Self::invalid(current, LifecycleAction::Edit));
        }
        Ok(LifecycleTransition::Edit { status: current })
    }

    /// Submit a draft for approval.
    pub fn submit(
        current: ReportStatus,
        role: Role,
        submitted_by: UserId,
    ) -> Result<LifecycleTransition, DomainError> {
        Self::authorize(role, LifecycleAction::Submit)?;
        match current {
            ReportStatus::Draft => Ok(LifecycleTransition::Submit {
                new_status: ReportStatus::Submitted,
                submitted_by,
                submitted_at: Utc::now(),
            }),
            _ => Err(Self::invalid(current, LifecycleAction::Submit)),
        }
    }

    /// Approve a submitted report.
    pub fn approve(
        current: ReportStatus,
        role: Role,
        approved_by: UserId,
    ) -> Result<LifecycleTransition, DomainError> {
        Self::authorize(role, LifecycleAction::Approve)?;
        match current {
            ReportStatus::Submitted => Ok(LifecycleTransition::Approve {
                new_status: ReportStatus::Approved,
                approved_by,
                approved_at: Utc::now(),
            }),
            _ => Err(Self::invalid(current, LifecycleAction::Approve)),
        }
    }

    /// Send a submitted report back to draft. The reason is required.
    pub fn reject(
        current: ReportStatus,
        role: Role,
        reason: &str,
    ) -> Result<LifecycleTransition, DomainError> {
        Self::authorize(role, LifecycleAction::Reject)?;
        if current != ReportStatus::Submitted {
            return Err(Self::invalid(current, LifecycleAction::Reject));
        }

        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::EmptyField("reason").into());
        }
        require_max_len("reason", reason, MAX_REASON_LEN)?;

        Ok(LifecycleTransition::Reject {
            new_status: ReportStatus::Draft,
            reason: reason.to_string(),
        })
    }

    /// Archive any report that is not already archived.
    pub fn archive(current: ReportStatus, role: Role) -> Result<LifecycleTransition, DomainError> {
        Self::authorize(role, LifecycleAction::Archive)?;
        if current.is_terminal() {
            return Err(Self::invalid(current, LifecycleAction::Archive));
        }
        Ok(LifecycleTransition::Archive {
            new_status: ReportStatus::Archived,
            archived_at: Utc::now(),
        })
    }

    /// Delete a draft.
    pub fn delete(current: ReportStatus, role: Role) -> Result<LifecycleTransition, DomainError> {
        Self::authorize(role, LifecycleAction::Delete)?;
        match current {
            ReportStatus::Draft => Ok(LifecycleTransition::Delete),
            _ => Err(Self::invalid(current, LifecycleAction::Delete)),
        }
    }

    /// Returns true if a single action can move a report from `from` to `to`.
    #[must_use]
    pub fn is_valid_transition(from: ReportStatus, to: ReportStatus) -> bool {
        matches!(
            (from, to),
            (ReportStatus::Draft, ReportStatus::Submitted)
                | (ReportStatus::Submitted, ReportStatus::Approved | ReportStatus::Draft)
                | (
                    ReportStatus::Draft | ReportStatus::Submitted | ReportStatus::Approved,
                    ReportStatus::Archived
                )
        )
    }

    const fn invalid(from: ReportStatus, action: LifecycleAction) -> DomainError {
        DomainError::InvalidTransition { from, action }
    }
}
