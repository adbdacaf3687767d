//! The authenticated caller of an operation.

use hospifin_shared::types::UserId;
use serde::{Deserialize, Serialize};

use crate::access::role::{Permission, Role};
use crate::error::DomainError;

/// Who is performing an operation, resolved from a verified session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Actor {
    /// Acting user.
    pub user_id: UserId,
    /// Their role.
    pub role: Role,
    /// Their hospital.
    pub hospital_id: String,
}

impl Actor {
    /// Creates an actor.
    pub fn new(user_id: UserId, role: Role, hospital_id: impl Into<String>) -> Self {
        Self {
            user_id,
            role,
            hospital_id: hospital_id.into(),
        }
    }

    /// Fails with `PermissionDenied` unless the actor's role grants `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), DomainError> {
        if self.role.has_permission(permission) {
            Ok(())
        } else {
            Err(DomainError::PermissionDenied {
                role: self.role,
                permission,
            })
        }
    }

    /// Fails unless the actor may read reports.
    pub fn require_view(&self) -> Result<(), DomainError> {
        if self.role.can_view_reports() {
            Ok(())
        } else {
            Err(DomainError::PermissionDenied {
                role: self.role,
                permission: Permission::ViewReports,
            })
        }
    }
}
