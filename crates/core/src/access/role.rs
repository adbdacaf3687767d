//! Role to permission mapping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A capability checked before an action is attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    /// Create report drafts.
    CreateReport,
    /// Edit reports.
    EditReport,
    /// Delete draft reports.
    DeleteReport,
    /// Approve or reject submitted reports.
    ApproveReport,
    /// View every report of the hospital.
    ViewAllReports,
    /// View reports read-only.
    ViewReports,
    /// Manage users of the hospital.
    ManageUsers,
    /// Change hospital settings.
    ManageSettings,
    /// Export reports.
    ExportReports,
    /// Archive reports.
    ArchiveReports,
    /// Submit drafts for approval.
    SubmitForApproval,
}

impl Permission {
    /// Returns the wire name of the permission.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::CreateReport => "create_report",
            Self::EditReport => "edit_report",
            Self::DeleteReport => "delete_report",
            Self::ApproveReport => "approve_report",
            Self::ViewAllReports => "view_all_reports",
            Self::ViewReports => "view_reports",
            Self::ManageUsers => "manage_users",
            Self::ManageSettings => "manage_settings",
            Self::ExportReports => "export_reports",
            Self::ArchiveReports => "archive_reports",
            Self::SubmitForApproval => "submit_for_approval",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const ADMIN_PERMISSIONS: &[Permission] = &[
    Permission::CreateReport,
    Permission::EditReport,
    Permission::DeleteReport,
    Permission::ApproveReport,
    Permission::ViewAllReports,
    Permission::ViewReports,
    Permission::ManageUsers,
    Permission::ManageSettings,
    Permission::ExportReports,
    Permission::ArchiveReports,
    Permission::SubmitForApproval,
];

const FINANCE_PERMISSIONS: &[Permission] = &[
    Permission::CreateReport,
    Permission::EditReport,
    Permission::ViewAllReports,
    Permission::ExportReports,
    Permission::SubmitForApproval,
];

const VIEWER_PERMISSIONS: &[Permission] = &[Permission::ViewReports, Permission::ExportReports];

/// A user's single role within their hospital.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full control, including approval and user management.
    Admin,
    /// Prepares and submits reports.
    Finance,
    /// Read and export only.
    Viewer,
}

impl Role {
    /// Every role.
    pub const ALL: [Self; 3] = [Self::Admin, Self::Finance, Self::Viewer];

    /// Returns the string representation of the role.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Finance => "finance",
            Self::Viewer => "viewer",
        }
    }

    /// Parses a role from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Self::Admin),
            "finance" => Some(Self::Finance),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    /// The role's full permission set.
    #[must_use]
    pub const fn permissions(&self) -> &'static [Permission] {
        match self {
            Self::Admin => ADMIN_PERMISSIONS,
            Self::Finance => FINANCE_PERMISSIONS,
            Self::Viewer => VIEWER_PERMISSIONS,
        }
    }

    /// Returns true if the role grants `permission`.
    #[must_use]
    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    /// Returns true for admins.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns true for finance users.
    #[must_use]
    pub const fn is_finance(&self) -> bool {
        matches!(self, Self::Finance)
    }

    /// Returns true if the role may edit reports.
    #[must_use]
    pub fn can_edit(&self) -> bool {
        self.has_permission(Permission::EditReport)
    }

    /// Returns true if the role may approve reports.
    #[must_use]
    pub fn can_approve(&self) -> bool {
        self.has_permission(Permission::ApproveReport)
    }

    /// Returns true if the role may read reports at all.
    #[must_use]
    pub fn can_view_reports(&self) -> bool {
        self.has_permission(Permission::ViewReports) || self.has_permission(Permission::ViewAllReports)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Pure lookup of `permission` in `role`'s permission set.
#[must_use]
pub fn has_permission(role: Role, permission: Permission) -> bool {
    role.has_permission(permission)
}
