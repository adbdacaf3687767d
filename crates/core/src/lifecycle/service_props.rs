//! Property-based tests for LifecycleService.

use proptest::prelude::*;
use uuid::Uuid;

use hospifin_shared::types::UserId;

use crate::access::{Permission, Role, has_permission};
use crate::error::DomainError;
use crate::lifecycle::service::LifecycleService;
use crate::lifecycle::types::{LifecycleAction, ReportStatus};

fn arb_status() -> impl Strategy<Value = ReportStatus> {
    prop_oneof![
        Just(ReportStatus::Draft),
        Just(ReportStatus::Submitted),
        Just(ReportStatus::Approved),
        Just(ReportStatus::Archived),
    ]
}

fn arb_role() -> impl Strategy<Value = Role> {
    prop_oneof![Just(Role::Admin), Just(Role::Finance), Just(Role::Viewer)]
}

fn arb_action() -> impl Strategy<Value = LifecycleAction> {
    prop_oneof![
        Just(LifecycleAction::Edit),
        Just(LifecycleAction::Submit),
        Just(LifecycleAction::Approve),
        Just(LifecycleAction::Reject),
        Just(LifecycleAction::Archive),
        Just(LifecycleAction::Delete),
    ]
}

fn arb_user() -> impl Strategy<Value = UserId> {
    any::<u128>().prop_map(|n| UserId::from_uuid(Uuid::from_u128(n)))
}

fn attempt(
    action: LifecycleAction,
    status: ReportStatus,
    role: Role,
    user: UserId,
) -> Result<Option<ReportStatus>, DomainError> {
    let transition = match action {
        LifecycleAction::Create => return LifecycleService::create(role).map(Some),
        LifecycleAction::Edit => LifecycleService::edit(status, role),
        LifecycleAction::Submit => LifecycleService::submit(status, role, user),
        LifecycleAction::Approve => LifecycleService::approve(status, role, user),
        LifecycleAction::Reject => LifecycleService::reject(status, role, "needs rework"),
        LifecycleAction::Archive => LifecycleService::archive(status, role),
        LifecycleAction::Delete => LifecycleService::delete(status, role),
    }?;
    Ok(transition.new_status())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Archived reports never change, whoever asks.
    #[test]
    fn prop_archived_is_terminal(action in arb_action(), role in arb_role(), user in arb_user()) {
        let result = attempt(action, ReportStatus::Archived, role, user);
        prop_assert!(result.is_err());
    }

    /// Missing permission always surfaces as PermissionDenied, never a state error.
    #[test]
    fn prop_permission_checked_first(
        action in arb_action(),
        status in arb_status(),
        role in arb_role(),
        user in arb_user(),
    ) {
        if !has_permission(role, action.required_permission()) {
            let result = attempt(action, status, role, user);
            let is_permission_denied = matches!(result, Err(DomainError::PermissionDenied { .. }));
            prop_assert!(is_permission_denied);
        }
    }

    /// Every accepted status change is a valid edge of the state machine.
    #[test]
    fn prop_transitions_follow_table(
        action in arb_action(),
        status in arb_status(),
        role in arb_role(),
        user in arb_user(),
    ) {
        if let Ok(Some(next)) = attempt(action, status, role, user) {
            if next != status {
                prop_assert!(LifecycleService::is_valid_transition(status, next));
            }
        }
    }

    /// An admin can do anything a finance or viewer user can.
    #[test]
    fn prop_admin_dominates(
        action in arb_action(),
        status in arb_status(),
        role in arb_role(),
        user in arb_user(),
    ) {
        if attempt(action, status, role, user).is_ok() {
            prop_assert!(attempt(action, status, Role::Admin, user).is_ok());
        }
    }

    /// Only admins approve.
    #[test]
    fn prop_only_admin_approves(status in arb_status(), role in arb_role(), user in arb_user()) {
        if LifecycleService::approve(status, role, user).is_ok() {
            prop_assert_eq!(role, Role::Admin);
            prop_assert_eq!(status, ReportStatus::Submitted);
            prop_assert!(has_permission(role, Permission::ApproveReport));
        }
    }
}
