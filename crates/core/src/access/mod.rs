//! Access control: roles, permissions, actors, passwords, and user rules.
//!
//! Permissions come only from role membership. There is no per-report ACL;
//! a finance user may edit any report of their hospital.

mod actor;
mod password;
mod role;
mod users;

pub use actor::Actor;
pub use password::{PasswordError, hash_password, verify_password};
pub use role::{Permission, Role, has_permission};
pub use users::{MIN_PASSWORD_LEN, NewUser, User, UserPolicy, normalize_email};
