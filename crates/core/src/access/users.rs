//! Hospital users and the rules for registering and administering them.

use chrono::{DateTime, Utc};
use hospifin_shared::auth::{RegisterRequest, UserInfo};
use hospifin_shared::types::UserId;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::access::actor::Actor;
use crate::access::role::{Permission, Role};
use crate::error::DomainError;
use crate::validation::{ValidationError, require_max_len, require_non_empty};

/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;
/// Maximum display name length.
pub const MAX_NAME_LEN: usize = 100;

/// A user scoped to one hospital.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// User ID.
    pub id: UserId,
    /// Lowercased email, unique across the system.
    pub email: String,
    /// Display name.
    pub name: String,
    /// Single role.
    pub role: Role,
    /// Owning hospital.
    pub hospital_id: String,
    /// Inactive users cannot sign in.
    pub is_active: bool,
    /// Last successful login.
    pub last_login: Option<DateTime<Utc>>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// The actor this user acts as.
    #[must_use]
    pub fn actor(&self) -> Actor {
        Actor::new(self.id, self.role, self.hospital_id.clone())
    }

    /// Public profile returned by auth endpoints.
    #[must_use]
    pub fn info(&self) -> UserInfo {
        UserInfo {
            id: self.id.into_inner(),
            email: self.email.clone(),
            name: self.name.clone(),
            role: self.role.as_str().to_string(),
            hospital_id: self.hospital_id.clone(),
        }
    }
}

/// Trims and lowercases an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// A validated registration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    /// Normalized email.
    pub email: String,
    /// Plaintext password, hashed before storage.
    pub password: String,
    /// Trimmed display name.
    pub name: String,
    /// Requested role.
    pub role: Role,
    /// Hospital joined.
    pub hospital_id: String,
}

impl NewUser {
    /// Validates a registration request. The role defaults to `viewer`.
    pub fn from_request(request: &RegisterRequest) -> Result<Self, ValidationError> {
        let email = normalize_email(&request.email);
        if !email.validate_email() {
            return Err(ValidationError::InvalidEmail(email));
        }

        if request.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(ValidationError::InvalidField {
                field: "password".to_string(),
                reason: format!("must be at least {MIN_PASSWORD_LEN} characters"),
            });
        }

        let name = request.name.trim().to_string();
        require_non_empty("name", &name)?;
        require_max_len("name", &name, MAX_NAME_LEN)?;

        let hospital_id = request.hospital_id.trim().to_string();
        require_non_empty("hospitalId", &hospital_id)?;

        let role = match request.role.as_deref() {
            None => Role::Viewer,
            Some(raw) => Role::parse(raw).ok_or_else(|| ValidationError::InvalidField {
                field: "role".to_string(),
                reason: format!("unknown role {raw}"),
            })?,
        };

        Ok(Self {
            email,
            password: request.password.clone(),
            name,
            role,
            hospital_id,
        })
    }
}

/// Stateless rules for user administration.
pub struct UserPolicy;

impl UserPolicy {
    /// Email must be unused; a hospital may have only one active admin.
    pub fn check_registration(
        new_user: &NewUser,
        email_taken: bool,
        hospital_has_active_admin: bool,
    ) -> Result<(), DomainError> {
        if email_taken {
            return Err(DomainError::Conflict(format!(
                "a user with email {} already exists",
                new_user.email
            )));
        }
        if new_user.role.is_admin() && hospital_has_active_admin {
            return Err(DomainError::Conflict(format!(
                "hospital {} already has an active admin",
                new_user.hospital_id
            )));
        }
        Ok(())
    }

    /// Only active users may sign in.
    #[must_use]
    pub const fn can_login(user: &User) -> bool {
        user.is_active
    }

    /// Admins may change other users' roles within their hospital.
    pub fn check_role_change(actor: &Actor, target: &User) -> Result<(), DomainError> {
        actor.require(Permission::ManageUsers)?;
        Self::check_same_hospital(actor, target)?;
        if actor.user_id == target.id {
            return Err(DomainError::NotAllowed(
                "you cannot change your own role".to_string(),
            ));
        }
        Ok(())
    }

    /// Admins may deactivate other users within their hospital.
    pub fn check_deactivation(actor: &Actor, target: &User) -> Result<(), DomainError> {
        actor.require(Permission::ManageUsers)?;
        Self::check_same_hospital(actor, target)?;
        if actor.user_id == target.id {
            return Err(DomainError::NotAllowed(
                "you cannot deactivate your own account".to_string(),
            ));
        }
        Ok(())
    }

    fn check_same_hospital(actor: &Actor, target: &User) -> Result<(), DomainError> {
        if target.hospital_id == actor.hospital_id {
            Ok(())
        } else {
            Err(DomainError::not_found("user", target.id))
        }
    }
}
