//! User repository for database operations.

use chrono::{DateTime, Utc};
use hospifin_core::DomainError;
use hospifin_core::access::{NewUser, Role, User};
use hospifin_shared::types::UserId;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

use crate::entities::{sea_orm_active_enums::UserRole, users};
use crate::repositories::storage_error;

/// A user together with the stored password hash.
#[derive(Debug, Clone)]
pub struct Credentials {
    /// The user.
    pub user: User,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// User repository for CRUD operations.
#[derive(Debug, Clone)]
pub struct UserRepository {
    db: DatabaseConnection,
}

impl UserRepository {
    /// Creates a new user repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Finds a user and password hash by (normalized) email.
    pub async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, DomainError> {
        let model = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(|e| storage_error("loading user", &e))?;

        Ok(model.map(|m| Credentials {
            password_hash: m.password_hash.clone(),
            user: to_domain(m),
        }))
    }

    /// Finds a user by ID.
    pub async fn find_by_id(&self, id: UserId) -> Result<Option<User>, DomainError> {
        users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map(|m| m.map(to_domain))
            .map_err(|e| storage_error("loading user", &e))
    }

    /// Checks if an email is already registered.
    pub async fn email_exists(&self, email: &str) -> Result<bool, DomainError> {
        let count = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .count(&self.db)
            .await
            .map_err(|e| storage_error("checking email", &e))?;

        Ok(count > 0)
    }

    /// Checks whether the hospital already has an active admin.
    pub async fn has_active_admin(&self, hospital_id: &str) -> Result<bool, DomainError> {
        let count = users::Entity::find()
            .filter(users::Column::HospitalId.eq(hospital_id))
            .filter(users::Column::Role.eq(UserRole::Admin))
            .filter(users::Column::IsActive.eq(true))
            .count(&self.db)
            .await
            .map_err(|e| storage_error("checking admins", &e))?;

        Ok(count > 0)
    }

    /// Creates a new user.
    pub async fn create(&self, new_user: &NewUser, password_hash: &str) -> Result<User, DomainError> {
        let now = Utc::now().into();
        let user = users::ActiveModel {
            id: Set(UserId::new().into_inner()),
            email: Set(new_user.email.clone()),
            password_hash: Set(password_hash.to_string()),
            name: Set(new_user.name.clone()),
            role: Set(to_db_role(new_user.role)),
            hospital_id: Set(new_user.hospital_id.clone()),
            is_active: Set(true),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = user
            .insert(&self.db)
            .await
            .map_err(|e| storage_error("registering user", &e))?;
        info!(user_id = %model.id, hospital_id = %model.hospital_id, role = %new_user.role, "user registered");
        Ok(to_domain(model))
    }

    /// Lists the users of a hospital by name.
    pub async fn list_by_hospital(&self, hospital_id: &str) -> Result<Vec<User>, DomainError> {
        users::Entity::find()
            .filter(users::Column::HospitalId.eq(hospital_id))
            .order_by_asc(users::Column::Name)
            .all(&self.db)
            .await
            .map(|models| models.into_iter().map(to_domain).collect())
            .map_err(|e| storage_error("listing users", &e))
    }

    /// Changes a user's role.
    pub async fn update_role(&self, id: UserId, role: Role) -> Result<User, DomainError> {
        self.update(id, "changing role", |user| user.role = Set(to_db_role(role)))
            .await
    }

    /// Deactivates a user.
    pub async fn deactivate(&self, id: UserId) -> Result<User, DomainError> {
        self.update(id, "deactivating user", |user| user.is_active = Set(false))
            .await
    }

    /// Records a successful login.
    pub async fn record_login(&self, id: UserId, at: DateTime<Utc>) -> Result<User, DomainError> {
        self.update(id, "recording login", |user| {
            user.last_login = Set(Some(at.into()));
        })
        .await
    }

    async fn update(
        &self,
        id: UserId,
        operation: &'static str,
        change: impl FnOnce(&mut users::ActiveModel),
    ) -> Result<User, DomainError> {
        let model = users::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(|e| storage_error(operation, &e))?
            .ok_or_else(|| DomainError::not_found("user", id))?;

        let mut active = model.into_active_model();
        change(&mut active);
        active.updated_at = Set(Utc::now().into());

        match active.update(&self.db).await {
            Ok(model) => {
                info!(user_id = %id, operation, "user updated");
                Ok(to_domain(model))
            }
            Err(DbErr::RecordNotUpdated) => Err(DomainError::not_found("user", id)),
            Err(e) => Err(storage_error(operation, &e)),
        }
    }
}

/// Convert domain role to database enum.
const fn to_db_role(role: Role) -> UserRole {
    match role {
        Role::Admin => UserRole::Admin,
        Role::Finance => UserRole::Finance,
        Role::Viewer => UserRole::Viewer,
    }
}

/// Convert database role to domain enum.
const fn from_db_role(role: UserRole) -> Role {
    match role {
        UserRole::Admin => Role::Admin,
        UserRole::Finance => Role::Finance,
        UserRole::Viewer => Role::Viewer,
    }
}

/// Convert database model to domain user.
fn to_domain(model: users::Model) -> User {
    User {
        id: UserId::from_uuid(model.id),
        email: model.email,
        name: model.name,
        role: from_db_role(model.role),
        hospital_id: model.hospital_id,
        is_active: model.is_active,
        last_login: model.last_login.map(|t| t.with_timezone(&Utc)),
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    }
}
