//! Hospital settings repository.

use chrono::Utc;
use hospifin_core::DomainError;
use hospifin_core::settings::HospitalSettings;
use hospifin_shared::types::Currency;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tracing::info;

use crate::entities::hospital_settings;
use crate::repositories::{from_json, storage_error, to_json};

/// Settings repository: one record per hospital.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    db: DatabaseConnection,
}

impl SettingsRepository {
    /// Creates a new settings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Loads the stored settings of a hospital.
    pub async fn find(&self, hospital_id: &str) -> Result<Option<HospitalSettings>, DomainError> {
        hospital_settings::Entity::find_by_id(hospital_id.to_string())
            .one(&self.db)
            .await
            .map_err(|e| storage_error("loading settings", &e))?
            .map(to_domain)
            .transpose()
    }

    /// Loads the stored settings, or unsaved defaults when none exist.
    pub async fn find_or_default(&self, hospital_id: &str) -> Result<HospitalSettings, DomainError> {
        Ok(self
            .find(hospital_id)
            .await?
            .unwrap_or_else(|| HospitalSettings::defaults_for(hospital_id, hospital_id)))
    }

    /// Inserts or replaces the settings of `settings.hospital_id`.
    pub async fn save(&self, settings: &HospitalSettings) -> Result<HospitalSettings, DomainError> {
        let exists = hospital_settings::Entity::find_by_id(settings.hospital_id.clone())
            .one(&self.db)
            .await
            .map_err(|e| storage_error("loading settings", &e))?
            .is_some();

        let model = to_active_model(settings)?;
        let saved = if exists {
            model.update(&self.db).await
        } else {
            model.insert(&self.db).await
        }
        .map_err(|e| storage_error("saving settings", &e))?;

        info!(hospital_id = %settings.hospital_id, "settings saved");
        to_domain(saved)
    }
}

fn to_active_model(
    settings: &HospitalSettings,
) -> Result<hospital_settings::ActiveModel, DomainError> {
    Ok(hospital_settings::ActiveModel {
        hospital_id: Set(settings.hospital_id.clone()),
        hospital_name: Set(settings.hospital_name.clone()),
        address: Set(settings.address.clone()),
        phone: Set(settings.phone.clone()),
        email: Set(settings.email.clone()),
        tax_id: Set(settings.tax_id.clone()),
        fiscal_year_start: Set(i32::try_from(settings.fiscal_year_start).unwrap_or(1)),
        currency: Set(settings.currency.as_str().to_string()),
        tax_settings: Set(to_json("tax_settings", &settings.tax_settings)?),
        reporting_settings: Set(to_json("reporting_settings", &settings.reporting_settings)?),
        notification_settings: Set(to_json(
            "notification_settings",
            &settings.notification_settings,
        )?),
        created_at: Set(settings.created_at.into()),
        updated_at: Set(settings.updated_at.into()),
    })
}

fn to_domain(model: hospital_settings::Model) -> Result<HospitalSettings, DomainError> {
    let currency = Currency::parse(&model.currency)
        .ok_or_else(|| DomainError::Storage(format!("unknown currency {}", model.currency)))?;

    Ok(HospitalSettings {
        hospital_id: model.hospital_id,
        hospital_name: model.hospital_name,
        address: model.address,
        phone: model.phone,
        email: model.email,
        tax_id: model.tax_id,
        fiscal_year_start: u32::try_from(model.fiscal_year_start).unwrap_or(1),
        currency,
        tax_settings: from_json("tax_settings", model.tax_settings)?,
        reporting_settings: from_json("reporting_settings", model.reporting_settings)?,
        notification_settings: from_json("notification_settings", model.notification_settings)?,
        created_at: model.created_at.with_timezone(&Utc),
        updated_at: model.updated_at.with_timezone(&Utc),
    })
}
