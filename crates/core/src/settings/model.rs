//! Hospital settings record and its update payload.

use chrono::{DateTime, Utc};
use hospifin_shared::types::Currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::access::{Actor, Permission};
use crate::error::DomainResult;
use crate::lifecycle::ArchivePolicy;
use crate::report::DEFAULT_TAX_RATE;
use crate::validation::{
    ValidationError, require_max_len, require_non_empty, require_range, require_rate,
};

/// Maximum hospital name length.
pub const MAX_HOSPITAL_NAME_LEN: usize = 200;
/// Maximum address length.
pub const MAX_ADDRESS_LEN: usize = 500;

const DEFAULT_VAT_RATE: Decimal = Decimal::from_parts(11, 0, 0, false, 2);
const DEFAULT_WITHHOLDING_RATE: Decimal = Decimal::from_parts(2, 0, 0, false, 2);
const DEFAULT_ARCHIVE_AFTER_MONTHS: u32 = 24;

/// Tax rates applied to a hospital's reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxSettings {
    /// Default corporate income tax rate.
    pub corporate_tax_rate: Decimal,
    /// VAT rate on revenue.
    pub vat_rate: Decimal,
    /// Withholding tax rate on revenue.
    pub withholding_tax_rate: Decimal,
    /// Names of deduction types in use.
    #[serde(default)]
    pub deduction_types: Vec<String>,
}

impl Default for TaxSettings {
    fn default() -> Self {
        Self {
            corporate_tax_rate: DEFAULT_TAX_RATE,
            vat_rate: DEFAULT_VAT_RATE,
            withholding_tax_rate: DEFAULT_WITHHOLDING_RATE,
            deduction_types: Vec::new(),
        }
    }
}

/// Reporting policy flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportingSettings {
    /// Stored only; approval is always explicit.
    pub auto_approval: bool,
    /// Stored only; one admin approval suffices.
    pub require_dual_approval: bool,
    /// Months after period end before an approved report is archived.
    pub archive_after_months: u32,
}

impl Default for ReportingSettings {
    fn default() -> Self {
        Self {
            auto_approval: false,
            require_dual_approval: true,
            archive_after_months: DEFAULT_ARCHIVE_AFTER_MONTHS,
        }
    }
}

/// Notification preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationSettings {
    /// Whether email notifications are sent.
    pub email_notifications: bool,
    /// Days before a review is due to send reminders.
    #[serde(default)]
    pub reminder_days: Vec<u32>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            email_notifications: true,
            reminder_days: Vec::new(),
        }
    }
}

/// Settings of one hospital.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HospitalSettings {
    /// Hospital the settings belong to.
    pub hospital_id: String,
    /// Display name.
    pub hospital_name: String,
    /// Postal address.
    pub address: String,
    /// Phone number.
    pub phone: String,
    /// Contact email, lowercased.
    pub email: String,
    /// Tax registration number.
    pub tax_id: String,
    /// First month of the fiscal year, 1 to 12.
    pub fiscal_year_start: u32,
    /// Reporting currency.
    pub currency: Currency,
    /// Tax rates.
    pub tax_settings: TaxSettings,
    /// Reporting policy.
    pub reporting_settings: ReportingSettings,
    /// Notification preferences.
    pub notification_settings: NotificationSettings,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl HospitalSettings {
    /// Default settings for a hospital that has none stored yet.
    pub fn defaults_for(hospital_id: impl Into<String>, hospital_name: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            hospital_id: hospital_id.into(),
            hospital_name: hospital_name.into(),
            address: String::new(),
            phone: String::new(),
            email: String::new(),
            tax_id: String::new(),
            fiscal_year_start: 1,
            currency: Currency::default(),
            tax_settings: TaxSettings::default(),
            reporting_settings: ReportingSettings::default(),
            notification_settings: NotificationSettings::default(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Checks every field limit.
    ///
    /// Contact fields may be left empty on defaults but must be filled once
    /// saved, see [`HospitalSettings::update`].
    pub fn validate(&self) -> Result<(), ValidationError> {
        require_non_empty("hospitalId", &self.hospital_id)?;
        require_non_empty("hospitalName", &self.hospital_name)?;
        require_max_len("hospitalName", &self.hospital_name, MAX_HOSPITAL_NAME_LEN)?;
        require_max_len("address", &self.address, MAX_ADDRESS_LEN)?;
        if !self.email.is_empty() && !self.email.validate_email() {
            return Err(ValidationError::InvalidEmail(self.email.clone()));
        }
        require_range(
            "fiscalYearStart",
            i64::from(self.fiscal_year_start),
            1,
            12,
        )?;

        let tax = &self.tax_settings;
        require_rate("taxSettings.corporateTaxRate", tax.corporate_tax_rate)?;
        require_rate("taxSettings.vatRate", tax.vat_rate)?;
        require_rate("taxSettings.withholdingTaxRate", tax.withholding_tax_rate)?;

        ArchivePolicy::check_months(
            "reportingSettings.archiveAfterMonths",
            self.reporting_settings.archive_after_months,
        )?;
        for day in &self.notification_settings.reminder_days {
            require_range(
                "notificationSettings.reminderDays",
                i64::from(*day),
                1,
                i64::from(u32::MAX),
            )?;
        }
        Ok(())
    }

    /// Applies an update made by `actor` and stamps `updated_at`.
    ///
    /// Requires `manage_settings`. The stored record only changes when the
    /// merged result is valid.
    pub fn update(
        &mut self,
        actor: &Actor,
        update: SettingsUpdate,
        now: DateTime<Utc>,
    ) -> DomainResult<()> {
        actor.require(Permission::ManageSettings)?;

        let mut merged = self.clone();
        update.merge_into(&mut merged);
        for (field, value) in [
            ("address", &merged.address),
            ("phone", &merged.phone),
            ("email", &merged.email),
            ("taxId", &merged.tax_id),
        ] {
            require_non_empty(field, value)?;
        }
        merged.validate()?;

        merged.updated_at = now;
        *self = merged;
        Ok(())
    }
}

/// Partial settings update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsUpdate {
    /// New display name.
    pub hospital_name: Option<String>,
    /// New address.
    pub address: Option<String>,
    /// New phone number.
    pub phone: Option<String>,
    /// New contact email.
    pub email: Option<String>,
    /// New tax registration number.
    pub tax_id: Option<String>,
    /// New fiscal year start month.
    pub fiscal_year_start: Option<u32>,
    /// New currency.
    pub currency: Option<Currency>,
    /// Replacement tax settings.
    pub tax_settings: Option<TaxSettings>,
    /// Replacement reporting settings.
    pub reporting_settings: Option<ReportingSettings>,
    /// Replacement notification settings.
    pub notification_settings: Option<NotificationSettings>,
}

impl SettingsUpdate {
    fn merge_into(self, settings: &mut HospitalSettings) {
        let trimmed = |s: String| s.trim().to_string();
        if let Some(v) = self.hospital_name {
            settings.hospital_name = trimmed(v);
        }
        if let Some(v) = self.address {
            settings.address = trimmed(v);
        }
        if let Some(v) = self.phone {
            settings.phone = trimmed(v);
        }
        if let Some(v) = self.email {
            settings.email = v.trim().to_lowercase();
        }
        if let Some(v) = self.tax_id {
            settings.tax_id = trimmed(v);
        }
        if let Some(v) = self.fiscal_year_start {
            settings.fiscal_year_start = v;
        }
        if let Some(v) = self.currency {
            settings.currency = v;
        }
        if let Some(mut v) = self.tax_settings {
            v.deduction_types = v
                .deduction_types
                .into_iter()
                .map(trimmed)
                .filter(|s| !s.is_empty())
                .collect();
            settings.tax_settings = v;
        }
        if let Some(v) = self.reporting_settings {
            settings.reporting_settings = v;
        }
        if let Some(v) = self.notification_settings {
            settings.notification_settings = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use hospifin_shared::types::UserId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::DomainError;
    use crate::access::Role;

    fn admin() -> Actor {
        Actor::new(UserId::new(), Role::Admin, "hospital-1")
    }

    fn complete_update() -> SettingsUpdate {
        SettingsUpdate {
            address: Some(" Jl. Sudirman No. 1 ".to_string()),
            phone: Some("+62 21 555 0100".to_string()),
            email: Some("Finance@RSSebening.co.id".to_string()),
            tax_id: Some("01.234.567.8-901.000".to_string()),
            ..SettingsUpdate::default()
        }
    }

    #[test]
    fn test_defaults() {
        let settings = HospitalSettings::defaults_for("hospital-1", "RS Sebening Kasih");
        assert_eq!(settings.tax_settings.corporate_tax_rate, dec!(0.25));
        assert_eq!(settings.tax_settings.vat_rate, dec!(0.11));
        assert_eq!(settings.tax_settings.withholding_tax_rate, dec!(0.02));
        assert!(!settings.reporting_settings.auto_approval);
        assert!(settings.reporting_settings.require_dual_approval);
        assert_eq!(settings.reporting_settings.archive_after_months, 24);
        assert!(settings.notification_settings.email_notifications);
        assert_eq!(settings.currency, Currency::Idr);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_update_normalizes_and_stamps() {
        let mut settings = HospitalSettings::defaults_for("hospital-1", "RS Sebening Kasih");
        let now = Utc::now();
        settings.update(&admin(), complete_update(), now).unwrap();

        assert_eq!(settings.address, "Jl. Sudirman No. 1");
        assert_eq!(settings.email, "finance@rssebening.co.id");
        assert_eq!(settings.updated_at, now);
    }

    #[test]
    fn test_update_requires_manage_settings() {
        let mut settings = HospitalSettings::defaults_for("hospital-1", "RS Sebening Kasih");
        let finance = Actor::new(UserId::new(), Role::Finance, "hospital-1");
        let err = settings
            .update(&finance, complete_update(), Utc::now())
            .unwrap_err();
        assert!(matches!(err, DomainError::PermissionDenied { .. }));
    }

    #[test]
    fn test_update_requires_contact_fields() {
        let mut settings = HospitalSettings::defaults_for("hospital-1", "RS Sebening Kasih");
        let update = SettingsUpdate {
            fiscal_year_start: Some(7),
            ..SettingsUpdate::default()
        };
        assert!(settings.update(&admin(), update, Utc::now()).is_err());
        assert_eq!(settings.fiscal_year_start, 1);
    }

    #[rstest]
    #[case::fiscal_month_zero(SettingsUpdate { fiscal_year_start: Some(0), ..complete_update() })]
    #[case::fiscal_month_thirteen(SettingsUpdate { fiscal_year_start: Some(13), ..complete_update() })]
    #[case::bad_email(SettingsUpdate { email: Some("rs-sebening".to_string()), ..complete_update() })]
    #[case::long_name(SettingsUpdate { hospital_name: Some("R".repeat(201)), ..complete_update() })]
    #[case::rate_above_one(SettingsUpdate {
        tax_settings: Some(TaxSettings { vat_rate: dec!(1.5), ..TaxSettings::default() }),
        ..complete_update()
    })]
    #[case::archive_never(SettingsUpdate {
        reporting_settings: Some(ReportingSettings { archive_after_months: 0, ..ReportingSettings::default() }),
        ..complete_update()
    })]
    #[case::reminder_zero(SettingsUpdate {
        notification_settings: Some(NotificationSettings { email_notifications: true, reminder_days: vec![7, 0] }),
        ..complete_update()
    })]
    fn test_invalid_updates_are_refused(#[case] update: SettingsUpdate) {
        let mut settings = HospitalSettings::defaults_for("hospital-1", "RS Sebening Kasih");
        let before = settings.clone();
        let err = settings.update(&admin(), update, Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
        assert_eq!(settings, before);
    }

    #[test]
    fn test_camel_case_wire_format() {
        let settings = HospitalSettings::defaults_for("hospital-1", "RS Sebening Kasih");
        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["taxSettings"]["corporateTaxRate"], "0.25");
        assert_eq!(json["reportingSettings"]["archiveAfterMonths"], 24);
        assert_eq!(json["currency"], "IDR");
    }
}
