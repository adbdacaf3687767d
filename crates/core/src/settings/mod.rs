//! Per-hospital settings.
//!
//! One record per hospital. The corporate tax rate seeds new reports; the
//! archive period drives age-based archiving. Approval flags are stored only.

mod model;

pub use model::{
    HospitalSettings, MAX_ADDRESS_LEN, MAX_HOSPITAL_NAME_LEN, NotificationSettings,
    ReportingSettings, SettingsUpdate, TaxSettings,
};
