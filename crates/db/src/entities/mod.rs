//! `SeaORM` entity definitions.

pub mod financial_reports;
pub mod hospital_settings;
pub mod review_schedules;
pub mod sea_orm_active_enums;
pub mod users;
