//! `SeaORM` Entity for hospital_settings table.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "hospital_settings")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub hospital_id: String,
    pub hospital_name: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub tax_id: String,
    pub fiscal_year_start: i32,
    pub currency: String,
    pub tax_settings: Json,
    pub reporting_settings: Json,
    pub notification_settings: Json,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
