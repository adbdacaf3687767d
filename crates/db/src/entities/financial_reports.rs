//! `SeaORM` Entity for financial_reports table.
//!
//! Line-item categories and derived blocks are JSONB documents keyed by the
//! wire names of their items.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{ReportStatus, ReportType};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "financial_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub hospital_id: String,
    pub report_type: ReportType,
    pub period: String,
    pub year: i32,
    pub month: Option<i32>,
    pub quarter: Option<i32>,
    pub period_end: Date,
    pub revenue: Json,
    pub expenses: Json,
    pub assets: Json,
    pub liabilities: Json,
    pub equity: Json,
    pub tax: Json,
    pub balance_sheet: Json,
    pub status: ReportStatus,
    pub created_by: Uuid,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTimeWithTimeZone>,
    pub rejection_reason: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::CreatedBy",
        to = "super::users::Column::Id"
    )]
    Creator,
    #[sea_orm(has_many = "super::review_schedules::Entity")]
    ReviewSchedules,
}

impl Related<super::review_schedules::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ReviewSchedules.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
