//! `SeaORM` Entity for the orders table.
//!
//! The customer, invoice, line-group, and payment sections of an order
//! are stored as JSONB documents; the transition metadata the engine
//! stamps lives in scalar columns so it can be indexed and filtered.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "JsonBinary")]
    pub personal_info: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub order_details: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub line_groups: Json,
    #[sea_orm(column_type = "JsonBinary")]
    pub payment_state: Json,
    pub status_value: String,
    pub cancellation_reason: Option<String>,
    pub cancelled_at: Option<DateTimeWithTimeZone>,
    pub completed_at: Option<DateTimeWithTimeZone>,
    pub pending_at: Option<DateTimeWithTimeZone>,
    pub expected_resume_date: Option<Date>,
    pub pending_notes: Option<String>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
