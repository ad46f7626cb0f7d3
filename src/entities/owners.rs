use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 资料表上反规范化的订阅门禁状态（只读缓存，权威数据在 subscriptions 表）。
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "owner_gate_status")]
#[serde(rename_all = "snake_case")]
pub enum OwnerGateStatus {
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "expired")]
    Expired,
}

impl std::fmt::Display for OwnerGateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OwnerGateStatus::Active => write!(f, "active"),
            OwnerGateStatus::Expired => write!(f, "expired"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "owners")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// 外部不透明主键（钱包地址）
    pub owner_key: String,
    pub username: Option<String>,
    pub subscription_status: Option<OwnerGateStatus>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub referral_code: Option<String>,
    pub referred_by: Option<i64>,
    pub points_balance: Option<i64>,
    pub telegram_user_id: Option<i64>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
