use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "points_entry_type")]
#[serde(rename_all = "snake_case")]
pub enum PointsEntryType {
    #[sea_orm(string_value = "referral_conversion")]
    ReferralConversion,
    #[sea_orm(string_value = "admin_adjust")]
    AdminAdjust,
    #[sea_orm(string_value = "redeem")]
    Redeem,
}

impl std::fmt::Display for PointsEntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PointsEntryType::ReferralConversion => write!(f, "referral_conversion"),
            PointsEntryType::AdminAdjust => write!(f, "admin_adjust"),
            PointsEntryType::Redeem => write!(f, "redeem"),
        }
    }
}

/// 积分流水，仅追加；owners.points_balance 是其累加缓存。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "points_ledger")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_key: String,
    pub entry_type: PointsEntryType,
    /// 有符号增量（消费为负）
    pub delta_points: i64,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
