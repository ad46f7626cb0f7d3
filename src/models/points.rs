use crate::entities::{PointsEntryType, points_ledger_entity as ledger};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsBalanceResponse {
    pub owner_key: String,
    pub balance: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct PointsEntryResponse {
    pub id: i64,
    pub entry_type: PointsEntryType,
    /// 正数为入账，负数为消费
    pub delta_points: i64,
    pub reference: Option<String>,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<ledger::Model> for PointsEntryResponse {
    fn from(m: ledger::Model) -> Self {
        Self {
            id: m.id,
            entry_type: m.entry_type,
            delta_points: m.delta_points,
            reference: m.reference,
            note: m.note,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemPointsRequest {
    pub owner_key: String,
    #[schema(example = 100)]
    pub points: i64,
    pub note: Option<String>,
}

/// 管理端手工调账，delta 可正可负。
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustPointsRequest {
    pub owner_key: String,
    pub delta_points: i64,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PointsHistoryQuery {
    pub owner_key: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
