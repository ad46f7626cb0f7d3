use crate::entities::{OwnerGateStatus, owner_entity as owners};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerResponse {
    pub id: i64,
    pub owner_key: String,
    pub username: Option<String>,
    pub subscription_status: Option<OwnerGateStatus>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub referral_code: Option<String>,
    pub points_balance: i64,
    pub telegram_linked: bool,
    pub created_at: DateTime<Utc>,
}

impl From<owners::Model> for OwnerResponse {
    fn from(m: owners::Model) -> Self {
        Self {
            id: m.id,
            owner_key: m.owner_key,
            username: m.username,
            subscription_status: m.subscription_status,
            subscription_expires_at: m.subscription_expires_at,
            referral_code: m.referral_code,
            points_balance: m.points_balance.unwrap_or(0),
            telegram_linked: m.telegram_user_id.is_some(),
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

/// 画像聚合统计，来自订阅表和推荐表的实时计数。
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerStatistics {
    pub total_subscriptions: i64,
    pub has_active_subscription: bool,
    pub total_referrals: i64,
    pub points_balance: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct OwnerProfileResponse {
    pub owner: OwnerResponse,
    pub statistics: OwnerStatistics,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct OwnerProfileQuery {
    pub owner_key: String,
}
