use crate::entities::{SubscriptionClass, SubscriptionStatus, subscription_entity as subs};
use crate::external::price_feed::RateSource;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 创建订阅时前端提交的报价快照（stable 为美分，native 为 lamports）。
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PriceInput {
    #[schema(example = 999)]
    pub stable_cents: i64,
    #[schema(example = 66600000)]
    pub native_lamports: i64,
    /// 报价时的 USD / 原生币汇率，仅作审计记录
    #[schema(example = 150.0)]
    pub exchange_rate: f64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct CreateSubscriptionRequest {
    #[schema(example = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin")]
    pub owner_key: String,
    /// 链上转账签名（base58）
    pub payment_proof: String,
    pub price: PriceInput,
    #[schema(example = 30)]
    pub duration_days: i32,
    pub is_recurring: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionResponse {
    pub id: i64,
    pub owner_key: String,
    pub payment_proof: String,
    pub price_stable_cents: i64,
    pub price_native_lamports: i64,
    pub duration_days: i32,
    pub is_recurring: bool,
    pub class: SubscriptionClass,
    pub status: SubscriptionStatus,
    pub payment_verified: bool,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub auto_renew: bool,
    pub next_billing_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<subs::Model> for SubscriptionResponse {
    fn from(m: subs::Model) -> Self {
        Self {
            id: m.id,
            owner_key: m.owner_key,
            payment_proof: m.payment_proof,
            price_stable_cents: m.price_stable_cents,
            price_native_lamports: m.price_native_lamports,
            duration_days: m.duration_days,
            is_recurring: m.is_recurring,
            class: m.class,
            status: m.status,
            payment_verified: m.payment_verified,
            starts_at: m.starts_at,
            expires_at: m.expires_at,
            auto_renew: m.auto_renew,
            next_billing_at: m.next_billing_at,
            created_at: m.created_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySubscriptionRequest {
    pub payment_proof: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct VerifySubscriptionResponse {
    pub verified: bool,
    pub subscription: SubscriptionResponse,
    /// 非致命的旁路写失败（资料缓存、推荐奖励）会以警告形式带回
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub warnings: Vec<String>,
}

/// 管理操作请求：以 serde tag 区分动作，穷尽匹配代替字符串分发。
#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ManageSubscriptionRequest {
    Cancel {
        subscription_id: i64,
    },
    Update {
        subscription_id: i64,
        new_duration_days: Option<i32>,
        new_recurring: Option<bool>,
    },
    GetActive {
        owner_key: String,
    },
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscriptionQuoteQuery {
    pub duration_days: i32,
    pub is_recurring: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct SubscriptionQuoteResponse {
    pub class: SubscriptionClass,
    pub duration_days: i32,
    pub is_recurring: bool,
    pub stable_cents: i64,
    pub native_lamports: i64,
    pub exchange_rate: f64,
    pub rate_source: RateSource,
    /// 报价有效期，过期后应重新询价
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SubscriptionListQuery {
    pub owner_key: String,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}
