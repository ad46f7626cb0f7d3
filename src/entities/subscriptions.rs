use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{DeriveActiveEnum, EnumIter};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "subscription_status"
)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "active")]
    Active,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionStatus::Pending => write!(f, "pending"),
            SubscriptionStatus::Active => write!(f, "active"),
            SubscriptionStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// 订阅档位：由时长与是否续订推导，仅用于展示/报表，不参与计费。
#[derive(
    Debug, Clone, Serialize, Deserialize, PartialEq, Eq, ToSchema, DeriveActiveEnum, EnumIter,
)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "subscription_class")]
pub enum SubscriptionClass {
    #[sea_orm(string_value = "recurring_yearly")]
    #[serde(rename = "recurring_yearly")]
    RecurringYearly,
    #[sea_orm(string_value = "recurring_quarterly")]
    #[serde(rename = "recurring_quarterly")]
    RecurringQuarterly,
    #[sea_orm(string_value = "recurring_monthly")]
    #[serde(rename = "recurring_monthly")]
    RecurringMonthly,
    #[sea_orm(string_value = "one_time_90_days")]
    #[serde(rename = "one_time_90_days")]
    OneTime90Days,
    #[sea_orm(string_value = "one_time_60_days")]
    #[serde(rename = "one_time_60_days")]
    OneTime60Days,
    #[sea_orm(string_value = "one_time_30_days")]
    #[serde(rename = "one_time_30_days")]
    OneTime30Days,
}

impl std::fmt::Display for SubscriptionClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubscriptionClass::RecurringYearly => write!(f, "recurring_yearly"),
            SubscriptionClass::RecurringQuarterly => write!(f, "recurring_quarterly"),
            SubscriptionClass::RecurringMonthly => write!(f, "recurring_monthly"),
            SubscriptionClass::OneTime90Days => write!(f, "one_time_90_days"),
            SubscriptionClass::OneTime60Days => write!(f, "one_time_60_days"),
            SubscriptionClass::OneTime30Days => write!(f, "one_time_30_days"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "subscriptions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub owner_key: String,
    /// 链上转账签名，唯一，作为支付核销的幂等键
    pub payment_proof: String,
    pub price_stable_cents: i64,
    pub price_native_lamports: i64,
    pub exchange_rate: f64,
    pub duration_days: i32,
    pub is_recurring: bool,
    pub class: SubscriptionClass,
    pub status: SubscriptionStatus,
    pub payment_verified: bool,
    pub starts_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub auto_renew: bool,
    pub next_billing_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
