use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueLinkTokenRequest {
    pub owner_key: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct IssueLinkTokenResponse {
    /// 一次性绑定令牌，交给 Telegram bot 的 /start 参数
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemLinkTokenRequest {
    pub token: String,
    pub telegram_user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RedeemLinkTokenResponse {
    pub linked: bool,
    pub owner_key: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GateCheckQuery {
    pub telegram_user_id: i64,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct GateCheckResponse {
    pub allowed: bool,
    pub owner_key: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}
