use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordClickRequest {
    #[schema(example = "X7K2P9")]
    pub referral_code: String,
    /// 前端生成的匿名会话标识，同一会话重复点击不重复计数
    pub visitor_session: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordClickResponse {
    pub recorded: bool,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttributeReferralRequest {
    pub referral_code: String,
    pub owner_key: String,
    pub visitor_session: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AttributeReferralResponse {
    pub attributed: bool,
    pub referrer_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ReferralStatsResponse {
    pub referral_code: String,
    pub total_clicks: i64,
    pub total_signups: i64,
    pub total_conversions: i64,
    pub points_earned: i64,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReferralStatsQuery {
    pub owner_key: String,
}
