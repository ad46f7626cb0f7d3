use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;

/// 推荐链接点击记录，(referral_code, visitor_session) 唯一，保证重复点击不重复计数。
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "referral_clicks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub referral_code: String,
    pub visitor_session: String,
    pub converted: bool,
    pub converted_owner_key: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
