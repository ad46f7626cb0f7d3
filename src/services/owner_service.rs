use crate::entities::{
    OwnerGateStatus, SubscriptionStatus, owner_entity as owners, subscription_entity as subs,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::generate_unique_referral_code;
use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, Set,
};

#[derive(Clone)]
pub struct OwnerService {
    pool: DatabaseConnection,
}

impl OwnerService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 按钱包地址取画像行，没有就建一条（顺带分配推荐码）
    pub async fn ensure_owner(&self, owner_key: &str) -> AppResult<owners::Model> {
        if let Some(owner) = self.find_by_key(owner_key).await? {
            return Ok(owner);
        }

        let code = generate_unique_referral_code(&self.pool).await?;
        let model = owners::ActiveModel {
            owner_key: Set(owner_key.to_string()),
            referral_code: Set(Some(code)),
            points_balance: Set(Some(0)),
            ..Default::default()
        };

        match model.insert(&self.pool).await {
            Ok(owner) => Ok(owner),
            // 并发下同一地址同时建档，回读已存在的行
            Err(e) if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
                self.find_by_key(owner_key)
                    .await?
                    .ok_or_else(|| AppError::InternalError("owner 建档后查询失败".to_string()))
            }
            Err(e) => Err(AppError::DatabaseError(e)),
        }
    }

    pub async fn find_by_key(&self, owner_key: &str) -> AppResult<Option<owners::Model>> {
        Ok(owners::Entity::find()
            .filter(owners::Column::OwnerKey.eq(owner_key.to_string()))
            .one(&self.pool)
            .await?)
    }

    /// 画像 + 实时统计（统计走权威表，不依赖缓存字段）
    pub async fn get_profile(&self, owner_key: &str) -> AppResult<OwnerProfileResponse> {
        let owner = self
            .find_by_key(owner_key)
            .await?
            .ok_or_else(|| AppError::NotFound("owner 不存在".to_string()))?;

        let now = Utc::now();
        let total_subscriptions = subs::Entity::find()
            .filter(subs::Column::OwnerKey.eq(owner_key.to_string()))
            .count(&self.pool)
            .await? as i64;
        let active_count = subs::Entity::find()
            .filter(subs::Column::OwnerKey.eq(owner_key.to_string()))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .filter(subs::Column::ExpiresAt.gt(now))
            .count(&self.pool)
            .await?;
        let total_referrals = owners::Entity::find()
            .filter(owners::Column::ReferredBy.eq(owner.id))
            .count(&self.pool)
            .await? as i64;

        let statistics = OwnerStatistics {
            total_subscriptions,
            has_active_subscription: active_count > 0,
            total_referrals,
            points_balance: owner.points_balance.unwrap_or(0),
        };

        Ok(OwnerProfileResponse {
            owner: OwnerResponse::from(owner),
            statistics,
        })
    }

    /// 订阅激活后的画像缓存回写（best-effort，调用方负责告警）
    pub async fn mark_active(
        &self,
        owner_key: &str,
        expires_at: DateTime<Utc>,
    ) -> AppResult<()> {
        let owner = self.ensure_owner(owner_key).await?;
        let mut am = owner.into_active_model();
        am.subscription_status = Set(Some(OwnerGateStatus::Active));
        am.subscription_expires_at = Set(Some(expires_at));
        am.update(&self.pool).await?;
        Ok(())
    }

    /// 把缓存里已过期却仍标记 active 的画像翻成 expired，返回处理条数。
    /// 只修读侧缓存，订阅表的到期语义由 expires_at 自身表达，不在这里动。
    pub async fn sweep_lapsed(&self) -> AppResult<u64> {
        let result = owners::Entity::update_many()
            .col_expr(
                owners::Column::SubscriptionStatus,
                Expr::value(OwnerGateStatus::Expired),
            )
            .filter(owners::Column::SubscriptionStatus.eq(OwnerGateStatus::Active))
            .filter(owners::Column::SubscriptionExpiresAt.lt(Utc::now()))
            .exec(&self.pool)
            .await?;
        Ok(result.rows_affected)
    }
}
