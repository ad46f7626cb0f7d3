use crate::config::TelegramConfig;
use crate::entities::{OwnerGateStatus, owner_entity as owners};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::OwnerService;
use crate::store::{LinkToken, TokenStore};
use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, QueryFilter,
    Set,
};
use std::sync::Arc;
use uuid::Uuid;

/// Telegram 绑定与进群门禁。绑定令牌走进程内 TokenStore，一次性使用。
#[derive(Clone)]
pub struct TelegramLinkService {
    pool: DatabaseConnection,
    config: TelegramConfig,
    store: Arc<dyn TokenStore>,
    owner_service: OwnerService,
}

impl TelegramLinkService {
    pub fn new(
        pool: DatabaseConnection,
        config: TelegramConfig,
        store: Arc<dyn TokenStore>,
        owner_service: OwnerService,
    ) -> Self {
        Self {
            pool,
            config,
            store,
            owner_service,
        }
    }

    /// 为钱包签发一次性绑定令牌，同一钱包旧令牌全部作废
    pub async fn issue_link_token(&self, owner_key: &str) -> AppResult<IssueLinkTokenResponse> {
        self.owner_service.ensure_owner(owner_key).await?;

        for stale in self.store.list_by_owner(owner_key) {
            self.store.delete(&stale.token);
        }

        let now = Utc::now();
        let token = LinkToken {
            token: Uuid::new_v4().simple().to_string(),
            owner_key: owner_key.to_string(),
            issued_at: now,
            expires_at: now + Duration::seconds(self.config.link_token_ttl_secs),
        };
        let response = IssueLinkTokenResponse {
            token: token.token.clone(),
            expires_at: token.expires_at,
        };
        self.store.put(token);

        Ok(response)
    }

    /// bot 端兑换令牌，把 telegram 账号绑到钱包上
    pub async fn redeem_link_token(
        &self,
        req: RedeemLinkTokenRequest,
    ) -> AppResult<RedeemLinkTokenResponse> {
        let token = self
            .store
            .delete(&req.token)
            .ok_or_else(|| AppError::NotFound("绑定令牌不存在或已过期".to_string()))?;

        // 同一 telegram 账号不能绑两个钱包
        let taken = owners::Entity::find()
            .filter(owners::Column::TelegramUserId.eq(req.telegram_user_id))
            .one(&self.pool)
            .await?;
        if let Some(existing) = taken
            && existing.owner_key != token.owner_key
        {
            return Err(AppError::ConflictError(
                "该 Telegram 账号已绑定其他钱包".to_string(),
            ));
        }

        let owner = self.owner_service.ensure_owner(&token.owner_key).await?;
        let owner_key = owner.owner_key.clone();
        let mut am = owner.into_active_model();
        am.telegram_user_id = Set(Some(req.telegram_user_id));
        am.update(&self.pool).await?;

        Ok(RedeemLinkTokenResponse {
            linked: true,
            owner_key,
        })
    }

    /// bot 放行检查：绑定过且画像缓存显示订阅仍有效。
    /// 即使缓存的 status 还是 active，到期时间过了也一律拒绝。
    pub async fn gate_check(&self, telegram_user_id: i64) -> AppResult<GateCheckResponse> {
        let owner = owners::Entity::find()
            .filter(owners::Column::TelegramUserId.eq(telegram_user_id))
            .one(&self.pool)
            .await?;

        let Some(owner) = owner else {
            return Ok(GateCheckResponse {
                allowed: false,
                owner_key: None,
                expires_at: None,
            });
        };

        let now = Utc::now();
        let allowed = owner.subscription_status == Some(OwnerGateStatus::Active)
            && owner.subscription_expires_at.is_some_and(|t| t > now);

        Ok(GateCheckResponse {
            allowed,
            owner_key: Some(owner.owner_key),
            expires_at: owner.subscription_expires_at,
        })
    }
}
