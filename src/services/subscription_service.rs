use crate::entities::{
    SubscriptionClass, SubscriptionStatus, owner_entity as owners, subscription_entity as subs,
};
use crate::error::{AppError, AppResult};
use crate::external::{ChainRpcService, PriceFeedService, price_feed::native_lamports_for_cents};
use crate::models::*;
use crate::services::{OwnerService, ReferralService};
use crate::utils::{validate_owner_key, validate_payment_proof};
use chrono::{DateTime, Duration, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};

/// 按时长与续订与否推导订阅档位。边界值归入高档（≥ 语义）。
pub fn classify(duration_days: i32, is_recurring: bool) -> SubscriptionClass {
    if is_recurring {
        if duration_days >= 365 {
            SubscriptionClass::RecurringYearly
        } else if duration_days >= 90 {
            SubscriptionClass::RecurringQuarterly
        } else {
            SubscriptionClass::RecurringMonthly
        }
    } else if duration_days >= 90 {
        SubscriptionClass::OneTime90Days
    } else if duration_days >= 60 {
        SubscriptionClass::OneTime60Days
    } else {
        SubscriptionClass::OneTime30Days
    }
}

/// 各档位的美元定价（美分）
pub fn stable_cents_for_class(class: &SubscriptionClass) -> i64 {
    match class {
        SubscriptionClass::RecurringYearly => 7999,   // $79.99
        SubscriptionClass::RecurringQuarterly => 2499, // $24.99
        SubscriptionClass::RecurringMonthly => 999,   // $9.99
        SubscriptionClass::OneTime90Days => 2999,     // $29.99
        SubscriptionClass::OneTime60Days => 2199,     // $21.99
        SubscriptionClass::OneTime30Days => 1299,     // $12.99
    }
}

/// 核销时的到期日裁决：上一份订阅尚未到期则顺延叠加，
/// 已到期或不存在则沿用本单创建时算好的到期日（断档不补）。
pub fn resolve_expiry(
    own_expires_at: DateTime<Utc>,
    prior_expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    duration_days: i32,
) -> DateTime<Utc> {
    match prior_expires_at {
        Some(prior) if prior > now => prior + Duration::days(duration_days as i64),
        _ => own_expires_at,
    }
}

/// 核销入口的状态裁决：active 走幂等返回，cancelled 拒绝，只有 pending 往下走。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyGate {
    AlreadyActive,
    Rejected,
    Proceed,
}

pub fn verify_gate(status: &SubscriptionStatus) -> VerifyGate {
    match status {
        SubscriptionStatus::Active => VerifyGate::AlreadyActive,
        SubscriptionStatus::Cancelled => VerifyGate::Rejected,
        SubscriptionStatus::Pending => VerifyGate::Proceed,
    }
}

/// update 操作的档位重算：仅在提供新时长时重算，续订标记取新值否则沿用旧值。
pub fn reclassify_on_update(
    new_duration_days: Option<i32>,
    new_recurring: Option<bool>,
    current_recurring: bool,
) -> Option<SubscriptionClass> {
    new_duration_days.map(|days| classify(days, new_recurring.unwrap_or(current_recurring)))
}

#[derive(Clone)]
pub struct SubscriptionService {
    pool: DatabaseConnection,
    chain_service: ChainRpcService,
    price_feed: PriceFeedService,
    owner_service: OwnerService,
    referral_service: ReferralService,
}

impl SubscriptionService {
    pub fn new(
        pool: DatabaseConnection,
        chain_service: ChainRpcService,
        price_feed: PriceFeedService,
        owner_service: OwnerService,
        referral_service: ReferralService,
    ) -> Self {
        Self {
            pool,
            chain_service,
            price_feed,
            owner_service,
            referral_service,
        }
    }

    /// 报价：档位定价 + 实时汇率换算成 lamports，带有效期窗口
    pub async fn quote(&self, req: SubscriptionQuoteQuery) -> AppResult<SubscriptionQuoteResponse> {
        if req.duration_days <= 0 {
            return Err(AppError::ValidationError(
                "duration_days 必须为正整数".to_string(),
            ));
        }

        let class = classify(req.duration_days, req.is_recurring);
        let stable_cents = stable_cents_for_class(&class);
        let (usd_per_native, rate_source) = self.price_feed.usd_rate().await;

        Ok(SubscriptionQuoteResponse {
            class,
            duration_days: req.duration_days,
            is_recurring: req.is_recurring,
            stable_cents,
            native_lamports: native_lamports_for_cents(stable_cents, usd_per_native),
            exchange_rate: usd_per_native,
            rate_source,
            valid_until: self.price_feed.quote_valid_until(),
        })
    }

    /// 提交支付凭证，落一条 pending 订阅。payment_proof 唯一，重复提交报 409。
    pub async fn create_pending(
        &self,
        req: CreateSubscriptionRequest,
    ) -> AppResult<SubscriptionResponse> {
        validate_owner_key(&req.owner_key)?;
        validate_payment_proof(&req.payment_proof)?;
        if req.duration_days <= 0 {
            return Err(AppError::ValidationError(
                "duration_days 必须为正整数".to_string(),
            ));
        }
        if req.price.stable_cents <= 0 || req.price.native_lamports <= 0 {
            return Err(AppError::ValidationError("price 金额必须为正".to_string()));
        }

        // 先查重，给出明确的 409；并发竞态由唯一约束兜底
        let exists = subs::Entity::find()
            .filter(subs::Column::PaymentProof.eq(req.payment_proof.clone()))
            .count(&self.pool)
            .await?;
        if exists > 0 {
            return Err(AppError::ConflictError(
                "该支付凭证已提交过，请直接调用 verify 查询核销结果".to_string(),
            ));
        }

        // 保证画像行存在（顺带分配推荐码）
        self.owner_service.ensure_owner(&req.owner_key).await?;

        let now = Utc::now();
        let expires_at = now + Duration::days(req.duration_days as i64);
        let class = classify(req.duration_days, req.is_recurring);

        let model = subs::ActiveModel {
            owner_key: Set(req.owner_key.clone()),
            payment_proof: Set(req.payment_proof.clone()),
            price_stable_cents: Set(req.price.stable_cents),
            price_native_lamports: Set(req.price.native_lamports),
            exchange_rate: Set(req.price.exchange_rate),
            duration_days: Set(req.duration_days),
            is_recurring: Set(req.is_recurring),
            class: Set(class),
            status: Set(SubscriptionStatus::Pending),
            payment_verified: Set(false),
            starts_at: Set(now),
            expires_at: Set(expires_at),
            auto_renew: Set(req.is_recurring),
            next_billing_at: Set(req.is_recurring.then_some(expires_at)),
            ..Default::default()
        };

        let inserted = model.insert(&self.pool).await.map_err(|e| {
            // 竞态下唯一约束触发时也映射成 409
            if let Some(sea_orm::SqlErr::UniqueConstraintViolation(_)) = e.sql_err() {
                AppError::ConflictError("该支付凭证已提交过".to_string())
            } else {
                AppError::DatabaseError(e)
            }
        })?;

        Ok(SubscriptionResponse::from(inserted))
    }

    /// 核销支付并激活订阅。幂等：已激活的记录原样返回，不重复叠加天数。
    pub async fn verify_and_extend(
        &self,
        payment_proof: &str,
    ) -> AppResult<VerifySubscriptionResponse> {
        let sub = subs::Entity::find()
            .filter(subs::Column::PaymentProof.eq(payment_proof.to_string()))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("未找到该支付凭证对应的订阅".to_string()))?;

        // 状态机只允许 pending -> active
        match verify_gate(&sub.status) {
            VerifyGate::AlreadyActive => {
                return Ok(VerifySubscriptionResponse {
                    verified: true,
                    subscription: SubscriptionResponse::from(sub),
                    warnings: vec![],
                });
            }
            VerifyGate::Rejected => {
                return Err(AppError::InvalidState(
                    "订阅已取消，不能再核销".to_string(),
                ));
            }
            VerifyGate::Proceed => {}
        }

        // 链上确认。未达确认级别视为支付未完成，RPC 故障原样上抛 502。
        if !self.chain_service.confirm_signature(payment_proof).await? {
            return Err(AppError::ValidationError(
                "链上交易尚未确认，请稍后重试".to_string(),
            ));
        }

        let now = Utc::now();
        let mut warnings: Vec<String> = Vec::new();

        // 叠加来源以订阅表为准：本人最近一条未到期的 active 记录
        let prior = subs::Entity::find()
            .filter(subs::Column::OwnerKey.eq(sub.owner_key.clone()))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .filter(subs::Column::ExpiresAt.gt(now))
            .filter(subs::Column::Id.ne(sub.id))
            .order_by_desc(subs::Column::ExpiresAt)
            .one(&self.pool)
            .await?
            .map(|p| p.expires_at);

        // 画像缓存只用来探测不一致，不参与计算
        let cached = owners::Entity::find()
            .filter(owners::Column::OwnerKey.eq(sub.owner_key.clone()))
            .one(&self.pool)
            .await?
            .and_then(|o| o.subscription_expires_at);
        if let (Some(p), Some(c)) = (prior, cached)
            && p != c
        {
            log::warn!(
                "owner {} 的画像缓存到期日 {c} 与订阅表 {p} 不一致，以订阅表为准",
                sub.owner_key
            );
            warnings.push("画像缓存与订阅表到期日不一致，已按订阅表计算".to_string());
        }

        let candidate = resolve_expiry(sub.expires_at, prior, now, sub.duration_days);

        // 权威写：条件迁移，只有仍是 pending 的行会被翻成 active。
        // 并发的重复核销或抢先的取消都会让这条 update 落空，不会覆盖写。
        let owner_key = sub.owner_key.clone();
        let mut update = subs::Entity::update_many()
            .col_expr(subs::Column::Status, Expr::value(SubscriptionStatus::Active))
            .col_expr(subs::Column::PaymentVerified, Expr::value(true))
            .col_expr(subs::Column::ExpiresAt, Expr::value(candidate))
            .filter(subs::Column::Id.eq(sub.id))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Pending));
        if sub.is_recurring {
            update = update.col_expr(subs::Column::NextBillingAt, Expr::value(candidate));
        }
        let result = update.exec(&self.pool).await?;

        if result.rows_affected == 0 {
            // 竞态：别的请求先完成了迁移，按落库后的状态重新裁决
            let current = subs::Entity::find_by_id(sub.id)
                .one(&self.pool)
                .await?
                .ok_or_else(|| AppError::NotFound("订阅不存在".to_string()))?;
            return match verify_gate(&current.status) {
                VerifyGate::AlreadyActive => Ok(VerifySubscriptionResponse {
                    verified: true,
                    subscription: SubscriptionResponse::from(current),
                    warnings: vec![],
                }),
                _ => Err(AppError::InvalidState(
                    "订阅已取消，不能再核销".to_string(),
                )),
            };
        }

        let updated = subs::Entity::find_by_id(sub.id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::InternalError("订阅核销后查询失败".to_string()))?;

        // 旁路写 1：画像缓存，失败只告警
        if let Err(e) = self
            .owner_service
            .mark_active(&owner_key, candidate)
            .await
        {
            log::warn!("更新 owner {owner_key} 画像缓存失败: {e:?}");
            warnings.push(format!("画像缓存更新失败: {e}"));
        }

        // 旁路写 2：推荐转化奖励，同样只告警。
        // 只有赢得条件迁移的一方走到这里，奖励不会重复发放。
        if let Err(e) = self
            .referral_service
            .award_conversion(&owner_key, payment_proof)
            .await
        {
            log::warn!("发放 owner {owner_key} 的推荐转化奖励失败: {e:?}");
            warnings.push(format!("推荐奖励发放失败: {e}"));
        }

        Ok(VerifySubscriptionResponse {
            verified: true,
            subscription: SubscriptionResponse::from(updated),
            warnings,
        })
    }

    /// 取消自动续订。一次性订阅不可取消，只会自然到期。
    pub async fn cancel(&self, subscription_id: i64) -> AppResult<SubscriptionResponse> {
        let sub = subs::Entity::find_by_id(subscription_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("订阅不存在".to_string()))?;

        if !sub.is_recurring {
            return Err(AppError::InvalidState(
                "一次性订阅不能取消，到期自动失效".to_string(),
            ));
        }

        // 取消只关自动续订，expires_at 保持不变，当期权益用完为止
        let mut am = sub.into_active_model();
        am.status = Set(SubscriptionStatus::Cancelled);
        am.auto_renew = Set(false);
        am.next_billing_at = Set(None);
        let updated = am.update(&self.pool).await?;

        Ok(SubscriptionResponse::from(updated))
    }

    /// 调整后续计费参数。档位立即重算，日期留到下次核销才生效。
    pub async fn update(
        &self,
        subscription_id: i64,
        new_duration_days: Option<i32>,
        new_recurring: Option<bool>,
    ) -> AppResult<SubscriptionResponse> {
        if new_duration_days.is_none() && new_recurring.is_none() {
            return Err(AppError::ValidationError(
                "new_duration_days 与 new_recurring 至少提供一个".to_string(),
            ));
        }
        if let Some(days) = new_duration_days
            && days <= 0
        {
            return Err(AppError::ValidationError(
                "new_duration_days 必须为正整数".to_string(),
            ));
        }

        let sub = subs::Entity::find_by_id(subscription_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound("订阅不存在".to_string()))?;

        let new_class = reclassify_on_update(new_duration_days, new_recurring, sub.is_recurring);

        let mut am = sub.into_active_model();
        if let Some(days) = new_duration_days {
            am.duration_days = Set(days);
        }
        if let Some(class) = new_class {
            am.class = Set(class);
        }
        if let Some(recurring) = new_recurring {
            am.is_recurring = Set(recurring);
            am.auto_renew = Set(recurring);
        }
        let updated = am.update(&self.pool).await?;

        Ok(SubscriptionResponse::from(updated))
    }

    /// 最近创建的一条激活中的续订订阅，没有则返回 None
    pub async fn get_active_recurring(
        &self,
        owner_key: &str,
    ) -> AppResult<Option<SubscriptionResponse>> {
        let found = subs::Entity::find()
            .filter(subs::Column::OwnerKey.eq(owner_key.to_string()))
            .filter(subs::Column::IsRecurring.eq(true))
            .filter(subs::Column::Status.eq(SubscriptionStatus::Active))
            .order_by_desc(subs::Column::CreatedAt)
            .one(&self.pool)
            .await?;

        Ok(found.map(SubscriptionResponse::from))
    }

    /// 订阅历史，新的在前
    pub async fn list_subscriptions(
        &self,
        owner_key: &str,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<SubscriptionResponse>> {
        let total = subs::Entity::find()
            .filter(subs::Column::OwnerKey.eq(owner_key.to_string()))
            .count(&self.pool)
            .await? as i64;

        let models = subs::Entity::find()
            .filter(subs::Column::OwnerKey.eq(owner_key.to_string()))
            .order_by_desc(subs::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<SubscriptionResponse> =
            models.into_iter().map(SubscriptionResponse::from).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_recurring_boundaries() {
        assert_eq!(classify(365, true), SubscriptionClass::RecurringYearly);
        assert_eq!(classify(400, true), SubscriptionClass::RecurringYearly);
        assert_eq!(classify(364, true), SubscriptionClass::RecurringQuarterly);
        assert_eq!(classify(90, true), SubscriptionClass::RecurringQuarterly);
        assert_eq!(classify(89, true), SubscriptionClass::RecurringMonthly);
        assert_eq!(classify(30, true), SubscriptionClass::RecurringMonthly);
        assert_eq!(classify(1, true), SubscriptionClass::RecurringMonthly);
    }

    #[test]
    fn test_classify_one_time_boundaries() {
        assert_eq!(classify(90, false), SubscriptionClass::OneTime90Days);
        assert_eq!(classify(120, false), SubscriptionClass::OneTime90Days);
        assert_eq!(classify(89, false), SubscriptionClass::OneTime60Days);
        assert_eq!(classify(60, false), SubscriptionClass::OneTime60Days);
        assert_eq!(classify(59, false), SubscriptionClass::OneTime30Days);
        assert_eq!(classify(30, false), SubscriptionClass::OneTime30Days);
        assert_eq!(classify(1, false), SubscriptionClass::OneTime30Days);
    }

    #[test]
    fn test_resolve_expiry_no_prior() {
        let now = Utc::now();
        let own = now + Duration::days(30);
        assert_eq!(resolve_expiry(own, None, now, 30), own);
    }

    #[test]
    fn test_resolve_expiry_stacks_on_unexpired_prior() {
        // 上一份还剩 10 天，新买 30 天应从旧到期日续 30 天
        let now = Utc::now();
        let prior = now + Duration::days(10);
        let own = now + Duration::days(30);
        assert_eq!(
            resolve_expiry(own, Some(prior), now, 30),
            prior + Duration::days(30)
        );
    }

    #[test]
    fn test_resolve_expiry_no_stacking_across_gap() {
        // 上一份已过期 5 天，断档不补，沿用本单自己的到期日
        let now = Utc::now();
        let prior = now - Duration::days(5);
        let own = now + Duration::days(30);
        assert_eq!(resolve_expiry(own, Some(prior), now, 30), own);
    }

    #[test]
    fn test_resolve_expiry_prior_exactly_now_is_lapsed() {
        let now = Utc::now();
        let own = now + Duration::days(30);
        assert_eq!(resolve_expiry(own, Some(now), now, 30), own);
    }

    #[test]
    fn test_verify_gate_only_pending_proceeds() {
        assert_eq!(
            verify_gate(&SubscriptionStatus::Pending),
            VerifyGate::Proceed
        );
        assert_eq!(
            verify_gate(&SubscriptionStatus::Active),
            VerifyGate::AlreadyActive
        );
        assert_eq!(
            verify_gate(&SubscriptionStatus::Cancelled),
            VerifyGate::Rejected
        );
    }

    #[test]
    fn test_second_verify_keeps_stored_expiry() {
        // 第一次核销：叠加在旧订阅剩余期限之上
        let now = Utc::now();
        let prior = now + Duration::days(10);
        let own = now + Duration::days(30);
        let stored = resolve_expiry(own, Some(prior), now, 30);

        // 记录已翻成 active，第二次核销走幂等分支，直接返回已存的到期日；
        // 若错误地重跑叠加计算，到期日会再多出 30 天
        assert_eq!(
            verify_gate(&SubscriptionStatus::Active),
            VerifyGate::AlreadyActive
        );
        assert_eq!(
            resolve_expiry(own, Some(stored), now, 30),
            stored + Duration::days(30)
        );
    }

    #[test]
    fn test_reclassify_on_update() {
        // 只给时长：用原续订标记
        assert_eq!(
            reclassify_on_update(Some(180), None, false),
            Some(SubscriptionClass::OneTime90Days)
        );
        // 时长 + 续订：用新续订标记
        assert_eq!(
            reclassify_on_update(Some(180), Some(true), false),
            Some(SubscriptionClass::RecurringQuarterly)
        );
        // 只改续订标记不重算档位
        assert_eq!(reclassify_on_update(None, Some(true), false), None);
    }

    #[test]
    fn test_stable_cents_covers_all_classes() {
        for class in [
            SubscriptionClass::RecurringYearly,
            SubscriptionClass::RecurringQuarterly,
            SubscriptionClass::RecurringMonthly,
            SubscriptionClass::OneTime90Days,
            SubscriptionClass::OneTime60Days,
            SubscriptionClass::OneTime30Days,
        ] {
            assert!(stable_cents_for_class(&class) > 0);
        }
        // 年付应比季付贵，季付比月付贵
        assert!(
            stable_cents_for_class(&SubscriptionClass::RecurringYearly)
                > stable_cents_for_class(&SubscriptionClass::RecurringQuarterly)
        );
        assert!(
            stable_cents_for_class(&SubscriptionClass::RecurringQuarterly)
                > stable_cents_for_class(&SubscriptionClass::RecurringMonthly)
        );
    }
}
