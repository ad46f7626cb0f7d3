use crate::config::ReferralConfig;
use crate::entities::{
    PointsEntryType, owner_entity as owners, points_ledger_entity as ledger,
    referral_click_entity as clicks,
};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::{OwnerService, PointsService};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QuerySelect, Set,
};

#[derive(Clone)]
pub struct ReferralService {
    pool: DatabaseConnection,
    config: ReferralConfig,
    owner_service: OwnerService,
    points_service: PointsService,
}

impl ReferralService {
    pub fn new(
        pool: DatabaseConnection,
        config: ReferralConfig,
        owner_service: OwnerService,
        points_service: PointsService,
    ) -> Self {
        Self {
            pool,
            config,
            owner_service,
            points_service,
        }
    }

    async fn find_referrer_by_code(&self, code: &str) -> AppResult<Option<owners::Model>> {
        Ok(owners::Entity::find()
            .filter(owners::Column::ReferralCode.eq(code.to_string()))
            .one(&self.pool)
            .await?)
    }

    /// 记录推荐链接点击。(code, session) 唯一，同一会话重复点击不重复计数。
    pub async fn record_click(&self, req: RecordClickRequest) -> AppResult<RecordClickResponse> {
        if req.referral_code.is_empty() || req.visitor_session.is_empty() {
            return Err(AppError::ValidationError(
                "referral_code 与 visitor_session 不能为空".to_string(),
            ));
        }
        if self.find_referrer_by_code(&req.referral_code).await?.is_none() {
            return Err(AppError::NotFound("推荐码不存在".to_string()));
        }

        let model = clicks::ActiveModel {
            referral_code: Set(req.referral_code),
            visitor_session: Set(req.visitor_session),
            converted: Set(false),
            ..Default::default()
        };

        match model.insert(&self.pool).await {
            Ok(_) => Ok(RecordClickResponse { recorded: true }),
            // 重复点击静默去重
            Err(e) if matches!(e.sql_err(), Some(sea_orm::SqlErr::UniqueConstraintViolation(_))) => {
                Ok(RecordClickResponse { recorded: false })
            }
            Err(e) => Err(AppError::DatabaseError(e)),
        }
    }

    /// 推荐归因：首触生效，绑过一次不再改；禁止自推。
    pub async fn attribute(
        &self,
        req: AttributeReferralRequest,
    ) -> AppResult<AttributeReferralResponse> {
        let referrer = self
            .find_referrer_by_code(&req.referral_code)
            .await?
            .ok_or_else(|| AppError::NotFound("推荐码不存在".to_string()))?;

        if referrer.owner_key == req.owner_key {
            return Err(AppError::ValidationError("不能使用自己的推荐码".to_string()));
        }

        let owner = self.owner_service.ensure_owner(&req.owner_key).await?;
        if owner.referred_by.is_some() {
            return Ok(AttributeReferralResponse {
                attributed: false,
                referrer_key: None,
            });
        }

        let referrer_id = referrer.id;
        let referrer_key = referrer.owner_key.clone();
        let mut am = owner.into_active_model();
        am.referred_by = Set(Some(referrer_id));
        am.update(&self.pool).await?;

        // 顺带把这条会话的点击标记为已注册（没有对应点击行也没关系）
        if let Some(session) = req.visitor_session {
            let _ = clicks::Entity::update_many()
                .col_expr(clicks::Column::ConvertedOwnerKey, Expr::value(req.owner_key))
                .filter(clicks::Column::ReferralCode.eq(req.referral_code))
                .filter(clicks::Column::VisitorSession.eq(session))
                .exec(&self.pool)
                .await?;
        }

        Ok(AttributeReferralResponse {
            attributed: true,
            referrer_key: Some(referrer_key),
        })
    }

    /// 被推荐人首次激活订阅时给推荐人发积分。
    /// 以「每个被推荐人只发一次」为幂等边界：流水 reference 记的是被推荐人地址。
    pub async fn award_conversion(&self, owner_key: &str, payment_proof: &str) -> AppResult<()> {
        let owner = match self.owner_service.find_by_key(owner_key).await? {
            Some(o) => o,
            None => return Ok(()),
        };
        let Some(referrer_id) = owner.referred_by else {
            return Ok(());
        };
        let Some(referrer) = owners::Entity::find_by_id(referrer_id).one(&self.pool).await? else {
            return Ok(());
        };

        let already = ledger::Entity::find()
            .filter(ledger::Column::OwnerKey.eq(referrer.owner_key.clone()))
            .filter(ledger::Column::EntryType.eq(PointsEntryType::ReferralConversion))
            .filter(ledger::Column::Reference.eq(owner_key.to_string()))
            .count(&self.pool)
            .await?;
        if already > 0 {
            return Ok(());
        }

        self.points_service
            .append(
                &referrer.owner_key,
                PointsEntryType::ReferralConversion,
                self.config.conversion_points,
                Some(owner_key.to_string()),
                Some(format!("推荐转化，支付凭证 {payment_proof}")),
            )
            .await?;

        // 该被推荐人名下的点击行翻成已转化
        let _ = clicks::Entity::update_many()
            .col_expr(clicks::Column::Converted, Expr::value(true))
            .filter(clicks::Column::ConvertedOwnerKey.eq(owner_key.to_string()))
            .exec(&self.pool)
            .await?;

        Ok(())
    }

    /// 推荐战绩：点击数、注册数、转化数、累计积分
    pub async fn stats(&self, owner_key: &str) -> AppResult<ReferralStatsResponse> {
        let owner = self
            .owner_service
            .find_by_key(owner_key)
            .await?
            .ok_or_else(|| AppError::NotFound("owner 不存在".to_string()))?;
        let code = owner
            .referral_code
            .clone()
            .ok_or_else(|| AppError::NotFound("该 owner 尚未分配推荐码".to_string()))?;

        let total_clicks = clicks::Entity::find()
            .filter(clicks::Column::ReferralCode.eq(code.clone()))
            .count(&self.pool)
            .await? as i64;
        let total_signups = owners::Entity::find()
            .filter(owners::Column::ReferredBy.eq(owner.id))
            .count(&self.pool)
            .await? as i64;
        let total_conversions = ledger::Entity::find()
            .filter(ledger::Column::OwnerKey.eq(owner_key.to_string()))
            .filter(ledger::Column::EntryType.eq(PointsEntryType::ReferralConversion))
            .count(&self.pool)
            .await? as i64;

        #[derive(Debug, sea_orm::FromQueryResult)]
        struct SumRow {
            total: Option<i64>,
        }
        let points_earned = ledger::Entity::find()
            .filter(ledger::Column::OwnerKey.eq(owner_key.to_string()))
            .filter(ledger::Column::EntryType.eq(PointsEntryType::ReferralConversion))
            .select_only()
            .column_as(Expr::col(ledger::Column::DeltaPoints).sum(), "total")
            .into_model::<SumRow>()
            .one(&self.pool)
            .await?
            .and_then(|r| r.total)
            .unwrap_or(0);

        Ok(ReferralStatsResponse {
            referral_code: code,
            total_clicks,
            total_signups,
            total_conversions,
            points_earned,
        })
    }
}
