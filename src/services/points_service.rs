use crate::entities::{PointsEntryType, owner_entity as owners, points_ledger_entity as ledger};
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::services::OwnerService;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Set, TransactionTrait,
};

/// 扣分时余额必须至少有多少，加分不设门槛
pub fn min_balance_for(delta_points: i64) -> Option<i64> {
    if delta_points < 0 {
        Some(-delta_points)
    } else {
        None
    }
}

#[derive(Clone)]
pub struct PointsService {
    pool: DatabaseConnection,
    owner_service: OwnerService,
}

impl PointsService {
    pub fn new(pool: DatabaseConnection, owner_service: OwnerService) -> Self {
        Self {
            pool,
            owner_service,
        }
    }

    /// 记一笔流水并同步余额缓存，两者在同一事务里完成
    pub async fn append(
        &self,
        owner_key: &str,
        entry_type: PointsEntryType,
        delta_points: i64,
        reference: Option<String>,
        note: Option<String>,
    ) -> AppResult<PointsEntryResponse> {
        self.owner_service.ensure_owner(owner_key).await?;

        let txn = self.pool.begin().await?;

        let entry = ledger::ActiveModel {
            owner_key: Set(owner_key.to_string()),
            entry_type: Set(entry_type),
            delta_points: Set(delta_points),
            reference: Set(reference),
            note: Set(note),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        // 余额在库内原地累加，扣分时把余额下限拼进过滤条件，
        // 没改到行就说明余额不足，事务随之回滚
        let mut update = owners::Entity::update_many()
            .col_expr(
                owners::Column::PointsBalance,
                Expr::col(owners::Column::PointsBalance).add(delta_points),
            )
            .filter(owners::Column::OwnerKey.eq(owner_key.to_string()));
        if let Some(min_balance) = min_balance_for(delta_points) {
            update = update.filter(owners::Column::PointsBalance.gte(min_balance));
        }
        let result = update.exec(&txn).await?;
        if result.rows_affected == 0 {
            return Err(AppError::ValidationError("积分余额不足".to_string()));
        }

        txn.commit().await?;

        Ok(PointsEntryResponse::from(entry))
    }

    pub async fn balance(&self, owner_key: &str) -> AppResult<PointsBalanceResponse> {
        let owner = self
            .owner_service
            .find_by_key(owner_key)
            .await?
            .ok_or_else(|| AppError::NotFound("owner 不存在".to_string()))?;

        Ok(PointsBalanceResponse {
            owner_key: owner.owner_key,
            balance: owner.points_balance.unwrap_or(0),
        })
    }

    pub async fn history(
        &self,
        owner_key: &str,
        params: &PaginationParams,
    ) -> AppResult<PaginatedResponse<PointsEntryResponse>> {
        let total = ledger::Entity::find()
            .filter(ledger::Column::OwnerKey.eq(owner_key.to_string()))
            .count(&self.pool)
            .await? as i64;

        let models = ledger::Entity::find()
            .filter(ledger::Column::OwnerKey.eq(owner_key.to_string()))
            .order_by_desc(ledger::Column::CreatedAt)
            .limit(params.get_limit() as u64)
            .offset(params.get_offset() as u64)
            .all(&self.pool)
            .await?;
        let items: Vec<PointsEntryResponse> =
            models.into_iter().map(PointsEntryResponse::from).collect();

        Ok(PaginatedResponse::new(
            items,
            params.get_page(),
            params.get_page_size(),
            total,
        ))
    }

    /// 消费积分，余额不足直接拒绝
    pub async fn redeem(&self, req: RedeemPointsRequest) -> AppResult<PointsEntryResponse> {
        if req.points <= 0 {
            return Err(AppError::ValidationError(
                "points 必须为正整数".to_string(),
            ));
        }

        self.append(
            &req.owner_key,
            PointsEntryType::Redeem,
            -req.points,
            None,
            req.note,
        )
        .await
    }

    /// 管理端手工调账
    pub async fn adjust(&self, req: AdjustPointsRequest) -> AppResult<PointsEntryResponse> {
        if req.delta_points == 0 {
            return Err(AppError::ValidationError(
                "delta_points 不能为 0".to_string(),
            ));
        }

        self.append(
            &req.owner_key,
            PointsEntryType::AdminAdjust,
            req.delta_points,
            None,
            req.note,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_balance_for_debit_requires_cover() {
        assert_eq!(min_balance_for(-500), Some(500));
        assert_eq!(min_balance_for(-1), Some(1));
    }

    #[test]
    fn test_min_balance_for_credit_unrestricted() {
        assert_eq!(min_balance_for(100), None);
        assert_eq!(min_balance_for(0), None);
    }
}
