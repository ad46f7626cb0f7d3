use crate::models::*;
use crate::services::PointsService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/points/balance",
    tag = "points",
    params(
        ("owner_key" = String, Query, description = "钱包地址")
    ),
    responses(
        (status = 200, description = "获取积分余额成功", body = PointsBalanceResponse),
        (status = 404, description = "owner 不存在")
    )
)]
pub async fn get_balance(
    points_service: web::Data<PointsService>,
    query: web::Query<OwnerProfileQuery>,
) -> Result<HttpResponse> {
    match points_service.balance(&query.owner_key).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/points/history",
    tag = "points",
    params(
        ("owner_key" = String, Query, description = "钱包地址"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("page_size" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取积分流水成功")
    )
)]
pub async fn get_history(
    points_service: web::Data<PointsService>,
    query: web::Query<PointsHistoryQuery>,
) -> Result<HttpResponse> {
    let params = PaginationParams::new(query.page, query.page_size);
    match points_service.history(&query.owner_key, &params).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/points/redeem",
    tag = "points",
    request_body = RedeemPointsRequest,
    responses(
        (status = 200, description = "积分消费成功", body = PointsEntryResponse),
        (status = 400, description = "余额不足或参数错误")
    )
)]
pub async fn redeem_points(
    points_service: web::Data<PointsService>,
    request: web::Json<RedeemPointsRequest>,
) -> Result<HttpResponse> {
    match points_service.redeem(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn points_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/points")
            .route("/balance", web::get().to(get_balance))
            .route("/history", web::get().to(get_history))
            .route("/redeem", web::post().to(redeem_points)),
    );
}
