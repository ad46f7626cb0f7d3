use crate::models::*;
use crate::services::{PointsService, TelegramLinkService};
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/admin/telegram/link-token",
    tag = "admin",
    request_body = IssueLinkTokenRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "签发绑定令牌成功", body = IssueLinkTokenResponse),
        (status = 403, description = "API key 无效")
    )
)]
pub async fn issue_link_token(
    telegram_service: web::Data<TelegramLinkService>,
    request: web::Json<IssueLinkTokenRequest>,
) -> Result<HttpResponse> {
    match telegram_service.issue_link_token(&request.owner_key).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/telegram/redeem",
    tag = "admin",
    request_body = RedeemLinkTokenRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "绑定成功", body = RedeemLinkTokenResponse),
        (status = 404, description = "令牌不存在或已过期"),
        (status = 409, description = "该 Telegram 账号已绑定其他钱包")
    )
)]
pub async fn redeem_link_token(
    telegram_service: web::Data<TelegramLinkService>,
    request: web::Json<RedeemLinkTokenRequest>,
) -> Result<HttpResponse> {
    match telegram_service.redeem_link_token(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/admin/telegram/gate",
    tag = "admin",
    params(
        ("telegram_user_id" = i64, Query, description = "Telegram 用户 ID")
    ),
    security(("api_key" = [])),
    responses(
        (status = 200, description = "门禁检查结果", body = GateCheckResponse)
    )
)]
pub async fn gate_check(
    telegram_service: web::Data<TelegramLinkService>,
    query: web::Query<GateCheckQuery>,
) -> Result<HttpResponse> {
    match telegram_service.gate_check(query.telegram_user_id).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/admin/points/adjust",
    tag = "admin",
    request_body = AdjustPointsRequest,
    security(("api_key" = [])),
    responses(
        (status = 200, description = "调账成功", body = PointsEntryResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn adjust_points(
    points_service: web::Data<PointsService>,
    request: web::Json<AdjustPointsRequest>,
) -> Result<HttpResponse> {
    match points_service.adjust(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn admin_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/admin")
            .route("/telegram/link-token", web::post().to(issue_link_token))
            .route("/telegram/redeem", web::post().to(redeem_link_token))
            .route("/telegram/gate", web::get().to(gate_check))
            .route("/points/adjust", web::post().to(adjust_points)),
    );
}
