use crate::models::*;
use crate::services::ReferralService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    post,
    path = "/referral/click",
    tag = "referral",
    request_body = RecordClickRequest,
    responses(
        (status = 200, description = "点击记录成功（重复点击 recorded=false）", body = RecordClickResponse),
        (status = 404, description = "推荐码不存在")
    )
)]
pub async fn record_click(
    referral_service: web::Data<ReferralService>,
    request: web::Json<RecordClickRequest>,
) -> Result<HttpResponse> {
    match referral_service.record_click(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/referral/attribute",
    tag = "referral",
    request_body = AttributeReferralRequest,
    responses(
        (status = 200, description = "归因成功（已归因过 attributed=false）", body = AttributeReferralResponse),
        (status = 400, description = "不能使用自己的推荐码"),
        (status = 404, description = "推荐码不存在")
    )
)]
pub async fn attribute_referral(
    referral_service: web::Data<ReferralService>,
    request: web::Json<AttributeReferralRequest>,
) -> Result<HttpResponse> {
    match referral_service.attribute(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/referral/stats",
    tag = "referral",
    params(
        ("owner_key" = String, Query, description = "钱包地址")
    ),
    responses(
        (status = 200, description = "获取推荐统计成功", body = ReferralStatsResponse),
        (status = 404, description = "owner 不存在")
    )
)]
pub async fn get_referral_stats(
    referral_service: web::Data<ReferralService>,
    query: web::Query<ReferralStatsQuery>,
) -> Result<HttpResponse> {
    match referral_service.stats(&query.owner_key).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn referral_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/referral")
            .route("/click", web::post().to(record_click))
            .route("/attribute", web::post().to(attribute_referral))
            .route("/stats", web::get().to(get_referral_stats)),
    );
}
