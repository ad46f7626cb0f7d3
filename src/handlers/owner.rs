use crate::models::*;
use crate::services::OwnerService;
use actix_web::{HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/owner/profile",
    tag = "owner",
    params(
        ("owner_key" = String, Query, description = "钱包地址")
    ),
    responses(
        (status = 200, description = "获取画像成功", body = OwnerProfileResponse),
        (status = 404, description = "owner 不存在")
    )
)]
pub async fn get_profile(
    owner_service: web::Data<OwnerService>,
    query: web::Query<OwnerProfileQuery>,
) -> Result<HttpResponse> {
    match owner_service.get_profile(&query.owner_key).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ApiResponse::success(response))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn owner_config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/owner").route("/profile", web::get().to(get_profile)));
}
