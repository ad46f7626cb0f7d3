use crate::models::*;
use crate::services::SubscriptionService;
use actix_web::{HttpResponse, ResponseError, Result, web};
use serde_json::json;

#[utoipa::path(
    get,
    path = "/subscription/quote",
    tag = "subscription",
    params(
        ("duration_days" = i32, Query, description = "订阅时长（天）"),
        ("is_recurring" = bool, Query, description = "是否自动续订")
    ),
    responses(
        (status = 200, description = "获取报价成功", body = SubscriptionQuoteResponse),
        (status = 400, description = "请求参数错误")
    )
)]
pub async fn get_quote(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionQuoteQuery>,
) -> Result<HttpResponse> {
    match subscription_service.quote(query.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/create",
    tag = "subscription",
    request_body = CreateSubscriptionRequest,
    responses(
        (status = 200, description = "创建待核销订阅成功", body = SubscriptionResponse),
        (status = 400, description = "请求参数错误"),
        (status = 409, description = "支付凭证已提交过")
    )
)]
pub async fn create_subscription(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<CreateSubscriptionRequest>,
) -> Result<HttpResponse> {
    match subscription_service.create_pending(request.into_inner()).await {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/verify",
    tag = "subscription",
    request_body = VerifySubscriptionRequest,
    responses(
        (status = 200, description = "核销成功（重复核销为幂等返回）", body = VerifySubscriptionResponse),
        (status = 400, description = "链上交易尚未确认"),
        (status = 404, description = "支付凭证不存在"),
        (status = 422, description = "订阅状态不允许核销"),
        (status = 502, description = "链上 RPC 不可用")
    )
)]
pub async fn verify_subscription(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<VerifySubscriptionRequest>,
) -> Result<HttpResponse> {
    match subscription_service
        .verify_and_extend(&request.payment_proof)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    post,
    path = "/subscription/manage",
    tag = "subscription",
    request_body = ManageSubscriptionRequest,
    responses(
        (status = 200, description = "管理操作成功"),
        (status = 404, description = "订阅不存在"),
        (status = 422, description = "当前状态不允许该操作")
    )
)]
pub async fn manage_subscription(
    subscription_service: web::Data<SubscriptionService>,
    request: web::Json<ManageSubscriptionRequest>,
) -> Result<HttpResponse> {
    // 动作是带 tag 的枚举，穷尽匹配，新动作漏写分发时编译期就会报错
    let result = match request.into_inner() {
        ManageSubscriptionRequest::Cancel { subscription_id } => subscription_service
            .cancel(subscription_id)
            .await
            .map(|sub| json!({"success": true, "data": sub})),
        ManageSubscriptionRequest::Update {
            subscription_id,
            new_duration_days,
            new_recurring,
        } => subscription_service
            .update(subscription_id, new_duration_days, new_recurring)
            .await
            .map(|sub| json!({"success": true, "data": sub})),
        ManageSubscriptionRequest::GetActive { owner_key } => subscription_service
            .get_active_recurring(&owner_key)
            .await
            .map(|sub| json!({"success": true, "data": sub})),
    };

    match result {
        Ok(body) => Ok(HttpResponse::Ok().json(body)),
        Err(e) => Ok(e.error_response()),
    }
}

#[utoipa::path(
    get,
    path = "/subscription/list",
    tag = "subscription",
    params(
        ("owner_key" = String, Query, description = "钱包地址"),
        ("page" = Option<u32>, Query, description = "页码"),
        ("page_size" = Option<u32>, Query, description = "每页数量")
    ),
    responses(
        (status = 200, description = "获取订阅历史成功")
    )
)]
pub async fn list_subscriptions(
    subscription_service: web::Data<SubscriptionService>,
    query: web::Query<SubscriptionListQuery>,
) -> Result<HttpResponse> {
    let params = PaginationParams::new(query.page, query.page_size);
    match subscription_service
        .list_subscriptions(&query.owner_key, &params)
        .await
    {
        Ok(response) => Ok(HttpResponse::Ok().json(json!({
            "success": true,
            "data": response
        }))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn subscription_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/subscription")
            .route("/quote", web::get().to(get_quote))
            .route("/create", web::post().to(create_subscription))
            .route("/verify", web::post().to(verify_subscription))
            .route("/manage", web::post().to(manage_subscription))
            .route("/list", web::get().to(list_subscriptions)),
    );
}
