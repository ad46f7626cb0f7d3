use actix_web::web;
use utoipa::OpenApi;
use utoipa::{
    Modify,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use crate::entities::{OwnerGateStatus, PointsEntryType, SubscriptionClass, SubscriptionStatus};
use crate::external::price_feed::RateSource;
use crate::handlers;
use crate::models::*;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.as_mut().unwrap();
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Api-Key"))),
        )
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::subscription::get_quote,
        handlers::subscription::create_subscription,
        handlers::subscription::verify_subscription,
        handlers::subscription::manage_subscription,
        handlers::subscription::list_subscriptions,
        handlers::owner::get_profile,
        handlers::referral::record_click,
        handlers::referral::attribute_referral,
        handlers::referral::get_referral_stats,
        handlers::points::get_balance,
        handlers::points::get_history,
        handlers::points::redeem_points,
        handlers::admin::issue_link_token,
        handlers::admin::redeem_link_token,
        handlers::admin::gate_check,
        handlers::admin::adjust_points,
    ),
    components(
        schemas(
            SubscriptionClass,
            SubscriptionStatus,
            OwnerGateStatus,
            PointsEntryType,
            RateSource,
            PriceInput,
            CreateSubscriptionRequest,
            SubscriptionResponse,
            VerifySubscriptionRequest,
            VerifySubscriptionResponse,
            ManageSubscriptionRequest,
            SubscriptionQuoteResponse,
            OwnerResponse,
            OwnerStatistics,
            OwnerProfileResponse,
            RecordClickRequest,
            RecordClickResponse,
            AttributeReferralRequest,
            AttributeReferralResponse,
            ReferralStatsResponse,
            PointsBalanceResponse,
            PointsEntryResponse,
            RedeemPointsRequest,
            AdjustPointsRequest,
            IssueLinkTokenRequest,
            IssueLinkTokenResponse,
            RedeemLinkTokenRequest,
            RedeemLinkTokenResponse,
            GateCheckResponse,
            ApiError,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "subscription", description = "Subscription lifecycle API"),
        (name = "owner", description = "Owner profile API"),
        (name = "referral", description = "Referral tracking API"),
        (name = "points", description = "Points ledger API"),
        (name = "admin", description = "Admin / Telegram bot API"),
    ),
    info(
        title = "TokenGate Backend API",
        version = "1.0.0",
        description = "Token-gated community backend REST API documentation"
    ),
    servers(
        (url = "/api/v1", description = "Local server")
    )
)]
pub struct ApiDoc;

pub fn swagger_config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
    )
    .route(
        "/swagger-ui",
        web::get().to(|| async {
            actix_web::HttpResponse::Found()
                .append_header(("Location", "/swagger-ui/"))
                .finish()
        }),
    );
}
