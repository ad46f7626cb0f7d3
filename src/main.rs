use actix_web::{App, HttpServer, middleware::Logger, web};
use chrono::Local; // timestamp in log lines
use env_logger::{Env, Target};
use std::io::Write; // for env_logger custom formatter
use std::sync::Arc;

use tokengate_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    external::{ChainRpcService, PriceFeedService},
    handlers,
    middlewares::{AdminKeyMiddleware, create_cors},
    services::*,
    store::{MemoryTokenStore, TokenStore},
    swagger::swagger_config,
    tasks,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();

    // 加载配置
    let config = Config::from_toml().expect("Failed to load configuration file");

    // 创建数据库连接池
    let pool = create_pool(&config.database)
        .await
        .expect("Failed to create database connection pool");

    // 运行数据库迁移
    run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    // 创建外部服务
    let price_feed = PriceFeedService::new(config.price_feed.clone());
    let chain_service = ChainRpcService::new(config.chain.clone());

    // 进程内一次性令牌存储
    let token_store: Arc<dyn TokenStore> = Arc::new(MemoryTokenStore::new());

    // 创建服务
    let owner_service = OwnerService::new(pool.clone());
    let points_service = PointsService::new(pool.clone(), owner_service.clone());
    let referral_service = ReferralService::new(
        pool.clone(),
        config.referral.clone(),
        owner_service.clone(),
        points_service.clone(),
    );
    let subscription_service = SubscriptionService::new(
        pool.clone(),
        chain_service.clone(),
        price_feed.clone(),
        owner_service.clone(),
        referral_service.clone(),
    );
    let telegram_service = TelegramLinkService::new(
        pool.clone(),
        config.telegram.clone(),
        token_store,
        owner_service.clone(),
    );

    // 启动后台任务（行情刷新、画像过期翻转）
    tasks::spawn_all(
        price_feed.clone(),
        owner_service.clone(),
        config.price_feed.refresh_secs,
    );

    // 启动HTTP服务器
    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    let admin_api_key = config.admin.api_key.clone();

    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(owner_service.clone()))
            .app_data(web::Data::new(points_service.clone()))
            .app_data(web::Data::new(referral_service.clone()))
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(web::Data::new(telegram_service.clone()))
            .configure(swagger_config)
            .service(
                web::scope("/api/v1")
                    .configure(handlers::subscription_config)
                    .configure(handlers::owner_config)
                    .configure(handlers::referral_config)
                    .configure(handlers::points_config)
                    .service(
                        web::scope("")
                            .wrap(AdminKeyMiddleware::new(admin_api_key.clone()))
                            .configure(handlers::admin_config),
                    ),
            )
    })
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await
}
