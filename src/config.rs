use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub price_feed: PriceFeedConfig,
    #[serde(default)]
    pub chain: ChainConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub admin: AdminConfig,
    #[serde(default)]
    pub referral: ReferralConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceFeedConfig {
    pub base_url: String,
    /// 行情接口里原生资产的标识（如 coingecko 的 "solana"）
    pub asset_id: String,
    pub quote_ttl_secs: i64,
    pub refresh_secs: u64,
    /// 行情不可用时的兜底汇率（USD / 原生币）
    pub fallback_usd_per_native: f64,
}

impl Default for PriceFeedConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            asset_id: "solana".to_string(),
            quote_ttl_secs: 60,
            refresh_secs: 60,
            fallback_usd_per_native: 150.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub rpc_url: String,
    /// 支付确认所需的确认级别: processed | confirmed | finalized
    pub commitment: String,
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            rpc_url: "https://api.mainnet-beta.solana.com".to_string(),
            commitment: "confirmed".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub link_token_ttl_secs: i64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            link_token_ttl_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AdminConfig {
    /// 空字符串表示禁用 admin 接口（全部拒绝）
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferralConfig {
    /// 被推荐人首次开通订阅时，推荐人获得的积分
    pub conversion_points: i64,
}

impl Default for ReferralConfig {
    fn default() -> Self {
        Self {
            conversion_points: 500,
        }
    }
}

impl Config {
    pub fn from_toml() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
        use std::io::ErrorKind;

        // 尝试读取配置文件，如果不存在则完全依赖环境变量
        let config_result = std::fs::read_to_string(&config_path);

        let mut config: Config = match config_result {
            Ok(config_str) => {
                // 有配置文件：先解析再用环境变量覆盖
                toml::from_str(&config_str)
                    .with_context(|| format!("failed to parse config file {config_path}"))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                // 无配置文件：使用环境变量与默认值构建
                fn get_env(name: &str) -> Option<String> {
                    env::var(name).ok()
                }
                fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
                    env::var(name)
                        .ok()
                        .and_then(|v| v.parse::<T>().ok())
                        .unwrap_or(default)
                }

                // 数据库 URL 在无配置文件时必须提供
                let database_url = get_env("DATABASE_URL").with_context(|| {
                    format!("DATABASE_URL not set and config file {config_path} not found")
                })?;

                Config {
                    server: ServerConfig {
                        host: get_env("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                        port: get_env_parse("SERVER_PORT", 8080u16),
                    },
                    database: DatabaseConfig {
                        url: database_url,
                        max_connections: get_env_parse("DB_MAX_CONNECTIONS", 10u32),
                    },
                    price_feed: PriceFeedConfig::default(),
                    chain: ChainConfig::default(),
                    telegram: TelegramConfig::default(),
                    admin: AdminConfig::default(),
                    referral: ReferralConfig::default(),
                }
            }
            Err(e) => {
                return Err(anyhow::anyhow!("failed to read config file {config_path}: {e}"));
            }
        };

        // 环境变量覆盖（即便文件存在时也覆盖）
        if let Ok(v) = env::var("SERVER_HOST") {
            config.server.host = v;
        }
        if let Ok(v) = env::var("SERVER_PORT")
            && let Ok(p) = v.parse()
        {
            config.server.port = p;
        }
        if let Ok(v) = env::var("DATABASE_URL") {
            config.database.url = v;
        }
        if let Ok(v) = env::var("DB_MAX_CONNECTIONS")
            && let Ok(mc) = v.parse()
        {
            config.database.max_connections = mc;
        }
        if let Ok(v) = env::var("PRICE_FEED_BASE_URL") {
            config.price_feed.base_url = v;
        }
        if let Ok(v) = env::var("PRICE_FEED_ASSET_ID") {
            config.price_feed.asset_id = v;
        }
        if let Ok(v) = env::var("PRICE_FEED_QUOTE_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.price_feed.quote_ttl_secs = n;
        }
        if let Ok(v) = env::var("PRICE_FEED_REFRESH_SECS")
            && let Ok(n) = v.parse()
        {
            config.price_feed.refresh_secs = n;
        }
        if let Ok(v) = env::var("PRICE_FEED_FALLBACK_USD_PER_NATIVE")
            && let Ok(n) = v.parse()
        {
            config.price_feed.fallback_usd_per_native = n;
        }
        if let Ok(v) = env::var("CHAIN_RPC_URL") {
            config.chain.rpc_url = v;
        }
        if let Ok(v) = env::var("CHAIN_COMMITMENT") {
            config.chain.commitment = v;
        }
        if let Ok(v) = env::var("TELEGRAM_LINK_TOKEN_TTL_SECS")
            && let Ok(n) = v.parse()
        {
            config.telegram.link_token_ttl_secs = n;
        }
        if let Ok(v) = env::var("ADMIN_API_KEY") {
            config.admin.api_key = v;
        }
        if let Ok(v) = env::var("REFERRAL_CONVERSION_POINTS")
            && let Ok(n) = v.parse()
        {
            config.referral.conversion_points = n;
        }

        Ok(config)
    }
}
