use crate::config::PriceFeedConfig;
use crate::error::AppResult;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use utoipa::ToSchema;

/// 报价汇率的来源：实时行情或最后一次成功的行情
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Live,
    Fallback,
}

#[derive(Debug, Clone)]
struct LastGoodRate {
    rate: f64,
    fetched_at: DateTime<Utc>,
}

/// 行情服务：从 CoinGecko 拉取原生币的 USD 价格。
/// 上游失败时回退到最后一次成功的行情，报价接口因此永不对外报 502。
#[derive(Clone)]
pub struct PriceFeedService {
    client: Client,
    config: PriceFeedConfig,
    last_good: Arc<RwLock<Option<LastGoodRate>>>,
}

impl PriceFeedService {
    pub fn new(config: PriceFeedConfig) -> Self {
        Self {
            client: Client::new(),
            config,
            last_good: Arc::new(RwLock::new(None)),
        }
    }

    /// 拉取实时汇率并写入缓存，后台刷新任务定期调用
    pub async fn refresh(&self) -> AppResult<f64> {
        let rate = self.fetch_live().await?;

        let mut guard = self.last_good.write().unwrap_or_else(|e| e.into_inner());
        *guard = Some(LastGoodRate {
            rate,
            fetched_at: Utc::now(),
        });

        Ok(rate)
    }

    /// 取报价用的汇率。缓存新鲜直接用，否则现拉一次；
    /// 上游挂了就退回最后一次成功值（没有历史值时用配置兜底价）。
    pub async fn usd_rate(&self) -> (f64, RateSource) {
        let ttl = Duration::seconds(self.config.quote_ttl_secs as i64);

        if let Some(last) = self.cached()
            && Utc::now() - last.fetched_at < ttl
        {
            return (last.rate, RateSource::Live);
        }

        match self.refresh().await {
            Ok(rate) => (rate, RateSource::Live),
            Err(e) => {
                log::warn!("行情拉取失败，使用兜底汇率: {}", e);
                match self.cached() {
                    Some(last) => (last.rate, RateSource::Fallback),
                    None => (self.config.fallback_usd_per_native, RateSource::Fallback),
                }
            }
        }
    }

    pub fn quote_valid_until(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.config.quote_ttl_secs as i64)
    }

    fn cached(&self) -> Option<LastGoodRate> {
        self.last_good
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    async fn fetch_live(&self) -> AppResult<f64> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.config.base_url, self.config.asset_id
        );

        let response = self.client.get(&url).send().await?;
        let body: HashMap<String, HashMap<String, f64>> = response.json().await?;

        body.get(&self.config.asset_id)
            .and_then(|quotes| quotes.get("usd"))
            .copied()
            .ok_or_else(|| {
                crate::error::AppError::UpstreamError(format!(
                    "行情响应缺少 {} 的 usd 报价",
                    self.config.asset_id
                ))
            })
    }
}

/// 把美分金额换算成 lamports，向上取整保证不少收
pub fn native_lamports_for_cents(stable_cents: i64, usd_per_native: f64) -> i64 {
    if usd_per_native <= 0.0 {
        return 0;
    }
    let usd = stable_cents as f64 / 100.0;
    (usd / usd_per_native * 1_000_000_000.0).ceil() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_lamports_exact() {
        // $9.99 @ $150/SOL = 0.0666 SOL
        assert_eq!(native_lamports_for_cents(999, 150.0), 66_600_000);
    }

    #[test]
    fn test_native_lamports_rounds_up() {
        // $10.00 @ $151 = 0.06622516... SOL，向上取整
        let lamports = native_lamports_for_cents(1000, 151.0);
        assert_eq!(lamports, 66_225_166);
        assert!(lamports as f64 / 1e9 * 151.0 >= 10.0);
    }

    #[test]
    fn test_native_lamports_zero_rate_guard() {
        assert_eq!(native_lamports_for_cents(999, 0.0), 0);
        assert_eq!(native_lamports_for_cents(999, -1.0), 0);
    }

    #[test]
    fn test_rate_source_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&RateSource::Fallback).unwrap(),
            "\"fallback\""
        );
    }
}
