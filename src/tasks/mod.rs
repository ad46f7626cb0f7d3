//! Background scheduled tasks for the application.
//!
//! This module centralizes all recurring background jobs (price-feed refresh
//! and the owner-profile lapse sweep). Call `spawn_all` once during startup
//! to launch them.

use crate::external::PriceFeedService;
use crate::services::OwnerService;

/// Spawn all background tasks.
///
/// Notes
/// - Each task is idempotent as implemented in its service and runs on its own schedule.
/// - This function detaches tasks via `tokio::spawn`; it does not block.
pub fn spawn_all(price_feed: PriceFeedService, owner_service: OwnerService, refresh_secs: u64) {
    // 定期刷新行情，保证报价用到的汇率和兜底值都尽量新鲜
    {
        let feed = price_feed.clone();
        tokio::spawn(async move {
            loop {
                match feed.refresh().await {
                    Ok(rate) => log::debug!("Price feed refreshed: {rate} USD per native unit"),
                    Err(e) => log::warn!("Failed to refresh price feed: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(refresh_secs.max(10))).await;
            }
        });
    }

    // 画像缓存过期翻转（每 10 分钟）。只修读侧缓存，不动订阅表。
    {
        let svc = owner_service.clone();
        tokio::spawn(async move {
            loop {
                match svc.sweep_lapsed().await {
                    Ok(n) if n > 0 => log::info!("Lapsed owner profiles swept: {n}"),
                    Ok(_) => {}
                    Err(e) => log::error!("Failed to sweep lapsed owner profiles: {e:?}"),
                }
                tokio::time::sleep(std::time::Duration::from_secs(600)).await;
            }
        });
    }
}
