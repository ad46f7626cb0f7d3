pub mod memory;

pub use memory::MemoryTokenStore;

use chrono::{DateTime, Utc};

/// 一次性 Telegram 绑定令牌
#[derive(Debug, Clone)]
pub struct LinkToken {
    pub token: String,
    pub owner_key: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl LinkToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// 短效令牌存储。过期令牌视同不存在，由实现自行回收。
pub trait TokenStore: Send + Sync {
    /// 写入令牌，同一 token 重复写入直接覆盖
    fn put(&self, token: LinkToken);

    /// 按 token 查询，过期的不返回
    fn get(&self, token: &str) -> Option<LinkToken>;

    /// 删除并返回令牌（兑换是一次性的）
    fn delete(&self, token: &str) -> Option<LinkToken>;

    /// 列出某个钱包当前有效的全部令牌
    fn list_by_owner(&self, owner_key: &str) -> Vec<LinkToken>;
}
