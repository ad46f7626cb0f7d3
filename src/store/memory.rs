use super::{LinkToken, TokenStore};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;

/// 进程内令牌存储，绑定令牌只有几分钟寿命，不需要落库。
#[derive(Default)]
pub struct MemoryTokenStore {
    inner: Mutex<HashMap<String, LinkToken>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn put(&self, token: LinkToken) {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        // 顺手回收已过期的条目，避免 map 无限增长
        let now = Utc::now();
        map.retain(|_, t| !t.is_expired(now));
        map.insert(token.token.clone(), token);
    }

    fn get(&self, token: &str) -> Option<LinkToken> {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.get(token).filter(|t| !t.is_expired(Utc::now())).cloned()
    }

    fn delete(&self, token: &str) -> Option<LinkToken> {
        let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        map.remove(token).filter(|t| !t.is_expired(Utc::now()))
    }

    fn list_by_owner(&self, owner_key: &str) -> Vec<LinkToken> {
        let map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let now = Utc::now();
        map.values()
            .filter(|t| t.owner_key == owner_key && !t.is_expired(now))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token(token: &str, owner: &str, ttl_secs: i64) -> LinkToken {
        let now = Utc::now();
        LinkToken {
            token: token.to_string(),
            owner_key: owner.to_string(),
            issued_at: now,
            expires_at: now + Duration::seconds(ttl_secs),
        }
    }

    #[test]
    fn test_put_get_roundtrip() {
        let store = MemoryTokenStore::new();
        store.put(token("abc", "owner1", 600));

        let found = store.get("abc").unwrap();
        assert_eq!(found.owner_key, "owner1");
        assert!(store.get("missing").is_none());
    }

    #[test]
    fn test_expired_token_is_invisible() {
        let store = MemoryTokenStore::new();
        store.put(token("stale", "owner1", -1));

        assert!(store.get("stale").is_none());
        assert!(store.delete("stale").is_none());
    }

    #[test]
    fn test_delete_is_one_time() {
        let store = MemoryTokenStore::new();
        store.put(token("once", "owner1", 600));

        assert!(store.delete("once").is_some());
        assert!(store.delete("once").is_none());
        assert!(store.get("once").is_none());
    }

    #[test]
    fn test_list_by_owner_filters() {
        let store = MemoryTokenStore::new();
        store.put(token("a", "owner1", 600));
        store.put(token("b", "owner1", 600));
        store.put(token("c", "owner2", 600));
        store.put(token("d", "owner1", -1));

        let tokens = store.list_by_owner("owner1");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.iter().all(|t| t.owner_key == "owner1"));
    }

    #[test]
    fn test_put_overwrites_same_token() {
        let store = MemoryTokenStore::new();
        store.put(token("dup", "owner1", 600));
        store.put(token("dup", "owner2", 600));

        let found = store.get("dup").unwrap();
        assert_eq!(found.owner_key, "owner2");
    }
}
