//! # Redis
//!
//! Read-through cache for the expensive list/detail queries, plus the
//! rate-limit counters.
//!
//! Keys are namespaced `{entity}:{params}`. List and search keys are
//! parameterized (page, limit, query string) and cannot be derived from
//! a written document id, so any write to a product — or to media
//! embedded in a cached product view — drops the whole `products:*` and
//! `search:*` namespaces. The policy is invalidate-then-ignore: a miss
//! after invalidation simply repopulates on the next read, and a reader
//! racing a writer may see the old view for at most the TTL.

use std::time::Duration;

use redis::{
    aio::{ConnectionManager, ConnectionManagerConfig},
    AsyncCommands, Client,
};
use tracing::info;

use super::error::AppError;

/// Product list pages, per-user carts and search results go stale fast.
pub const LIST_TTL_SECS: u64 = 300;
/// A single product document changes rarely; writes invalidate anyway.
pub const DETAIL_TTL_SECS: u64 = 3600;

pub const PRODUCTS_NS: &str = "products";
pub const SEARCH_NS: &str = "search";
pub const CARTS_NS: &str = "carts";

pub async fn init_redis(redis_url: &str) -> ConnectionManager {
    let config = ConnectionManagerConfig::new()
        .set_number_of_retries(1)
        .set_connection_timeout(Duration::from_millis(100));

    let client = Client::open(redis_url).expect("Redis misconfigured!");
    let connection_manager = client
        .get_connection_manager_with_config(config)
        .await
        .expect("Redis unreachable!");

    info!("Connected to Redis");

    connection_manager
}

#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
}

impl Cache {
    pub fn new(conn: ConnectionManager) -> Self {
        Self { conn }
    }

    /// Raw handle for non-cache uses of the same connection (rate-limit
    /// counters).
    pub fn connection(&self) -> ConnectionManager {
        self.conn.clone()
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.conn.clone();
        Ok(conn.get(key).await?)
    }

    pub async fn put(&self, key: &str, value: &str, ttl_secs: u64) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    pub async fn invalidate(&self, key: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    /// Drops every key under `{namespace}:*`. SCAN rather than KEYS so a
    /// large keyspace does not stall the server.
    pub async fn invalidate_namespace(&self, namespace: &str) -> Result<(), AppError> {
        let mut conn = self.conn.clone();

        let keys: Vec<String> = {
            let mut iter = conn.scan_match(namespace_pattern(namespace)).await?;
            let mut keys = Vec::new();
            while let Some(key) = iter.next_item().await {
                keys.push(key);
            }
            keys
        };

        if !keys.is_empty() {
            let _: () = conn.del(keys).await?;
        }

        Ok(())
    }
}

pub fn namespace_pattern(namespace: &str) -> String {
    format!("{namespace}:*")
}

pub fn product_list_key(page: u64, limit: u64) -> String {
    format!("{PRODUCTS_NS}:{page}:{limit}")
}

pub fn product_key(id: &str) -> String {
    format!("{PRODUCTS_NS}:{id}")
}

pub fn cart_key(user_id: &str) -> String {
    format!("{CARTS_NS}:{user_id}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_keys_are_parameterized_by_page_and_limit() {
        assert_eq!(product_list_key(1, 10), "products:1:10");
        assert_eq!(product_list_key(3, 25), "products:3:25");
    }

    #[test]
    fn detail_and_list_keys_share_the_product_namespace() {
        let detail = product_key("64f000000000000000000001");
        let list = product_list_key(2, 10);

        let pattern = namespace_pattern(PRODUCTS_NS);
        let prefix = pattern.trim_end_matches('*');

        assert!(detail.starts_with(prefix));
        assert!(list.starts_with(prefix));
    }

    #[test]
    fn cart_keys_are_scoped_per_user() {
        assert_eq!(cart_key("abc"), "carts:abc");
        assert_ne!(cart_key("abc"), cart_key("abd"));
    }
}
