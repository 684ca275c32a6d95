//! Best-effort cache layer backed by Redis
//!
//! The cache is an optimization, never a source of truth: every operation
//! swallows its own failures (logging at `warn`) so a dead Redis can never
//! fail a request. Services receive the cache as an injected
//! `Arc<dyn Cache>`; there is no process-wide singleton.

use std::time::Duration;

use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use serde::{de::DeserializeOwned, Serialize};

/// Pattern covering all cached daily sales reports
pub const DAILY_SALES_REPORT_PATTERN: &str = "daily_sales_report:*";

/// Pattern covering all cached top-selling-items reports
pub const TOP_SELLING_ITEMS_PATTERN: &str = "top_selling_items:*";

/// Object-safe cache operations over JSON payloads
#[async_trait]
pub trait Cache: Send + Sync {
    /// Fetch a raw JSON value; `None` on miss or any backend failure
    async fn get_json(&self, key: &str) -> Option<serde_json::Value>;

    /// Store a JSON value with a TTL; failures are logged and swallowed
    async fn set_json(&self, key: &str, value: serde_json::Value, ttl: Duration);

    /// Drop a single key
    async fn delete(&self, key: &str);

    /// Drop every key matching a glob pattern
    async fn delete_pattern(&self, pattern: &str);
}

impl dyn Cache {
    /// Typed read-through helper
    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.get_json(key).await?;
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                tracing::warn!("Cache deserialization failed for {}: {}", key, e);
                None
            }
        }
    }

    /// Typed write-through helper
    pub async fn set<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        match serde_json::to_value(value) {
            Ok(v) => self.set_json(key, v, ttl).await,
            Err(e) => tracing::warn!("Cache serialization failed for {}: {}", key, e),
        }
    }
}

/// Redis-backed cache
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Connect to Redis and return a cache handle
    pub async fn connect(url: &str) -> anyhow::Result<Self> {
        let client = redis::Client::open(url)?;
        let manager = client.get_connection_manager().await?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get_json(&self, key: &str) -> Option<serde_json::Value> {
        let mut conn = self.manager.clone();
        let raw: Option<String> = match conn.get(key).await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!("Cache get failed for {}: {}", key, e);
                return None;
            }
        };
        raw.and_then(|s| serde_json::from_str(&s).ok())
    }

    async fn set_json(&self, key: &str, value: serde_json::Value, ttl: Duration) {
        let mut conn = self.manager.clone();
        let result: redis::RedisResult<()> =
            conn.set_ex(key, value.to_string(), ttl.as_secs()).await;
        if let Err(e) = result {
            tracing::warn!("Cache set failed for {}: {}", key, e);
        }
    }

    async fn delete(&self, key: &str) {
        let mut conn = self.manager.clone();
        let result: redis::RedisResult<()> = conn.del(key).await;
        if let Err(e) = result {
            tracing::warn!("Cache delete failed for {}: {}", key, e);
        }
    }

    async fn delete_pattern(&self, pattern: &str) {
        let mut conn = self.manager.clone();
        let keys: Vec<String> = match conn.keys(pattern).await {
            Ok(keys) => keys,
            Err(e) => {
                tracing::warn!("Cache key scan failed for {}: {}", pattern, e);
                return;
            }
        };
        for key in keys {
            let result: redis::RedisResult<()> = conn.del(&key).await;
            if let Err(e) = result {
                tracing::warn!("Cache delete failed for {}: {}", key, e);
            }
        }
    }
}

/// No-op cache used when no Redis URL is configured and in tests
#[derive(Clone, Default)]
pub struct NoopCache;

#[async_trait]
impl Cache for NoopCache {
    async fn get_json(&self, _key: &str) -> Option<serde_json::Value> {
        None
    }

    async fn set_json(&self, _key: &str, _value: serde_json::Value, _ttl: Duration) {}

    async fn delete(&self, _key: &str) {}

    async fn delete_pattern(&self, _pattern: &str) {}
}
