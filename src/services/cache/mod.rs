use crate::error::CacheError;
use crate::models::RecommendationResponse;
use async_trait::async_trait;
use dashmap::DashMap;
use redis::AsyncCommands;

/// Last computed recommendation payload per canonical identity.
///
/// Entries are overwritten on every recomputation, never merged.
#[async_trait]
pub trait ResultCache: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<RecommendationResponse>, CacheError>;
    async fn put(&self, id: &str, payload: &RecommendationResponse) -> Result<(), CacheError>;
}

pub fn cache_key(id: &str) -> String {
    format!("recommendation:{}", id)
}

pub struct RedisResultCache {
    client: redis::Client,
    ttl_seconds: u64,
}

impl RedisResultCache {
    pub fn new(url: &str, ttl_seconds: u64) -> Result<Self, CacheError> {
        Ok(Self {
            client: redis::Client::open(url)?,
            ttl_seconds,
        })
    }
}

#[async_trait]
impl ResultCache for RedisResultCache {
    async fn get(&self, id: &str) -> Result<Option<RecommendationResponse>, CacheError> {
        let mut conn = self.client.get_async_connection().await?;
        let cached: Option<String> = conn.get(cache_key(id)).await?;
        match cached {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, id: &str, payload: &RecommendationResponse) -> Result<(), CacheError> {
        let mut conn = self.client.get_async_connection().await?;
        let payload_json = serde_json::to_string(payload)?;
        if self.ttl_seconds > 0 {
            let _: () = conn.set_ex(cache_key(id), payload_json, self.ttl_seconds).await?;
        } else {
            let _: () = conn.set(cache_key(id), payload_json).await?;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryResultCache {
    entries: DashMap<String, RecommendationResponse>,
}

impl InMemoryResultCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ResultCache for InMemoryResultCache {
    async fn get(&self, id: &str) -> Result<Option<RecommendationResponse>, CacheError> {
        Ok(self.entries.get(id).map(|entry| entry.value().clone()))
    }

    async fn put(&self, id: &str, payload: &RecommendationResponse) -> Result<(), CacheError> {
        self.entries.insert(id.to_string(), payload.clone());
        Ok(())
    }
}
