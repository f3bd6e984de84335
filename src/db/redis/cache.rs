use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;

use crate::error::{AppError, AppResult};
use crate::models::MediaKind;

/// Key space for cached catalog responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Search(String),
    Details(u64, MediaKind),
    Providers(u64, MediaKind),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Search(query) => write!(f, "search:{}", query.to_lowercase()),
            CacheKey::Details(id, kind) => write!(f, "details:{}:{}", kind.as_path(), id),
            CacheKey::Providers(id, kind) => write!(f, "providers:{}:{}", kind.as_path(), id),
        }
    }
}

/// Creates a Redis client for caching and pointer storage
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Cache handler for storing and retrieving catalog data from Redis
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
}

impl Cache {
    pub fn new(redis_client: Client) -> Self {
        Self { redis_client }
    }

    /// Retrieves a value from the cache by key
    ///
    /// Returns the deserialized value when the key exists, `None` on a
    /// cache miss.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(format!("{}", key)).await?;

        match cached {
            Some(json) => {
                let data = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })?;
                Ok(Some(data))
            }
            None => Ok(None),
        }
    }

    /// Stores a value in the cache without blocking the caller
    ///
    /// The write runs on a spawned task; a failed write only costs the
    /// next lookup a cache miss, so failures are logged and dropped.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let client = self.redis_client.clone();
        let key = format!("{}", key);

        tokio::spawn(async move {
            let mut conn = match client.get_multiplexed_async_connection().await {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(error = %e, key = %key, "Cache connection failed");
                    return;
                }
            };
            let result: redis::RedisResult<()> = conn.set_ex(&key, json, ttl).await;
            if let Err(e) = result {
                tracing::error!(error = %e, key = %key, "Cache write failed");
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_search_lowercases() {
        let key = CacheKey::Search("The Matrix".to_string());
        assert_eq!(format!("{}", key), "search:the matrix");
    }

    #[test]
    fn test_cache_key_display_details() {
        let key = CacheKey::Details(603, MediaKind::Movie);
        assert_eq!(format!("{}", key), "details:movie:603");
    }

    #[test]
    fn test_cache_key_display_providers() {
        let key = CacheKey::Providers(1396, MediaKind::Tv);
        assert_eq!(format!("{}", key), "providers:tv:1396");
    }
}
