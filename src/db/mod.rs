pub mod pointers;
pub mod redis;

pub use pointers::{PointerStore, RedisPointerStore};
pub use self::redis::{create_redis_client, Cache, CacheKey};
