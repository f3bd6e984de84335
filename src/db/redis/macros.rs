/// A macro to simplify caching logic using Redis.
///
/// Checks the cache for the key and returns the hit when present;
/// otherwise runs the provided block, stores its value under the key with
/// the given TTL, and returns it.
///
/// # Arguments
/// * `$cache`: The cache instance, providing `get_from_cache` and
///   `set_in_background`.
/// * `$key`: The key to cache the value under.
/// * `$ttl`: Time-to-live for the cached value in seconds.
/// * `$block`: The block that computes the value on a cache miss.
///
/// # Example
/// ```ignore
/// let candidates = cached!(cache, cache_key, ttl, async move {
///     fetch_from_catalog().await
/// });
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        // Attempt to get the value from cache
        if let Some(cached) = $cache.get_from_cache(&$key).await? {
            Ok(cached)
        } else {
            // If not in cache, execute the block to compute the value
            let value = $block.await?;
            // Store the computed value in cache
            $cache.set_in_background(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
