/// Read-through caching for catalog lookups.
///
/// Checks `$cache` for `$key` and returns the hit; on a miss, awaits `$block`
/// to fetch the value, queues a background write with the given `$ttl`, and
/// returns the fresh value. The surrounding function must return `AppResult`
/// since both the cache read and the block use `?`.
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        match $cache.get_from_cache(&$key).await? {
            Some(hit) => Ok(hit),
            None => {
                let fresh = $block.await?;
                $cache.set_in_background(&$key, &fresh, $ttl);
                Ok(fresh)
            }
        }
    }};
}
