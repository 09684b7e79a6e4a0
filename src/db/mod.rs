pub mod postgres;
pub mod redis;
pub mod store;

pub use postgres::{create_pool, PostgresStore};
pub use redis::create_redis_client;
pub use redis::Cache;
pub use redis::CacheKey;
pub use store::{MemoryStore, SignalStore};
