use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

/// Keys for cached catalog lookups
///
/// Search keys fold the query to lowercase so "Dune" and "dune" share an
/// entry; the language code stays part of the key because results differ.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    BookSearch { query: String, language: String },
    Volume(String),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::BookSearch { query, language } => {
                write!(f, "search:{}:{}", language, query.to_lowercase())
            }
            CacheKey::Volume(isbn) => write!(f, "volume:{}", isbn),
        }
    }
}

/// Opens a Redis client; connections are multiplexed per call site
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// One queued write-behind entry
struct PendingWrite {
    key: String,
    json: String,
    ttl: u64,
}

/// Redis-backed cache with write-behind semantics
///
/// Reads hit Redis directly. Writes are queued to a background task so a
/// catalog response is never delayed by cache population; a lost write only
/// costs a future cache miss.
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Owns the shutdown signal for the background writer
///
/// Dropping the handle without calling `shutdown` leaves the writer running
/// for the life of the process, which is the normal server configuration.
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    /// Signals the writer to drain its queue and stop
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Builds the cache and spawns its background writer task
    pub async fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let client = redis_client.clone();
        tokio::spawn(async move {
            Self::writer_loop(client, write_rx, shutdown_rx).await;
        });

        let cache = Self {
            redis_client,
            write_tx,
        };

        (cache, CacheWriterHandle { shutdown_tx })
    }

    /// Drains queued writes; on shutdown, flushes whatever is left first
    async fn writer_loop(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(entry) = write_rx.recv() => {
                    if let Err(e) = Self::apply_write(&client, entry).await {
                        tracing::error!(error = %e, "Cache write failed");
                    }
                }
                _ = shutdown_rx.recv() => {
                    tracing::info!("Cache writer draining before shutdown");

                    while let Some(entry) = write_rx.recv().await {
                        if let Err(e) = Self::apply_write(&client, entry).await {
                            tracing::error!(error = %e, "Cache write failed during drain");
                        }
                    }

                    tracing::info!("Cache writer stopped");
                    break;
                }
            }
        }
    }

    async fn apply_write(client: &Client, entry: PendingWrite) -> AppResult<()> {
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: () = conn.set_ex(entry.key, entry.json, entry.ttl).await?;
        Ok(())
    }

    /// Looks up a key; `None` on a miss, deserialized JSON on a hit
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

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

    /// Queues a write without waiting for Redis
    ///
    /// Serialization problems and a closed writer channel are logged and
    /// swallowed; cache population is never allowed to fail a request.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let json = match serde_json::to_string(value) {
            Ok(j) => j,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let entry = PendingWrite {
            key: key.to_string(),
            json,
            ttl,
        };

        if let Err(e) = self.write_tx.send(entry) {
            tracing::error!(error = %e, "Cache writer channel closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_display_book_search() {
        let key = CacheKey::BookSearch {
            query: "Dune".to_string(),
            language: "en".to_string(),
        };
        assert_eq!(key.to_string(), "search:en:dune");
    }

    #[test]
    fn test_cache_key_display_book_search_language_distinct() {
        let en = CacheKey::BookSearch {
            query: "cien años de soledad".to_string(),
            language: "en".to_string(),
        };
        let es = CacheKey::BookSearch {
            query: "cien años de soledad".to_string(),
            language: "es".to_string(),
        };
        assert_ne!(en.to_string(), es.to_string());
    }

    #[test]
    fn test_cache_key_display_volume() {
        let key = CacheKey::Volume("9780441013593".to_string());
        assert_eq!(key.to_string(), "volume:9780441013593");
    }

    #[tokio::test]
    async fn test_cache_miss() {
        let redis_url =
            std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string());

        let Ok(client) = create_redis_client(&redis_url) else {
            return;
        };
        let Ok((cache, _handle)) = tokio::time::timeout(
            std::time::Duration::from_secs(1),
            Cache::new(client),
        )
        .await
        else {
            return;
        };

        let key = CacheKey::Volume("nonexistent_isbn_12345".to_string());
        let Ok(retrieved) = cache.get_from_cache::<Vec<String>>(&key).await else {
            // No Redis in the test environment; nothing to assert
            return;
        };

        assert_eq!(retrieved, None);
    }
}
