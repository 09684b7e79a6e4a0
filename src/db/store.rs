use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{BookSignal, SignalKind, UserSignals},
};

/// Behavioral signal record store
///
/// Append-only with insert-if-absent semantics per book id within a signal
/// kind: re-inserting an existing (user, book, kind) triple is a successful
/// no-op, never an error. `query` returns signals in insertion order.
#[async_trait::async_trait]
pub trait SignalStore: Send + Sync {
    async fn insert(&self, user_id: Uuid, kind: SignalKind, signal: BookSignal) -> AppResult<()>;

    async fn query(&self, user_id: Uuid, kind: SignalKind) -> AppResult<Vec<BookSignal>>;

    /// Removes a book from every signal set for the user
    async fn delete(&self, user_id: Uuid, book_id: &str) -> AppResult<()>;

    /// Loads the full behavioral history in one call
    ///
    /// Default implementation issues one query per kind; stores with a
    /// cheaper bulk path can override.
    async fn load_all(&self, user_id: Uuid) -> AppResult<UserSignals> {
        Ok(UserSignals {
            liked: self.query(user_id, SignalKind::Liked).await?,
            disliked: self.query(user_id, SignalKind::Disliked).await?,
            read: self.query(user_id, SignalKind::Read).await?,
        })
    }
}

/// In-memory signal store used in tests and when no database is configured
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<Uuid, UserSignals>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl SignalStore for MemoryStore {
    async fn insert(&self, user_id: Uuid, kind: SignalKind, signal: BookSignal) -> AppResult<()> {
        let mut users = self.inner.write().await;
        users.entry(user_id).or_default().add(kind, signal);
        Ok(())
    }

    async fn query(&self, user_id: Uuid, kind: SignalKind) -> AppResult<Vec<BookSignal>> {
        let users = self.inner.read().await;
        Ok(users
            .get(&user_id)
            .map(|signals| signals.of_kind(kind).to_vec())
            .unwrap_or_default())
    }

    async fn delete(&self, user_id: Uuid, book_id: &str) -> AppResult<()> {
        let mut users = self.inner.write().await;
        if let Some(signals) = users.get_mut(&user_id) {
            signals.remove(book_id);
        }
        Ok(())
    }

    async fn load_all(&self, user_id: Uuid) -> AppResult<UserSignals> {
        let users = self.inner.read().await;
        Ok(users.get(&user_id).cloned().unwrap_or_default())
    }
}
