use chrono::{DateTime, Utc};
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{BookSignal, SignalKind},
};

use super::store::SignalStore;

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// PostgreSQL-backed signal store
///
/// Expects a `book_signals` table with a unique constraint on
/// (user_id, book_id, kind); insert idempotence rides on ON CONFLICT.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl SignalStore for PostgresStore {
    async fn insert(&self, user_id: Uuid, kind: SignalKind, signal: BookSignal) -> AppResult<()> {
        // Liked/disliked are disjoint by book id; the opposite set entry
        // goes away before the insert so a flipped opinion moves the book
        let opposite = match kind {
            SignalKind::Liked => Some(SignalKind::Disliked),
            SignalKind::Disliked => Some(SignalKind::Liked),
            SignalKind::Read => None,
        };

        let mut tx = self.pool.begin().await?;

        if let Some(opposite) = opposite {
            sqlx::query("DELETE FROM book_signals WHERE user_id = $1 AND book_id = $2 AND kind = $3")
                .bind(user_id)
                .bind(&signal.book_id)
                .bind(opposite.as_str())
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query(
            "INSERT INTO book_signals (user_id, book_id, kind, title, author, categories, recorded_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             ON CONFLICT (user_id, book_id, kind) DO NOTHING",
        )
        .bind(user_id)
        .bind(&signal.book_id)
        .bind(kind.as_str())
        .bind(&signal.title)
        .bind(&signal.author)
        .bind(&signal.categories)
        .bind(signal.recorded_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn query(&self, user_id: Uuid, kind: SignalKind) -> AppResult<Vec<BookSignal>> {
        let rows = sqlx::query(
            "SELECT book_id, title, author, categories, recorded_at
             FROM book_signals
             WHERE user_id = $1 AND kind = $2
             ORDER BY recorded_at ASC",
        )
        .bind(user_id)
        .bind(kind.as_str())
        .fetch_all(&self.pool)
        .await?;

        let signals = rows
            .into_iter()
            .map(|row| BookSignal {
                book_id: row.get("book_id"),
                title: row.get("title"),
                author: row.get("author"),
                categories: row.get::<Vec<String>, _>("categories"),
                recorded_at: row.get::<DateTime<Utc>, _>("recorded_at"),
            })
            .collect();

        Ok(signals)
    }

    async fn delete(&self, user_id: Uuid, book_id: &str) -> AppResult<()> {
        sqlx::query("DELETE FROM book_signals WHERE user_id = $1 AND book_id = $2")
            .bind(user_id)
            .bind(book_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
