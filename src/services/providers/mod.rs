/// External collaborator abstractions
///
/// The catalog and the generative text service are both pluggable: each is a
/// trait with concrete reqwest-backed implementations below, so the engine
/// can be exercised in tests without the network and providers can be
/// swapped without touching the pipeline.
use crate::{
    error::AppResult,
    models::BookCandidate,
};

pub mod gemini;
pub mod google_books;
pub mod open_library;

/// Trait for book catalog providers
///
/// Providers implement search (free text or field-qualified query, language
/// restricted) and fetch-by-ISBN. A search may legitimately return an empty
/// list; fetch-by-ISBN reports a missing volume as `AppError::NotFound`.
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    async fn search(&self, query: &str, language: &str) -> AppResult<Vec<BookCandidate>>;

    async fn fetch_by_isbn(&self, isbn: &str) -> AppResult<BookCandidate>;

    /// Clone provider for parallel task execution
    ///
    /// Required because providers need to be moved into tokio tasks.
    fn clone_for_task(&self) -> Box<dyn CatalogProvider>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for the generative text collaborator
///
/// One prompt in, raw text out. The service is treated as unreliable and
/// possibly absent; callers own prompt construction and response parsing.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait TextGenerator: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}
