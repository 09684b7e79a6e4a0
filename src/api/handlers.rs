use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{BookCandidate, BookSignal, DeclaredProfile, SignalKind, UserSignals};
use crate::services::recommendations::RecommendationBatch;

use super::AppState;

/// Health check endpoint
pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    q: String,
    #[serde(default = "default_lang")]
    lang: String,
}

fn default_lang() -> String {
    "en".to_string()
}

/// Handler for catalog search
pub async fn search_books(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<BookCandidate>>> {
    let books = state.catalog.search(&params.q, &params.lang).await?;
    Ok(Json(books))
}

/// Handler for catalog fetch-by-ISBN
pub async fn get_book(
    State(state): State<AppState>,
    Path(isbn): Path<String>,
) -> AppResult<Json<BookCandidate>> {
    let book = state.catalog.fetch_by_isbn(&isbn).await?;
    Ok(Json(book))
}

#[derive(Debug, Deserialize)]
pub struct RecordSignalRequest {
    pub kind: SignalKind,
    pub book_id: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

/// Records a behavioral signal; re-recording the same book is a success
pub async fn record_signal(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<RecordSignalRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    if request.book_id.trim().is_empty() {
        return Err(AppError::InvalidInput("book_id cannot be empty".to_string()));
    }

    let signal = BookSignal::new(request.book_id, request.title, request.author)
        .with_categories(request.categories);
    state.store.insert(user_id, request.kind, signal).await?;

    Ok((StatusCode::OK, Json(json!({ "status": "recorded" }))))
}

#[derive(Debug, Deserialize)]
pub struct ListSignalsQuery {
    kind: Option<String>,
}

/// Lists a user's signals, optionally narrowed to one kind
pub async fn list_signals(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Query(params): Query<ListSignalsQuery>,
) -> AppResult<Json<UserSignals>> {
    match params.kind.as_deref() {
        Some(raw) => {
            let kind = SignalKind::parse(raw)
                .ok_or_else(|| AppError::InvalidInput(format!("Unknown signal kind: {}", raw)))?;
            let signals = state.store.query(user_id, kind).await?;
            let mut result = UserSignals::new();
            match kind {
                SignalKind::Liked => result.liked = signals,
                SignalKind::Disliked => result.disliked = signals,
                SignalKind::Read => result.read = signals,
            }
            Ok(Json(result))
        }
        None => Ok(Json(state.store.load_all(user_id).await?)),
    }
}

/// Removes a book from all of a user's signal sets
pub async fn delete_signal(
    State(state): State<AppState>,
    Path((user_id, book_id)): Path<(Uuid, String)>,
) -> AppResult<StatusCode> {
    state.store.delete(user_id, &book_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the declared profile, empty defaults if never set
pub async fn get_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<DeclaredProfile>> {
    let profiles = state.profiles.read().await;
    let profile = profiles.get(&user_id).cloned().unwrap_or_default();
    Ok(Json(profile))
}

/// Overwrites the declared profile whole
pub async fn put_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(profile): Json<DeclaredProfile>,
) -> AppResult<Json<DeclaredProfile>> {
    let mut profiles = state.profiles.write().await;
    profiles.insert(user_id, profile.clone());
    Ok(Json(profile))
}

/// Runs the full recommendation pipeline for a user
///
/// Generative failures never surface here; the worst outcome is a
/// deterministic, lower-confidence batch.
pub async fn recommendations(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<RecommendationBatch>> {
    let profile = {
        let profiles = state.profiles.read().await;
        profiles.get(&user_id).cloned().unwrap_or_default()
    };

    let batch = state.recommendations.recommend(user_id, &profile).await?;
    Ok(Json(batch))
}
