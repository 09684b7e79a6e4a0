/// Google Books volumes API provider
///
/// The primary catalog source. Searches and volume lookups are cached in
/// Redis since catalog data changes slowly and quota is shared.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{BookCandidate, GbSearchResponse, GbVolume},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const VOLUME_CACHE_TTL: u64 = 604800; // 1 week
const MAX_RESULTS: u32 = 10;

#[derive(Clone)]
pub struct GoogleBooksProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
}

impl GoogleBooksProvider {
    pub fn new(cache: Cache, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            cache,
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for GoogleBooksProvider {
    async fn search(&self, query: &str, language: &str) -> AppResult<Vec<BookCandidate>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::BookSearch {
                query: query.to_string(),
                language: language.to_string(),
            },
            SEARCH_CACHE_TTL,
            async move {
                let url = format!("{}/volumes", self.api_url);
                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("q", query),
                        ("langRestrict", language),
                        ("maxResults", &MAX_RESULTS.to_string()),
                        ("printType", "books"),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "Catalog returned status {}: {}",
                        status, body
                    )));
                }

                let parsed: GbSearchResponse = response.json().await?;
                let candidates: Vec<BookCandidate> = parsed
                    .items
                    .unwrap_or_default()
                    .into_iter()
                    .map(BookCandidate::from)
                    .collect();

                tracing::info!(
                    query = %query,
                    language = %language,
                    results = candidates.len(),
                    provider = "google_books",
                    "Catalog search completed"
                );

                Ok(candidates)
            }
        )
    }

    async fn fetch_by_isbn(&self, isbn: &str) -> AppResult<BookCandidate> {
        cached!(
            self.cache,
            CacheKey::Volume(isbn.to_string()),
            VOLUME_CACHE_TTL,
            async move {
                let url = format!("{}/volumes", self.api_url);
                let response = self
                    .http_client
                    .get(&url)
                    .query(&[("q", format!("isbn:{}", isbn).as_str()), ("maxResults", "1")])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    let body = response.text().await.unwrap_or_default();
                    return Err(AppError::ExternalApi(format!(
                        "Catalog returned status {}: {}",
                        status, body
                    )));
                }

                let parsed: GbSearchResponse = response.json().await?;
                let volume: Option<GbVolume> =
                    parsed.items.and_then(|items| items.into_iter().next());

                match volume {
                    Some(volume) => {
                        tracing::info!(
                            isbn = %isbn,
                            provider = "google_books",
                            "Volume fetched"
                        );
                        Ok(BookCandidate::from(volume))
                    }
                    None => Err(AppError::NotFound(format!("No volume for ISBN {}", isbn))),
                }
            }
        )
    }

    fn clone_for_task(&self) -> Box<dyn CatalogProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "google_books"
    }
}
