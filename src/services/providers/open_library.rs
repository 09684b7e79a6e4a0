/// Open Library provider
///
/// Keyless alternative catalog. Slower and with messier subject data than
/// Google Books, but useful as a drop-in when quota is exhausted.
use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{BookCandidate, BookId, OlBookMap, OlSearchResponse},
    services::providers::CatalogProvider,
};
use reqwest::Client as HttpClient;

const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const VOLUME_CACHE_TTL: u64 = 604800; // 1 week
const SEARCH_LIMIT: u32 = 10;

#[derive(Clone)]
pub struct OpenLibraryProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
}

impl OpenLibraryProvider {
    pub fn new(cache: Cache, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_url,
            cache,
        }
    }
}

#[async_trait::async_trait]
impl CatalogProvider for OpenLibraryProvider {
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
                // Open Library has no field-qualified syntax; strip it down
                let plain = query
                    .replace("inauthor:", "")
                    .replace("subject:", "")
                    .replace('"', "");

                let url = format!("{}/search.json", self.api_url);
                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("q", plain.as_str()),
                        ("lang", language),
                        ("limit", &SEARCH_LIMIT.to_string()),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    return Err(AppError::ExternalApi(format!(
                        "Open Library returned status {}",
                        status
                    )));
                }

                let parsed: OlSearchResponse = response.json().await?;
                let candidates: Vec<BookCandidate> =
                    parsed.docs.into_iter().map(BookCandidate::from).collect();

                tracing::info!(
                    query = %query,
                    results = candidates.len(),
                    provider = "open_library",
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
                let url = format!("{}/api/books", self.api_url);
                let bibkey = format!("ISBN:{}", isbn);
                let response = self
                    .http_client
                    .get(&url)
                    .query(&[
                        ("bibkeys", bibkey.as_str()),
                        ("format", "json"),
                        ("jscmd", "data"),
                    ])
                    .send()
                    .await?;

                if !response.status().is_success() {
                    let status = response.status();
                    return Err(AppError::ExternalApi(format!(
                        "Open Library returned status {}",
                        status
                    )));
                }

                let parsed: OlBookMap = response.json().await?;
                let details = parsed
                    .into_iter()
                    .next()
                    .map(|(_, details)| details)
                    .ok_or_else(|| AppError::NotFound(format!("No volume for ISBN {}", isbn)))?;

                let published_year = details
                    .publish_date
                    .as_deref()
                    .and_then(|d| {
                        d.split_whitespace()
                            .last()
                            .and_then(|y| y.parse::<i32>().ok())
                    });

                Ok(BookCandidate {
                    id: BookId::Isbn(isbn.to_string()),
                    title: details.title,
                    authors: details.authors.into_iter().map(|a| a.name).collect(),
                    categories: details
                        .subjects
                        .into_iter()
                        .take(8)
                        .map(|s| s.name)
                        .collect(),
                    description: None,
                    published_year,
                    language: None,
                })
            }
        )
    }

    fn clone_for_task(&self) -> Box<dyn CatalogProvider> {
        Box::new(self.clone())
    }

    fn name(&self) -> &'static str {
        "open_library"
    }
}
