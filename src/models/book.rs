use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;

/// Identifier for a catalog book: an ISBN or a provider-specific volume id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BookId {
    /// ISBN-10 or ISBN-13 (e.g., "9780441013593")
    Isbn(String),
    /// Catalog-specific volume id
    Volume(String),
}

impl Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookId::Isbn(id) => write!(f, "{}", id),
            BookId::Volume(id) => write!(f, "{}", id),
        }
    }
}

/// A book returned from the external catalog, normalized for the client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookCandidate {
    pub id: BookId,
    pub title: String,
    pub authors: Vec<String>,
    pub categories: Vec<String>,
    pub description: Option<String>,
    pub published_year: Option<i32>,
    pub language: Option<String>,
}

// ============================================================================
// Google Books API Types
// ============================================================================

/// Raw response from GET /volumes?q=...
#[derive(Debug, Clone, Deserialize)]
pub struct GbSearchResponse {
    #[serde(default)]
    pub items: Option<Vec<GbVolume>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GbVolume {
    pub id: String,
    pub volume_info: GbVolumeInfo,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GbVolumeInfo {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub industry_identifiers: Vec<GbIndustryIdentifier>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GbIndustryIdentifier {
    #[serde(rename = "type")]
    pub id_type: String,
    pub identifier: String,
}

impl From<GbVolume> for BookCandidate {
    fn from(volume: GbVolume) -> Self {
        let info = volume.volume_info;

        // Prefer ISBN-13, then ISBN-10, then the volume id
        let isbn = info
            .industry_identifiers
            .iter()
            .find(|i| i.id_type == "ISBN_13")
            .or_else(|| info.industry_identifiers.iter().find(|i| i.id_type == "ISBN_10"))
            .map(|i| i.identifier.clone());

        let id = match isbn {
            Some(isbn) => BookId::Isbn(isbn),
            None => BookId::Volume(volume.id),
        };

        let published_year = info
            .published_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse().ok());

        BookCandidate {
            id,
            title: info.title,
            authors: info.authors,
            categories: info.categories,
            description: info.description,
            published_year,
            language: info.language,
        }
    }
}

// ============================================================================
// Open Library API Types
// ============================================================================

/// Open Library search.json response
#[derive(Debug, Clone, Deserialize)]
pub struct OlSearchResponse {
    #[serde(default)]
    pub docs: Vec<OlDoc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OlDoc {
    pub key: String,
    pub title: String,
    #[serde(default)]
    pub author_name: Vec<String>,
    #[serde(default)]
    pub subject: Vec<String>,
    #[serde(default)]
    pub isbn: Vec<String>,
    #[serde(default)]
    pub first_publish_year: Option<i32>,
    #[serde(default)]
    pub language: Vec<String>,
}

impl From<OlDoc> for BookCandidate {
    fn from(doc: OlDoc) -> Self {
        let id = match doc.isbn.first() {
            Some(isbn) => BookId::Isbn(isbn.clone()),
            None => BookId::Volume(doc.key),
        };

        BookCandidate {
            id,
            title: doc.title,
            authors: doc.author_name,
            // Subject lists run long; keep the head so payloads stay small
            categories: doc.subject.into_iter().take(8).collect(),
            description: None,
            published_year: doc.first_publish_year,
            language: doc.language.into_iter().next(),
        }
    }
}

/// Open Library ISBN lookup response (api/books endpoint)
#[derive(Debug, Clone, Deserialize)]
pub struct OlBookDetails {
    pub title: String,
    #[serde(default)]
    pub authors: Vec<OlAuthorRef>,
    #[serde(default)]
    pub subjects: Vec<OlSubjectRef>,
    #[serde(default)]
    pub publish_date: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OlAuthorRef {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OlSubjectRef {
    pub name: String,
}

/// Wrapper for the `ISBN:<n>` keyed map the api/books endpoint returns
pub type OlBookMap = HashMap<String, OlBookDetails>;
