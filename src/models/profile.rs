use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Preferences a user declares during onboarding
///
/// Created with empty defaults at registration and overwritten whole on each
/// preference update; behavioral history lives separately in `UserSignals`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeclaredProfile {
    /// Genres the user picked, free-form strings
    #[serde(default)]
    pub genres: Vec<String>,
    /// BCP-47-ish language code for catalog searches ("en", "es", ...)
    #[serde(default = "default_language")]
    pub language: String,
    /// Preferred reading length ("short", "medium", "long")
    #[serde(default)]
    pub reading_length: Option<String>,
    /// Reading goal ids from the onboarding wizard
    #[serde(default)]
    pub goals: Vec<String>,
    /// Single reader-type tag, if answered
    #[serde(default)]
    pub reader_type: Option<String>,
    /// Story-vibe ids from the onboarding wizard
    #[serde(default)]
    pub story_vibes: Vec<String>,
    /// Free-text note about a favorite book
    #[serde(default)]
    pub favorite_book: Option<String>,
    /// Psychological question answers: question id -> answer id
    #[serde(default)]
    pub psych_answers: HashMap<String, String>,
    #[serde(default)]
    pub onboarding_completed: bool,
}

fn default_language() -> String {
    "en".to_string()
}

impl Default for DeclaredProfile {
    fn default() -> Self {
        Self::new()
    }
}

impl DeclaredProfile {
    /// Creates an empty profile with the default language
    pub fn new() -> Self {
        Self {
            genres: Vec::new(),
            language: default_language(),
            reading_length: None,
            goals: Vec::new(),
            reader_type: None,
            story_vibes: Vec::new(),
            favorite_book: None,
            psych_answers: HashMap::new(),
            onboarding_completed: false,
        }
    }
}
