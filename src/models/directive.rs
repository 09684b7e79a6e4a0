use serde::{Deserialize, Serialize};

use super::BookCandidate;

/// Reasoning strings longer than this are truncated at a char boundary
pub const MAX_REASONING_LEN: usize = 200;

/// Confidence tag attached to a directive by the synthesizer
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
}

/// The aspect of the user's taste a directive targets
///
/// No two directives in one batch share a focus area; this is what keeps a
/// batch diverse rather than five variations of the same query.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    Author,
    Genre,
    Popular,
    Vibe,
    Goal,
    Mood,
    Discovery,
    Contemporary,
    Classic,
}

/// A structured catalog search instruction plus explanatory metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationDirective {
    /// Free text or field-qualified query (`inauthor:"..."`, `subject:"..."`)
    pub query: String,
    /// Human-readable explanation shown alongside results
    pub reasoning: String,
    pub focus: FocusArea,
    /// Genre the results are expected to fall into, if predictable
    #[serde(default)]
    pub expected_genre: Option<String>,
    pub confidence: Confidence,
}

impl RecommendationDirective {
    pub fn new(
        query: impl Into<String>,
        reasoning: impl Into<String>,
        focus: FocusArea,
        confidence: Confidence,
    ) -> Self {
        let mut reasoning: String = reasoning.into();
        if reasoning.len() > MAX_REASONING_LEN {
            reasoning = reasoning.chars().take(MAX_REASONING_LEN).collect();
        }
        Self {
            query: query.into(),
            reasoning,
            focus,
            expected_genre: None,
            confidence,
        }
    }

    pub fn with_expected_genre(mut self, genre: impl Into<String>) -> Self {
        self.expected_genre = Some(genre.into());
        self
    }
}

/// Display tier shown as a badge next to a scored candidate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    PerfectMatch,
    Excellent,
    Good,
    MightInterest,
}

impl MatchTier {
    /// Fixed tier boundaries: 90 / 80 / 70
    pub fn for_score(score: u8) -> Self {
        match score {
            90..=100 => MatchTier::PerfectMatch,
            80..=89 => MatchTier::Excellent,
            70..=79 => MatchTier::Good,
            _ => MatchTier::MightInterest,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchTier::PerfectMatch => "perfect match",
            MatchTier::Excellent => "excellent",
            MatchTier::Good => "good",
            MatchTier::MightInterest => "might interest you",
        }
    }
}

/// A catalog candidate annotated with its compatibility estimate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoredCandidate {
    pub book: BookCandidate,
    /// Affinity estimate in [0,100]; display-only, never used for filtering
    pub score: u8,
    pub tier: MatchTier,
}

/// One resolved directive with its scored results, in original batch order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedDirective {
    pub directive: RecommendationDirective,
    pub candidates: Vec<ScoredCandidate>,
}
