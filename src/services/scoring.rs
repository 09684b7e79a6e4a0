use crate::models::{BookCandidate, Confidence, MatchTier, ScoredCandidate};

use super::patterns::PatternSummary;

/// Base score and ceiling per confidence tag
const HIGH_BASE: u8 = 84;
const HIGH_CEILING: u8 = 97;
const MEDIUM_BASE: u8 = 62;
const MEDIUM_CEILING: u8 = 79;

/// Added per category the candidate shares with the user's favorite genres
const OVERLAP_INCREMENT: u8 = 5;

/// Assigns a display-only 0-100 affinity score to a resolved candidate
///
/// The score never filters or ranks results; the UI uses it to badge them.
/// High-confidence directives land in [80,97], medium in [55,79], nudged
/// upward by category overlap with the user's favor-set and capped at the
/// range ceiling.
pub fn score_candidate(
    book: BookCandidate,
    confidence: Confidence,
    patterns: &PatternSummary,
) -> ScoredCandidate {
    let (base, ceiling) = match confidence {
        Confidence::High => (HIGH_BASE, HIGH_CEILING),
        Confidence::Medium => (MEDIUM_BASE, MEDIUM_CEILING),
    };

    let overlap = book
        .categories
        .iter()
        .filter(|category| {
            let folded = category.to_lowercase();
            patterns
                .favorite_genres
                .iter()
                .any(|genre| folded.contains(genre.as_str()) || genre.contains(&folded))
        })
        .count() as u8;

    let score = base
        .saturating_add(overlap.saturating_mul(OVERLAP_INCREMENT))
        .min(ceiling)
        .min(100);

    let tier = MatchTier::for_score(score);

    ScoredCandidate { book, score, tier }
}
