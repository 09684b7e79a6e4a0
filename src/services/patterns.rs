use serde::{Deserialize, Serialize};

use crate::models::BookSignal;

/// Derived lists are capped at this many entries
const MAX_PATTERN_ENTRIES: usize = 5;

/// Ordered keyword -> style table; the first matching row wins, so ties
/// between a user's genres are broken by table position, not frequency
const STYLE_RULES: &[(&[&str], &str)] = &[
    (&["literary", "classic", "literature"], "Literary"),
    (&["thriller", "action", "suspense", "crime"], "Fast-paced"),
    (&["romance", "love"], "Emotional"),
    (&["fantasy", "science fiction", "sci-fi"], "Imaginative"),
    (&["history", "biography", "memoir"], "Reflective"),
];

/// Category keyword -> inferred narrative theme
const THEME_RULES: &[(&str, &str)] = &[
    ("mystery", "puzzles and secrets"),
    ("thriller", "high-stakes tension"),
    ("adventure", "journeys and exploration"),
    ("romance", "relationships"),
    ("fantasy", "imagined worlds"),
    ("science fiction", "speculative futures"),
    ("horror", "fear and the unknown"),
    ("history", "the past brought to life"),
    ("biography", "real lives"),
    ("self-help", "personal growth"),
    ("philosophy", "big questions"),
    ("coming of age", "growing up"),
];

/// Recurring tastes mined from a user's behavioral history
///
/// Pure function of the current signals, recomputed on every recommendation
/// request and never persisted; behavioral data changes between requests.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PatternSummary {
    /// Whether any liked signals existed to mine
    pub has_data: bool,
    /// Whether any disliked signals existed to mine
    pub has_dislike_data: bool,
    pub favorite_genres: Vec<String>,
    pub favorite_authors: Vec<String>,
    pub favorite_themes: Vec<String>,
    pub avoid_genres: Vec<String>,
    pub avoid_authors: Vec<String>,
    /// Qualitative reading-style label, if any style rule matched
    pub narrative_style: Option<String>,
}

/// Mines liked and disliked signals for recurring genres, authors and themes
///
/// Category labels are case-folded; derived lists keep first-seen order
/// after dedup and are capped at five entries. Disliked signals always win:
/// a genre or author appearing on both sides is dropped from the favor side.
/// Absence of data is a valid empty result, never an error.
pub fn analyze(liked: &[BookSignal], disliked: &[BookSignal]) -> PatternSummary {
    let mut summary = PatternSummary {
        has_data: !liked.is_empty(),
        has_dislike_data: !disliked.is_empty(),
        ..Default::default()
    };

    if summary.has_data {
        summary.favorite_genres = collect_genres(liked);
        summary.favorite_authors = collect_authors(liked);
        summary.favorite_themes = infer_themes(&summary.favorite_genres);
        summary.narrative_style = derive_style(&summary.favorite_genres);
    }

    if summary.has_dislike_data {
        summary.avoid_genres = collect_genres(disliked);
        summary.avoid_authors = collect_authors(disliked);
    }

    // Disliked entries win for any identifier present on both sides
    summary
        .favorite_genres
        .retain(|g| !summary.avoid_genres.contains(g));
    summary
        .favorite_authors
        .retain(|a| !summary.avoid_authors.contains(a));

    summary
}

fn collect_genres(signals: &[BookSignal]) -> Vec<String> {
    let mut genres = Vec::new();
    for signal in signals {
        for category in &signal.categories {
            push_folded(&mut genres, category);
        }
    }
    genres
}

fn collect_authors(signals: &[BookSignal]) -> Vec<String> {
    let mut authors = Vec::new();
    for signal in signals {
        if !signal.author.trim().is_empty() {
            push_folded(&mut authors, &signal.author);
        }
    }
    authors
}

/// Case-folded dedup with first-seen order and the fixed cap
fn push_folded(list: &mut Vec<String>, value: &str) {
    if list.len() >= MAX_PATTERN_ENTRIES {
        return;
    }
    let folded = value.trim().to_lowercase();
    if !folded.is_empty() && !list.contains(&folded) {
        list.push(folded);
    }
}

fn infer_themes(genres: &[String]) -> Vec<String> {
    let mut themes = Vec::new();
    for genre in genres {
        for (keyword, theme) in THEME_RULES {
            if genre.contains(keyword) {
                push_folded(&mut themes, theme);
            }
        }
    }
    themes
}

fn derive_style(genres: &[String]) -> Option<String> {
    for (keywords, style) in STYLE_RULES {
        for genre in genres {
            if keywords.iter().any(|k| genre.contains(k)) {
                return Some(style.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::BookSignal;

    fn liked_book(id: &str, author: &str, categories: &[&str]) -> BookSignal {
        BookSignal::new(id, format!("Book {}", id), author)
            .with_categories(categories.iter().map(|c| c.to_string()).collect())
    }

    #[test]
    fn test_empty_input_is_empty_result() {
        let summary = analyze(&[], &[]);
        assert!(!summary.has_data);
        assert!(!summary.has_dislike_data);
        assert!(summary.favorite_genres.is_empty());
        assert!(summary.avoid_genres.is_empty());
        assert_eq!(summary.narrative_style, None);
    }

    #[test]
    fn test_genres_are_case_folded_and_deduped() {
        let liked = vec![
            liked_book("b1", "A. Author", &["Thriller"]),
            liked_book("b2", "B. Author", &["thriller", "Mystery"]),
        ];
        let summary = analyze(&liked, &[]);
        assert_eq!(summary.favorite_genres, vec!["thriller", "mystery"]);
    }

    #[test]
    fn test_lists_are_capped_at_five() {
        let liked: Vec<BookSignal> = (0..10)
            .map(|i| liked_book(&format!("b{}", i), &format!("Author {}", i), &[&format!("genre-{}", i)]))
            .collect();
        let summary = analyze(&liked, &[]);
        assert_eq!(summary.favorite_genres.len(), 5);
        assert_eq!(summary.favorite_authors.len(), 5);
    }

    #[test]
    fn test_disliked_wins_over_liked() {
        let liked = vec![
            liked_book("b1", "Shared Author", &["romance", "thriller"]),
            liked_book("b2", "Kept Author", &["mystery"]),
        ];
        let disliked = vec![liked_book("b3", "Shared Author", &["romance"])];

        let summary = analyze(&liked, &disliked);

        assert!(!summary.favorite_genres.contains(&"romance".to_string()));
        assert!(summary.favorite_genres.contains(&"thriller".to_string()));
        assert!(!summary.favorite_authors.contains(&"shared author".to_string()));
        assert!(summary.favorite_authors.contains(&"kept author".to_string()));
        assert!(summary.avoid_genres.contains(&"romance".to_string()));
    }

    #[test]
    fn test_favor_and_avoid_never_overlap() {
        let liked = vec![liked_book("b1", "Author One", &["fantasy", "horror"])];
        let disliked = vec![liked_book("b2", "Author One", &["horror", "western"])];

        let summary = analyze(&liked, &disliked);

        for genre in &summary.favorite_genres {
            assert!(!summary.avoid_genres.contains(genre));
        }
        for author in &summary.favorite_authors {
            assert!(!summary.avoid_authors.contains(author));
        }
    }

    #[test]
    fn test_style_table_order_breaks_ties() {
        // Both literary and thriller are present; literary is earlier in the table
        let liked = vec![liked_book("b1", "A", &["thriller", "literary fiction"])];
        let summary = analyze(&liked, &[]);
        assert_eq!(summary.narrative_style, Some("Literary".to_string()));
    }

    #[test]
    fn test_style_fast_paced() {
        let liked = vec![liked_book("b1", "A", &["action", "adventure"])];
        let summary = analyze(&liked, &[]);
        assert_eq!(summary.narrative_style, Some("Fast-paced".to_string()));
    }

    #[test]
    fn test_themes_inferred_from_genres() {
        let liked = vec![liked_book("b1", "A", &["mystery", "fantasy"])];
        let summary = analyze(&liked, &[]);
        assert!(summary.favorite_themes.contains(&"puzzles and secrets".to_string()));
        assert!(summary.favorite_themes.contains(&"imagined worlds".to_string()));
    }

    #[test]
    fn test_dislike_only_input() {
        let disliked = vec![liked_book("b1", "Avoided Author", &["horror"])];
        let summary = analyze(&[], &disliked);
        assert!(!summary.has_data);
        assert!(summary.has_dislike_data);
        assert!(summary.favorite_genres.is_empty());
        assert_eq!(summary.avoid_genres, vec!["horror"]);
    }
}
