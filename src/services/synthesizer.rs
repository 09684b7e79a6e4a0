use crate::models::{Confidence, DeclaredProfile, FocusArea, RecommendationDirective};

use super::patterns::PatternSummary;
use super::profile_tags::{self, ProfileTags};
use super::stage::LearningStage;

/// A deterministic batch always carries exactly this many directives
pub const BATCH_SIZE: usize = 5;

/// Story-vibe id -> (catalog query, expected genre)
const VIBE_QUERIES: &[(&str, &str, &str)] = &[
    ("cozy", "subject:\"cozy mystery\"", "cozy mystery"),
    ("dark", "subject:\"gothic fiction\"", "gothic"),
    ("epic", "subject:\"epic fantasy\"", "fantasy"),
    ("funny", "subject:\"humorous fiction\"", "humor"),
    ("thoughtful", "literary fiction quiet character study", "literary fiction"),
    ("twisty", "psychological thriller unreliable narrator", "thriller"),
];

/// Reading-goal id -> catalog query
const GOAL_QUERIES: &[(&str, &str)] = &[
    ("relax", "feel-good fiction"),
    ("learn", "narrative nonfiction"),
    ("escape", "immersive fantasy series"),
    ("grow", "subject:\"self-improvement\""),
    ("habit", "short novels page-turner"),
    ("connect", "book club fiction"),
];

/// (psych question id, answer id) -> catalog query
const PSYCH_QUERIES: &[(&str, &str, &str)] = &[
    ("evening", "quiet", "atmospheric literary fiction"),
    ("evening", "social", "ensemble cast family saga"),
    ("conflict", "head-on", "hard-boiled detective fiction"),
    ("conflict", "avoid", "gentle uplifting fiction"),
    ("world", "real", "contemporary realistic fiction"),
    ("world", "imagined", "speculative fiction world-building"),
    ("pace", "slow", "slow burn character driven novel"),
    ("pace", "fast", "fast-paced thriller short chapters"),
];

/// Language-specific safe pad directives, cycled when a batch runs short
///
/// Each row keeps a distinct focus area so padding never collides with the
/// diversity rule under normal batch sizes.
const PAD_QUERIES_EN: &[(&str, &str, FocusArea)] = &[
    (
        "award-winning contemporary fiction",
        "Widely praised recent fiction is a reliable starting point",
        FocusArea::Discovery,
    ),
    (
        "classic literature",
        "Time-tested classics suit almost every reader",
        FocusArea::Classic,
    ),
    (
        "feel-good bestsellers",
        "Popular uplifting reads are an easy match",
        FocusArea::Mood,
    ),
    (
        "book club fiction picks",
        "Book-club staples balance accessibility and depth",
        FocusArea::Contemporary,
    ),
];

const PAD_QUERIES_ES: &[(&str, &str, FocusArea)] = &[
    (
        "novela contemporánea en español",
        "Narrativa contemporánea en tu idioma",
        FocusArea::Discovery,
    ),
    (
        "inauthor:\"Gabriel García Márquez\"",
        "Un clásico imprescindible de la literatura hispana",
        FocusArea::Classic,
    ),
    (
        "bestsellers en español",
        "Los libros más leídos del mercado hispano",
        FocusArea::Mood,
    ),
    (
        "subject:\"novela histórica\" español",
        "La novela histórica es una apuesta segura",
        FocusArea::Contemporary,
    ),
];

/// Everything the synthesizer needs for one recommendation cycle
#[derive(Debug, Clone, Copy)]
pub struct SynthesisInput<'a> {
    pub patterns: &'a PatternSummary,
    pub profile: &'a DeclaredProfile,
    pub tags: &'a ProfileTags,
    pub stage: LearningStage,
}

/// Builds a batch of exactly five catalog search directives
///
/// Applies the slot rules in order, each slot targeting a different focus
/// area. `rotation` is a caller-owned counter that varies which favorite
/// author (or declared genre) anchors the batch run-to-run; passing the same
/// value reproduces the same batch, which keeps tests deterministic.
pub fn synthesize(input: &SynthesisInput<'_>, rotation: usize) -> Vec<RecommendationDirective> {
    let mut batch: Vec<RecommendationDirective> = Vec::with_capacity(BATCH_SIZE);

    if let Some(directive) = anchor_slot(input, rotation) {
        batch.push(directive);
    }
    if let Some(directive) = mood_slot(input, &batch) {
        batch.push(directive);
    }
    if let Some(directive) = psych_slot(input, &batch) {
        batch.push(directive);
    }

    pad_batch(&mut batch, input);
    batch
}

/// Slot 1-3 of the rule table: author, then declared genre, then bestsellers
fn anchor_slot(input: &SynthesisInput<'_>, rotation: usize) -> Option<RecommendationDirective> {
    let mut candidates = Vec::new();

    if input.stage.trusts_behavior() && !input.patterns.favorite_authors.is_empty() {
        let authors = &input.patterns.favorite_authors;
        let author = &authors[rotation % authors.len()];
        candidates.push(
            RecommendationDirective::new(
                format!("inauthor:\"{}\"", author),
                format!("You have liked several books by {}", author),
                FocusArea::Author,
                Confidence::High,
            ),
        );
    }

    if let Some(genre) = pick(&input.profile.genres, rotation) {
        candidates.push(
            RecommendationDirective::new(
                format!("subject:\"{}\"", genre.to_lowercase()),
                format!("You told us you enjoy {}", genre),
                FocusArea::Genre,
                Confidence::High,
            )
            .with_expected_genre(genre.to_lowercase()),
        );
    }

    candidates.push(RecommendationDirective::new(
        "bestseller fiction",
        "Broadly loved titles while we learn your taste",
        FocusArea::Popular,
        Confidence::Medium,
    ));

    resolve_conflicts(candidates, input.patterns)
}

/// Slot 4: story vibes, then reading goals, then a generic contemporary pick
fn mood_slot(
    input: &SynthesisInput<'_>,
    batch: &[RecommendationDirective],
) -> Option<RecommendationDirective> {
    let mut candidates = Vec::new();

    for vibe in &input.profile.story_vibes {
        if let Some((_, query, genre)) = VIBE_QUERIES.iter().find(|(id, _, _)| *id == vibe.as_str()) {
            candidates.push(
                RecommendationDirective::new(
                    *query,
                    format!("Matches the \"{}\" mood you asked for", vibe),
                    FocusArea::Vibe,
                    Confidence::High,
                )
                .with_expected_genre(*genre),
            );
            break;
        }
    }

    for goal in &input.profile.goals {
        if let Some((_, query)) = GOAL_QUERIES.iter().find(|(id, _)| *id == goal.as_str()) {
            candidates.push(RecommendationDirective::new(
                *query,
                format!("Picked for your goal to {}", profile_tags::describe_goal(goal)),
                FocusArea::Goal,
                Confidence::High,
            ));
            break;
        }
    }

    candidates.push(RecommendationDirective::new(
        "contemporary fiction",
        "A steady dose of well-reviewed current fiction",
        FocusArea::Contemporary,
        Confidence::Medium,
    ));

    candidates.retain(|c| !batch.iter().any(|d| d.focus == c.focus));
    resolve_conflicts(candidates, input.patterns)
}

/// Slot 5: the psychological-answer map; skipped silently when nothing maps
fn psych_slot(
    input: &SynthesisInput<'_>,
    batch: &[RecommendationDirective],
) -> Option<RecommendationDirective> {
    // Sorted so HashMap ordering cannot make batches flap between runs
    let mut answers: Vec<(&String, &String)> = input.profile.psych_answers.iter().collect();
    answers.sort();

    let mut candidates = Vec::new();
    for (question, answer) in answers {
        if let Some((_, _, query)) = PSYCH_QUERIES
            .iter()
            .find(|(q, a, _)| *q == question.as_str() && *a == answer.as_str())
        {
            candidates.push(RecommendationDirective::new(
                *query,
                "Chosen from how you described your reading personality",
                FocusArea::Mood,
                Confidence::Medium,
            ));
            break;
        }
    }

    candidates.retain(|c| !batch.iter().any(|d| d.focus == c.focus));
    resolve_conflicts(candidates, input.patterns)
}

/// Rule 6: cycle the language-appropriate safe list until the batch holds five
fn pad_batch(batch: &mut Vec<RecommendationDirective>, input: &SynthesisInput<'_>) {
    let pads = match input.profile.language.as_str() {
        "es" => PAD_QUERIES_ES,
        _ => PAD_QUERIES_EN,
    };

    // First cycle respects focus-area uniqueness; the second admits focus
    // repeats. The last cycle admits avoid-set conflicts as well, the same
    // keep-rather-than-underfill rule the slots apply, so an avoid-set that
    // blankets the pad vocabulary cannot push the batch below size.
    for cycle in 0..3 {
        for (query, reasoning, focus) in pads {
            if batch.len() >= BATCH_SIZE {
                return;
            }
            if cycle == 0 && batch.iter().any(|d| d.focus == *focus) {
                continue;
            }
            if cycle < 2 && conflicts_with_avoid(query, input.patterns) {
                continue;
            }
            if batch.iter().any(|d| d.query == *query) {
                continue;
            }
            batch.push(RecommendationDirective::new(
                *query,
                *reasoning,
                *focus,
                Confidence::Medium,
            ));
        }
    }
}

/// Avoid-set enforcement: discard and fall through to the next rule; if every
/// rule conflicts, keep the first candidate with confidence forced to medium
fn resolve_conflicts(
    candidates: Vec<RecommendationDirective>,
    patterns: &PatternSummary,
) -> Option<RecommendationDirective> {
    if candidates.is_empty() {
        return None;
    }

    if let Some(clean) = candidates
        .iter()
        .find(|c| !conflicts_with_avoid(&c.query, patterns))
    {
        return Some(clean.clone());
    }

    let mut downgraded = candidates.into_iter().next()?;
    downgraded.confidence = Confidence::Medium;
    Some(downgraded)
}

/// Whether a query mentions anything in the user's avoid-set
///
/// Shared with generative-output validation so both directive sources
/// enforce the same rule.
pub(crate) fn conflicts_with_avoid(query: &str, patterns: &PatternSummary) -> bool {
    let query = query.to_lowercase();
    patterns
        .avoid_genres
        .iter()
        .chain(patterns.avoid_authors.iter())
        .any(|avoided| query.contains(avoided.as_str()))
}

fn pick<'a>(values: &'a [String], rotation: usize) -> Option<&'a String> {
    if values.is_empty() {
        None
    } else {
        Some(&values[rotation % values.len()])
    }
}

/// Builds the instruction payload for the generative collaborator
///
/// The deterministic rules above stay the single source of truth for batch
/// shape; the prompt only asks the model for a richer rendition of the same
/// structure, which the controller then validates.
pub fn build_prompt(input: &SynthesisInput<'_>) -> String {
    let mut prompt = String::from(
        "You are a book recommendation engine. Produce book catalog search queries \
         for the reader described below.\n\n",
    );

    let patterns = input.patterns;
    if patterns.has_data {
        prompt.push_str(&format!(
            "Liked genres: {}\nLiked authors: {}\nThemes they respond to: {}\n",
            join_or_none(&patterns.favorite_genres),
            join_or_none(&patterns.favorite_authors),
            join_or_none(&patterns.favorite_themes),
        ));
        if let Some(style) = &patterns.narrative_style {
            prompt.push_str(&format!("Narrative style: {}\n", style));
        }
    } else {
        prompt.push_str("No behavioral history yet; lean on declared preferences.\n");
    }

    if patterns.has_dislike_data {
        prompt.push_str(&format!(
            "NEVER recommend these genres: {}\nNEVER recommend these authors: {}\n",
            join_or_none(&patterns.avoid_genres),
            join_or_none(&patterns.avoid_authors),
        ));
    }

    prompt.push_str(&format!(
        "\nDeclared genres: {}\nLanguage: {}\nReading maturity: {:?}\n",
        join_or_none(&input.profile.genres),
        input.profile.language,
        input.stage,
    ));

    let tags = input.tags;
    if !tags.goals.is_empty() {
        prompt.push_str(&format!("Goals: {}\n", tags.goals.join("; ")));
    }
    if let Some(reader_type) = &tags.reader_type {
        prompt.push_str(&format!("Reader type: {}\n", reader_type));
    }
    if !tags.vibes.is_empty() {
        prompt.push_str(&format!("Wants: {}\n", tags.vibes.join("; ")));
    }
    if !tags.psych_traits.is_empty() {
        prompt.push_str(&format!("Personality: {}\n", tags.psych_traits.join("; ")));
    }
    if let Some(favorite) = &input.profile.favorite_book {
        prompt.push_str(&format!("A favorite book of theirs: {}\n", favorite));
    }

    prompt.push_str(
        "\nRespond with ONLY a JSON array of 3 to 5 objects, no prose. Each object:\n\
         {\"query\": string (free text or inauthor:\"...\" / subject:\"...\"),\n\
         \"reasoning\": short string addressed to the reader,\n\
         \"focus\": one of \"author\",\"genre\",\"popular\",\"vibe\",\"goal\",\"mood\",\"discovery\",\"contemporary\",\"classic\",\n\
         \"expected_genre\": string or null,\n\
         \"confidence\": \"high\" or \"medium\"}\n\
         No two objects may share the same focus.\n",
    );

    prompt
}

fn join_or_none(values: &[String]) -> String {
    if values.is_empty() {
        "none".to_string()
    } else {
        values.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::patterns::analyze;
    use crate::services::profile_tags::normalize;
    use crate::models::BookSignal;

    fn input_for<'a>(
        patterns: &'a PatternSummary,
        profile: &'a DeclaredProfile,
        tags: &'a ProfileTags,
        stage: LearningStage,
    ) -> SynthesisInput<'a> {
        SynthesisInput {
            patterns,
            profile,
            tags,
            stage,
        }
    }

    fn thriller_history(count: usize) -> Vec<BookSignal> {
        (0..count)
            .map(|i| {
                BookSignal::new(format!("b{}", i), format!("Thriller {}", i), "Lee Child")
                    .with_categories(vec!["thriller".to_string()])
            })
            .collect()
    }

    #[test]
    fn test_batch_is_always_five_with_valid_fields() {
        let patterns = PatternSummary::default();
        let profile = DeclaredProfile::new();
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        let batch = synthesize(&input, 0);
        assert_eq!(batch.len(), BATCH_SIZE);
        for directive in &batch {
            assert!(!directive.query.is_empty());
            assert!(!directive.reasoning.is_empty());
        }
    }

    #[test]
    fn test_no_two_directives_share_focus() {
        let liked = thriller_history(20);
        let patterns = analyze(&liked, &[]);
        let mut profile = DeclaredProfile::new();
        profile.genres = vec!["Mystery".to_string()];
        profile.story_vibes = vec!["twisty".to_string()];
        profile
            .psych_answers
            .insert("pace".to_string(), "fast".to_string());
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::Established);

        let batch = synthesize(&input, 0);
        let mut seen = std::collections::HashSet::new();
        for directive in &batch {
            assert!(seen.insert(directive.focus), "duplicate focus {:?}", directive.focus);
        }
    }

    #[test]
    fn test_new_user_with_declared_genre_gets_genre_anchor() {
        // Stage below developing means the author rule cannot fire
        let patterns = PatternSummary::default();
        let mut profile = DeclaredProfile::new();
        profile.genres = vec!["Fantasy".to_string()];
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        let batch = synthesize(&input, 0);
        assert_eq!(batch[0].focus, FocusArea::Genre);
        assert!(batch[0].query.contains("fantasy"));
        assert_eq!(batch[0].expected_genre.as_deref(), Some("fantasy"));
    }

    #[test]
    fn test_established_user_gets_author_anchor() {
        let liked = thriller_history(20);
        let patterns = analyze(&liked, &[]);
        assert!(patterns.avoid_genres.is_empty());
        assert!(patterns.avoid_authors.is_empty());

        let profile = DeclaredProfile::new();
        let tags = normalize(&profile);
        let stage = LearningStage::from_interactions(20);
        assert_eq!(stage, LearningStage::Established);

        let batch = synthesize(&input_for(&patterns, &profile, &tags, stage), 0);
        assert_eq!(batch[0].focus, FocusArea::Author);
        assert!(batch[0].query.contains("lee child"));
        assert_eq!(batch[0].confidence, Confidence::High);
    }

    #[test]
    fn test_rotation_varies_author_selection() {
        let mut liked = thriller_history(10);
        for (i, signal) in liked.iter_mut().enumerate() {
            signal.author = format!("Author {}", i % 3);
        }
        let patterns = analyze(&liked, &[]);
        let profile = DeclaredProfile::new();
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::Developing);

        let first = synthesize(&input, 0);
        let second = synthesize(&input, 1);
        assert_ne!(first[0].query, second[0].query);

        // Same rotation reproduces the same batch
        let replay = synthesize(&input, 0);
        assert_eq!(first, replay);
    }

    #[test]
    fn test_no_signals_no_genres_falls_back_to_bestsellers() {
        let patterns = PatternSummary::default();
        let profile = DeclaredProfile::new();
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        let batch = synthesize(&input, 0);
        assert_eq!(batch[0].query, "bestseller fiction");
        assert_eq!(batch[0].focus, FocusArea::Popular);
    }

    #[test]
    fn test_avoided_genre_discards_declared_genre_anchor() {
        let liked = vec![BookSignal::new("b1", "Good", "Kept Author")
            .with_categories(vec!["mystery".to_string()])];
        let disliked = vec![BookSignal::new("b2", "Bad", "Bad Author")
            .with_categories(vec!["horror".to_string()])];
        let patterns = analyze(&liked, &disliked);

        let mut profile = DeclaredProfile::new();
        profile.genres = vec!["Horror".to_string()];
        let tags = normalize(&profile);
        // Learning stage: author rule off, genre rule conflicts, bestsellers win
        let input = input_for(&patterns, &profile, &tags, LearningStage::Learning);

        let batch = synthesize(&input, 0);
        assert_eq!(batch[0].query, "bestseller fiction");
    }

    #[test]
    fn test_avoid_set_covering_pad_vocabulary_still_fills_batch() {
        // Every pad query mentions fiction, literature or bestsellers, so an
        // avoid-set built from those words conflicts with the whole pad list
        let disliked = vec![
            BookSignal::new("b1", "Bad", "X").with_categories(vec!["fiction".to_string()]),
            BookSignal::new("b2", "Bad2", "Y").with_categories(vec!["literature".to_string()]),
            BookSignal::new("b3", "Bad3", "Z").with_categories(vec!["bestsellers".to_string()]),
        ];
        let patterns = analyze(&[], &disliked);

        let profile = DeclaredProfile::new();
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        let batch = synthesize(&input, 0);
        assert_eq!(batch.len(), BATCH_SIZE);
        // Conflicting entries are kept at reduced confidence, never dropped
        for directive in &batch {
            assert!(!directive.query.is_empty());
            assert_eq!(directive.confidence, Confidence::Medium);
        }
    }

    #[test]
    fn test_all_rules_conflicting_downgrades_confidence() {
        let disliked = vec![
            BookSignal::new("b1", "Bad", "X").with_categories(vec!["horror".to_string()]),
            BookSignal::new("b2", "Bad2", "Y").with_categories(vec!["bestseller".to_string()]),
        ];
        let patterns = analyze(&[], &disliked);

        let mut profile = DeclaredProfile::new();
        profile.genres = vec!["Horror".to_string()];
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        // Genre anchor conflicts with "horror", bestseller pad conflicts with
        // "bestseller": the first candidate is kept but downgraded
        let batch = synthesize(&input, 0);
        assert_eq!(batch[0].focus, FocusArea::Genre);
        assert_eq!(batch[0].confidence, Confidence::Medium);
    }

    #[test]
    fn test_vibe_beats_goal_in_mood_slot() {
        let patterns = PatternSummary::default();
        let mut profile = DeclaredProfile::new();
        profile.story_vibes = vec!["epic".to_string()];
        profile.goals = vec!["relax".to_string()];
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        let batch = synthesize(&input, 0);
        let mood = batch.iter().find(|d| d.focus == FocusArea::Vibe).unwrap();
        assert!(mood.query.contains("epic fantasy"));
        assert!(!batch.iter().any(|d| d.focus == FocusArea::Goal));
    }

    #[test]
    fn test_goal_used_when_no_vibe_maps() {
        let patterns = PatternSummary::default();
        let mut profile = DeclaredProfile::new();
        profile.story_vibes = vec!["unmapped_vibe".to_string()];
        profile.goals = vec!["learn".to_string()];
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        let batch = synthesize(&input, 0);
        let goal = batch.iter().find(|d| d.focus == FocusArea::Goal).unwrap();
        assert_eq!(goal.query, "narrative nonfiction");
    }

    #[test]
    fn test_psych_slot_skipped_without_mapped_answers() {
        let patterns = PatternSummary::default();
        let mut profile = DeclaredProfile::new();
        profile
            .psych_answers
            .insert("unknown_question".to_string(), "whatever".to_string());
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        // Still five directives, the gap filled by pads instead
        let batch = synthesize(&input, 0);
        assert_eq!(batch.len(), BATCH_SIZE);
    }

    #[test]
    fn test_spanish_users_get_spanish_pads() {
        let patterns = PatternSummary::default();
        let mut profile = DeclaredProfile::new();
        profile.language = "es".to_string();
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::New);

        let batch = synthesize(&input, 0);
        assert!(batch.iter().any(|d| d.query.contains("español")
            || d.query.contains("García Márquez")));
    }

    #[test]
    fn test_prompt_includes_avoids_and_shape() {
        let liked = vec![BookSignal::new("b1", "Good", "Liked Author")
            .with_categories(vec!["fantasy".to_string()])];
        let disliked = vec![BookSignal::new("b2", "Bad", "Hated Author")
            .with_categories(vec!["horror".to_string()])];
        let patterns = analyze(&liked, &disliked);
        let profile = DeclaredProfile::new();
        let tags = normalize(&profile);
        let input = input_for(&patterns, &profile, &tags, LearningStage::Developing);

        let prompt = build_prompt(&input);
        assert!(prompt.contains("NEVER recommend these genres: horror"));
        assert!(prompt.contains("hated author"));
        assert!(prompt.contains("JSON array of 3 to 5"));
    }
}
