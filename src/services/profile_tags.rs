use crate::models::DeclaredProfile;

/// Fixed onboarding-id lookup tables
///
/// Unknown ids pass through as their raw id rather than failing, so schema
/// drift in upstream preference data never blocks recommendation synthesis.
const GOAL_DESCRIPTIONS: &[(&str, &str)] = &[
    ("relax", "unwind and de-stress"),
    ("learn", "learn something new"),
    ("escape", "escape into another world"),
    ("grow", "personal growth"),
    ("habit", "build a steady reading habit"),
    ("connect", "discuss books with others"),
];

const READER_TYPE_DESCRIPTIONS: &[(&str, &str)] = &[
    ("casual", "casual reader who picks books up now and then"),
    ("bookworm", "devoted reader who always has a book going"),
    ("explorer", "adventurous reader who tries unfamiliar genres"),
    ("returning", "reader getting back into the habit"),
    ("mood", "mood reader who chooses by feeling"),
];

const VIBE_DESCRIPTIONS: &[(&str, &str)] = &[
    ("cozy", "warm, comforting stories"),
    ("dark", "dark, atmospheric stories"),
    ("epic", "sweeping, large-scale stories"),
    ("funny", "light, humorous stories"),
    ("thoughtful", "quiet, reflective stories"),
    ("twisty", "stories full of twists and reveals"),
];

/// (question id, answer id) -> description of what the answer says about taste
const PSYCH_DESCRIPTIONS: &[(&str, &str, &str)] = &[
    ("evening", "quiet", "prefers calm, immersive evening reads"),
    ("evening", "social", "enjoys stories about people and relationships"),
    ("conflict", "head-on", "drawn to direct, confrontational protagonists"),
    ("conflict", "avoid", "prefers low-conflict, gentle narratives"),
    ("world", "real", "grounded in the real world"),
    ("world", "imagined", "drawn to invented worlds and speculative settings"),
    ("pace", "slow", "savors slow-burning stories"),
    ("pace", "fast", "wants momentum and short chapters"),
];

/// Human-readable expansion of a user's declared onboarding answers
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileTags {
    pub goals: Vec<String>,
    pub reader_type: Option<String>,
    pub vibes: Vec<String>,
    pub psych_traits: Vec<String>,
}

/// Maps free-form onboarding answers into descriptive tags
pub fn normalize(profile: &DeclaredProfile) -> ProfileTags {
    let goals = profile
        .goals
        .iter()
        .map(|id| lookup(GOAL_DESCRIPTIONS, id))
        .collect();

    let reader_type = profile
        .reader_type
        .as_deref()
        .map(|id| lookup(READER_TYPE_DESCRIPTIONS, id));

    let vibes = profile
        .story_vibes
        .iter()
        .map(|id| lookup(VIBE_DESCRIPTIONS, id))
        .collect();

    let mut psych_traits: Vec<String> = profile
        .psych_answers
        .iter()
        .map(|(question, answer)| lookup_psych(question, answer))
        .collect();
    // HashMap iteration order is arbitrary; keep output reproducible
    psych_traits.sort();

    ProfileTags {
        goals,
        reader_type,
        vibes,
        psych_traits,
    }
}

/// Description for a single goal id, raw id if unknown
pub fn describe_goal(id: &str) -> String {
    lookup(GOAL_DESCRIPTIONS, id)
}

fn lookup(table: &[(&str, &str)], id: &str) -> String {
    table
        .iter()
        .find(|(key, _)| *key == id)
        .map(|(_, description)| description.to_string())
        .unwrap_or_else(|| id.to_string())
}

fn lookup_psych(question: &str, answer: &str) -> String {
    PSYCH_DESCRIPTIONS
        .iter()
        .find(|(q, a, _)| *q == question && *a == answer)
        .map(|(_, _, description)| description.to_string())
        .unwrap_or_else(|| format!("{}: {}", question, answer))
}
