mod book;
mod directive;
mod profile;
mod signals;

pub use book::{
    BookCandidate, BookId, GbIndustryIdentifier, GbSearchResponse, GbVolume, GbVolumeInfo,
    OlBookDetails, OlBookMap, OlDoc, OlSearchResponse,
};
pub use directive::{
    Confidence, FocusArea, MatchTier, RecommendationDirective, ResolvedDirective, ScoredCandidate,
    MAX_REASONING_LEN,
};
pub use profile::DeclaredProfile;
pub use signals::{BookSignal, SignalKind, UserSignals};
