use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of recorded user interaction with a book
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    Liked,
    Disliked,
    Read,
}

impl SignalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignalKind::Liked => "liked",
            SignalKind::Disliked => "disliked",
            SignalKind::Read => "read",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "liked" => Some(SignalKind::Liked),
            "disliked" => Some(SignalKind::Disliked),
            "read" => Some(SignalKind::Read),
            _ => None,
        }
    }
}

/// A single recorded interaction between a user and a book
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookSignal {
    /// Stable book identifier (ISBN or catalog volume id)
    pub book_id: String,
    pub title: String,
    pub author: String,
    /// Zero or more category labels as reported by the catalog
    #[serde(default)]
    pub categories: Vec<String>,
    pub recorded_at: DateTime<Utc>,
}

impl BookSignal {
    pub fn new(book_id: impl Into<String>, title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            book_id: book_id.into(),
            title: title.into(),
            author: author.into(),
            categories: Vec::new(),
            recorded_at: Utc::now(),
        }
    }

    pub fn with_categories(mut self, categories: Vec<String>) -> Self {
        self.categories = categories;
        self
    }
}

/// Append-only behavioral history for one user
///
/// Liked and disliked are disjoint by book id: recording a like for a
/// currently-disliked book moves it (and vice versa). `read` is independent.
/// Re-adding an id to the same set is a no-op.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserSignals {
    pub liked: Vec<BookSignal>,
    pub disliked: Vec<BookSignal>,
    pub read: Vec<BookSignal>,
}

impl UserSignals {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a signal, preserving the idempotence and disjointness rules
    pub fn add(&mut self, kind: SignalKind, signal: BookSignal) {
        match kind {
            SignalKind::Liked => {
                self.disliked.retain(|s| s.book_id != signal.book_id);
                Self::push_if_absent(&mut self.liked, signal);
            }
            SignalKind::Disliked => {
                self.liked.retain(|s| s.book_id != signal.book_id);
                Self::push_if_absent(&mut self.disliked, signal);
            }
            SignalKind::Read => Self::push_if_absent(&mut self.read, signal),
        }
    }

    /// Removes a book from every signal set
    pub fn remove(&mut self, book_id: &str) {
        self.liked.retain(|s| s.book_id != book_id);
        self.disliked.retain(|s| s.book_id != book_id);
        self.read.retain(|s| s.book_id != book_id);
    }

    pub fn of_kind(&self, kind: SignalKind) -> &[BookSignal] {
        match kind {
            SignalKind::Liked => &self.liked,
            SignalKind::Disliked => &self.disliked,
            SignalKind::Read => &self.read,
        }
    }

    /// Total interaction count used for learning-stage classification
    pub fn interaction_count(&self) -> usize {
        self.liked.len() + self.disliked.len() + self.read.len()
    }

    fn push_if_absent(list: &mut Vec<BookSignal>, signal: BookSignal) {
        if !list.iter().any(|s| s.book_id == signal.book_id) {
            list.push(signal);
        }
    }
}
