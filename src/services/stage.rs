use serde::{Deserialize, Serialize};

/// Coarse maturity bucket of a user's interaction history
///
/// Governs how much weight behavioral signal gets versus declared
/// preference during query synthesis. Total step function of the
/// interaction count; a fixed count always maps to the same stage.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum LearningStage {
    New,
    Learning,
    Developing,
    Established,
    Expert,
}

impl LearningStage {
    /// Buckets a total interaction count (|liked| + |disliked| + |read|)
    pub fn from_interactions(count: usize) -> Self {
        match count {
            0 => LearningStage::New,
            1..=4 => LearningStage::Learning,
            5..=14 => LearningStage::Developing,
            15..=29 => LearningStage::Established,
            _ => LearningStage::Expert,
        }
    }

    /// Whether behavioral patterns should dominate declared preferences
    pub fn trusts_behavior(&self) -> bool {
        *self >= LearningStage::Developing
    }
}
