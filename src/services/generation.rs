use std::sync::Arc;

use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Confidence, FocusArea, RecommendationDirective},
};

use super::providers::TextGenerator;
use super::synthesizer::{self, SynthesisInput};

/// A valid batch holds between three and five directives
pub const MIN_DIRECTIVES: usize = 3;
pub const MAX_DIRECTIVES: usize = 5;

/// A source of recommendation directives
///
/// Two implementations share this seam: the deterministic synthesizer, which
/// is the single source of truth for the rule table, and the generative
/// source, whose output is merely validated against the same shape.
#[async_trait::async_trait]
pub trait DirectiveSource: Send + Sync {
    async fn directives(
        &self,
        input: &SynthesisInput<'_>,
        rotation: usize,
    ) -> AppResult<Vec<RecommendationDirective>>;
}

/// Rule-table synthesis without generative text; never fails
pub struct DeterministicSource;

#[async_trait::async_trait]
impl DirectiveSource for DeterministicSource {
    async fn directives(
        &self,
        input: &SynthesisInput<'_>,
        rotation: usize,
    ) -> AppResult<Vec<RecommendationDirective>> {
        Ok(synthesizer::synthesize(input, rotation))
    }
}

/// Generative synthesis: one completion call, then strict shape validation
pub struct GenerativeSource {
    generator: Arc<dyn TextGenerator>,
}

impl GenerativeSource {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

#[async_trait::async_trait]
impl DirectiveSource for GenerativeSource {
    async fn directives(
        &self,
        input: &SynthesisInput<'_>,
        rotation: usize,
    ) -> AppResult<Vec<RecommendationDirective>> {
        let _ = rotation; // diversity comes from the model, not the rule table
        let prompt = synthesizer::build_prompt(input);
        let raw = self.generator.complete(&prompt).await?;
        parse_directives(&raw, input.patterns)
    }
}

/// Loosely-shaped entry as the model tends to return it
#[derive(Debug, Deserialize)]
struct RawDirective {
    #[serde(default)]
    query: String,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    focus: Option<FocusArea>,
    #[serde(default)]
    expected_genre: Option<String>,
    #[serde(default)]
    confidence: Option<Confidence>,
}

/// Validates a raw model response into a directive batch
///
/// Strips code fences, locates the JSON array, drops entries with an empty
/// query or reasoning, and truncates to five. Fewer than three well-formed
/// entries or two entries sharing a focus area is a validation failure; an
/// entry whose query touches the user's avoid-set is kept at reduced
/// confidence, matching the deterministic path's conflict rule.
fn parse_directives(
    raw: &str,
    patterns: &crate::services::patterns::PatternSummary,
) -> AppResult<Vec<RecommendationDirective>> {
    let body = extract_json_array(raw)
        .ok_or_else(|| AppError::Generation("Response contains no JSON array".to_string()))?;

    let entries: Vec<RawDirective> = serde_json::from_str(body)
        .map_err(|e| AppError::Generation(format!("Malformed JSON: {}", e)))?;

    let directives: Vec<RecommendationDirective> = entries
        .into_iter()
        .filter(|entry| !entry.query.trim().is_empty() && !entry.reasoning.trim().is_empty())
        .take(MAX_DIRECTIVES)
        .map(|entry| {
            let confidence = if synthesizer::conflicts_with_avoid(&entry.query, patterns) {
                Confidence::Medium
            } else {
                entry.confidence.unwrap_or(Confidence::Medium)
            };
            let mut directive = RecommendationDirective::new(
                entry.query,
                entry.reasoning,
                entry.focus.unwrap_or(FocusArea::Discovery),
                confidence,
            );
            directive.expected_genre = entry.expected_genre;
            directive
        })
        .collect();

    if directives.len() < MIN_DIRECTIVES {
        return Err(AppError::Generation(format!(
            "Only {} well-formed directives in response",
            directives.len()
        )));
    }

    let mut seen = std::collections::HashSet::new();
    if !directives.iter().all(|d| seen.insert(d.focus)) {
        return Err(AppError::Generation(
            "Duplicate focus areas in response".to_string(),
        ));
    }

    Ok(directives)
}

fn extract_json_array(raw: &str) -> Option<&str> {
    let trimmed = raw.trim().trim_start_matches("```json").trim_start_matches("```");
    let start = trimmed.find('[')?;
    let end = trimmed.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&trimmed[start..=end])
}

/// Issues at most one generation attempt and falls back deterministically
///
/// Missing credential, transport failure, timeout, malformed output and
/// too-short batches all take the identical fallback path: callers cannot
/// distinguish failure causes from the output shape. No retries; a degraded
/// non-generative batch beats added latency on a stateless prompt that
/// would likely fail the same way again.
pub struct DirectiveController {
    generative: Option<GenerativeSource>,
    fallback: DeterministicSource,
}

impl DirectiveController {
    pub fn new(generator: Option<Arc<dyn TextGenerator>>) -> Self {
        Self {
            generative: generator.map(GenerativeSource::new),
            fallback: DeterministicSource,
        }
    }

    /// Produces a directive batch; infallible by design
    pub async fn generate(
        &self,
        input: &SynthesisInput<'_>,
        rotation: usize,
    ) -> Vec<RecommendationDirective> {
        match &self.generative {
            Some(source) => match source.directives(input, rotation).await {
                Ok(directives) => {
                    tracing::info!(count = directives.len(), "Generative batch accepted");
                    return directives;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Generation failed, using deterministic fallback");
                }
            },
            None => {
                tracing::debug!("No generative credential configured, using deterministic synthesis");
            }
        }

        // The deterministic source cannot fail
        self.fallback
            .directives(input, rotation)
            .await
            .unwrap_or_default()
    }
}
