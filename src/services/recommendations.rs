use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::{
    db::SignalStore,
    error::AppResult,
    models::{DeclaredProfile, ResolvedDirective},
    services::{
        generation::DirectiveController,
        patterns, profile_tags,
        providers::CatalogProvider,
        resolve,
        stage::LearningStage,
        synthesizer::SynthesisInput,
    },
};

/// One recommendation cycle's output, ready for the client to render
///
/// The shape is identical whether the directives came from the generative
/// path or the deterministic rule table; callers cannot tell the two apart.
#[derive(Debug, Serialize)]
pub struct RecommendationBatch {
    pub stage: LearningStage,
    pub directives: Vec<ResolvedDirective>,
}

/// Runs the sequential recommendation pipeline for one user
///
/// analyze -> normalize -> classify -> synthesize/generate -> resolve ->
/// score. All derived data is computed fresh per request from the signals
/// fetched for that request; nothing is shared across users or cached
/// between cycles.
pub struct RecommendationService {
    store: Arc<dyn SignalStore>,
    catalog: Arc<dyn CatalogProvider>,
    controller: DirectiveController,
    /// Counter feeding the synthesizer's rotation offset so repeated cycles
    /// do not anchor on the same favorite author every time
    rotation: AtomicUsize,
}

impl RecommendationService {
    pub fn new(
        store: Arc<dyn SignalStore>,
        catalog: Arc<dyn CatalogProvider>,
        controller: DirectiveController,
    ) -> Self {
        Self {
            store,
            catalog,
            controller,
            rotation: AtomicUsize::new(0),
        }
    }

    pub async fn recommend(
        &self,
        user_id: Uuid,
        profile: &DeclaredProfile,
    ) -> AppResult<RecommendationBatch> {
        let signals = self.store.load_all(user_id).await?;

        let summary = patterns::analyze(&signals.liked, &signals.disliked);
        let tags = profile_tags::normalize(profile);
        let stage = LearningStage::from_interactions(signals.interaction_count());

        tracing::info!(
            user_id = %user_id,
            stage = ?stage,
            liked = signals.liked.len(),
            disliked = signals.disliked.len(),
            has_patterns = summary.has_data,
            "Recommendation cycle started"
        );

        let input = SynthesisInput {
            patterns: &summary,
            profile,
            tags: &tags,
            stage,
        };

        let rotation = self.rotation.fetch_add(1, Ordering::Relaxed);
        let directives = self.controller.generate(&input, rotation).await;

        let resolved =
            resolve::resolve_batch(self.catalog.as_ref(), directives, &summary, &profile.language)
                .await;

        tracing::info!(
            user_id = %user_id,
            resolved = resolved.len(),
            "Recommendation cycle completed"
        );

        Ok(RecommendationBatch {
            stage,
            directives: resolved,
        })
    }
}
