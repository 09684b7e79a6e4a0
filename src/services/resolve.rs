use crate::{
    models::{RecommendationDirective, ResolvedDirective},
    services::{patterns::PatternSummary, providers::CatalogProvider, scoring},
};

/// Candidates kept per directive after resolution
const CANDIDATES_PER_DIRECTIVE: usize = 3;

/// Resolves a directive batch against the catalog, in parallel
///
/// Each directive is an independent read-only query, so lookups run as
/// separate tasks; the returned batch preserves the original directive order
/// for a reproducible layout. A directive whose search fails or comes back
/// empty is dropped from the batch while the others proceed. If the caller
/// drops the returned future, spawned lookups detach and run to completion
/// but their results are discarded; an abandoned cycle never yields a
/// partially displayed batch.
pub async fn resolve_batch(
    provider: &dyn CatalogProvider,
    directives: Vec<RecommendationDirective>,
    patterns: &PatternSummary,
    language: &str,
) -> Vec<ResolvedDirective> {
    let mut tasks = Vec::with_capacity(directives.len());

    for directive in directives {
        let provider = provider.clone_for_task();
        let language = language.to_string();
        let query = directive.query.clone();
        let task = tokio::spawn(async move { provider.search(&query, &language).await });
        tasks.push((directive, task));
    }

    let mut resolved = Vec::with_capacity(tasks.len());

    for (directive, task) in tasks {
        match task.await {
            Ok(Ok(candidates)) if !candidates.is_empty() => {
                let scored = candidates
                    .into_iter()
                    .take(CANDIDATES_PER_DIRECTIVE)
                    .map(|book| scoring::score_candidate(book, directive.confidence, patterns))
                    .collect();
                resolved.push(ResolvedDirective {
                    directive,
                    candidates: scored,
                });
            }
            Ok(Ok(_)) => {
                tracing::debug!(query = %directive.query, "Directive resolved to no candidates, dropping");
            }
            Ok(Err(e)) => {
                tracing::warn!(query = %directive.query, error = %e, "Directive resolution failed, dropping");
            }
            Err(e) => {
                tracing::error!(query = %directive.query, error = %e, "Task join error");
            }
        }
    }

    resolved
}
