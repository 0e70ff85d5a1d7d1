// Humanization Pipeline
// segment -> score lookup -> cache check -> conditional rewrite -> restore -> reassemble

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

use super::paragraphs::{paragraph_id, restore_format, split_paragraphs, ParagraphUnit};
use super::rewrite_cache::RewriteCache;
use super::rewriter::RewriteModel;
use super::text_processor::truncate_chars;

/// Scores above this are rewritten; cached rewrites are trusted only at or below it.
pub const ACCEPT_THRESHOLD: f64 = 0.3;
/// Upper bound on the paragraph text handed to the rewrite model.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 2048;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanizeOutcome {
    pub text: String,
    pub highlights: Vec<bool>,
    pub scores: HashMap<String, f64>,
}

/// What happened to one paragraph during a run.
#[derive(Debug, Clone, PartialEq)]
enum ParagraphAction {
    Cached(String),
    Rewritten(String),
    Failed,
    Kept,
}

/// Rewriting service that owns the rewrite cache.
///
/// Built once at startup and shared behind a lock; `humanize` takes `&mut self`
/// so runs against the same cache never interleave.
pub struct Humanizer<R> {
    model: R,
    cache: RewriteCache,
    max_input_chars: usize,
}

impl<R: RewriteModel> Humanizer<R> {
    pub fn new(model: R, cache: RewriteCache) -> Self {
        Self {
            model,
            cache,
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
        }
    }

    pub fn with_max_input_chars(mut self, max_input_chars: usize) -> Self {
        self.max_input_chars = max_input_chars.max(1);
        self
    }

    pub fn cache(&self) -> &RewriteCache {
        &self.cache
    }

    pub fn model(&self) -> &R {
        &self.model
    }

    /// Rewrite the paragraphs of `text` whose score marks them as AI-generated.
    ///
    /// `scores` is keyed by positional paragraph id (`p0`, `p1`, ...); missing
    /// ids count as 0. Rewrite failures fall back to the original paragraph and
    /// never fail the run.
    pub async fn humanize(&mut self, text: &str, scores: &HashMap<String, f64>) -> HumanizeOutcome {
        let paragraphs = split_paragraphs(text);
        info!("[HUMANIZER] Processing {} paragraphs", paragraphs.len());

        let mut parts = Vec::with_capacity(paragraphs.len());
        let mut highlights = Vec::with_capacity(paragraphs.len());
        let mut updated_scores = HashMap::with_capacity(paragraphs.len());
        let (mut rewritten, mut cached, mut failed) = (0usize, 0usize, 0usize);

        for (i, para) in paragraphs.iter().enumerate() {
            let para_id = paragraph_id(i);
            let score = scores.get(&para_id).copied().unwrap_or(0.0);

            match self.process_paragraph(i, para, score).await {
                ParagraphAction::Cached(text) => {
                    cached += 1;
                    parts.push(text);
                    highlights.push(false);
                    updated_scores.insert(para_id, score);
                }
                ParagraphAction::Rewritten(text) => {
                    rewritten += 1;
                    parts.push(text);
                    highlights.push(true);
                    updated_scores.insert(para_id, 0.0);
                }
                ParagraphAction::Failed => {
                    failed += 1;
                    parts.push(para.original.clone());
                    highlights.push(false);
                    updated_scores.insert(para_id, score);
                }
                ParagraphAction::Kept => {
                    parts.push(para.original.clone());
                    highlights.push(false);
                    updated_scores.insert(para_id, score);
                }
            }
        }

        let persisted = self.cache.persist();

        info!(
            paragraphs = paragraphs.len(),
            rewritten, cached, failed, persisted, "humanize.completed"
        );

        HumanizeOutcome {
            text: parts.join("\n\n").trim().to_string(),
            highlights,
            scores: updated_scores,
        }
    }

    async fn process_paragraph(&mut self, index: usize, para: &ParagraphUnit, score: f64) -> ParagraphAction {
        if score <= ACCEPT_THRESHOLD {
            if let Some(hit) = self.cache.lookup(&para.text) {
                debug!(paragraph = index, score, "humanize.cache_hit");
                return ParagraphAction::Cached(hit.to_string());
            }
        }

        if score > ACCEPT_THRESHOLD {
            let input = truncate_chars(&para.text, self.max_input_chars);
            return match self.model.rewrite(input).await {
                Ok(decoded) => {
                    let formatted = restore_format(&para.original, &decoded);
                    self.cache.store(para.text.clone(), formatted.clone());
                    ParagraphAction::Rewritten(formatted)
                }
                Err(e) => {
                    warn!("[HUMANIZER] Error processing paragraph {}: {}", index, e);
                    ParagraphAction::Failed
                }
            };
        }

        ParagraphAction::Kept
    }
}
