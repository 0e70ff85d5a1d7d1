// Detection Service
// Paragraph-level AI-likelihood scoring keyed by the humanizer's own segmentation

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use thiserror::Error;
use tracing::{info, warn};

use super::paragraphs::{paragraph_id, split_paragraphs};
use super::providers::{extract_json, ChatOptions, ProviderClient, ProviderError};

pub const DEFAULT_AI_THRESHOLD: f64 = 0.65;
pub const DEFAULT_MIN_PARAGRAPH_CHARS: usize = 20;

const DETECT_MAX_TOKENS: i32 = 64;

const DETECT_SYSTEM_PROMPT: &str = r#"Sen Türkçe metinlerde yapay zeka ile üretilmiş içeriği tespit eden bir uzmansın.
Verilen paragrafın bir dil modeli tarafından yazılmış olma olasılığını 0 ile 1 arasında değerlendir.
Kalıplaşmış pazarlama dili, genel geçer övgüler ve tekdüze cümle yapısı yapay zeka işaretidir;
kişisel deneyim, günlük dil ve düzensiz anlatım insan işaretidir.
Sadece JSON döndür: {"probability": 0.0}"#;

#[derive(Error, Debug)]
pub enum DetectError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("malformed detector output: {0}")]
    Malformed(String),
}

/// External detector collaborator: probability in [0, 1] that `text` is machine-written.
pub trait Detector {
    fn score(&self, text: &str) -> impl Future<Output = Result<f64, DetectError>> + Send;
}

#[derive(Debug, Deserialize)]
struct Judgment {
    #[serde(alias = "ai_probability", alias = "aiProbability")]
    probability: f64,
}

/// [`Detector`] that asks a chat model for a JSON judgment.
#[derive(Clone)]
pub struct ChatDetector {
    client: ProviderClient,
}

impl ChatDetector {
    pub fn new(client: ProviderClient) -> Self {
        Self { client }
    }

    pub fn is_configured(&self) -> bool {
        self.client.has_api_key()
    }
}

impl Detector for ChatDetector {
    async fn score(&self, text: &str) -> Result<f64, DetectError> {
        let options = ChatOptions {
            max_tokens: DETECT_MAX_TOKENS,
            temperature: 0.0,
            json_format: true,
        };
        let result = self.client.chat(DETECT_SYSTEM_PROMPT, text, options).await?;
        parse_probability(&result.content)
    }
}

fn parse_probability(content: &str) -> Result<f64, DetectError> {
    let json = extract_json(content);
    let judgment: Judgment =
        serde_json::from_str(&json).map_err(|e| DetectError::Malformed(e.to_string()))?;
    if !judgment.probability.is_finite() {
        return Err(DetectError::Malformed("non-finite probability".to_string()));
    }
    Ok(judgment.probability.clamp(0.0, 1.0))
}

#[derive(Debug, Clone, Copy)]
pub struct DetectionOptions {
    /// Paragraphs above this probability are reported as AI-generated.
    pub threshold: f64,
    /// Paragraphs shorter than this (trimmed, in chars) are not scored.
    pub min_chars: usize,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_AI_THRESHOLD,
            min_chars: DEFAULT_MIN_PARAGRAPH_CHARS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParagraphScore {
    pub id: String,
    pub text: String,
    pub ai_probability: f64,
    pub is_ai: bool,
    pub confidence: f64,
    /// False when the paragraph was too short or the detector failed.
    pub scored: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectionReport {
    pub overall_ai_probability: f64,
    pub paragraphs: Vec<ParagraphScore>,
    /// Ready to pass back as the humanize score map.
    pub scores: HashMap<String, f64>,
}

pub(crate) fn round4(x: f64) -> f64 {
    (x * 10_000.0).round() / 10_000.0
}

/// Score every paragraph of `text`.
///
/// Ids come from the same segmentation the humanizer uses, and every
/// paragraph gets one even when it is skipped, so the returned `scores` line up
/// with a later humanize call on the same text.
pub async fn detect_paragraphs<D: Detector>(
    detector: &D,
    text: &str,
    options: DetectionOptions,
) -> DetectionReport {
    let paragraphs = split_paragraphs(text);
    info!("[DETECTION] Scoring {} paragraphs", paragraphs.len());

    let mut results = Vec::with_capacity(paragraphs.len());
    let mut scores = HashMap::with_capacity(paragraphs.len());

    for (i, para) in paragraphs.iter().enumerate() {
        let id = paragraph_id(i);

        let probability = if para.text.trim().chars().count() < options.min_chars {
            None
        } else {
            match detector.score(&para.text).await {
                Ok(p) => Some(round4(p)),
                Err(e) => {
                    warn!("[DETECTION] Scoring failed for paragraph {}: {}", i, e);
                    None
                }
            }
        };

        let p = probability.unwrap_or(0.0);
        scores.insert(id.clone(), p);
        results.push(ParagraphScore {
            id,
            text: para.text.clone(),
            ai_probability: p,
            is_ai: probability.is_some() && p > options.threshold,
            confidence: if probability.is_some() { round4((p - 0.5).abs() * 2.0) } else { 0.0 },
            scored: probability.is_some(),
        });
    }

    let scored: Vec<f64> = results.iter().filter(|r| r.scored).map(|r| r.ai_probability).collect();
    let overall = if scored.is_empty() {
        0.0
    } else {
        round4(scored.iter().sum::<f64>() / scored.len() as f64)
    };

    info!(
        paragraphs = results.len(),
        scored = scored.len(),
        overall,
        "detection.completed"
    );

    DetectionReport {
        overall_ai_probability: overall,
        paragraphs: results,
        scores,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scores by keyword; fails on paragraphs containing "HATA".
    struct KeywordDetector;

    impl Detector for KeywordDetector {
        async fn score(&self, text: &str) -> Result<f64, DetectError> {
            if text.contains("HATA") {
                return Err(DetectError::Malformed("scripted".to_string()));
            }
            if text.contains("gelişmiş teknoloji") {
                Ok(0.9)
            } else {
                Ok(0.2)
            }
        }
    }

    #[test]
    fn test_parse_probability() {
        assert_eq!(parse_probability(r#"{"probability": 0.42}"#).unwrap(), 0.42);
        assert_eq!(parse_probability("Sonuç: {\"ai_probability\": 1.7}").unwrap(), 1.0);
        assert!(parse_probability("emin değilim").is_err());
    }

    #[tokio::test]
    async fn test_scores_are_keyed_by_position() {
        let text = "Bu ürün gelişmiş teknoloji kullanarak tasarlanmıştır.\n\nKargo çok hızlıydı, tavsiye ederim.";
        let report = detect_paragraphs(&KeywordDetector, text, DetectionOptions::default()).await;

        assert_eq!(report.paragraphs.len(), 2);
        assert_eq!(report.scores["p0"], 0.9);
        assert_eq!(report.scores["p1"], 0.2);
        assert!(report.paragraphs[0].is_ai);
        assert!(!report.paragraphs[1].is_ai);
        assert_eq!(report.paragraphs[0].confidence, 0.8);
        assert_eq!(report.overall_ai_probability, 0.55);
    }

    #[tokio::test]
    async fn test_short_and_failed_paragraphs_keep_their_ids() {
        let text = "Kısa başlık\n\nHATA içeren uzun bir paragraf burada.\n\nBu ürün gelişmiş teknoloji ile üretilmiştir.";
        let report = detect_paragraphs(&KeywordDetector, text, DetectionOptions::default()).await;

        assert_eq!(report.paragraphs.len(), 3);
        assert!(!report.paragraphs[0].scored);
        assert!(!report.paragraphs[1].scored);
        assert_eq!(report.scores["p0"], 0.0);
        assert_eq!(report.scores["p1"], 0.0);
        assert_eq!(report.scores["p2"], 0.9);
        assert_eq!(report.overall_ai_probability, 0.9);
    }

    #[tokio::test]
    async fn test_empty_text_reports_nothing() {
        let report = detect_paragraphs(&KeywordDetector, "", DetectionOptions::default()).await;
        assert!(report.paragraphs.is_empty());
        assert_eq!(report.overall_ai_probability, 0.0);
    }
}
