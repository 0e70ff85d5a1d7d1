// Humanizer Data Models
// Request/response shapes of the HTTP API

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::services::detection::{DetectionReport, ParagraphScore};
use crate::services::sentences::{LineReport, SentenceReport};
use crate::services::humanizer::HumanizeOutcome;

// ============ Humanize ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeRequest {
    #[serde(default)]
    pub text: String,
    /// Paragraph id (`p0`, `p1`, ...) -> AI-likelihood score.
    #[serde(default, alias = "aiScores", alias = "ai_scores")]
    pub scores: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanizeResponse {
    pub text: String,
    pub highlights: Vec<bool>,
    pub scores: HashMap<String, f64>,
    pub request_id: String,
}

impl HumanizeResponse {
    pub fn new(outcome: HumanizeOutcome, request_id: String) -> Self {
        Self {
            text: outcome.text,
            highlights: outcome.highlights,
            scores: outcome.scores,
            request_id,
        }
    }
}

// ============ Detection ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DetectRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectResponse {
    pub overall_ai_probability: f64,
    pub paragraphs: Vec<ParagraphScore>,
    pub scores: HashMap<String, f64>,
    pub request_id: String,
}

impl DetectResponse {
    pub fn new(report: DetectionReport, request_id: String) -> Self {
        Self {
            overall_ai_probability: report.overall_ai_probability,
            paragraphs: report.paragraphs,
            scores: report.scores,
            request_id,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceDetectResponse {
    pub title: String,
    pub lines: Vec<LineReport>,
    pub overall_score: f64,
    pub request_id: String,
}

impl SentenceDetectResponse {
    pub fn new(report: SentenceReport, request_id: String) -> Self {
        Self {
            title: report.title,
            lines: report.lines,
            overall_score: report.overall_score,
            request_id,
        }
    }
}

// ============ Preprocess ============

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PreprocessRequest {
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreprocessResponse {
    pub text: String,
}

// ============ Health ============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsConfigured {
    pub rewriter: bool,
    pub detector: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub models_configured: ModelsConfigured,
    pub cache_entries: usize,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
