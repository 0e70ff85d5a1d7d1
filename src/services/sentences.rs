// Sentence Report
// Line-by-line, sentence-by-sentence AI-likelihood scoring with a title line

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::detection::{round4, DetectionOptions, Detector};

const TERMINATORS: [char; 3] = ['.', '!', '?'];
const CLOSING_QUOTES: [char; 4] = ['"', '\'', '\u{201d}', '\u{2019}'];

/// Split one line into sentences.
///
/// A sentence ends at `.`, `!` or `?` (plus an optional closing quote) only
/// when whitespace or the end of the line follows, so `3.5` and `x.com` stay
/// whole and runs like `!!!` end a single sentence. A sentence never starts
/// with a terminator or whitespace. Trailing text without a terminator is the
/// last sentence.
pub fn split_sentences(line: &str) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    let mut sentences = Vec::new();
    let mut buffer = String::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];

        if buffer.is_empty() && (ch.is_whitespace() || TERMINATORS.contains(&ch)) {
            i += 1;
            continue;
        }
        buffer.push(ch);

        if TERMINATORS.contains(&ch) {
            let mut end = i + 1;
            if end < chars.len() && CLOSING_QUOTES.contains(&chars[end]) {
                end += 1;
            }
            if end == chars.len() || chars[end].is_whitespace() {
                buffer.extend(&chars[i + 1..end]);
                let sentence = buffer.trim().to_string();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                buffer.clear();
                i = end;
                continue;
            }
        }
        i += 1;
    }

    let rest = buffer.trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }
    sentences
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceScore {
    pub text: String,
    pub is_ai: bool,
    /// Detector probability, 0 when unscored.
    pub confidence: f64,
    pub scored: bool,
}

/// One source line after the title. Blank lines are kept with no sentences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineReport {
    pub sentences: Vec<SentenceScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceReport {
    pub title: String,
    pub lines: Vec<LineReport>,
    /// Mean over scored sentences.
    pub overall_score: f64,
}

/// Score every sentence of `text`, line by line.
///
/// The first non-empty line is the title and is not scored. Sentences the
/// detector fails on stay in the report with `scored = false` and are left out
/// of the overall mean.
pub async fn detect_sentences<D: Detector>(
    detector: &D,
    text: &str,
    options: DetectionOptions,
) -> SentenceReport {
    let lines: Vec<&str> = text.lines().collect();
    let title_index = lines.iter().position(|l| !l.trim().is_empty());
    let title = title_index.map(|i| lines[i].trim().to_string()).unwrap_or_default();
    let body = match title_index {
        Some(i) => &lines[i + 1..],
        None => &lines[..0],
    };

    info!("[DETECTION] Sentence report over {} lines", body.len());

    let mut reports = Vec::with_capacity(body.len());
    let mut scores = Vec::new();

    for line in body {
        let mut sentences = Vec::new();
        for sentence in split_sentences(line) {
            let probability = match detector.score(&sentence).await {
                Ok(p) => Some(round4(p)),
                Err(e) => {
                    warn!("[DETECTION] Sentence scoring failed: {}", e);
                    None
                }
            };
            if let Some(p) = probability {
                scores.push(p);
            }
            sentences.push(SentenceScore {
                text: sentence,
                is_ai: probability.is_some_and(|p| p > options.threshold),
                confidence: probability.unwrap_or(0.0),
                scored: probability.is_some(),
            });
        }
        reports.push(LineReport { sentences });
    }

    let overall = if scores.is_empty() {
        0.0
    } else {
        round4(scores.iter().sum::<f64>() / scores.len() as f64)
    };

    info!(
        lines = reports.len(),
        sentences = scores.len(),
        overall,
        "detection.sentences.completed"
    );

    SentenceReport {
        title,
        lines: reports,
        overall_score: overall,
    }
}
