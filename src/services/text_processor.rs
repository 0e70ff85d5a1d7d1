// Text Processing Service
// Cleans raw text into paragraph strings for training-pair storage

use regex::Regex;
use std::sync::OnceLock;

static URL_RE: OnceLock<Regex> = OnceLock::new();
static MULTI_SPACE_RE: OnceLock<Regex> = OnceLock::new();

fn url_re() -> &'static Regex {
    URL_RE.get_or_init(|| Regex::new(r"http\S+|www.\S+").expect("url pattern is valid"))
}

fn multi_space_re() -> &'static Regex {
    MULTI_SPACE_RE.get_or_init(|| Regex::new(r" {2,}").expect("space pattern is valid"))
}

/// Width of the leading whitespace run, counted in chars.
pub fn leading_whitespace_width(line: &str) -> usize {
    line.chars().take_while(|c| c.is_whitespace()).count()
}

/// Remove URL tokens (`http...` / `www....`) from a line.
pub fn strip_urls(text: &str) -> String {
    url_re().replace_all(text, "").into_owned()
}

/// Collapse runs of spaces into a single space.
pub fn collapse_spaces(text: &str) -> String {
    multi_space_re().replace_all(text, " ").into_owned()
}

/// Clean a single line while keeping its indentation width.
///
/// Tabs in the indentation are re-emitted as spaces; only the width survives.
pub fn clean_line(line: &str) -> String {
    let indent = leading_whitespace_width(line);
    let content: String = line.chars().skip(indent).collect();

    let content = collapse_spaces(&strip_urls(&content));
    let content = content.trim_end();

    format!("{}{}", " ".repeat(indent), content)
}

/// Normalize raw text into clean paragraphs.
///
/// Paragraphs are split on `"\n\n"`, each line is cleaned with [`clean_line`],
/// paragraphs that end up blank are dropped and the survivors are rejoined with
/// a blank line. Running it twice gives the same result as running it once.
pub fn preprocess_text(text: &str) -> String {
    let mut paragraphs: Vec<String> = Vec::new();

    for paragraph in text.split("\n\n") {
        if paragraph.trim().is_empty() {
            continue;
        }

        let processed = paragraph
            .split('\n')
            .map(clean_line)
            .collect::<Vec<_>>()
            .join("\n");

        if !processed.trim().is_empty() {
            paragraphs.push(processed);
        }
    }

    paragraphs.join("\n\n")
}

/// Keep at most `max_chars` chars of `text`, cutting on a char boundary.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}
