// Paragraph Segmentation
// Splits documents into paragraph units and restores their layout after a rewrite

use serde::{Deserialize, Serialize};

use super::text_processor::leading_whitespace_width;

/// A maximal run of consecutive non-blank lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphUnit {
    /// Lines of the paragraph joined with `\n`.
    pub text: String,
    /// Leading-whitespace width of every line, in order.
    pub indentation: Vec<usize>,
    /// Same content as `text`; the layout source for [`restore_format`].
    pub original: String,
}

impl ParagraphUnit {
    fn from_lines(lines: &[&str]) -> Self {
        let joined = lines.join("\n");
        Self {
            text: joined.clone(),
            indentation: lines.iter().map(|l| leading_whitespace_width(l)).collect(),
            original: joined,
        }
    }
}

/// Positional identifier used as the key in score maps.
pub fn paragraph_id(index: usize) -> String {
    format!("p{}", index)
}

/// Split text into paragraph units.
///
/// A whitespace-only line (or the end of input) closes the current unit, so
/// any number of blank lines between paragraphs counts as one boundary.
pub fn split_paragraphs(text: &str) -> Vec<ParagraphUnit> {
    let mut paragraphs = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in text.split('\n') {
        if !line.trim().is_empty() {
            current.push(line);
        } else if !current.is_empty() {
            paragraphs.push(ParagraphUnit::from_lines(&current));
            current.clear();
        }
    }

    if !current.is_empty() {
        paragraphs.push(ParagraphUnit::from_lines(&current));
    }

    paragraphs
}

/// Re-apply the original paragraph's indentation to rewritten text.
///
/// Line `i` of `new_text` is stripped and indented with the width of line `i`
/// of `original`. Lines past the end of `original` are kept exactly as the
/// model produced them, without any indentation applied.
pub fn restore_format(original: &str, new_text: &str) -> String {
    let orig_lines: Vec<&str> = original.split('\n').collect();

    new_text
        .split('\n')
        .enumerate()
        .map(|(i, new_line)| match orig_lines.get(i) {
            Some(orig_line) => {
                let indent = leading_whitespace_width(orig_line);
                format!("{}{}", " ".repeat(indent), new_line.trim())
            }
            None => new_line.to_string(),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_paragraphs_basic() {
        let units = split_paragraphs("Hello world.\n\nThis is AI text.");
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "Hello world.");
        assert_eq!(units[1].text, "This is AI text.");
        assert_eq!(units[1].original, units[1].text);
    }

    #[test]
    fn test_split_paragraphs_records_indentation() {
        let text = "Liste:\n  - birinci\n    - iç madde\n\n\tSekmeli";
        let units = split_paragraphs(text);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].indentation, vec![0, 2, 4]);
        assert_eq!(units[1].indentation, vec![1]);
        assert_eq!(units[1].text, "\tSekmeli");
    }

    #[test]
    fn test_split_paragraphs_trailing_run_is_emitted() {
        let units = split_paragraphs("a\n\n\n   \nb\nc");
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].text, "b\nc");
    }

    #[test]
    fn test_split_paragraphs_empty_input() {
        assert!(split_paragraphs("").is_empty());
        assert!(split_paragraphs("\n \n\t\n").is_empty());
    }

    #[test]
    fn test_segment_rejoin_reproduces_boundaries() {
        let text = "\n\nBir.\nİki.\n\n\n  Üç.\n\nDört.\n\n";
        let rejoined = split_paragraphs(text)
            .into_iter()
            .map(|p| p.text)
            .collect::<Vec<_>>()
            .join("\n\n");
        assert_eq!(rejoined, "Bir.\nİki.\n\n  Üç.\n\nDört.");
        assert_eq!(split_paragraphs(&rejoined), split_paragraphs(text));
    }

    #[test]
    fn test_restore_format_applies_original_indentation() {
        let original = "Başlık\n    ikinci satır\n  üçüncü";
        let restored = restore_format(original, "Yeni başlık\n   yeni ikinci\nyeni üçüncü");
        assert_eq!(restored, "Yeni başlık\n    yeni ikinci\n  yeni üçüncü");

        let orig_lines: Vec<&str> = original.split('\n').collect();
        for (i, line) in restored.split('\n').enumerate() {
            assert_eq!(
                leading_whitespace_width(line),
                leading_whitespace_width(orig_lines[i])
            );
        }
    }

    #[test]
    fn test_restore_format_fewer_lines() {
        let restored = restore_format("  a\n    b\n c", "x\ny");
        assert_eq!(restored, "  x\n    y");
    }

    #[test]
    fn test_restore_format_extra_lines_kept_verbatim() {
        let restored = restore_format("  tek satır", "ilk\n   ek satır  ");
        assert_eq!(restored, "  ilk\n   ek satır  ");
    }

    #[test]
    fn test_paragraph_id() {
        assert_eq!(paragraph_id(0), "p0");
        assert_eq!(paragraph_id(12), "p12");
    }
}
