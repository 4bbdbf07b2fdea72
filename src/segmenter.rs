//! Text segmentation for Reelsmith
//! Splits raw input into the ordered units that become individual clips

use serde::{Deserialize, Serialize};

use crate::types::TextUnit;

/// How the input text is split into units
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SegmentStrategy {
    /// Split on blank lines (paragraph breaks)
    #[default]
    Paragraphs,
    /// Split on sentence terminators (`.`, `!`, `?`)
    Sentences,
}

/// Split raw text into ordered, non-empty units.
///
/// Whitespace-only fragments are dropped and do not occupy a position in the
/// output. Empty input yields an empty sequence, not an error.
pub fn segment(text: &str, strategy: SegmentStrategy) -> Vec<TextUnit> {
    let fragments: Vec<String> = match strategy {
        SegmentStrategy::Paragraphs => text.split("\n\n").map(str::to_string).collect(),
        SegmentStrategy::Sentences => split_sentences(text),
    };

    fragments
        .into_iter()
        .filter(|f| !f.trim().is_empty())
        .enumerate()
        .map(|(index, fragment)| TextUnit {
            index,
            text: fragment.trim().to_string(),
        })
        .collect()
}

/// Split on sentence terminators, keeping the terminator with its sentence.
/// A period between two digits is a decimal point, not a boundary.
fn split_sentences(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        current.push(c);
        if matches!(c, '.' | '!' | '?') {
            let prev_digit = i > 0 && chars[i - 1].is_ascii_digit();
            let next_digit = chars.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if c == '.' && prev_digit && next_digit {
                continue;
            }
            sentences.push(std::mem::take(&mut current));
        }
    }

    if !current.is_empty() {
        sentences.push(current);
    }

    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_segmentation() {
        let units = segment("Hello world.\n\nGoodbye.", SegmentStrategy::Paragraphs);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "Hello world.");
        assert_eq!(units[1].text, "Goodbye.");
        assert_eq!(units[0].index, 0);
        assert_eq!(units[1].index, 1);
    }

    #[test]
    fn test_sentence_segmentation() {
        let units = segment("One. Two! Three?", SegmentStrategy::Sentences);
        assert_eq!(units.len(), 3);
        assert_eq!(units[0].text, "One.");
        assert_eq!(units[1].text, "Two!");
        assert_eq!(units[2].text, "Three?");
    }

    #[test]
    fn test_decimal_point_is_not_a_boundary() {
        let units = segment("Pi is 3.14 roughly. The end.", SegmentStrategy::Sentences);
        assert_eq!(units.len(), 2);
        assert_eq!(units[0].text, "Pi is 3.14 roughly.");
    }

    #[test]
    fn test_empty_input_yields_empty_sequence() {
        assert!(segment("", SegmentStrategy::Paragraphs).is_empty());
        assert!(segment("", SegmentStrategy::Sentences).is_empty());
        assert!(segment("   \n\n  \t ", SegmentStrategy::Paragraphs).is_empty());
    }

    #[test]
    fn test_blank_fragments_do_not_occupy_positions() {
        let units = segment("First.\n\n\n\n  \n\nSecond.", SegmentStrategy::Paragraphs);
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].index, 1);
        assert_eq!(units[1].text, "Second.");
    }

    #[test]
    fn test_trailing_text_without_terminator_is_kept() {
        let units = segment("Done. And then", SegmentStrategy::Sentences);
        assert_eq!(units.len(), 2);
        assert_eq!(units[1].text, "And then");
    }

    #[test]
    fn test_units_are_non_empty_after_trimming() {
        let units = segment("A. . B.", SegmentStrategy::Sentences);
        for unit in &units {
            assert!(!unit.text.trim().is_empty());
        }
        assert_eq!(units.len(), 2);
    }
}
