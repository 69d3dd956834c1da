//! Extractive "lead" summarizer
//!
//! Keeps the opening sentences of the document until the word budget
//! (`LengthBounds::max_length`) is spent. Output is always a word-prefix of
//! the whitespace-normalized input, so it is never longer than the input.

use super::{LengthBounds, Summarizer};
use crate::error::SummarizeError;

const MODEL_NAME: &str = "lead-extractive";

#[derive(Debug, Clone, Default)]
pub struct LeadSummarizer;

impl LeadSummarizer {
    pub fn new() -> Self {
        Self
    }
}

impl Summarizer for LeadSummarizer {
    fn model_name(&self) -> &str {
        MODEL_NAME
    }

    async fn summarize(&self, text: &str, bounds: LengthBounds) -> Result<String, SummarizeError> {
        let summary = lead_sentences(text, bounds.max_length.max(1));
        if summary.is_empty() {
            return Err(SummarizeError::EmptySummary);
        }
        Ok(summary)
    }
}

/// Leading sentences within `max_words`; the first sentence is cut at a word boundary if it alone exceeds the budget
fn lead_sentences(text: &str, max_words: usize) -> String {
    let mut out: Vec<&str> = Vec::new();

    for sentence in split_sentences(text) {
        let words: Vec<&str> = sentence.split_whitespace().collect();
        if out.len() + words.len() <= max_words {
            out.extend(words);
        } else {
            if out.is_empty() {
                out.extend(words.into_iter().take(max_words));
            }
            break;
        }
    }

    out.join(" ")
}

/// Sentence spans ending in `.`, `!` or `?` followed by whitespace (or end of text)
fn split_sentences(text: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().map_or(true, |(_, next)| next.is_whitespace());
            if at_boundary {
                let end = i + c.len_utf8();
                let sentence = text[start..end].trim();
                if !sentence.is_empty() {
                    sentences.push(sentence);
                }
                start = end;
            }
        }
    }

    let tail = text[start..].trim();
    if !tail.is_empty() {
        sentences.push(tail);
    }
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(max_length: usize) -> LengthBounds {
        LengthBounds {
            min_length: 1,
            max_length,
        }
    }

    #[test]
    fn test_split_sentences() {
        let parts = split_sentences("Fees are $1.50 per unit. Term is 2 years! Renewal? Yes");
        assert_eq!(
            parts,
            vec![
                "Fees are $1.50 per unit.",
                "Term is 2 years!",
                "Renewal?",
                "Yes"
            ]
        );
    }

    #[tokio::test]
    async fn test_short_text_kept_whole() {
        let text = "This agreement shall terminate in 30 days.";
        let summary = LeadSummarizer::new()
            .summarize(text, LengthBounds::for_input(text))
            .await
            .unwrap();
        assert_eq!(summary, text);
    }

    #[tokio::test]
    async fn test_stops_at_sentence_budget() {
        let text = "One two three. Four five six. Seven eight nine.";
        let summary = LeadSummarizer::new()
            .summarize(text, bounds(7))
            .await
            .unwrap();
        assert_eq!(summary, "One two three. Four five six.");
    }

    #[tokio::test]
    async fn test_long_first_sentence_is_cut() {
        let text = "a b c d e f g h. Second sentence.";
        let summary = LeadSummarizer::new()
            .summarize(text, bounds(3))
            .await
            .unwrap();
        assert_eq!(summary, "a b c");
    }

    #[tokio::test]
    async fn test_summary_never_longer_than_input() {
        let text = "  Party A\t\tpays.\n\nParty B   delivers.  ";
        let summary = LeadSummarizer::new()
            .summarize(text, bounds(50))
            .await
            .unwrap();
        assert_eq!(summary, "Party A pays. Party B delivers.");
        assert!(summary.chars().count() <= text.trim().chars().count());
    }

    #[tokio::test]
    async fn test_whitespace_only_is_empty_summary() {
        let err = LeadSummarizer::new()
            .summarize("   ", bounds(10))
            .await
            .unwrap_err();
        assert!(matches!(err, SummarizeError::EmptySummary));
    }
}
