use fancy_regex::Regex;
use log::warn;
use unicode_segmentation::UnicodeSegmentation;

/// Guaranteed-available fallback: split on sentence-ending punctuation
/// followed by whitespace and a capital letter.
const REGEX_FALLBACK_PATTERN: &str = r"(?<=[.!?])\s+(?=[A-Z])";

enum Backend {
    Linguistic,
    Regex(Regex),
}

/// Splits text into sentences using a linguistic pipeline when available,
/// falling back to a regex split that is always available.
pub struct SentenceSegmenter {
    backend: Backend,
}

impl SentenceSegmenter {
    /// Select a backend following the fallback hierarchy. Always succeeds:
    /// the linguistic backend (Unicode sentence-boundary detection) has no
    /// external model to fail to load, but the regex fallback is attempted
    /// if compiling it is ever needed by a caller that requests it
    /// explicitly (see [`SentenceSegmenter::regex_only`]).
    pub fn new() -> Self {
        Self {
            backend: Backend::Linguistic,
        }
    }

    /// Force the regex fallback backend, used when the linguistic pipeline
    /// is unavailable in the host environment.
    pub fn regex_only() -> Self {
        match Regex::new(REGEX_FALLBACK_PATTERN) {
            Ok(re) => Self {
                backend: Backend::Regex(re),
            },
            Err(e) => {
                // The pattern is a compile-time constant; this cannot
                // realistically fail, but we still honor "never abort
                // construction" by falling back to the linguistic backend.
                warn!("regex sentence segmenter pattern failed to compile: {e}");
                Self {
                    backend: Backend::Linguistic,
                }
            }
        }
    }

    /// Segment `text` into trimmed, non-empty, non-overlapping sentences in
    /// source order. Returns an empty list for empty/whitespace input.
    pub fn segment(&self, text: &str) -> Vec<String> {
        if text.trim().is_empty() {
            return vec![];
        }

        match &self.backend {
            Backend::Linguistic => text
                .unicode_sentences()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
            Backend::Regex(re) => re
                .split(text)
                .filter_map(Result::ok)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }
}

impl Default for SentenceSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_yields_no_sentences() {
        let seg = SentenceSegmenter::new();
        assert!(seg.segment("").is_empty());
        assert!(seg.segment("   ").is_empty());
    }

    #[test]
    fn splits_multiple_sentences() {
        let seg = SentenceSegmenter::new();
        let sentences = seg.segment("Hello world. This is a test. And a third one!");
        assert_eq!(sentences.len(), 3);
        for s in &sentences {
            assert_eq!(s, s.trim());
        }
    }

    #[test]
    fn regex_fallback_splits_on_sentence_boundaries() {
        let seg = SentenceSegmenter::regex_only();
        let sentences = seg.segment("First sentence. Second sentence. Third one.");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], "First sentence.");
        assert_eq!(sentences[2], "Third one.");
    }

    #[test]
    fn sentences_do_not_overlap_and_are_trimmed() {
        let seg = SentenceSegmenter::regex_only();
        let sentences = seg.segment("  One.   Two.  Three.  ");
        for s in &sentences {
            assert!(!s.starts_with(' ') && !s.ends_with(' '));
        }
        assert_eq!(sentences, vec!["One.", "Two.", "Three."]);
    }
}
