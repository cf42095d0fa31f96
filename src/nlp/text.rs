//! Sentence segmentation, word tokenization and stop-word filtering.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

/// One segment of an article: original text plus its word tokens.
#[derive(Debug, Clone, PartialEq)]
pub struct Sentence {
    /// Position in the article, used as the ranking tie-break.
    pub index: usize,
    pub text: String,
    pub tokens: Vec<String>,
}

/// Splits raw article text into sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str>;
}

/// Rule-based splitter: a sentence ends after a run of `.`, `!` or `?`,
/// optionally followed by closing quotes or brackets, then whitespace.
#[derive(Debug, Clone, Copy, Default)]
pub struct PunctuationSplitter;

static SENTENCE_END: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[.!?]+["'”’)\]]*\s+"#).expect("valid regex"));

static WORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\p{L}\p{N}]+(?:['’_-][\p{L}\p{N}]+)*").expect("valid regex")
});

impl SentenceSplitter for PunctuationSplitter {
    fn split<'a>(&self, text: &'a str) -> Vec<&'a str> {
        let mut sentences = Vec::new();
        let mut start = 0;
        for boundary in SENTENCE_END.find_iter(text) {
            push_segment(&mut sentences, &text[start..boundary.end()]);
            start = boundary.end();
        }
        push_segment(&mut sentences, &text[start..]);
        sentences
    }
}

fn push_segment<'a>(sentences: &mut Vec<&'a str>, segment: &'a str) {
    if !segment.trim().is_empty() {
        sentences.push(segment);
    }
}

/// Word tokens in their original casing. Punctuation is dropped.
pub fn word_tokens(text: &str) -> Vec<String> {
    WORD.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Segment `text` and tokenize every sentence.
pub fn sentences(splitter: &dyn SentenceSplitter, text: &str) -> Vec<Sentence> {
    splitter
        .split(text)
        .into_iter()
        .enumerate()
        .map(|(index, raw)| Sentence {
            index,
            text: raw.to_string(),
            tokens: word_tokens(raw),
        })
        .collect()
}

/// Lowercased English stop-word set.
#[derive(Debug, Clone)]
pub struct StopWords(HashSet<String>);

impl StopWords {
    pub fn english() -> Self {
        let words = stop_words::get(stop_words::LANGUAGE::English);
        Self(words.iter().map(|w| w.to_lowercase()).collect())
    }

    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect())
    }

    pub fn none() -> Self {
        Self(HashSet::new())
    }

    /// Expects an already-lowercased token.
    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }
}

impl Default for StopWords {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_terminal_punctuation() {
        let text = "The climate is warming. Stocks rose today! Did emissions fall? Yes";
        let parts = PunctuationSplitter.split(text);
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0].trim(), "The climate is warming.");
        assert_eq!(parts[1].trim(), "Stocks rose today!");
        assert_eq!(parts[3].trim(), "Yes");
    }

    #[test]
    fn keeps_closing_quotes_with_their_sentence() {
        let parts = PunctuationSplitter.split("He said \"it is hot.\" Then left.");
        assert_eq!(parts[0].trim(), "He said \"it is hot.\"");
        assert_eq!(parts[1].trim(), "Then left.");
    }

    #[test]
    fn decimals_do_not_end_sentences() {
        let parts = PunctuationSplitter.split("Temperatures rose 1.5 degrees. Seas rose too.");
        assert_eq!(parts.len(), 2);
    }

    #[test]
    fn whitespace_only_text_has_no_sentences() {
        assert!(PunctuationSplitter.split("   \n ").is_empty());
    }

    #[test]
    fn tokens_drop_punctuation_but_keep_compounds() {
        let tokens = word_tokens("CO2-emissions (sea_level) don't rise, 2°C.");
        assert_eq!(tokens, vec!["CO2-emissions", "sea_level", "don't", "rise", "2", "C"]);
    }

    #[test]
    fn sentence_indices_follow_document_order() {
        let sents = sentences(&PunctuationSplitter, "One fish. Two fish.");
        assert_eq!(sents[1].index, 1);
        assert_eq!(sents[1].tokens, vec!["Two", "fish"]);
    }

    #[test]
    fn english_stop_words_cover_function_words() {
        let stop = StopWords::english();
        assert!(stop.contains("the"));
        assert!(stop.contains("is"));
        assert!(!stop.contains("climate"));
    }
}
