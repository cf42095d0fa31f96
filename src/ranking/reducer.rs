//! Per-article sentence ranking and length reduction.

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tracing::{debug, warn};

use crate::{
    config::KeepFraction,
    data::corpus::Article,
    frames::LabelSource,
    nlp::text::{self, PunctuationSplitter, Sentence, SentenceSplitter, StopWords},
    ranking::{
        reference::{ReferenceOrigin, ReferenceSet},
        scorer::Scorer,
    },
};

/// A sentence paired with its distance to the reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredSentence {
    pub index: usize,
    pub text: String,
    pub distance: f32,
}

/// Outcome of reducing one article.
#[derive(Debug, Clone)]
pub struct Reduction {
    /// Sentences produced by segmentation.
    pub sentence_count: usize,
    /// `floor(sentence_count × fraction)`.
    pub keep_length: usize,
    /// Sentences that survived token filtering and received a distance.
    pub scored_count: usize,
    /// Retained sentences, best first.
    pub kept: Vec<ScoredSentence>,
    pub origin: ReferenceOrigin,
}

impl Reduction {
    /// Retained sentence texts without surrounding whitespace, best first.
    pub fn texts(&self) -> Vec<&str> {
        self.kept.iter().map(|s| s.text.trim()).collect()
    }

    /// File body: every retained sentence followed by a single space.
    pub fn render(&self) -> String {
        render_sentences(self.texts())
    }
}

/// Ranks the sentences of each article against its reference and keeps the best fraction.
pub struct ArticleReducer<S: Scorer> {
    scorer: S,
    references: ReferenceSet<S::Reference>,
    labels: Option<Arc<dyn LabelSource>>,
    splitter: Arc<dyn SentenceSplitter>,
    stop_words: StopWords,
    fraction: KeepFraction,
}

impl<S: Scorer> ArticleReducer<S> {
    pub fn new(scorer: S, references: ReferenceSet<S::Reference>, fraction: KeepFraction) -> Self {
        Self {
            scorer,
            references,
            labels: None,
            splitter: Arc::new(PunctuationSplitter),
            stop_words: StopWords::english(),
            fraction,
        }
    }

    /// Enable frame-specific references, looking labels up in `labels`.
    pub fn with_labels(mut self, labels: Arc<dyn LabelSource>) -> Self {
        self.labels = Some(labels);
        self
    }

    pub fn with_stop_words(mut self, stop_words: StopWords) -> Self {
        self.stop_words = stop_words;
        self
    }

    /// Reference for an article: its frame's when frame mode is on and the
    /// label resolves, otherwise the glossary reference.
    pub fn resolve(&self, article_id: &str) -> (&S::Reference, ReferenceOrigin) {
        let frame_mode = self
            .labels
            .as_ref()
            .map(|labels| labels.label_for(article_id));
        let resolved = self.references.resolve(frame_mode);
        if resolved.1 == ReferenceOrigin::Fallback {
            warn!(article = article_id, "no frame reference; using glossary");
        }
        resolved
    }

    /// Distance of one sentence, `None` if no token survives filtering.
    pub fn score(&self, sentence: &Sentence, reference: &S::Reference) -> Option<f32> {
        let tokens = self.scorer.prepare(&sentence.tokens, &self.stop_words);
        if tokens.is_empty() {
            return None;
        }
        Some(self.scorer.distance(reference, &tokens))
    }

    pub fn reduce(&self, article: &Article) -> Reduction {
        let (reference, origin) = self.resolve(&article.id);
        self.reduce_text(&article.text, reference, origin)
    }

    /// Rank `text` against `reference` and keep the top `floor(n × fraction)` sentences.
    ///
    /// `n` counts every segmented sentence, including those later excluded
    /// for having no usable tokens.
    pub fn reduce_text(
        &self,
        text: &str,
        reference: &S::Reference,
        origin: ReferenceOrigin,
    ) -> Reduction {
        let sentences = text::sentences(self.splitter.as_ref(), text);
        let sentence_count = sentences.len();
        let keep_length = self.fraction.keep_length(sentence_count);

        let mut scored: Vec<ScoredSentence> = Vec::with_capacity(sentence_count);
        for sentence in sentences {
            match self.score(&sentence, reference) {
                Some(distance) => scored.push(ScoredSentence {
                    index: sentence.index,
                    text: sentence.text,
                    distance,
                }),
                None => debug!(index = sentence.index, "sentence has no usable tokens"),
            }
        }
        let scored_count = scored.len();

        // stable: equal distances keep document order
        scored.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        scored.truncate(keep_length);

        Reduction {
            sentence_count,
            keep_length,
            scored_count,
            kept: scored,
            origin,
        }
    }
}

/// Each sentence trimmed and followed by a single space, in the given order.
pub fn render_sentences<'a, I>(sentences: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    sentences
        .into_iter()
        .map(|text| format!("{} ", text.trim()))
        .collect()
}

/// Write a reduced article to `dir/<article id>`, replacing any earlier output.
pub fn write_reduction(dir: &Path, article_id: &str, body: &str) -> Result<()> {
    let path = dir.join(article_id);
    std::fs::write(&path, body).with_context(|| format!("write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rendering_trims_and_appends_a_space() {
        assert_eq!(render_sentences(["  First. ", "Second.\n"]), "First. Second. ");
        assert_eq!(render_sentences(Vec::<&str>::new()), "");
    }

    #[test]
    fn writing_replaces_previous_output() {
        let dir = tempfile::tempdir().unwrap();
        write_reduction(dir.path(), "a.ocr", "old text ").unwrap();
        write_reduction(dir.path(), "a.ocr", "new ").unwrap();
        assert_eq!(std::fs::read_to_string(dir.path().join("a.ocr")).unwrap(), "new ");
    }
}
