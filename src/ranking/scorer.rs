//! Sentence scoring strategies.
//!
//! A [`Scorer`] owns the shape of its reference representation, so a vector
//! reference can never be handed to the token-set criterion or vice versa.

use std::{fmt::Debug, sync::Arc};

use crate::{
    frames::FrameKeywords,
    nlp::{
        embeddings::{cosine, mean_vector, EmbeddingProvider},
        text::StopWords,
        tfidf::{self, SparseVector, TfIdfModel},
    },
    ranking::wmd::word_movers_distance,
};

/// Distance strategy selected once per run. Lower distances are more relevant.
pub trait Scorer: Send + Sync + 'static {
    type Reference: Debug + Clone + Send + Sync + 'static;

    /// Short name used in logs and errors.
    fn name(&self) -> &'static str;

    fn in_vocabulary(&self, token: &str) -> bool;

    /// Build a reference from raw words, `None` when every word is unknown.
    fn reference(&self, words: &[String]) -> Option<Self::Reference>;

    /// Reuse a representation stored in the frame keyword resource, if this criterion has one.
    fn precomputed(&self, _frame: &FrameKeywords) -> Option<Self::Reference> {
        None
    }

    /// Lowercase, keep in-vocabulary tokens, drop stop words.
    fn prepare(&self, tokens: &[String], stop_words: &StopWords) -> Vec<String> {
        tokens
            .iter()
            .map(|token| token.to_lowercase())
            .filter(|token| !stop_words.contains(token) && self.in_vocabulary(token))
            .collect()
    }

    /// Distance between a reference and already prepared, non-empty sentence tokens.
    fn distance(&self, reference: &Self::Reference, tokens: &[String]) -> f32;
}

/// Lowercased in-vocabulary words, in input order.
fn known_words(words: &[String], known: impl Fn(&str) -> bool) -> Vec<String> {
    words
        .iter()
        .map(|word| word.to_lowercase())
        .filter(|word| known(word.as_str()))
        .collect()
}

/// `1 − cosine` between mean word embeddings. Range `[0, 2]`.
#[derive(Clone)]
pub struct CosineScorer {
    embeddings: Arc<dyn EmbeddingProvider>,
}

impl CosineScorer {
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embeddings }
    }
}

impl Scorer for CosineScorer {
    type Reference = Vec<f32>;

    fn name(&self) -> &'static str {
        "cosine"
    }

    fn in_vocabulary(&self, token: &str) -> bool {
        self.embeddings.contains(token)
    }

    fn reference(&self, words: &[String]) -> Option<Vec<f32>> {
        let words = known_words(words, |w| self.in_vocabulary(w));
        mean_vector(self.embeddings.as_ref(), &words)
    }

    fn precomputed(&self, frame: &FrameKeywords) -> Option<Vec<f32>> {
        frame
            .embedding
            .as_ref()
            .filter(|vector| vector.len() == self.embeddings.dimension())
            .cloned()
    }

    fn distance(&self, reference: &Vec<f32>, tokens: &[String]) -> f32 {
        match mean_vector(self.embeddings.as_ref(), tokens) {
            Some(sentence) => (1.0 - cosine(reference, &sentence)).max(0.0),
            None => 1.0,
        }
    }
}

/// Word Mover's Distance between the reference token list and the sentence. Range `[0, ∞)`.
#[derive(Clone)]
pub struct WmdScorer {
    embeddings: Arc<dyn EmbeddingProvider>,
}

impl WmdScorer {
    pub fn new(embeddings: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embeddings }
    }
}

impl Scorer for WmdScorer {
    type Reference = Vec<String>;

    fn name(&self) -> &'static str {
        "wmd"
    }

    fn in_vocabulary(&self, token: &str) -> bool {
        self.embeddings.contains(token)
    }

    fn reference(&self, words: &[String]) -> Option<Vec<String>> {
        let words = known_words(words, |w| self.in_vocabulary(w));
        (!words.is_empty()).then_some(words)
    }

    fn distance(&self, reference: &Vec<String>, tokens: &[String]) -> f32 {
        word_movers_distance(self.embeddings.as_ref(), reference, tokens)
            .map(|d| d as f32)
            .unwrap_or(f32::INFINITY)
    }
}

/// `1 − cosine` between TF-IDF vectors fitted over the run's articles.
#[derive(Clone)]
pub struct TfIdfScorer {
    model: Arc<TfIdfModel>,
}

impl TfIdfScorer {
    pub fn new(model: Arc<TfIdfModel>) -> Self {
        Self { model }
    }
}

impl Scorer for TfIdfScorer {
    type Reference = SparseVector;

    fn name(&self) -> &'static str {
        "tfidf"
    }

    fn in_vocabulary(&self, token: &str) -> bool {
        self.model.contains(token)
    }

    fn reference(&self, words: &[String]) -> Option<SparseVector> {
        // glossary phrases are stored joined by underscores
        let parts: Vec<String> = words
            .iter()
            .flat_map(|word| word.split('_'))
            .map(str::to_lowercase)
            .filter(|part| self.in_vocabulary(part))
            .collect();
        let vector = self.model.transform(&parts);
        (!vector.is_empty()).then_some(vector)
    }

    fn prepare(&self, tokens: &[String], stop_words: &StopWords) -> Vec<String> {
        tokens
            .iter()
            .flat_map(|token| tfidf::analyze(token, stop_words))
            .filter(|term| self.in_vocabulary(term))
            .collect()
    }

    fn distance(&self, reference: &SparseVector, tokens: &[String]) -> f32 {
        (1.0 - reference.cosine(&self.model.transform(tokens))).max(0.0)
    }
}
