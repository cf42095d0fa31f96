//! TF-IDF vectorizer with a sorted vocabulary and smoothed IDF.
//!
//! Weights follow `tf × (ln((1 + n) / (1 + df)) + 1)` with raw term counts,
//! and every document vector is L2-normalised.

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::nlp::text::StopWords;

static TERM: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\w\w+\b").expect("valid regex"));

/// Lowercase, extract terms of two or more word characters, drop stop words.
pub fn analyze(text: &str, stop_words: &StopWords) -> Vec<String> {
    let lower = text.to_lowercase();
    TERM.find_iter(&lower)
        .map(|m| m.as_str())
        .filter(|term| !stop_words.contains(term))
        .map(str::to_string)
        .collect()
}

/// Sparse vector of `(term index, weight)` pairs sorted by index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector(Vec<(usize, f32)>);

impl SparseVector {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[(usize, f32)] {
        &self.0
    }

    pub fn cosine(&self, other: &SparseVector) -> f32 {
        let (mut i, mut j) = (0, 0);
        let mut dot = 0.0f32;
        while i < self.0.len() && j < other.0.len() {
            let (a_idx, a_val) = self.0[i];
            let (b_idx, b_val) = other.0[j];
            match a_idx.cmp(&b_idx) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    dot += a_val * b_val;
                    i += 1;
                    j += 1;
                }
            }
        }
        let norm_a = self.0.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        let norm_b = other.0.iter().map(|(_, v)| v * v).sum::<f32>().sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            0.0
        } else {
            dot / (norm_a * norm_b)
        }
    }
}

/// Fitted TF-IDF model.
#[derive(Debug, Clone)]
pub struct TfIdfModel {
    vocabulary: BTreeMap<String, usize>,
    terms: Vec<String>,
    idf: Vec<f32>,
}

impl TfIdfModel {
    /// Fit over pre-analyzed documents.
    pub fn fit<D, S>(documents: &[D]) -> Self
    where
        D: AsRef<[S]>,
        S: AsRef<str>,
    {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for doc in documents {
            let unique: HashSet<&str> = doc.as_ref().iter().map(AsRef::as_ref).collect();
            for term in unique {
                *document_frequency.entry(term.to_string()).or_insert(0) += 1;
            }
        }

        let n = documents.len() as f32;
        let mut vocabulary = BTreeMap::new();
        let mut terms = Vec::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n) / (1.0 + df as f32)).ln() + 1.0);
            vocabulary.insert(term.clone(), index);
            terms.push(term);
        }
        Self {
            vocabulary,
            terms,
            idf,
        }
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn contains(&self, term: &str) -> bool {
        self.vocabulary.contains_key(term)
    }

    /// L2-normalised TF-IDF vector; out-of-vocabulary tokens are ignored.
    pub fn transform<S: AsRef<str>>(&self, tokens: &[S]) -> SparseVector {
        let mut counts: BTreeMap<usize, f32> = BTreeMap::new();
        for token in tokens {
            if let Some(&index) = self.vocabulary.get(token.as_ref()) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }
        let mut weights: Vec<(usize, f32)> = counts
            .into_iter()
            .map(|(index, tf)| (index, tf * self.idf[index]))
            .collect();
        let norm = weights.iter().map(|(_, w)| w * w).sum::<f32>().sqrt();
        if norm > 0.0 {
            for (_, weight) in &mut weights {
                *weight /= norm;
            }
        }
        SparseVector(weights)
    }

    /// The `k` highest-weighted terms of a document.
    ///
    /// Equal weights are ordered lexicographically by term, which is the
    /// vocabulary order. Terms with zero weight are never returned.
    pub fn top_terms<S: AsRef<str>>(&self, tokens: &[S], k: usize) -> Vec<String> {
        let mut weights = self.transform(tokens).0;
        weights.retain(|(_, w)| *w > 0.0);
        weights.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        weights
            .into_iter()
            .take(k)
            .map(|(index, _)| self.terms[index].clone())
            .collect()
    }
}

/// Occurrence counts in first-seen order.
pub fn term_counts<I, S>(terms: I) -> IndexMap<String, usize>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut counts = IndexMap::new();
    for term in terms {
        *counts.entry(term.into()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn docs() -> Vec<Vec<String>> {
        let stop = StopWords::from_words(["the", "is", "a"]);
        [
            "The ocean is warming and the ocean is rising.",
            "Carbon emissions warm the planet.",
            "A carbon tax cuts emissions.",
        ]
        .iter()
        .map(|text| analyze(text, &stop))
        .collect()
    }

    #[test]
    fn analyzer_lowercases_and_drops_short_and_stop_terms() {
        let stop = StopWords::from_words(["the"]);
        assert_eq!(analyze("The CO2 a x ocean", &stop), vec!["co2", "ocean"]);
    }

    #[test]
    fn rare_terms_outweigh_shared_terms() {
        let documents = docs();
        let model = TfIdfModel::fit(&documents);
        let top = model.top_terms(&documents[2], 2);
        assert_eq!(top, vec!["cuts", "tax"]);
        assert!(!top.contains(&"carbon".to_string()));
    }

    #[test]
    fn repeated_terms_rank_first() {
        let documents = docs();
        let model = TfIdfModel::fit(&documents);
        assert_eq!(model.top_terms(&documents[0], 1), vec!["ocean"]);
    }

    #[test]
    fn vectors_are_unit_length() {
        let documents = docs();
        let model = TfIdfModel::fit(&documents);
        let vector = model.transform(&documents[1]);
        let norm: f32 = vector.entries().iter().map(|(_, w)| w * w).sum();
        assert!((norm - 1.0).abs() < 1e-5);
        assert!((vector.cosine(&vector) - 1.0).abs() < 1e-5);
        assert!(model.transform(&["unseen"]).is_empty());
    }

    #[test]
    fn counts_keep_first_seen_order() {
        let counts = term_counts(["b", "a", "b"]);
        assert_eq!(counts.get_index(0), Some((&"b".to_string(), &2)));
        assert_eq!(counts.len(), 2);
    }
}
