//! Offline frame keyword extraction.
//!
//! Articles are partitioned by their annotated frame. Within each frame a
//! TF-IDF model is fitted over that frame's articles only, every article
//! contributes its highest-weighted terms, and the pooled terms are
//! lemmatized and re-ranked by how often they were contributed.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::{
    config::Settings,
    data::{
        corpus::{self, Corpus},
        glossary::{self, Glossary, GlossaryVariant},
        master_table::{MasterTable, MASTER_TABLE_FILE},
    },
    frames::{FrameKeywordSet, FrameKeywords, FrameLabel, LabelSource},
    nlp::{
        self,
        embeddings::{mean_vector, EmbeddingProvider},
        lemma::lemmatize,
        text::StopWords,
        tfidf::{self, term_counts, TfIdfModel},
    },
};

/// Tuning knobs of the extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Terms taken from each article.
    pub top_terms: usize,
    /// Keywords kept per frame.
    pub keep: usize,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            top_terms: 8,
            keep: 40,
        }
    }
}

/// Article texts grouped by dominant frame; unlabelled articles are left out.
pub fn partition_by_frame(
    corpora: &[Corpus],
    labels: &dyn LabelSource,
) -> BTreeMap<FrameLabel, Vec<String>> {
    let mut partition: BTreeMap<FrameLabel, Vec<String>> = BTreeMap::new();
    for article in corpora.iter().flat_map(|corpus| &corpus.articles) {
        if let Some(label) = labels.label_for(&article.id) {
            partition.entry(label).or_default().push(article.text.clone());
        }
    }
    partition
}

/// Keywords of one frame, most frequently contributed first.
///
/// Equal frequencies are ordered lexicographically. `known` restricts lemma
/// candidates to a vocabulary.
pub fn frame_keywords<S: AsRef<str>>(
    texts: &[S],
    stop_words: &StopWords,
    known: Option<&dyn Fn(&str) -> bool>,
    options: ExtractOptions,
) -> Vec<String> {
    let documents: Vec<Vec<String>> = texts
        .iter()
        .map(|text| tfidf::analyze(text.as_ref(), stop_words))
        .collect();
    let model = TfIdfModel::fit(&documents);

    let pooled = documents
        .iter()
        .flat_map(|doc| model.top_terms(doc, options.top_terms))
        .map(|term| lemmatize(&term, known));

    let mut ranked: Vec<(String, usize)> = term_counts(pooled).into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
        .into_iter()
        .take(options.keep)
        .map(|(term, _)| term)
        .collect()
}

/// Build the keyword resource for every frame in `partition`.
///
/// With embeddings, lemmas are checked against the vocabulary and each frame
/// also gets the mean vector of its keywords plus the glossary.
pub fn extract(
    partition: &BTreeMap<FrameLabel, Vec<String>>,
    glossary: &Glossary,
    embeddings: Option<&dyn EmbeddingProvider>,
    stop_words: &StopWords,
    options: ExtractOptions,
) -> FrameKeywordSet {
    let in_vocabulary = |word: &str| embeddings.map_or(false, |e| e.contains(word));
    let known = embeddings.map(|_| &in_vocabulary as &dyn Fn(&str) -> bool);

    let mut set = FrameKeywordSet::default();
    for (label, texts) in partition {
        let keywords = frame_keywords(texts, stop_words, known, options);
        let embedding = embeddings.and_then(|provider| {
            let words: Vec<&str> = keywords
                .iter()
                .chain(glossary.words())
                .map(String::as_str)
                .collect();
            let mean = mean_vector(provider, &words);
            if mean.is_none() {
                warn!(%label, "no keyword or glossary word is in the embedding vocabulary");
            }
            mean
        });
        info!(
            %label,
            articles = texts.len(),
            keywords = keywords.len(),
            embedded = embedding.is_some(),
            "extracted frame keywords"
        );
        set.frames.insert(*label, FrameKeywords { keywords, embedding });
    }
    set
}

/// Read the corpus and master table, extract keywords and persist them.
pub async fn run(
    settings: &Settings,
    variant: GlossaryVariant,
    use_embeddings: bool,
    options: ExtractOptions,
) -> Result<FrameKeywordSet> {
    let glossary = glossary::load_glossary(&settings.resources_dir, variant)?;
    let table = MasterTable::load(&settings.join_resource(MASTER_TABLE_FILE))?;
    let corpora = corpus::load_corpora(&settings.data_dir)?;
    let partition = partition_by_frame(&corpora, &table);
    info!(frames = partition.len(), "partitioned articles by frame");

    let embeddings = if use_embeddings {
        Some(nlp::load_embeddings(&settings.embeddings_path).await?)
    } else {
        None
    };

    let mut set = tokio::task::spawn_blocking(move || {
        let provider = embeddings
            .as_deref()
            .map(|e| e as &dyn EmbeddingProvider);
        extract(&partition, &glossary, provider, &StopWords::english(), options)
    })
    .await
    .context("keyword extraction task panicked")?;
    set.glossary = Some(variant);

    set.save(&settings.frame_keywords_path)?;
    Ok(set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data::corpus::Article, nlp::embeddings::WordVectors};

    fn stop_words() -> StopWords {
        StopWords::from_words(["to", "and", "in"])
    }

    fn texts() -> Vec<String> {
        vec![
            "Carbon taxes raise revenue. Carbon markets trade permits.".to_string(),
            "Markets react to carbon prices and taxes.".to_string(),
            "Investors fear stranded assets in coal markets.".to_string(),
        ]
    }

    #[test]
    fn keywords_are_lemmatized_and_ranked_by_frequency() {
        let keywords = frame_keywords(&texts(), &stop_words(), None, ExtractOptions::default());
        assert_eq!(keywords[0], "market");
        assert!(keywords.contains(&"carbon".to_string()));
        assert!(keywords.contains(&"tax".to_string()));
        assert!(!keywords.contains(&"markets".to_string()));
    }

    #[test]
    fn keep_caps_the_keyword_count() {
        let options = ExtractOptions {
            top_terms: 8,
            keep: 3,
        };
        let keywords = frame_keywords(&texts(), &stop_words(), None, options);
        assert_eq!(keywords.len(), 3);
    }

    #[test]
    fn unlabelled_articles_are_skipped() {
        let corpora = vec![Corpus {
            name: "ScienceOCR".into(),
            articles: vec![
                Article {
                    id: "a.ocr".into(),
                    text: "Ice sheets melt.".into(),
                },
                Article {
                    id: "b.ocr".into(),
                    text: "Nothing here.".into(),
                },
            ],
        }];
        let mut labels = std::collections::HashMap::new();
        labels.insert("a.ocr".to_string(), FrameLabel::Scientific);
        let partition = partition_by_frame(&corpora, &labels);
        assert_eq!(partition.len(), 1);
        assert_eq!(partition[&FrameLabel::Scientific], vec!["Ice sheets melt.".to_string()]);
    }

    #[test]
    fn embeddings_add_a_mean_vector() {
        let vectors = WordVectors::from_pairs([
            ("market", vec![1.0, 0.0]),
            ("climate", vec![0.0, 1.0]),
        ])
        .unwrap();
        let mut partition = BTreeMap::new();
        partition.insert(FrameLabel::Econ, texts());
        let glossary = Glossary::new(["climate"]);
        let set = extract(
            &partition,
            &glossary,
            Some(&vectors as &dyn EmbeddingProvider),
            &stop_words(),
            ExtractOptions::default(),
        );
        let econ = set.get(FrameLabel::Econ).unwrap();
        assert_eq!(econ.embedding, Some(vec![0.5, 0.5]));

        let without = extract(&partition, &glossary, None, &stop_words(), ExtractOptions::default());
        assert!(without.get(FrameLabel::Econ).unwrap().embedding.is_none());
    }
}
