//! Corpus reduction runs: configuration, orchestration and the run manifest.

pub mod random;
pub mod reducer;
pub mod reference;
pub mod scorer;
pub mod wmd;

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info};

use crate::{
    cli::{Criterion, Method},
    config::{ConfigError, KeepFraction, Settings},
    data::{
        corpus::{self, Corpus},
        glossary::{self, Glossary, GlossaryVariant},
        master_table::{MasterTable, MASTER_TABLE_FILE},
    },
    frames::{FrameKeywordSet, LabelSource},
    nlp::{
        self,
        text::StopWords,
        tfidf::{self, TfIdfModel},
    },
};

use reducer::{write_reduction, ArticleReducer};
use reference::{ReferenceOrigin, ReferenceSet};
use scorer::{CosineScorer, Scorer, TfIdfScorer, WmdScorer};

pub const MANIFEST_FILE: &str = "run.json";

/// Validated options of one reduction run.
#[derive(Debug, Clone, Serialize)]
pub struct RunConfig {
    pub glossary: GlossaryVariant,
    pub fraction: KeepFraction,
    pub method: Method,
    pub criterion: Criterion,
    /// Rank against frame-specific references.
    pub frame: bool,
    pub jobs: usize,
}

impl RunConfig {
    pub fn new(
        glossary: GlossaryVariant,
        length: f64,
        method: Method,
        criterion: Criterion,
        frame: bool,
        jobs: usize,
    ) -> Result<Self, ConfigError> {
        let fraction = KeepFraction::new(length)?;
        if criterion == Criterion::Wmd && method != Method::Glove {
            return Err(ConfigError::UnsupportedCombination {
                method: method.as_str(),
                criterion: criterion.as_str(),
            });
        }
        Ok(Self {
            glossary,
            fraction,
            method,
            criterion,
            frame,
            jobs: jobs.max(1),
        })
    }

    /// Results sub-directory unique to this configuration.
    pub fn results_dir_name(&self) -> String {
        let mut name = format!(
            "{}-top-{}-percent-{}-{}",
            self.method.as_str(),
            self.fraction.percent_label(),
            self.criterion.as_str(),
            self.glossary.as_str(),
        );
        if self.frame {
            name.push_str("-with-frame-embeddings");
        }
        name
    }
}

/// Per sub-corpus totals recorded in the manifest.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorpusSummary {
    pub corpus: String,
    pub articles: usize,
    pub sentences: usize,
    pub scored: usize,
    pub kept: usize,
    /// Articles that ranked against the glossary reference while frame mode was on.
    pub fallbacks: usize,
}

impl CorpusSummary {
    fn new(corpus: &str) -> Self {
        Self {
            corpus: corpus.to_string(),
            ..Self::default()
        }
    }
}

/// Written to `<results dir>/run.json` once every article is reduced.
#[derive(Debug, Clone, Serialize)]
pub struct RunManifest<C: Serialize> {
    pub config: C,
    pub output_dir: PathBuf,
    pub corpora: Vec<CorpusSummary>,
    pub completed_at: DateTime<Utc>,
}

impl<C: Serialize> RunManifest<C> {
    pub fn write(&self) -> Result<PathBuf> {
        let path = self.output_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json).with_context(|| format!("write {}", path.display()))?;
        Ok(path)
    }
}

/// Run a full reduction over every sub-corpus below `settings.data_dir`.
pub async fn run(config: RunConfig, settings: &Settings) -> Result<RunManifest<RunConfig>> {
    let glossary = glossary::load_glossary(&settings.resources_dir, config.glossary)?;

    let (frames, labels) = if config.frame {
        if !settings.frame_keywords_path.is_file() {
            return Err(ConfigError::MissingResource {
                path: settings.frame_keywords_path.clone(),
                hint: "run `extract-frames` first",
            }
            .into());
        }
        let mut frames = FrameKeywordSet::load(&settings.frame_keywords_path)?;
        frames.retain_embeddings_for(config.glossary);
        let table = MasterTable::load(&settings.join_resource(MASTER_TABLE_FILE))?;
        (Some(frames), Some(Arc::new(table) as Arc<dyn LabelSource>))
    } else {
        (None, None)
    };

    let corpora = corpus::load_corpora(&settings.data_dir)?;
    let output_dir = settings.join_results(config.results_dir_name());

    let inputs = RunInputs {
        glossary: &glossary,
        frames: frames.as_ref(),
        labels,
        fraction: config.fraction,
        jobs: config.jobs,
        output_dir: &output_dir,
    };

    let summaries = match (config.method, config.criterion) {
        (Method::Glove, Criterion::Cosine) => {
            let embeddings = nlp::load_embeddings(&settings.embeddings_path).await?;
            reduce_corpora(CosineScorer::new(embeddings), corpora, inputs).await?
        }
        (Method::Glove, Criterion::Wmd) => {
            let embeddings = nlp::load_embeddings(&settings.embeddings_path).await?;
            reduce_corpora(WmdScorer::new(embeddings), corpora, inputs).await?
        }
        (Method::Tfidf, Criterion::Cosine) => {
            let model = fit_corpus_model(&corpora);
            info!(terms = model.len(), "fitted TF-IDF model over run articles");
            reduce_corpora(TfIdfScorer::new(Arc::new(model)), corpora, inputs).await?
        }
        (method, criterion) => {
            return Err(ConfigError::UnsupportedCombination {
                method: method.as_str(),
                criterion: criterion.as_str(),
            }
            .into())
        }
    };

    let manifest = RunManifest {
        config,
        output_dir,
        corpora: summaries,
        completed_at: Utc::now(),
    };
    let path = manifest.write()?;
    info!(manifest = %path.display(), "reduction run complete");
    Ok(manifest)
}

/// Shared, read-only inputs of a reduction run.
pub struct RunInputs<'a> {
    pub glossary: &'a Glossary,
    pub frames: Option<&'a FrameKeywordSet>,
    pub labels: Option<Arc<dyn LabelSource>>,
    pub fraction: KeepFraction,
    pub jobs: usize,
    pub output_dir: &'a Path,
}

/// Fit one IDF table with every article of the run as a document.
pub fn fit_corpus_model(corpora: &[Corpus]) -> TfIdfModel {
    let stop_words = StopWords::english();
    let documents: Vec<Vec<String>> = corpora
        .iter()
        .flat_map(|corpus| &corpus.articles)
        .map(|article| tfidf::analyze(&article.text, &stop_words))
        .collect();
    TfIdfModel::fit(&documents)
}

/// Reduce every article of `corpora` into `<output_dir>/<corpus name>/<article id>`.
pub async fn reduce_corpora<S: Scorer>(
    scorer: S,
    corpora: Vec<Corpus>,
    inputs: RunInputs<'_>,
) -> Result<Vec<CorpusSummary>> {
    let references = ReferenceSet::build(&scorer, inputs.glossary, inputs.frames)?;
    debug!(frames = references.frame_count(), "references ready");

    let mut reducer = ArticleReducer::new(scorer, references, inputs.fraction);
    if let Some(labels) = inputs.labels {
        reducer = reducer.with_labels(labels);
    }
    let reducer = Arc::new(reducer);

    let mut summaries = Vec::with_capacity(corpora.len());
    for corpus in corpora {
        let dir = inputs.output_dir.join(&corpus.name);
        std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
        info!(
            corpus = %corpus.name,
            articles = corpus.articles.len(),
            output = %dir.display(),
            "reducing sub-corpus"
        );

        let mut summary = CorpusSummary::new(&corpus.name);
        let outcomes = stream::iter(corpus.articles)
            .map(|article| {
                let reducer = Arc::clone(&reducer);
                let dir = dir.clone();
                tokio::task::spawn_blocking(move || {
                    let reduction = reducer.reduce(&article);
                    write_reduction(&dir, &article.id, &reduction.render())?;
                    Ok::<_, anyhow::Error>(reduction)
                })
            })
            .buffer_unordered(inputs.jobs.max(1))
            .collect::<Vec<_>>()
            .await;

        for outcome in outcomes {
            let reduction = outcome.context("reduction task panicked")??;
            summary.articles += 1;
            summary.sentences += reduction.sentence_count;
            summary.scored += reduction.scored_count;
            summary.kept += reduction.kept.len();
            if reduction.origin == ReferenceOrigin::Fallback {
                summary.fallbacks += 1;
            }
        }
        info!(
            corpus = %summary.corpus,
            articles = summary.articles,
            kept = summary.kept,
            fallbacks = summary.fallbacks,
            "sub-corpus reduced"
        );
        summaries.push(summary);
    }
    Ok(summaries)
}
