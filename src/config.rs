//! Runtime configuration utilities for climate-reducer.

use std::{
    env,
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Application configuration resolved from `.env` and defaults.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Root folder holding the OCR sub-corpora.
    pub data_dir: PathBuf,
    /// Folder with glossaries, the master table and precomputed frame keywords.
    pub resources_dir: PathBuf,
    /// Root folder for reduced articles.
    pub results_dir: PathBuf,
    /// Pretrained word-vector table in GloVe/word2vec text format.
    pub embeddings_path: PathBuf,
    /// Offline frame keyword resource produced by `extract-frames`.
    pub frame_keywords_path: PathBuf,
}

impl Settings {
    /// Load configuration from environment with reasonable defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        let data_dir = env::var("DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));
        let resources_dir = env::var("RESOURCES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| data_dir.join("resources"));
        let results_dir = env::var("RESULTS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./results"));
        let embeddings_path = env::var("EMBEDDINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| resources_dir.join("glove.6B.300d.txt"));
        let frame_keywords_path = env::var("FRAME_KEYWORDS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| resources_dir.join("frame_keywords.json"));

        std::fs::create_dir_all(&results_dir).context("creating results dir")?;

        Ok(Self {
            data_dir,
            resources_dir,
            results_dir,
            embeddings_path,
            frame_keywords_path,
        })
    }

    /// Settings rooted at a single directory, used by tests and scripted runs.
    pub fn rooted<P: AsRef<Path>>(root: P) -> Self {
        let root = root.as_ref();
        let data_dir = root.join("data");
        let resources_dir = data_dir.join("resources");
        Self {
            embeddings_path: resources_dir.join("glove.6B.300d.txt"),
            frame_keywords_path: resources_dir.join("frame_keywords.json"),
            results_dir: root.join("results"),
            data_dir,
            resources_dir,
        }
    }

    /// Convenience helper for derived path segments.
    pub fn join_data<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.data_dir.join(path)
    }

    /// Convenience helper for resource files.
    pub fn join_resource<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.resources_dir.join(path)
    }

    /// Convenience helper for derived output path segments.
    pub fn join_results<P: AsRef<Path>>(&self, path: P) -> PathBuf {
        self.results_dir.join(path)
    }
}

/// Fatal configuration problems, reported before any article is processed.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("keep fraction must be in (0, 1], got {0}")]
    KeepFraction(f64),
    #[error("criterion `{criterion}` cannot be used with method `{method}`")]
    UnsupportedCombination {
        method: &'static str,
        criterion: &'static str,
    },
    #[error("required resource {path} is missing; {hint}")]
    MissingResource { path: PathBuf, hint: &'static str },
    #[error("no glossary word is known to the {0} vocabulary")]
    EmptyGlossary(&'static str),
}

/// Fraction of each article's sentences to keep, validated to lie in (0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeepFraction(f64);

impl KeepFraction {
    pub fn new(value: f64) -> Result<Self, ConfigError> {
        if value > 0.0 && value <= 1.0 {
            Ok(Self(value))
        } else {
            Err(ConfigError::KeepFraction(value))
        }
    }

    /// `floor(sentence_count × fraction)`; zero is a valid result.
    pub fn keep_length(self, sentence_count: usize) -> usize {
        (sentence_count as f64 * self.0).floor() as usize
    }

    /// Exact percentage used in result directory names: `0.5` is `"50"`,
    /// `0.504` is `"50.4"`.
    ///
    /// Built by shifting the decimal point of the shortest round-trip
    /// representation, so distinct fractions always give distinct labels.
    pub fn percent_label(self) -> String {
        let repr = self.0.to_string();
        let (int_part, frac_part) = repr.split_once('.').unwrap_or((repr.as_str(), ""));
        let shifted: String = frac_part.chars().chain(std::iter::repeat('0')).take(2).collect();
        let whole = format!("{int_part}{shifted}");
        let whole = whole.trim_start_matches('0');
        let whole = if whole.is_empty() { "0" } else { whole };
        match frac_part.get(2..) {
            Some(rest) if !rest.is_empty() => format!("{whole}.{rest}"),
            _ => whole.to_string(),
        }
    }
}
