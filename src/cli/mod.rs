//! Command-line interface wiring for climate-reducer.

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config::Settings;

pub mod extract_frames;
pub mod random;
pub mod reduce;

/// Top-level CLI definition.
#[derive(Debug, Parser)]
#[command(author, version, about = "Climate article corpus reducer", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Parse CLI arguments from the environment.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Dispatch the selected sub-command.
    pub async fn dispatch(self, settings: Settings) -> Result<()> {
        match self.command {
            Commands::Reduce(args) => reduce::run(args, settings).await,
            Commands::ExtractFrames(args) => extract_frames::run(args, settings).await,
            Commands::Random(args) => random::run(args, settings).await,
        }
    }
}

/// Supported sub-commands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Rank sentences against the glossary and keep the most relevant fraction.
    Reduce(reduce::Args),
    /// Precompute per-frame keywords and mean embeddings.
    ExtractFrames(extract_frames::Args),
    /// Baseline: keep a random fraction of each article.
    Random(random::Args),
}

/// How sentences and references are represented.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Pretrained word embeddings.
    Glove,
    /// TF-IDF vectors fitted over the run's articles.
    Tfidf,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Glove => "glove",
            Self::Tfidf => "tfidf",
        }
    }
}

/// Distance used to rank sentences.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Criterion {
    /// One minus cosine similarity of mean vectors.
    Cosine,
    /// Word Mover's Distance; embeddings only.
    Wmd,
}

impl Criterion {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cosine => "cosine",
            Self::Wmd => "wmd",
        }
    }
}
