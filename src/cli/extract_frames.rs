//! CLI entry-point for offline frame keyword extraction.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::Settings,
    data::glossary::GlossaryVariant,
    frames::extract::{self, ExtractOptions},
};

/// Args for the `extract-frames` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Glossary merged into each frame's mean embedding.
    #[arg(long, default_value = "normal", value_enum)]
    pub glossary: GlossaryVariant,
    /// Highest-weighted terms taken from each article.
    #[arg(long, default_value_t = 8)]
    pub top_terms: usize,
    /// Keywords kept per frame.
    #[arg(long, default_value_t = 40)]
    pub keep: usize,
    /// Skip mean embeddings and vocabulary-checked lemmatization.
    #[arg(long)]
    pub no_embeddings: bool,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let options = ExtractOptions {
        top_terms: args.top_terms,
        keep: args.keep,
    };
    extract::run(&settings, args.glossary, !args.no_embeddings, options).await?;
    Ok(())
}
