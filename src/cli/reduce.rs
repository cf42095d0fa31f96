//! CLI entry-point for ranking runs.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::{info, instrument};

use crate::{
    cli::{Criterion, Method},
    config::Settings,
    data::glossary::GlossaryVariant,
    ranking::{self, RunConfig},
};

/// Args for the `reduce` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Glossary backing the global reference.
    #[arg(long, default_value = "normal", value_enum)]
    pub glossary: GlossaryVariant,
    /// Fraction of each article's sentences to keep, in (0, 1].
    #[arg(long, default_value_t = 0.5)]
    pub length: f64,
    /// Sentence representation.
    #[arg(long, default_value = "glove", value_enum)]
    pub method: Method,
    /// Ranking distance.
    #[arg(long, default_value = "cosine", value_enum)]
    pub criterion: Criterion,
    /// Rank each article against its annotated frame's reference.
    #[arg(long)]
    pub frame: bool,
    /// Articles reduced concurrently.
    #[arg(long, default_value_t = 1)]
    pub jobs: usize,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let config = RunConfig::new(
        args.glossary,
        args.length,
        args.method,
        args.criterion,
        args.frame,
        args.jobs,
    )?;
    let manifest = ranking::run(config, &settings).await?;
    let kept: usize = manifest.corpora.iter().map(|c| c.kept).sum();
    info!(output = %manifest.output_dir.display(), kept, "reduction finished");
    Ok(())
}
