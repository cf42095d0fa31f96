//! CLI entry-point for the random-selection baseline.

use anyhow::Result;
use clap::Args as ClapArgs;
use tracing::instrument;

use crate::{
    config::{KeepFraction, Settings},
    ranking::random::{self, RandomConfig},
};

/// Args for the `random` command.
#[derive(Debug, Clone, ClapArgs)]
pub struct Args {
    /// Fraction of each article's sentences to keep, in (0, 1].
    #[arg(long, default_value_t = 0.67)]
    pub length: f64,
    /// Seed for a reproducible sample.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[instrument(skip(settings))]
pub async fn run(args: Args, settings: Settings) -> Result<()> {
    let config = RandomConfig {
        fraction: KeepFraction::new(args.length)?,
        seed: args.seed,
    };
    random::run(config, &settings).await?;
    Ok(())
}
