//! Random-selection baseline: keep a uniformly sampled subset of each article.

use anyhow::{Context, Result};
use chrono::Utc;
use rand::{rngs::StdRng, seq::index, Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

use crate::{
    config::{KeepFraction, Settings},
    data::corpus,
    nlp::text::{PunctuationSplitter, SentenceSplitter},
    ranking::{
        reducer::{render_sentences, write_reduction},
        CorpusSummary, RunManifest,
    },
};

/// Options of a baseline run.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RandomConfig {
    pub fraction: KeepFraction,
    /// Fixed seed for reproducible samples; drawn from the OS when absent.
    pub seed: Option<u64>,
}

impl RandomConfig {
    pub fn results_dir_name(&self) -> String {
        format!("random-top-{}-percent", self.fraction.percent_label())
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Sample `floor(n × fraction)` distinct sentences, returned in sample order.
pub fn sample_sentences<'a, R: Rng + ?Sized>(
    splitter: &dyn SentenceSplitter,
    text: &'a str,
    fraction: KeepFraction,
    rng: &mut R,
) -> Vec<&'a str> {
    let sentences = splitter.split(text);
    let amount = fraction.keep_length(sentences.len());
    index::sample(rng, sentences.len(), amount)
        .into_iter()
        .map(|i| sentences[i])
        .collect()
}

/// Reduce every sub-corpus by random selection.
///
/// Articles are processed in order on one generator so a seeded run is reproducible.
pub async fn run(config: RandomConfig, settings: &Settings) -> Result<RunManifest<RandomConfig>> {
    let corpora = corpus::load_corpora(&settings.data_dir)?;
    let output_dir = settings.join_results(config.results_dir_name());

    let task_dir = output_dir.clone();
    let summaries = tokio::task::spawn_blocking(move || -> Result<Vec<CorpusSummary>> {
        let splitter = PunctuationSplitter;
        let mut rng = config.rng();
        let mut summaries = Vec::with_capacity(corpora.len());
        for corpus in corpora {
            let dir = task_dir.join(&corpus.name);
            std::fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
            info!(corpus = %corpus.name, articles = corpus.articles.len(), "sampling sub-corpus");

            let mut summary = CorpusSummary::new(&corpus.name);
            for article in &corpus.articles {
                let sentences = splitter.split(&article.text).len();
                let kept = sample_sentences(&splitter, &article.text, config.fraction, &mut rng);
                write_reduction(&dir, &article.id, &render_sentences(kept.iter().copied()))?;
                summary.articles += 1;
                summary.sentences += sentences;
                summary.scored += sentences;
                summary.kept += kept.len();
            }
            summaries.push(summary);
        }
        Ok(summaries)
    })
    .await
    .context("sampling task panicked")??;

    let manifest = RunManifest {
        config,
        output_dir,
        corpora: summaries,
        completed_at: Utc::now(),
    };
    let path = manifest.write()?;
    info!(manifest = %path.display(), "random baseline complete");
    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    const TEXT: &str = "One. Two. Three. Four. Five. Six.";

    #[test]
    fn samples_floor_of_fraction_without_repeats() {
        let fraction = KeepFraction::new(0.67).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let kept = sample_sentences(&PunctuationSplitter, TEXT, fraction, &mut rng);
        assert_eq!(kept.len(), 4);
        let unique: HashSet<_> = kept.iter().map(|s| s.trim()).collect();
        assert_eq!(unique.len(), 4);
    }

    #[test]
    fn same_seed_same_sample() {
        let fraction = KeepFraction::new(0.5).unwrap();
        let first = sample_sentences(&PunctuationSplitter, TEXT, fraction, &mut StdRng::seed_from_u64(42));
        let second = sample_sentences(&PunctuationSplitter, TEXT, fraction, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);
    }

    #[test]
    fn directory_name_uses_percentage() {
        let config = RandomConfig {
            fraction: KeepFraction::new(0.67).unwrap(),
            seed: None,
        };
        assert_eq!(config.results_dir_name(), "random-top-67-percent");
    }
}
