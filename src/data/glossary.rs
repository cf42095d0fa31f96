//! Climate-change glossary loading.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Which glossary file backs the global reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlossaryVariant {
    /// Wikipedia climate-change glossary, one term per line.
    Normal,
    /// Extended glossary, single-column CSV.
    Enriched,
}

impl GlossaryVariant {
    pub fn file_name(self) -> &'static str {
        match self {
            Self::Normal => "CCglossaryWiki.txt",
            Self::Enriched => "CCglossaryComplete.csv",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Enriched => "enriched",
        }
    }
}

/// Normalised domain vocabulary in file order, without duplicates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glossary {
    words: Vec<String>,
}

impl Glossary {
    pub fn new<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: IndexSet<String> = terms
            .into_iter()
            .map(|term| normalize_term(term.as_ref()))
            .filter(|term| !term.is_empty())
            .collect();
        Self {
            words: words.into_iter().collect(),
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Multi-word terms are joined with underscores to match phrase embeddings.
pub fn normalize_term(term: &str) -> String {
    term.replace(&['\n', '\r'][..], "")
        .trim()
        .replace(' ', "_")
        .to_lowercase()
}

pub fn load_glossary(resources_dir: &Path, variant: GlossaryVariant) -> Result<Glossary> {
    let path = resources_dir.join(variant.file_name());
    let glossary = match variant {
        GlossaryVariant::Normal => {
            let raw = std::fs::read_to_string(&path)
                .with_context(|| format!("read glossary {}", path.display()))?;
            Glossary::new(raw.lines())
        }
        GlossaryVariant::Enriched => {
            let mut reader = csv::ReaderBuilder::new()
                .has_headers(false)
                .flexible(true)
                .from_path(&path)
                .with_context(|| format!("open glossary {}", path.display()))?;
            let mut terms = Vec::new();
            for record in reader.records() {
                let record = record.with_context(|| format!("parse {}", path.display()))?;
                if let Some(term) = record.get(0) {
                    terms.push(term.to_string());
                }
            }
            Glossary::new(terms)
        }
    };
    info!(?variant, terms = glossary.len(), "loaded glossary");
    Ok(glossary)
}
