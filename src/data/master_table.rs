//! Human-annotated master table mapping articles to their dominant frame.

use std::{collections::HashMap, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::frames::{FrameLabel, LabelSource};

pub const MASTER_TABLE_FILE: &str = "master_table.tsv";

#[derive(Debug, Deserialize)]
struct MasterRow {
    txt: String,
    #[serde(rename = "Labels_dominant", default)]
    labels_dominant: Option<String>,
}

/// Article identifier → frame label lookup.
#[derive(Debug, Clone, Default)]
pub struct MasterTable {
    labels: HashMap<String, FrameLabel>,
}

impl MasterTable {
    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(reader);
        let mut labels = HashMap::new();
        let mut unmapped = 0usize;
        for row in reader.deserialize() {
            let row: MasterRow = row.context("parse master table row")?;
            match row
                .labels_dominant
                .as_deref()
                .and_then(FrameLabel::from_code)
            {
                Some(label) => {
                    labels.insert(article_key(&row.txt).to_string(), label);
                }
                None => unmapped += 1,
            }
        }
        if unmapped > 0 {
            debug!(unmapped, "master table rows without a known frame code");
        }
        Ok(Self { labels })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)
            .with_context(|| format!("open master table {}", path.display()))?;
        let table = Self::from_reader(file)?;
        info!(path = %path.display(), labelled = table.len(), "loaded master table");
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

impl LabelSource for MasterTable {
    fn label_for(&self, article_id: &str) -> Option<FrameLabel> {
        self.labels.get(article_key(article_id)).copied()
    }
}

/// Corpus file names carry an `.ocr` suffix that the table omits.
fn article_key(id: &str) -> &str {
    let id = id.trim();
    id.strip_suffix(".ocr").unwrap_or(id)
}
