//! OCR corpus loading.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;
use walkdir::WalkDir;

/// A named sub-corpus and the number of leading byline lines stripped from each file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubCorpus {
    pub name: &'static str,
    pub skip_lines: usize,
}

/// Science articles carry author names on their first three lines, Nature on two.
pub const SUB_CORPORA: &[SubCorpus] = &[
    SubCorpus {
        name: "ScienceOCR",
        skip_lines: 3,
    },
    SubCorpus {
        name: "NatureOCR",
        skip_lines: 2,
    },
];

/// One article: file name and body text with the byline removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub id: String,
    pub text: String,
}

/// All articles of one sub-corpus, ordered by file name.
#[derive(Debug, Clone)]
pub struct Corpus {
    pub name: String,
    pub articles: Vec<Article>,
}

/// Load every configured sub-corpus below `data_dir`.
pub fn load_corpora(data_dir: &Path) -> Result<Vec<Corpus>> {
    SUB_CORPORA
        .iter()
        .map(|sub| load_sub_corpus(data_dir, sub))
        .collect()
}

pub fn load_sub_corpus(data_dir: &Path, sub: &SubCorpus) -> Result<Corpus> {
    let root = data_dir.join(sub.name);
    if !root.is_dir() {
        bail!("sub-corpus directory {} does not exist", root.display());
    }

    let mut articles = Vec::new();
    for entry in WalkDir::new(&root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("list {}", root.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let id = entry.file_name().to_string_lossy().into_owned();
        let bytes = std::fs::read(entry.path())
            .with_context(|| format!("read article {}", entry.path().display()))?;
        articles.push(Article {
            id,
            text: strip_byline(&decode_lossy(&bytes), sub.skip_lines),
        });
    }

    info!(corpus = sub.name, articles = articles.len(), "loaded sub-corpus");
    Ok(Corpus {
        name: sub.name.to_string(),
        articles,
    })
}

/// Decode UTF-8, dropping undecodable bytes.
fn decode_lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect()
}

/// Drop the first `skip` lines and join the rest with single spaces.
pub fn strip_byline(raw: &str, skip: usize) -> String {
    raw.lines()
        .skip(skip)
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join(" ")
}
