//! Natural language processing building blocks shared by ranking and keyword extraction.

pub mod embeddings;
pub mod lemma;
pub mod text;
pub mod tfidf;

use std::{path::Path, sync::Arc};

use anyhow::{Context, Result};
use tracing::info;

use embeddings::WordVectors;

/// Load the word-vector table off the async runtime.
pub async fn load_embeddings(path: &Path) -> Result<Arc<WordVectors>> {
    info!(path = %path.display(), "loading word embeddings");
    let owned = path.to_path_buf();
    let vectors = tokio::task::spawn_blocking(move || WordVectors::load(&owned))
        .await
        .context("embedding loader task panicked")??;
    Ok(Arc::new(vectors))
}
