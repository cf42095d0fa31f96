//! Pretrained word-vector lookup and vector aggregation helpers.

use std::{
    collections::HashMap,
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use anyhow::{bail, Context, Result};
use ndarray::{Array1, ArrayView1};
use tracing::{info, warn};

/// Read-only word → vector lookup.
///
/// Out-of-vocabulary tokens yield `None`; callers filter them before aggregating.
pub trait EmbeddingProvider: Send + Sync {
    /// Fixed dimensionality of every vector.
    fn dimension(&self) -> usize;

    fn embed(&self, token: &str) -> Option<&[f32]>;

    fn contains(&self, token: &str) -> bool {
        self.embed(token).is_some()
    }

    /// Batch lookup with the same semantics as repeated [`embed`](Self::embed).
    fn embed_batch<'a>(&'a self, tokens: &[&str]) -> Vec<Option<&'a [f32]>> {
        tokens.iter().map(|token| self.embed(token)).collect()
    }
}

/// In-memory word-vector table, stored as one contiguous row-major buffer.
#[derive(Debug, Clone, Default)]
pub struct WordVectors {
    dimension: usize,
    index: HashMap<String, usize>,
    data: Vec<f32>,
}

impl WordVectors {
    /// Build a table from `(word, vector)` pairs. The first vector fixes the dimension.
    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, Vec<f32>)>,
        S: Into<String>,
    {
        let mut table = Self::default();
        for (word, vector) in pairs {
            if table.index.is_empty() && table.dimension == 0 {
                table.dimension = vector.len();
            }
            if vector.len() != table.dimension {
                bail!(
                    "vector dimension {} does not match table dimension {}",
                    vector.len(),
                    table.dimension
                );
            }
            table.insert(word.into(), &vector);
        }
        Ok(table)
    }

    /// Load a GloVe or word2vec text file (`word v1 .. vD` per line, optional `count dim` header).
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("open embedding table {}", path.display()))?;
        let reader = BufReader::new(file);
        let mut table = Self::default();
        let mut skipped = 0usize;

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read {} line {}", path.display(), line_no + 1))?;
            let line = line.trim_end();
            if line.is_empty() {
                continue;
            }
            if line_no == 0 {
                if let Some(dimension) = parse_header(line) {
                    table.dimension = dimension;
                    continue;
                }
                table.dimension = line.split(' ').count().saturating_sub(1);
            }
            match parse_line(line, table.dimension) {
                Some((word, vector)) => {
                    if !table.index.contains_key(word) {
                        table.insert(word.to_string(), &vector);
                    }
                }
                None => skipped += 1,
            }
        }

        if table.index.is_empty() {
            bail!("embedding table {} contains no vectors", path.display());
        }
        if skipped > 0 {
            warn!(skipped, path = %path.display(), "skipped malformed embedding lines");
        }
        info!(
            path = %path.display(),
            words = table.len(),
            dimension = table.dimension,
            "loaded word vectors"
        );
        Ok(table)
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    fn insert(&mut self, word: String, vector: &[f32]) {
        let row = self.index.len();
        self.data.extend_from_slice(vector);
        self.index.insert(word, row);
    }
}

impl EmbeddingProvider for WordVectors {
    fn dimension(&self) -> usize {
        self.dimension
    }

    fn embed(&self, token: &str) -> Option<&[f32]> {
        let row = *self.index.get(token)?;
        let start = row * self.dimension;
        Some(&self.data[start..start + self.dimension])
    }
}

fn parse_header(line: &str) -> Option<usize> {
    let mut parts = line.split_whitespace();
    let _count: usize = parts.next()?.parse().ok()?;
    let dimension: usize = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some(dimension)
}

/// Split off the trailing `dimension` floats; whatever precedes them is the word.
fn parse_line(line: &str, dimension: usize) -> Option<(&str, Vec<f32>)> {
    if dimension == 0 {
        return None;
    }
    let mut fields = line.rsplitn(dimension + 1, ' ');
    let mut vector = Vec::with_capacity(dimension);
    for _ in 0..dimension {
        vector.push(fields.next()?.parse::<f32>().ok()?);
    }
    let word = fields.next()?;
    if word.is_empty() {
        return None;
    }
    vector.reverse();
    Some((word, vector))
}

/// Element-wise mean of the vectors of all in-vocabulary `words`.
///
/// Returns `None` when no word is known.
pub fn mean_vector<S: AsRef<str>>(
    provider: &dyn EmbeddingProvider,
    words: &[S],
) -> Option<Vec<f32>> {
    let tokens: Vec<&str> = words.iter().map(AsRef::as_ref).collect();
    let mut sum = Array1::<f32>::zeros(provider.dimension());
    let mut count = 0usize;
    for vector in provider.embed_batch(&tokens).into_iter().flatten() {
        sum += &ArrayView1::from(vector);
        count += 1;
    }
    if count == 0 {
        return None;
    }
    Some((sum / count as f32).to_vec())
}

/// Cosine similarity; zero when either vector has no magnitude.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot = a.iter().zip(b).map(|(x, y)| x * y).sum::<f32>();
    let norm_a = a.iter().map(|v| v * v).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Euclidean distance, the ground metric for Word Mover's Distance.
pub fn euclidean(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b)
        .map(|(x, y)| {
            let d = (*x - *y) as f64;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn table() -> WordVectors {
        WordVectors::from_pairs([
            ("climate", vec![1.0, 0.0]),
            ("warming", vec![0.0, 1.0]),
        ])
        .unwrap()
    }

    #[test]
    fn unknown_words_are_not_errors() {
        let vectors = table();
        assert!(vectors.embed("stocks").is_none());
        assert_eq!(vectors.embed("climate"), Some(&[1.0, 0.0][..]));
        let batch = vectors.embed_batch(&["climate", "stocks", "warming"]);
        assert_eq!(batch.len(), 3);
        assert!(batch[1].is_none());
        assert_eq!(batch[2], vectors.embed("warming"));
    }

    #[test]
    fn mean_skips_out_of_vocabulary_words() {
        let vectors = table();
        let mean = mean_vector(&vectors, &["climate", "stocks", "warming"]).unwrap();
        assert_eq!(mean, vec![0.5, 0.5]);
        assert!(mean_vector(&vectors, &["stocks"]).is_none());
    }

    #[test]
    fn rejects_mixed_dimensions() {
        let result = WordVectors::from_pairs([("a", vec![1.0]), ("b", vec![1.0, 2.0])]);
        assert!(result.is_err());
    }

    #[test]
    fn loads_text_format_with_header_and_spaced_words() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "3 2").unwrap();
        writeln!(file, "climate 0.5 0.25").unwrap();
        writeln!(file, "new york 1 2").unwrap();
        writeln!(file, "broken 1").unwrap();
        let vectors = WordVectors::load(file.path()).unwrap();
        assert_eq!(vectors.dimension(), 2);
        assert_eq!(vectors.len(), 2);
        assert_eq!(vectors.embed("new york"), Some(&[1.0, 2.0][..]));
    }

    #[test]
    fn cosine_handles_zero_vectors() {
        assert_eq!(cosine(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert!((cosine(&[1.0, 1.0], &[2.0, 2.0]) - 1.0).abs() < 1e-6);
    }
}
