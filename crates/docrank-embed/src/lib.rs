//! docrank-embed
//!
//! Embedding collaborators. The engine treats the model as an opaque
//! `text -> vector` function; this crate ships a deterministic hashed
//! embedder so the whole pipeline runs without model weights.

use anyhow::{bail, Result};
use std::hash::Hasher;
use twox_hash::XxHash64;

use docrank_core::config::EmbeddingConfig;
use docrank_core::tokenize::tokenize;
use docrank_core::traits::Embedder;

/// Feature-hashed bag of tokens, L2-normalized.
///
/// Each token lands in bucket `xxh64(token) % dim` with a sign taken from
/// the hash, so texts sharing tokens get a positive cosine similarity and
/// unrelated texts hover around zero.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
    seed: u64,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim, seed: 0 }
    }

    pub fn with_seed(dim: usize, seed: u64) -> Self {
        Self { dim, seed }
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dim];
        if self.dim == 0 {
            return v;
        }
        for token in tokenize(text) {
            let mut hasher = XxHash64::with_seed(self.seed);
            hasher.write(token.as_bytes());
            let h = hasher.finish();
            let idx = (h % self.dim as u64) as usize;
            let sign = if (h >> 63) == 0 { 1.0 } else { -1.0 };
            v[idx] += sign;
        }
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }
}

impl Embedder for HashEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if self.dim == 0 {
            bail!("embedding dimension must be positive");
        }
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}

/// The embedder configured under `embedding`.
pub fn default_embedder(config: &EmbeddingConfig) -> Box<dyn Embedder> {
    tracing::debug!(dim = config.dimension, "using hashed embedder");
    Box::new(HashEmbedder::new(config.dimension))
}
