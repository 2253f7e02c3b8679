//! Contracts for the external collaborators the engine is wired to.
//!
//! Collaborators are opaque services, so their failures surface as
//! `anyhow::Error` and the engine decides how to degrade.

use std::path::Path;

use crate::types::{ChunkId, Extracted, SearchHit};

/// Text → vector. Every vector from one embedder has `dim()` entries.
pub trait Embedder: Send + Sync {
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;
}

/// Nearest-neighbour service over chunk embeddings.
pub trait VectorIndex: Send + Sync {
    fn upsert(&self, id: &str, vector: &[f32]) -> anyhow::Result<()>;
    /// Top `top_n` ids by cosine similarity, best first.
    fn search(&self, query: &[f32], top_n: usize) -> anyhow::Result<Vec<SearchHit>>;
    fn delete(&self, ids: &[ChunkId]) -> anyhow::Result<()>;
    fn delete_all(&self) -> anyhow::Result<()>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Supplies raw text and pass-through metadata for a source file.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> anyhow::Result<Extracted>;
}
