use anyhow::{bail, Result};
use parking_lot::RwLock;
use std::collections::HashMap;

use docrank_core::traits::VectorIndex;
use docrank_core::types::{ChunkId, SearchHit, SourceKind};

#[derive(Default)]
struct Entries {
    vectors: HashMap<ChunkId, (u64, Vec<f32>)>,
    dim: Option<usize>,
    next_seq: u64,
}

/// Brute-force cosine index held in memory.
///
/// Every search scans all vectors, which is fine for the corpus sizes a
/// single engine holds. Ties keep upsert order.
#[derive(Default)]
pub struct MemoryVectorIndex {
    entries: RwLock<Entries>,
}

impl MemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.read().vectors.contains_key(id)
    }
}

impl VectorIndex for MemoryVectorIndex {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<()> {
        let mut guard = self.entries.write();
        let entries = &mut *guard;
        if let Some(dim) = entries.dim {
            if dim != vector.len() {
                bail!("vector for {id} has {} dimensions, index holds {dim}", vector.len());
            }
        }
        entries.dim = Some(vector.len());
        let seq = match entries.vectors.get(id) {
            Some((seq, _)) => *seq,
            None => {
                entries.next_seq += 1;
                entries.next_seq
            }
        };
        entries.vectors.insert(id.to_string(), (seq, vector.to_vec()));
        Ok(())
    }

    fn search(&self, query: &[f32], top_n: usize) -> Result<Vec<SearchHit>> {
        let entries = self.entries.read();
        if let Some(dim) = entries.dim {
            if dim != query.len() {
                bail!("query has {} dimensions, index holds {dim}", query.len());
            }
        }
        // NaN components poison the cosine; such vectors never match.
        let mut scored: Vec<(f32, u64, &ChunkId)> = entries
            .vectors
            .iter()
            .map(|(id, (seq, v))| (cosine_similarity(query, v), *seq, id))
            .filter(|(score, _, _)| score.is_finite())
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        Ok(scored
            .into_iter()
            .take(top_n)
            .map(|(score, _, id)| SearchHit { id: id.clone(), score, source: SourceKind::Vector })
            .collect())
    }

    fn delete(&self, ids: &[ChunkId]) -> Result<()> {
        let mut entries = self.entries.write();
        for id in ids {
            entries.vectors.remove(id);
        }
        if entries.vectors.is_empty() {
            entries.dim = None;
        }
        Ok(())
    }

    fn delete_all(&self) -> Result<()> {
        *self.entries.write() = Entries::default();
        tracing::debug!("vector index cleared");
        Ok(())
    }

    fn len(&self) -> usize {
        self.entries.read().vectors.len()
    }
}

/// Cosine similarity in [-1, 1]; 0 when either vector is all zeros.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same length");

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}
