#![allow(dead_code)]

use anyhow::{anyhow, Result};
use std::sync::atomic::{AtomicUsize, Ordering};

use docrank_core::config::Settings;
use docrank_core::traits::{Embedder, VectorIndex};
use docrank_core::types::{ChunkId, Document, DocumentMetadata, SearchHit, SourceKind};
use docrank_embed::HashEmbedder;
use docrank_hybrid::HybridEngine;
use docrank_vector::MemoryVectorIndex;

pub const MEETING: &str = "Attendees: Dana, Lee\nAgenda:\n- review AAV capsid budget\nAction items:\n- Dana to finalize budget by Friday";

pub const PROGRESS: &str = "Progress report, week of May 3\nCompleted:\n- capsid purification finished\nIn progress:\n- mouse dosing study underway\nUpcoming:\n- FDA pre-IND meeting scheduled for Q3\nBlocked:\n- reagent shortage delays timeline";

pub const RESEARCH: &str = "Abstract\nWe evaluate AAV delivery of CRISPR editors to the liver.\n\nMethods\nWe used a dual-vector approach and a standard assay protocol.\n\nResults\nWe found a 42% reduction in target protein (p < 0.01).\n\nConclusion\nLiver editing is efficient.";

pub const GENERAL: &str = "Team newsletter. The lab moved to the new building and the coffee machine works again.";

pub fn corpus() -> Vec<Document> {
    [("minutes.txt", MEETING), ("weekly.txt", PROGRESS), ("paper.txt", RESEARCH), ("news.txt", GENERAL)]
        .into_iter()
        .map(|(source, text)| Document::new(source, text, DocumentMetadata::default()))
        .collect()
}

pub fn embedder() -> Box<dyn Embedder> {
    Box::new(HashEmbedder::new(256))
}

pub fn engine_with<V: VectorIndex>(vectors: V) -> HybridEngine<V> {
    HybridEngine::new(Settings::default(), embedder(), vectors).expect("engine")
}

pub fn loaded_engine() -> HybridEngine<MemoryVectorIndex> {
    let engine = engine_with(MemoryVectorIndex::new());
    let report = engine.ingest_batch(corpus());
    assert_eq!(report.failed, 0, "{:?}", report.outcomes);
    engine
}

/// Accepts vectors but every search fails.
#[derive(Default)]
pub struct VectorsDown {
    pub inner: MemoryVectorIndex,
}

impl VectorIndex for VectorsDown {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<()> {
        self.inner.upsert(id, vector)
    }
    fn search(&self, _query: &[f32], _top_n: usize) -> Result<Vec<SearchHit>> {
        Err(anyhow!("vector service unreachable"))
    }
    fn delete(&self, ids: &[ChunkId]) -> Result<()> {
        self.inner.delete(ids)
    }
    fn delete_all(&self) -> Result<()> {
        self.inner.delete_all()
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Stores vectors but answers every search with a fixed hit list.
pub struct ScriptedVectors {
    pub inner: MemoryVectorIndex,
    pub hits: Vec<(String, f32)>,
}

impl ScriptedVectors {
    pub fn new(hits: &[(&str, f32)]) -> Self {
        Self {
            inner: MemoryVectorIndex::new(),
            hits: hits.iter().map(|(id, s)| (id.to_string(), *s)).collect(),
        }
    }
}

impl VectorIndex for ScriptedVectors {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<()> {
        self.inner.upsert(id, vector)
    }
    fn search(&self, _query: &[f32], top_n: usize) -> Result<Vec<SearchHit>> {
        Ok(self
            .hits
            .iter()
            .take(top_n)
            .map(|(id, score)| SearchHit { id: id.clone(), score: *score, source: SourceKind::Vector })
            .collect())
    }
    fn delete(&self, ids: &[ChunkId]) -> Result<()> {
        self.inner.delete(ids)
    }
    fn delete_all(&self) -> Result<()> {
        self.inner.delete_all()
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Rejects upserts for ids with a given prefix once `allow` upserts of
/// such ids went through.
pub struct FlakyVectors {
    pub inner: MemoryVectorIndex,
    pub prefix: &'static str,
    pub allow: usize,
    pub seen: AtomicUsize,
}

impl FlakyVectors {
    pub fn new(prefix: &'static str, allow: usize) -> Self {
        Self { inner: MemoryVectorIndex::new(), prefix, allow, seen: AtomicUsize::new(0) }
    }
}

impl VectorIndex for FlakyVectors {
    fn upsert(&self, id: &str, vector: &[f32]) -> Result<()> {
        if id.starts_with(self.prefix) && self.seen.fetch_add(1, Ordering::SeqCst) >= self.allow {
            return Err(anyhow!("disk full"));
        }
        self.inner.upsert(id, vector)
    }
    fn search(&self, query: &[f32], top_n: usize) -> Result<Vec<SearchHit>> {
        self.inner.search(query, top_n)
    }
    fn delete(&self, ids: &[ChunkId]) -> Result<()> {
        self.inner.delete(ids)
    }
    fn delete_all(&self) -> Result<()> {
        self.inner.delete_all()
    }
    fn len(&self) -> usize {
        self.inner.len()
    }
}

/// Acknowledges every upsert without storing anything.
#[derive(Default)]
pub struct LossyVectors;

impl VectorIndex for LossyVectors {
    fn upsert(&self, _id: &str, _vector: &[f32]) -> Result<()> {
        Ok(())
    }
    fn search(&self, _query: &[f32], _top_n: usize) -> Result<Vec<SearchHit>> {
        Ok(Vec::new())
    }
    fn delete(&self, _ids: &[ChunkId]) -> Result<()> {
        Ok(())
    }
    fn delete_all(&self) -> Result<()> {
        Ok(())
    }
    fn len(&self) -> usize {
        0
    }
}

pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize {
        256
    }
    fn embed_batch(&self, _texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Err(anyhow!("model not loaded"))
    }
}

pub fn ids(results: &[docrank_hybrid::RankedResult]) -> Vec<String> {
    results.iter().map(|r| r.chunk.id.clone()).collect()
}
