use parking_lot::{Mutex, RwLock};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use tracing::{debug, info, instrument, warn};

use docrank_core::chunking::Chunker;
use docrank_core::config::{SearchConfig, Settings};
use docrank_core::tagger;
use docrank_core::traits::{Embedder, VectorIndex};
use docrank_core::types::{Chunk, ChunkId, DocType, Document, DocumentMetadata, SearchHit, Weights};
use docrank_core::{Error, Result};
use docrank_text::LexicalIndex;

use crate::filter::{Filter, TagMatch};
use crate::fusion::{fuse, Fused};
use crate::rewrite::{suggest_weights, Intent, QueryRewriter};

/// A query and how to run it. Built with the chained setters.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub query: String,
    /// Falls back to `search.default_top_k`.
    pub top_k: Option<usize>,
    /// Explicit weights win over intent-suggested ones.
    pub weights: Option<Weights>,
    /// Retrieve with the synonym-expanded text. Implies intent detection.
    pub expand: bool,
    pub detect_intent: bool,
    /// Also narrow results to what the detected intent implies.
    pub intent_filter: bool,
    pub filter: Filter,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self { query: query.into(), ..Self::default() }
    }

    pub fn top_k(mut self, top_k: usize) -> Self {
        self.top_k = Some(top_k);
        self
    }

    pub fn weights(mut self, weights: Weights) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn expand(mut self, expand: bool) -> Self {
        self.expand = expand;
        self
    }

    pub fn detect_intent(mut self, detect: bool) -> Self {
        self.detect_intent = detect;
        self
    }

    pub fn intent_filter(mut self, on: bool) -> Self {
        self.intent_filter = on;
        self
    }

    pub fn filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RankedResult {
    pub chunk: Chunk,
    pub vector_score: f32,
    pub lexical_raw_score: f32,
    /// `ln(1 + lexical_raw_score)`.
    pub lexical_score: f32,
    pub combined_score: f32,
    /// 1-based position in the unfiltered ranking.
    pub rank: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub query: String,
    /// Text sent to both retrievers when it differs from `query`.
    pub expanded_query: Option<String>,
    pub synonyms_added: Vec<String>,
    pub intent: Option<Intent>,
    pub weights: Weights,
    pub results: Vec<RankedResult>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRecord {
    pub source: String,
    pub doc_type: DocType,
    pub chunk_count: usize,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Stats {
    pub total_documents: usize,
    pub total_chunks: usize,
    pub documents_by_type: BTreeMap<DocType, usize>,
    pub chunks_by_type: BTreeMap<DocType, usize>,
    pub documents: Vec<DocumentRecord>,
}

/// Result of one document in a batch.
#[derive(Debug)]
pub struct DocumentOutcome {
    pub source: String,
    pub result: Result<DocumentRecord>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<DocumentOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

struct StoredChunk {
    chunk: Chunk,
    seq: u64,
}

#[derive(Default)]
struct ChunkStore {
    chunks: HashMap<ChunkId, StoredChunk>,
    documents: Vec<DocumentRecord>,
    next_seq: u64,
}

impl ChunkStore {
    fn seq_of(&self, id: &str) -> Option<u64> {
        self.chunks.get(id).map(|c| c.seq)
    }

    fn has_document(&self, source: &str) -> bool {
        self.documents.iter().any(|d| d.source == source)
    }
}

/// Hybrid retrieval engine: owns the chunk store and the lexical index,
/// and drives the embedding and vector collaborators.
///
/// Ingestion is serialized. A document's chunks become visible to queries
/// all at once: the lexical commit and the chunk publication happen under
/// the store's write lock, and every query holds the read lock for its
/// whole duration.
pub struct HybridEngine<V: VectorIndex> {
    search: SearchConfig,
    chunker: Chunker,
    rewriter: QueryRewriter,
    embedder: Box<dyn Embedder>,
    vectors: V,
    lexical: LexicalIndex,
    store: RwLock<ChunkStore>,
    ingest_lock: Mutex<()>,
}

impl<V: VectorIndex> HybridEngine<V> {
    pub fn new(settings: Settings, embedder: Box<dyn Embedder>, vectors: V) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            search: settings.search,
            chunker: Chunker::new(settings.chunking),
            rewriter: QueryRewriter::new(),
            embedder,
            vectors,
            lexical: LexicalIndex::new()?,
            store: RwLock::new(ChunkStore::default()),
            ingest_lock: Mutex::new(()),
        })
    }

    pub fn vectors(&self) -> &V {
        &self.vectors
    }

    pub fn lexical(&self) -> &LexicalIndex {
        &self.lexical
    }

    pub fn rewriter(&self) -> &QueryRewriter {
        &self.rewriter
    }

    /// Chunks and tags a document without touching any index.
    pub fn prepare(&self, document: &Document) -> Vec<Chunk> {
        let mut chunks = self.chunker.chunk(document);
        for chunk in &mut chunks {
            tagger::tag(chunk);
        }
        chunks
    }

    pub fn ingest_text(
        &self,
        source: impl Into<String>,
        text: impl Into<String>,
        metadata: DocumentMetadata,
    ) -> Result<DocumentRecord> {
        self.ingest(Document::new(source, text, metadata))
    }

    /// Indexes one document. On failure nothing of it stays in either index.
    #[instrument(skip_all, fields(source = %document.source, doc_type = %document.doc_type))]
    pub fn ingest(&self, document: Document) -> Result<DocumentRecord> {
        let _serial = self.ingest_lock.lock();
        let chunks = self.prepare(&document);
        let record = DocumentRecord {
            source: document.source.clone(),
            doc_type: document.doc_type,
            chunk_count: chunks.len(),
            title: document.metadata.title.clone(),
        };

        {
            let store = self.store.read();
            if let Some(taken) = chunks.iter().find(|c| store.chunks.contains_key(&c.id)) {
                return Err(Error::DuplicateChunk(taken.id.clone()));
            }
            if store.has_document(&document.source) {
                return Err(Error::Validation(format!("document '{}' is already indexed", document.source)));
            }
        }

        if chunks.is_empty() {
            self.store.write().documents.push(record.clone());
            info!("indexed document with no chunks");
            return Ok(record);
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = self
            .embedder
            .embed_batch(&texts)
            .map_err(|e| Error::CollaboratorUnavailable(format!("embedding failed: {e:#}")))?;
        if embeddings.len() != chunks.len() {
            return Err(Error::CollaboratorUnavailable(format!(
                "embedder returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }

        let ids: Vec<ChunkId> = chunks.iter().map(|c| c.id.clone()).collect();
        let vectors_before = self.vectors.len();
        for (i, (id, vector)) in ids.iter().zip(&embeddings).enumerate() {
            if let Err(e) = self.vectors.upsert(id, vector) {
                self.discard_vectors(&ids[..i]);
                return Err(Error::CollaboratorUnavailable(format!("vector upsert failed for {id}: {e:#}")));
            }
        }

        let mut store = self.store.write();
        if let Err(e) = self.commit_lexical(&chunks) {
            self.discard_vectors(&ids);
            return Err(e);
        }
        let checks = [
            ("lexical", self.lexical.len(), store.chunks.len() + chunks.len()),
            ("vector", self.vectors.len(), vectors_before + chunks.len()),
        ];
        if let Some((index, actual, expected)) = checks.into_iter().find(|(_, actual, expected)| actual != expected) {
            if let Err(e) = self.lexical.remove(&ids) {
                warn!(error = %e, "failed to remove lexical entries after inconsistency");
            }
            self.discard_vectors(&ids);
            warn!(index, actual, expected, "index membership diverged; document rolled back");
            return Err(Error::IndexInconsistency { document: document.source, index, actual, expected });
        }

        for chunk in chunks {
            let seq = store.next_seq;
            store.next_seq += 1;
            store.chunks.insert(chunk.id.clone(), StoredChunk { chunk, seq });
        }
        store.documents.push(record.clone());
        info!(chunks = record.chunk_count, "indexed document");
        Ok(record)
    }

    fn commit_lexical(&self, chunks: &[Chunk]) -> Result<()> {
        let staged = chunks.iter().try_for_each(|c| self.lexical.stage(&c.id, &c.text));
        let committed = staged.and_then(|()| self.lexical.commit().map(|_| ()));
        if let Err(e) = committed {
            if let Err(rollback) = self.lexical.rollback() {
                warn!(error = %rollback, "lexical rollback failed");
            }
            return Err(e);
        }
        Ok(())
    }

    fn discard_vectors(&self, ids: &[ChunkId]) {
        if ids.is_empty() {
            return;
        }
        if let Err(e) = self.vectors.delete(ids) {
            warn!(error = %e, count = ids.len(), "failed to delete vectors during rollback");
        }
    }

    /// Ingests every document, isolating failures.
    pub fn ingest_batch<I>(&self, documents: I) -> BatchReport
    where
        I: IntoIterator<Item = Document>,
    {
        self.ingest_batch_with_progress(documents, |_| {})
    }

    /// Like `ingest_batch`, calling `on_outcome` after each document.
    pub fn ingest_batch_with_progress<I, F>(&self, documents: I, mut on_outcome: F) -> BatchReport
    where
        I: IntoIterator<Item = Document>,
        F: FnMut(&DocumentOutcome),
    {
        let mut report = BatchReport::default();
        for document in documents {
            let source = document.source.clone();
            let result = self.ingest(document);
            match &result {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    warn!(source = %source, error = %e, "document failed; continuing batch");
                    report.failed += 1;
                }
            }
            let outcome = DocumentOutcome { source, result };
            on_outcome(&outcome);
            report.outcomes.push(outcome);
        }
        info!(succeeded = report.succeeded, failed = report.failed, "batch ingested");
        report
    }

    /// Runs the full query pipeline: rewrite, dual retrieval, fusion,
    /// ranking, then filtering of the ranked window.
    #[instrument(skip_all, fields(query = %request.query))]
    pub fn search(&self, request: &SearchRequest) -> Result<SearchOutcome> {
        let top_k = self.resolve_top_k(request.top_k)?;
        if let Some(w) = request.weights {
            if !w.is_valid() {
                return Err(Error::Validation(format!(
                    "weights must be finite and non-negative, got ({}, {})",
                    w.vector, w.lexical
                )));
            }
        }

        let (retrieval_text, synonyms_added) = if request.expand {
            self.rewriter.expand(&request.query)
        } else {
            (request.query.clone(), Vec::new())
        };
        let intent = if request.expand || request.detect_intent {
            self.rewriter.detect_intent(&request.query)
        } else {
            None
        };
        let weights = match (request.weights, request.expand || request.detect_intent) {
            (Some(w), _) => w,
            (None, true) if intent.is_some() => suggest_weights(intent),
            _ => self.search.default_weights(),
        };
        debug!(?intent, vector = weights.vector, lexical = weights.lexical, "query plan");

        let store = self.store.read();
        let pool = top_k.saturating_mul(self.search.candidate_multiplier);
        let lexical_hits = match self.lexical.query(&retrieval_text, pool) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "lexical retrieval failed; continuing without it");
                Vec::new()
            }
        };
        let vector_hits = self.vector_candidates(&retrieval_text, pool);

        let mut fused: Vec<Fused> = fuse(&vector_hits, &lexical_hits, weights, |id| store.seq_of(id));
        fused.truncate(top_k);

        let intent_filter = request.intent_filter.then(|| intent.map(Intent::filter)).flatten();
        let results = fused
            .into_iter()
            .enumerate()
            .filter_map(|(i, f)| {
                let chunk = &store.chunks.get(&f.id)?.chunk;
                let keep = request.filter.matches(chunk) && intent_filter.as_ref().map_or(true, |flt| flt.matches(chunk));
                keep.then(|| RankedResult {
                    chunk: chunk.clone(),
                    vector_score: f.vector_score,
                    lexical_raw_score: f.lexical_raw_score,
                    lexical_score: f.lexical_score,
                    combined_score: f.combined_score,
                    rank: i + 1,
                })
            })
            .collect();

        let expanded_query = (retrieval_text != request.query).then_some(retrieval_text);
        Ok(SearchOutcome { query: request.query.clone(), expanded_query, synonyms_added, intent, weights, results })
    }

    fn resolve_top_k(&self, top_k: Option<usize>) -> Result<usize> {
        let top_k = top_k.unwrap_or(self.search.default_top_k);
        if top_k == 0 || top_k > self.search.max_top_k {
            return Err(Error::Validation(format!("top_k must be in 1..={}, got {top_k}", self.search.max_top_k)));
        }
        Ok(top_k)
    }

    /// Vector side of retrieval. Any collaborator failure degrades to an
    /// empty candidate set.
    fn vector_candidates(&self, text: &str, pool: usize) -> Vec<SearchHit> {
        if self.vectors.is_empty() {
            return Vec::new();
        }
        let query_vector = match self.embedder.embed_batch(&[text.to_string()]) {
            Ok(mut vs) if !vs.is_empty() => vs.swap_remove(0),
            Ok(_) => {
                warn!("embedder returned no vector for the query; lexical only");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "query embedding failed; lexical only");
                return Vec::new();
            }
        };
        match self.vectors.search(&query_vector, pool) {
            Ok(hits) => hits,
            Err(e) => {
                warn!(error = %e, "vector search failed; lexical only");
                Vec::new()
            }
        }
    }

    /// Plain hybrid search with default weights.
    pub fn search_text(&self, query: &str, top_k: usize) -> Result<Vec<RankedResult>> {
        Ok(self.search(&SearchRequest::new(query).top_k(top_k))?.results)
    }

    /// `search_text` narrowed to one document type, given by name. An
    /// unknown name yields no results.
    pub fn search_by_type(&self, query: &str, doc_type: &str, top_k: usize) -> Result<Vec<RankedResult>> {
        self.resolve_top_k(Some(top_k))?;
        let Ok(doc_type) = DocType::from_str(doc_type) else {
            debug!(doc_type, "unknown document type filter");
            return Ok(Vec::new());
        };
        let request = SearchRequest::new(query).top_k(top_k).filter(Filter::by_type(doc_type));
        Ok(self.search(&request)?.results)
    }

    pub fn search_by_tags(&self, query: &str, tags: &[&str], tag_match: TagMatch, top_k: usize) -> Result<Vec<RankedResult>> {
        let request = SearchRequest::new(query)
            .top_k(top_k)
            .filter(Filter::by_tags(tags.iter().copied(), tag_match));
        Ok(self.search(&request)?.results)
    }

    /// Expanded retrieval with intent-suggested weights and the intent's
    /// type/tag filter.
    pub fn search_with_intent(&self, query: &str, top_k: usize) -> Result<SearchOutcome> {
        self.search(&SearchRequest::new(query).top_k(top_k).expand(true).detect_intent(true).intent_filter(true))
    }

    pub fn chunk(&self, id: &str) -> Option<Chunk> {
        self.store.read().chunks.get(id).map(|c| c.chunk.clone())
    }

    pub fn get_stats(&self) -> Stats {
        let store = self.store.read();
        let mut documents_by_type: BTreeMap<DocType, usize> = DocType::ALL.iter().map(|t| (*t, 0)).collect();
        let mut chunks_by_type = documents_by_type.clone();
        for doc in &store.documents {
            *documents_by_type.entry(doc.doc_type).or_default() += 1;
        }
        for stored in store.chunks.values() {
            *chunks_by_type.entry(stored.chunk.doc_type).or_default() += 1;
        }
        Stats {
            total_documents: store.documents.len(),
            total_chunks: store.chunks.len(),
            documents_by_type,
            chunks_by_type,
            documents: store.documents.clone(),
        }
    }

    /// Empties the vector index, the lexical index and the chunk store.
    pub fn clear(&self) -> Result<()> {
        let _serial = self.ingest_lock.lock();
        let mut store = self.store.write();
        self.vectors
            .delete_all()
            .map_err(|e| Error::CollaboratorUnavailable(format!("vector clear failed: {e:#}")))?;
        self.lexical.clear()?;
        *store = ChunkStore::default();
        info!("engine cleared");
        Ok(())
    }
}
