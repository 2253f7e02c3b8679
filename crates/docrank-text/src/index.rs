use parking_lot::{Mutex, RwLock};
use std::collections::{HashMap, HashSet};
use std::fmt::Display;
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Term};
use tracing::{debug, warn};

use docrank_core::tokenize::tokenize;
use docrank_core::types::ChunkId;
use docrank_core::{Error, Result};

use crate::tantivy_utils::{build_schema, register_tokenizer, Fields};

const WRITER_MEMORY_BYTES: usize = 20_000_000;

struct Writer {
    inner: IndexWriter,
    staged: Vec<(ChunkId, Vec<String>)>,
    next_seq: u64,
}

/// Incrementally maintained BM25 index over chunk texts.
///
/// Writes are staged and become visible together on `commit`. The reader
/// only reloads after a commit, so a query sees the index either before or
/// after a commit, never in between.
pub struct LexicalIndex {
    reader: IndexReader,
    pub(crate) fields: Fields,
    writer: Mutex<Writer>,
    /// Committed chunk id -> indexed tokens.
    postings: RwLock<HashMap<ChunkId, Vec<String>>>,
}

pub(crate) fn lexical_err(e: impl Display) -> Error {
    Error::Lexical(e.to_string())
}

impl LexicalIndex {
    pub fn new() -> Result<Self> {
        let (schema, fields) = build_schema();
        let index = Index::create_in_ram(schema);
        register_tokenizer(&index);
        let inner: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES).map_err(lexical_err)?;
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(lexical_err)?;
        Ok(Self {
            reader,
            fields,
            writer: Mutex::new(Writer { inner, staged: Vec::new(), next_seq: 0 }),
            postings: RwLock::new(HashMap::new()),
        })
    }

    /// Stages and commits a single chunk.
    pub fn index(&self, id: &str, text: &str) -> Result<()> {
        self.stage(id, text)?;
        self.commit().map(|_| ())
    }

    /// Adds a chunk to the pending batch. Not visible to queries until
    /// `commit`. Ids already committed or staged are rejected.
    pub fn stage(&self, id: &str, text: &str) -> Result<()> {
        let mut writer = self.writer.lock();
        if self.postings.read().contains_key(id) || writer.staged.iter().any(|(staged, _)| staged == id) {
            return Err(Error::DuplicateChunk(id.to_string()));
        }
        let tokens = tokenize(text);
        let seq = writer.next_seq;
        writer
            .inner
            .add_document(doc!(
                self.fields.id => id.to_string(),
                self.fields.seq => seq,
                self.fields.text => tokens.join(" "),
            ))
            .map_err(lexical_err)?;
        writer.next_seq += 1;
        writer.staged.push((id.to_string(), tokens));
        Ok(())
    }

    /// Publishes every staged chunk. Returns how many became visible.
    pub fn commit(&self) -> Result<usize> {
        let mut writer = self.writer.lock();
        writer.inner.commit().map_err(lexical_err)?;
        self.reader.reload().map_err(lexical_err)?;
        let staged = std::mem::take(&mut writer.staged);
        let count = staged.len();
        self.postings.write().extend(staged);
        debug!(count, total = self.len(), "lexical commit");
        Ok(count)
    }

    /// Drops every staged chunk. Committed chunks are untouched.
    pub fn rollback(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        let dropped = writer.staged.len();
        writer.inner.rollback().map_err(lexical_err)?;
        writer.staged.clear();
        if dropped > 0 {
            warn!(dropped, "lexical writes rolled back");
        }
        Ok(())
    }

    /// Removes committed chunks and commits the removal.
    pub fn remove(&self, ids: &[ChunkId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let mut writer = self.writer.lock();
        for id in ids {
            writer.inner.delete_term(Term::from_field_text(self.fields.id, id));
        }
        writer.inner.commit().map_err(lexical_err)?;
        self.reader.reload().map_err(lexical_err)?;
        let doomed: HashSet<&ChunkId> = ids.iter().collect();
        self.postings.write().retain(|id, _| !doomed.contains(id));
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let mut writer = self.writer.lock();
        writer.staged.clear();
        writer.inner.delete_all_documents().map_err(lexical_err)?;
        writer.inner.commit().map_err(lexical_err)?;
        self.reader.reload().map_err(lexical_err)?;
        self.postings.write().clear();
        Ok(())
    }

    /// Committed chunk count.
    pub fn len(&self) -> usize {
        self.postings.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, id: &str) -> bool {
        self.postings.read().contains_key(id)
    }

    /// The token sequence a committed chunk was indexed with.
    pub fn tokens_for(&self, id: &str) -> Option<Vec<String>> {
        self.postings.read().get(id).cloned()
    }

    pub(crate) fn searcher(&self) -> tantivy::Searcher {
        self.reader.searcher()
    }
}
