//! Domain types used by the chunking pipeline and the index engines.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::classify::classify;
use crate::error::Error;

pub type ChunkId = String;
pub type Meta = BTreeMap<String, String>;

/// Coarse document family. Drives chunk size and chunking strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocType {
    MeetingMinutes,
    ProgressReport,
    ResearchPaper,
    General,
}

impl DocType {
    pub const ALL: [DocType; 4] = [
        DocType::MeetingMinutes,
        DocType::ProgressReport,
        DocType::ResearchPaper,
        DocType::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            DocType::MeetingMinutes => "meeting_minutes",
            DocType::ProgressReport => "progress_report",
            DocType::ResearchPaper => "research_paper",
            DocType::General => "general",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        DocType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| Error::NotFound(format!("unknown document type '{s}'")))
    }
}

/// Status bucket assigned to progress-report passages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    InProgress,
    Upcoming,
    Blocked,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Upcoming => "upcoming",
            TaskStatus::Blocked => "blocked",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which strategy cut a chunk out of its document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkKind {
    StructuredSection,
    TaskBased,
    Semantic,
    SlidingWindow,
    FixedWindow,
}

/// Extracted metadata. Opaque to ranking, copied onto every chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub title: Option<String>,
    pub authors: Vec<String>,
    pub created_date: Option<String>,
    #[serde(default)]
    pub extra: Meta,
}

/// Output of a text-extraction collaborator for one source file.
#[derive(Debug, Clone, Default)]
pub struct Extracted {
    pub text: String,
    pub metadata: DocumentMetadata,
}

/// An ingested source document. Immutable once classified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub source: String,
    pub text: String,
    pub doc_type: DocType,
    pub metadata: DocumentMetadata,
}

impl Document {
    /// Builds a document and classifies it from its text.
    pub fn new(source: impl Into<String>, text: impl Into<String>, metadata: DocumentMetadata) -> Self {
        let text = text.into();
        let doc_type = classify(&text);
        Self { source: source.into(), text, doc_type, metadata }
    }
}

/// A passage of a document that is independently indexed.
///
/// - `id`: `"{source}:{ordinal}"`, unique across the corpus
/// - `ordinal`/`total_chunks`: position within the parent document
/// - `section`: structural section label, when the strategy detected one
/// - `task_type`: status bucket, progress reports only
/// - `semantic_tags`/`chunk_category`: filled in by the tagger
/// - `prev_id`/`next_id`: neighbours in document order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub id: ChunkId,
    pub text: String,
    pub ordinal: usize,
    pub total_chunks: usize,
    pub section: Option<String>,
    pub task_type: Option<TaskStatus>,
    pub semantic_tags: BTreeSet<String>,
    pub chunk_category: String,
    pub kind: ChunkKind,
    pub doc_type: DocType,
    pub source_file: String,
    pub prev_id: Option<ChunkId>,
    pub next_id: Option<ChunkId>,
    pub metadata: DocumentMetadata,
}

impl Chunk {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.semantic_tags.contains(tag)
    }
}

/// Indicates which engine produced a result.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SourceKind {
    Vector,
    Text,
}

/// The minimal surface returned by both retrieval engines.
///
/// `id` matches `Chunk::id`. `score` is engine-specific but higher is
/// always better: cosine similarity for vectors, raw BM25 for text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: ChunkId,
    pub score: f32,
    pub source: SourceKind,
}

/// Fusion weights applied to the vector and lexical signals.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weights {
    pub vector: f32,
    pub lexical: f32,
}

impl Weights {
    pub const fn new(vector: f32, lexical: f32) -> Self {
        Self { vector, lexical }
    }

    pub fn is_valid(&self) -> bool {
        self.vector.is_finite() && self.lexical.is_finite() && self.vector >= 0.0 && self.lexical >= 0.0
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self::new(0.3, 0.7)
    }
}
