//! Type-aware chunking.
//!
//! `Chunker::chunk` dispatches on `DocType` to a strategy that cuts the
//! text into passages, then assigns ids, ordinals and neighbour links.
//! Size targets are soft: a bullet is never split, and nothing is dropped.

mod meeting;
mod progress;
mod research;
pub mod window;

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::tokenize::count_tokens;
use crate::types::{Chunk, ChunkId, ChunkKind, DocType, Document, TaskStatus};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub meeting_target_tokens: usize,
    pub progress_target_tokens: usize,
    pub research_target_tokens: usize,
    pub general_target_tokens: usize,
    pub research_overlap_percent: f32,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            meeting_target_tokens: 300,
            progress_target_tokens: 500,
            research_target_tokens: 1000,
            general_target_tokens: 500,
            research_overlap_percent: 0.12,
        }
    }
}

impl ChunkingConfig {
    pub fn target_for(&self, doc_type: DocType) -> usize {
        match doc_type {
            DocType::MeetingMinutes => self.meeting_target_tokens,
            DocType::ProgressReport => self.progress_target_tokens,
            DocType::ResearchPaper => self.research_target_tokens,
            DocType::General => self.general_target_tokens,
        }
    }
}

/// A strategy's output before ids are assigned.
#[derive(Debug, Clone)]
pub(crate) struct Passage {
    pub text: String,
    pub section: Option<String>,
    pub task_type: Option<TaskStatus>,
    pub kind: ChunkKind,
}

impl Passage {
    pub fn new(text: String, kind: ChunkKind) -> Self {
        Self { text, section: None, task_type: None, kind }
    }
}

/// Smallest piece a strategy will move around. Atomic units are never split.
#[derive(Debug, Clone)]
pub(crate) struct Unit {
    pub text: String,
    pub atomic: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Splits `document` into ordered, non-empty, untagged chunks.
    pub fn chunk(&self, document: &Document) -> Vec<Chunk> {
        if document.text.trim().is_empty() {
            warn!(source = %document.source, "empty document produced no chunks");
            return Vec::new();
        }
        let target = self.config.target_for(document.doc_type);
        let passages = match document.doc_type {
            DocType::MeetingMinutes => meeting::split(&document.text, target),
            DocType::ProgressReport => progress::split(&document.text, target),
            DocType::ResearchPaper => research::split(&document.text, target, self.config.research_overlap_percent),
            DocType::General => window::fixed(&document.text, target)
                .into_iter()
                .map(|text| Passage::new(text, ChunkKind::FixedWindow))
                .collect(),
        };
        let passages: Vec<Passage> = passages.into_iter().filter(|p| !p.text.trim().is_empty()).collect();
        debug!(source = %document.source, doc_type = %document.doc_type, chunks = passages.len(), "chunked document");
        assemble(document, passages)
    }
}

pub fn chunk_id(doc_id: &str, ordinal: usize) -> ChunkId {
    format!("{doc_id}:{ordinal}")
}

fn assemble(document: &Document, passages: Vec<Passage>) -> Vec<Chunk> {
    let total_chunks = passages.len();
    let ids: Vec<ChunkId> = (0..total_chunks).map(|i| chunk_id(&document.source, i)).collect();
    passages
        .into_iter()
        .enumerate()
        .map(|(ordinal, p)| Chunk {
            id: ids[ordinal].clone(),
            text: p.text,
            ordinal,
            total_chunks,
            section: p.section,
            task_type: p.task_type,
            semantic_tags: BTreeSet::new(),
            chunk_category: "general".to_string(),
            kind: p.kind,
            doc_type: document.doc_type,
            source_file: document.source.clone(),
            prev_id: ordinal.checked_sub(1).map(|i| ids[i].clone()),
            next_id: ids.get(ordinal + 1).cloned(),
            metadata: document.metadata.clone(),
        })
        .collect()
}

static BULLET_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:[-*•✓✗⚠]\s+|\d+[.)]\s+)").expect("bullet pattern"));

pub(crate) fn is_bullet(trimmed: &str) -> bool {
    BULLET_RE.is_match(trimmed)
}

/// Groups lines into units: a bullet plus its indented continuation lines
/// is one atomic unit; blank-line separated runs of other lines are
/// splittable paragraphs.
pub(crate) fn units(lines: &[&str]) -> Vec<Unit> {
    fn flush(units: &mut Vec<Unit>, current: &mut Vec<String>, atomic: bool) {
        if !current.is_empty() {
            units.push(Unit { text: current.join("\n"), atomic });
            current.clear();
        }
    }

    let mut out = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut in_bullet = false;
    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            flush(&mut out, &mut current, in_bullet);
            in_bullet = false;
            continue;
        }
        let bullet = is_bullet(trimmed);
        let continuation = in_bullet && !bullet && line.starts_with(char::is_whitespace);
        if bullet || (in_bullet && !continuation) {
            flush(&mut out, &mut current, in_bullet);
        }
        if bullet {
            in_bullet = true;
        } else if !continuation {
            in_bullet = false;
        }
        current.push(line.trim_end().to_string());
    }
    flush(&mut out, &mut current, in_bullet);
    out
}

/// Greedily packs units into passages of about `target` tokens. A unit
/// larger than the target is flushed on its own: whole when atomic,
/// otherwise through `oversize`.
pub(crate) fn pack(units: Vec<Unit>, target: usize, oversize: &dyn Fn(&str) -> Vec<String>) -> Vec<String> {
    let mut out = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_tokens = 0usize;
    for unit in units {
        let tokens = count_tokens(&unit.text);
        if tokens > target {
            if !current.is_empty() {
                out.push(current.join("\n"));
                current.clear();
                current_tokens = 0;
            }
            if unit.atomic {
                out.push(unit.text);
            } else {
                out.extend(oversize(&unit.text));
            }
            continue;
        }
        if current_tokens + tokens > target && !current.is_empty() {
            out.push(current.join("\n"));
            current.clear();
            current_tokens = 0;
        }
        current_tokens += tokens;
        current.push(unit.text);
    }
    if !current.is_empty() {
        out.push(current.join("\n"));
    }
    out
}
