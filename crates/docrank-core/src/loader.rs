//! Plain-text extraction collaborator.
//!
//! Walks a directory for `.txt` files and turns each into a classified
//! `Document`. Files are independent: one unreadable file yields an error
//! outcome for that file only.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::traits::TextExtractor;
use crate::types::{Document, DocumentMetadata, Extracted};

#[derive(Debug, Clone, Default)]
pub struct PlainTextLoader;

impl PlainTextLoader {
    pub fn new() -> Self {
        Self
    }

    /// Every `.txt` file under `root`, sorted for a stable ingestion order.
    pub fn list_txt_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut txt_files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("txt"))
            .collect();
        txt_files.sort();
        txt_files
    }

    /// Extracts and classifies one file. `source` becomes the document id.
    pub fn load_file(&self, path: &Path, source: impl Into<String>) -> Result<Document> {
        let Extracted { text, metadata } = self.extract(path)?;
        Ok(Document::new(source, text, metadata))
    }

    /// One outcome per `.txt` file under `root`. Sources are paths relative
    /// to `root` with `/` separators, so ids do not depend on where the
    /// corpus is mounted.
    pub fn load_directory(&self, root: &Path) -> Vec<(PathBuf, Result<Document>)> {
        let files = self.list_txt_files(root);
        if files.is_empty() {
            info!(dir = %root.display(), "no .txt files found");
            return Vec::new();
        }
        files
            .into_iter()
            .map(|path| {
                let source = source_id(root, &path);
                let outcome = self.load_file(&path, source);
                (path, outcome)
            })
            .collect()
    }
}

impl TextExtractor for PlainTextLoader {
    fn extract(&self, path: &Path) -> Result<Extracted> {
        let text = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(_) => {
                let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
                debug!(path = %path.display(), "file is not valid UTF-8; decoding lossily");
                String::from_utf8_lossy(&bytes).into_owned()
            }
        };
        let metadata = DocumentMetadata {
            title: path.file_stem().map(|s| s.to_string_lossy().into_owned()),
            ..DocumentMetadata::default()
        };
        Ok(Extracted { text, metadata })
    }
}

fn source_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
