use serde::{Deserialize, Serialize};

use docrank_core::types::{Chunk, DocType};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagMatch {
    /// At least one of the tags.
    #[default]
    Any,
    /// Every tag.
    All,
}

/// Presentation filter over ranked chunks. Empty lists do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub doc_types: Vec<DocType>,
    pub tags: Vec<String>,
    pub tag_match: TagMatch,
}

impl Filter {
    pub fn by_type(doc_type: DocType) -> Self {
        Self { doc_types: vec![doc_type], ..Self::default() }
    }

    pub fn by_tags<I, S>(tags: I, tag_match: TagMatch) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { tags: tags.into_iter().map(Into::into).collect(), tag_match, ..Self::default() }
    }

    pub fn is_empty(&self) -> bool {
        self.doc_types.is_empty() && self.tags.is_empty()
    }

    pub fn matches(&self, chunk: &Chunk) -> bool {
        let type_ok = self.doc_types.is_empty() || self.doc_types.contains(&chunk.doc_type);
        let tags_ok = self.tags.is_empty()
            || match self.tag_match {
                TagMatch::Any => self.tags.iter().any(|t| chunk.has_tag(t)),
                TagMatch::All => self.tags.iter().all(|t| chunk.has_tag(t)),
            };
        type_ok && tags_ok
    }
}
