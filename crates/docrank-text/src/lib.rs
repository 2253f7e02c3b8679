//! docrank-text
//!
//! BM25 lexical index over chunk texts, backed by an in-RAM tantivy index.
//! Texts are tokenized with `docrank_core::tokenize` before they reach
//! tantivy, so the engine scores exactly the tokens the rest of the system
//! sees.

pub mod index;
pub mod search;
pub mod tantivy_utils;

pub use index::LexicalIndex;
pub use search::normalize;
