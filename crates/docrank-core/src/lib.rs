//! docrank-core
//!
//! Domain types, configuration and the pure half of the ingestion path:
//! tokenizer, document classifier, type-aware chunker and semantic tagger.
//! Index engines live in sibling crates and plug in through `traits`.

pub mod chunking;
pub mod classify;
pub mod config;
pub mod error;
pub mod loader;
pub mod tagger;
pub mod tokenize;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
