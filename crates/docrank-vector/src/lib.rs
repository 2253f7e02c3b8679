//! docrank-vector
//!
//! Vector collaborators behind `docrank_core::traits::VectorIndex`.

pub mod memory;

pub use memory::{cosine_similarity, MemoryVectorIndex};
