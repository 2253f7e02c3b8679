//! docrank-hybrid
//!
//! Query rewriting, score fusion and the `HybridEngine` that ties the
//! chunking pipeline, the lexical index and the vector collaborator
//! together.

pub mod engine;
pub mod filter;
pub mod fusion;
pub mod rewrite;

pub use engine::{
    BatchReport, DocumentOutcome, DocumentRecord, HybridEngine, RankedResult, SearchOutcome, SearchRequest, Stats,
};
pub use filter::{Filter, TagMatch};
pub use rewrite::{suggest_weights, Intent, QueryRewriter, Rewrite};
