//! Score fusion for the two retrieval signals.
//!
//! The candidate sets are unioned; a chunk missing from one side scores 0
//! there instead of being dropped. Lexical scores go through
//! `ln(1 + raw)` first so an unbounded BM25 value can be summed with a
//! cosine similarity.

use std::cmp::Ordering;
use std::collections::HashMap;

use docrank_core::types::{ChunkId, SearchHit, Weights};
use docrank_text::normalize;
use tracing::warn;

/// One candidate after fusion, before truncation and filtering.
#[derive(Debug, Clone, PartialEq)]
pub struct Fused {
    pub id: ChunkId,
    pub vector_score: f32,
    pub lexical_raw_score: f32,
    pub lexical_score: f32,
    pub combined_score: f32,
    /// 0-based position in each candidate list.
    pub vector_rank: Option<usize>,
    pub lexical_rank: Option<usize>,
    /// Insertion order of the chunk.
    pub seq: u64,
}

impl Fused {
    fn new(id: ChunkId, seq: u64) -> Self {
        Self {
            id,
            vector_score: 0.0,
            lexical_raw_score: 0.0,
            lexical_score: 0.0,
            combined_score: 0.0,
            vector_rank: None,
            lexical_rank: None,
            seq,
        }
    }
}

/// Unions both candidate lists and sorts them best first.
///
/// `seq_of` resolves a chunk's insertion order; candidates it does not
/// know are dropped, and so are hits with a non-finite score. Only the
/// first occurrence of an id in each list counts.
pub fn fuse<F>(vector: &[SearchHit], lexical: &[SearchHit], weights: Weights, seq_of: F) -> Vec<Fused>
where
    F: Fn(&str) -> Option<u64>,
{
    let mut by_id: HashMap<ChunkId, Fused> = HashMap::new();

    let unscored = vector.iter().chain(lexical).filter(|h| !h.score.is_finite()).count();
    if unscored > 0 {
        warn!(unscored, "ignoring candidates with non-finite scores");
    }

    for (rank, hit) in vector.iter().enumerate() {
        if !hit.score.is_finite() {
            continue;
        }
        let Some(seq) = seq_of(&hit.id) else { continue };
        let entry = by_id.entry(hit.id.clone()).or_insert_with(|| Fused::new(hit.id.clone(), seq));
        if entry.vector_rank.is_none() {
            entry.vector_rank = Some(rank);
            entry.vector_score = hit.score;
        }
    }
    for (rank, hit) in lexical.iter().enumerate() {
        if !hit.score.is_finite() {
            continue;
        }
        let Some(seq) = seq_of(&hit.id) else { continue };
        let entry = by_id.entry(hit.id.clone()).or_insert_with(|| Fused::new(hit.id.clone(), seq));
        if entry.lexical_rank.is_none() {
            entry.lexical_rank = Some(rank);
            entry.lexical_raw_score = hit.score;
            entry.lexical_score = normalize(hit.score);
        }
    }

    let mut fused: Vec<Fused> = by_id
        .into_values()
        .map(|mut f| {
            f.combined_score = weights.vector * f.vector_score + weights.lexical * f.lexical_score;
            f
        })
        .collect();
    fused.sort_by(compare);
    fused
}

/// Combined score descending, then vector rank, then lexical rank (a
/// missing rank sorts last), then insertion order.
fn compare(a: &Fused, b: &Fused) -> Ordering {
    let rank = |r: Option<usize>| r.unwrap_or(usize::MAX);
    b.combined_score
        .total_cmp(&a.combined_score)
        .then_with(|| rank(a.vector_rank).cmp(&rank(b.vector_rank)))
        .then_with(|| rank(a.lexical_rank).cmp(&rank(b.lexical_rank)))
        .then_with(|| a.seq.cmp(&b.seq))
}

#[cfg(test)]
mod tests {
    use super::*;
    use docrank_core::types::SourceKind;

    fn hit(id: &str, score: f32, source: SourceKind) -> SearchHit {
        SearchHit { id: id.to_string(), score, source }
    }

    fn seqs(id: &str) -> Option<u64> {
        match id {
            "a" => Some(0),
            "b" => Some(1),
            "c" => Some(2),
            "d" => Some(3),
            _ => None,
        }
    }

    #[test]
    fn union_with_zero_fill() {
        let vector = [hit("a", 0.9, SourceKind::Vector)];
        let lexical = [hit("b", 3.0, SourceKind::Text)];
        let fused = fuse(&vector, &lexical, Weights::new(0.3, 0.7), seqs);
        assert_eq!(fused.len(), 2);

        let b = fused.iter().find(|f| f.id == "b").unwrap();
        assert_eq!(b.vector_score, 0.0);
        assert!((b.lexical_score - 4.0f32.ln()).abs() < 1e-6);
        assert!((b.combined_score - 0.7 * 4.0f32.ln()).abs() < 1e-6);

        let a = fused.iter().find(|f| f.id == "a").unwrap();
        assert_eq!(a.lexical_score, 0.0);
        assert!((a.combined_score - 0.27).abs() < 1e-6);
        assert_eq!(fused[0].id, "b");
    }

    #[test]
    fn ties_fall_back_to_vector_then_lexical_rank_then_insertion() {
        // every candidate scores 0 combined
        let vector = [hit("c", 0.0, SourceKind::Vector), hit("b", 0.0, SourceKind::Vector)];
        let lexical = [hit("d", 0.0, SourceKind::Text), hit("a", 0.0, SourceKind::Text)];
        let order: Vec<_> = fuse(&vector, &lexical, Weights::default(), seqs).into_iter().map(|f| f.id).collect();
        assert_eq!(order, vec!["c", "b", "d", "a"]);

        let lexical_only = [hit("d", 1.0, SourceKind::Text), hit("a", 1.0, SourceKind::Text)];
        let fused = fuse(&[], &lexical_only, Weights::default(), seqs);
        assert_eq!(fused[0].id, "d", "lexical rank beats insertion order");
    }

    #[test]
    fn non_finite_scores_count_as_absent() {
        let vector = [
            hit("a", f32::NAN, SourceKind::Vector),
            hit("b", 0.5, SourceKind::Vector),
            hit("c", f32::INFINITY, SourceKind::Vector),
        ];
        let lexical = [hit("c", 2.0, SourceKind::Text)];
        let fused = fuse(&vector, &lexical, Weights::default(), seqs);
        let ids: Vec<_> = fused.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "b"]);
        assert_eq!(fused[0].vector_score, 0.0);
        assert_eq!(fused[0].vector_rank, None);
        assert_eq!(fused[1].vector_rank, Some(1));
        assert!(fused.iter().all(|f| f.combined_score.is_finite()));
    }

    #[test]
    fn unknown_ids_are_dropped() {
        let vector = [hit("ghost", 1.0, SourceKind::Vector), hit("a", 0.5, SourceKind::Vector)];
        let fused = fuse(&vector, &[], Weights::default(), seqs);
        assert_eq!(fused.len(), 1);
        assert_eq!(fused[0].id, "a");
        assert_eq!(fused[0].vector_rank, Some(1));
    }
}
