use std::collections::HashSet;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::{IndexRecordOption, Value};
use tantivy::{TantivyDocument, Term};

use docrank_core::tokenize::tokenize;
use docrank_core::types::{SearchHit, SourceKind};
use docrank_core::Result;

use crate::index::{lexical_err, LexicalIndex};

/// Maps an unbounded BM25 score onto a scale comparable with cosine
/// similarity: `ln(1 + raw)`.
pub fn normalize(raw: f32) -> f32 {
    raw.max(0.0).ln_1p()
}

impl LexicalIndex {
    /// Chunks sharing at least one token with `text`, by raw BM25 score
    /// descending. Equal scores keep insertion order.
    pub fn query(&self, text: &str, top_n: usize) -> Result<Vec<SearchHit>> {
        let mut seen = HashSet::new();
        let terms: Vec<String> = tokenize(text).into_iter().filter(|t| seen.insert(t.clone())).collect();
        if terms.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let searcher = self.searcher();
        let num_docs = searcher.num_docs() as usize;
        if num_docs == 0 {
            return Ok(Vec::new());
        }

        let clauses: Vec<(Occur, Box<dyn Query>)> = terms
            .iter()
            .map(|t| {
                let term = Term::from_field_text(self.fields.text, t);
                let q: Box<dyn Query> = Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, q)
            })
            .collect();
        let query = BooleanQuery::new(clauses);

        // Scores arrive best first. Stored fields are only loaded down to the
        // `top_n`-th score, including everything tied with it, so ties can be
        // settled by insertion order before truncating.
        let top_docs = searcher.search(&query, &TopDocs::with_limit(num_docs)).map_err(lexical_err)?;
        let mut scored = Vec::with_capacity(top_n.min(top_docs.len()));
        let mut cutoff: Option<f32> = None;
        for (score, addr) in top_docs {
            if !score.is_finite() {
                continue;
            }
            if cutoff.is_some_and(|c| score < c) {
                break;
            }
            let doc: TantivyDocument = searcher.doc(addr).map_err(lexical_err)?;
            let id = doc.get_first(self.fields.id).and_then(|v| v.as_str()).unwrap_or_default().to_string();
            let seq = doc.get_first(self.fields.seq).and_then(|v| v.as_u64()).unwrap_or(u64::MAX);
            scored.push((score, seq, id));
            if scored.len() == top_n {
                cutoff = Some(score);
            }
        }
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.truncate(top_n);

        Ok(scored
            .into_iter()
            .map(|(score, _, id)| SearchHit { id, score, source: SourceKind::Text })
            .collect())
    }
}
