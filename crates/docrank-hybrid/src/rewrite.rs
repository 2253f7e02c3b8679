//! Query rewriting: synonym expansion, intent detection, weight
//! suggestion and splitting of compound questions.
//!
//! All vocabulary lives in the tables below; matching works on the
//! lower-cased word sequence of the query (stopwords kept, so "how" and
//! "when" can act as triggers).

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

use docrank_core::tokenize::{tokenize, words};
use docrank_core::types::{DocType, Weights};

use crate::filter::{Filter, TagMatch};

/// Domain abbreviation or jargon -> expansion phrases, in append order.
const SYNONYMS: &[(&str, &[&str])] = &[
    ("UKBB", &["UK Biobank", "UK Biobank cohort", "biobank"]),
    ("PD", &["Parkinson disease", "Parkinson's disease", "Parkinson", "parkinsonism"]),
    ("AD", &["Alzheimer disease", "Alzheimer's disease", "Alzheimer"]),
    ("FDA", &["FDA approval", "regulatory approval", "FDA requirement"]),
    ("safety", &["toxicity", "adverse effect", "side effect", "safety profile", "tolerability"]),
    ("efficacy", &["effectiveness", "efficiency", "efficacy", "clinical benefit"]),
    ("timeline", &["schedule", "deadline", "milestone", "due date", "target date"]),
    ("in vivo", &["in vivo study", "animal model", "preclinical"]),
    ("in vitro", &["in vitro study", "cell culture", "laboratory"]),
    ("CRISPR", &["CRISPR-Cas9", "CRISPR", "gene editing", "genome editing"]),
    ("AAV", &["adeno-associated virus", "AAV vector", "gene therapy"]),
    ("prediction", &["predict", "predictive", "forecast", "prognostic"]),
    ("reduction", &["decrease", "improvement", "reduction"]),
    ("results", &["findings", "outcomes", "results", "results section"]),
];

/// Coarse purpose of a query. Detection checks `Intent::ALL` in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    ResearchFinding,
    Timeline,
    Regulatory,
    Methodology,
}

impl Intent {
    pub const ALL: [Intent; 4] = [Intent::ResearchFinding, Intent::Timeline, Intent::Regulatory, Intent::Methodology];

    pub fn as_str(self) -> &'static str {
        match self {
            Intent::ResearchFinding => "research_finding",
            Intent::Timeline => "timeline",
            Intent::Regulatory => "regulatory",
            Intent::Methodology => "methodology",
        }
    }

    fn triggers(self) -> &'static [&'static str] {
        match self {
            Intent::ResearchFinding => &[
                "research shows", "study found", "paper says", "research paper", "according to", "demonstrated",
                "revealed", "showed",
            ],
            Intent::Timeline => &[
                "when", "due", "deadline", "deadlines", "schedule", "milestone", "milestones", "plan", "upcoming",
                "q1", "q2", "q3", "q4",
            ],
            Intent::Regulatory => {
                &["fda", "approval", "regulatory", "requirement", "requirements", "compliance", "blocker", "regulation"]
            }
            Intent::Methodology => &[
                "how", "method", "methods", "methodology", "approach", "procedure", "technique", "design",
                "conducted", "performed",
            ],
        }
    }

    /// Fusion weights that suit this intent.
    pub fn weights(self) -> Weights {
        match self {
            Intent::ResearchFinding => Weights::new(0.2, 0.8),
            Intent::Timeline => Weights::new(0.3, 0.7),
            Intent::Regulatory => Weights::new(0.2, 0.8),
            Intent::Methodology => Weights::new(0.5, 0.5),
        }
    }

    /// Document types and tags a result should carry to answer this intent.
    pub fn filter(self) -> Filter {
        let (doc_types, tags): (&[DocType], &[&str]) = match self {
            Intent::ResearchFinding => {
                (&[DocType::ResearchPaper], &["finding", "key-finding", "result", "results", "efficacy"])
            }
            Intent::Timeline => (&[DocType::ProgressReport], &["timeline"]),
            Intent::Regulatory => (&[DocType::General, DocType::ProgressReport], &["regulatory"]),
            Intent::Methodology => (&[DocType::ResearchPaper], &["methodology"]),
        };
        Filter {
            doc_types: doc_types.to_vec(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            tag_match: TagMatch::Any,
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// `(vector, lexical)` weights for an optional intent; no intent gets the
/// balanced default.
pub fn suggest_weights(intent: Option<Intent>) -> Weights {
    intent.map_or_else(Weights::default, Intent::weights)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Rewrite {
    pub original: String,
    /// Always starts with `original`.
    pub expanded_text: String,
    pub synonyms_added: Vec<String>,
    pub intent: Option<Intent>,
    pub sub_queries: Vec<String>,
}

/// Clauses shorter than this are never split off on "and".
const MIN_CLAUSE_TOKENS: usize = 3;

static AND_SPLIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)\s+and\s+").expect("conjunction pattern"));

/// Position of `needle` as a run of consecutive words inside `haystack`.
fn contains_run(haystack: &[String], needle: &[String]) -> Option<usize> {
    if needle.is_empty() || needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[derive(Debug, Clone)]
pub struct QueryRewriter {
    synonyms: Vec<(Vec<String>, &'static [&'static str])>,
    triggers: Vec<(Intent, Vec<Vec<String>>)>,
}

impl Default for QueryRewriter {
    fn default() -> Self {
        Self::new()
    }
}

impl QueryRewriter {
    pub fn new() -> Self {
        let synonyms = SYNONYMS.iter().map(|(key, phrases)| (words(key), *phrases)).collect();
        let triggers = Intent::ALL
            .iter()
            .map(|intent| (*intent, intent.triggers().iter().map(|t| words(t)).collect()))
            .collect();
        Self { synonyms, triggers }
    }

    pub fn rewrite(&self, query: &str) -> Rewrite {
        let (expanded_text, synonyms_added) = self.expand(query);
        Rewrite {
            original: query.to_string(),
            expanded_text,
            synonyms_added,
            intent: self.detect_intent(query),
            sub_queries: self.split(query),
        }
    }

    /// Appends the expansions of every synonym key found in `query`, in the
    /// order the keys first occur. A phrase whose words already appear in
    /// the text built so far is skipped.
    pub fn expand(&self, query: &str) -> (String, Vec<String>) {
        let query_words = words(query);
        let mut hits: Vec<(usize, &'static [&'static str])> = self
            .synonyms
            .iter()
            .filter_map(|(key, phrases)| contains_run(&query_words, key).map(|at| (at, *phrases)))
            .collect();
        hits.sort_by_key(|(at, _)| *at);

        let mut built = query_words;
        let mut added = Vec::new();
        for (_, phrases) in hits {
            for phrase in phrases {
                let phrase_words = words(phrase);
                if contains_run(&built, &phrase_words).is_some() {
                    continue;
                }
                built.extend(phrase_words);
                added.push((*phrase).to_string());
            }
        }

        let expanded = if added.is_empty() { query.to_string() } else { format!("{} {}", query, added.join(" ")) };
        (expanded, added)
    }

    /// First intent with a trigger in the query, `None` when nothing fires.
    pub fn detect_intent(&self, query: &str) -> Option<Intent> {
        let query_words = words(query);
        self.triggers
            .iter()
            .find(|(_, triggers)| triggers.iter().any(|t| contains_run(&query_words, t).is_some()))
            .map(|(intent, _)| *intent)
    }

    /// Splits a compound query into independent sub-queries. Falls back to
    /// the query itself when no split looks safe.
    pub fn split(&self, query: &str) -> Vec<String> {
        let trimmed = query.trim();

        let mut questions: Vec<String> = Vec::new();
        let mut rest = trimmed;
        while let Some(at) = rest.find('?') {
            let clause = rest[..=at].trim();
            if !tokenize(clause).is_empty() {
                questions.push(clause.to_string());
            }
            rest = &rest[at + 1..];
        }
        if questions.len() >= 2 {
            let tail = rest.trim();
            if !tokenize(tail).is_empty() {
                questions.push(tail.to_string());
            }
            return questions;
        }

        let clauses: Vec<&str> = AND_SPLIT.split(trimmed).map(str::trim).collect();
        if clauses.len() >= 2 && clauses.iter().all(|c| tokenize(c).len() >= MIN_CLAUSE_TOKENS) {
            return clauses.into_iter().map(str::to_string).collect();
        }

        vec![query.to_string()]
    }
}
