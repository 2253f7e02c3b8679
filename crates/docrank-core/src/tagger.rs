//! Content-category tags for chunks.
//!
//! Independent detectors run over the chunk text and their hits are
//! unioned. Tags are always recomputed from the chunk's text and section
//! label, never accumulated, which keeps tagging idempotent.

use regex::Regex;
use std::collections::BTreeSet;
use std::sync::LazyLock;

use crate::types::Chunk;

pub const WITH_METRICS: &str = "with-metrics";
pub const KEY_FINDING: &str = "key-finding";
pub const GENERAL_CATEGORY: &str = "general";

/// Highest priority first.
pub const CATEGORY_PRIORITY: [&str; 7] = ["regulatory", "safety", "finding", "result", "methodology", "timeline", "metric"];

const FINDING_TAGS: [&str; 2] = ["finding", "result"];
const STRUCTURAL_LABELS: [&str; 6] = ["abstract", "introduction", "methodology", "results", "discussion", "conclusion"];
const P_VALUE_CEILING: f64 = 0.05;

fn compile<S: AsRef<str>>(table: &[(&'static str, S)]) -> Vec<(&'static str, Regex)> {
    table
        .iter()
        .map(|(tag, pattern)| (*tag, Regex::new(pattern.as_ref()).expect("tag pattern")))
        .collect()
}

static STRUCTURAL: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    const NUM: &str = r"(?im)^\s*(?:\d+(?:\.\d+)*\.?\s*)?";
    compile(&[
        ("abstract", format!(r"{NUM}(?:abstract|summary)\b")),
        ("introduction", format!(r"{NUM}(?:introduction|background)\b")),
        ("methodology", format!(r"{NUM}(?:methodology|methods|materials)\b")),
        ("results", format!(r"{NUM}(?:results|findings)\b")),
        ("discussion", format!(r"{NUM}discussion\b")),
        ("conclusion", format!(r"{NUM}(?:conclusions?|implications)\b")),
    ])
});

static CONTENT: LazyLock<Vec<(&'static str, Regex)>> = LazyLock::new(|| {
    compile(&[
        ("finding", r"(?i)\b(?:find|finds|finding|findings|discover\w*|show|shows|shown|demonstrat\w*|reveal\w*|conclud\w*)\b"),
        ("methodology", r"(?i)\b(?:method\w*|approach\w*|techniqu\w*|procedur\w*|analy[sz]\w*|protocol\w*|assays?|test|tests|tested|testing)\b"),
        ("result", r"(?i)\b(?:results?|outcomes?|found|showed|proved|significant\w*)\b"),
        ("regulatory", r"(?i)\b(?:fda|ema|approval\w*|regulat\w*|complian\w*|requirements?|submission\w*)\b"),
        ("timeline", r"(?i)\b(?:timelines?|schedul\w*|deadlines?|dates?|due|weeks?|months?|quarters?|q[1-4]|milestones?)\b"),
        ("metric", r"(?i)(?:\b(?:improvement\w*|reduction\w*|increase\w*|decrease\w*|percent\w*|fold)\b|%)"),
        ("safety", r"(?i)\b(?:safety|toxicit\w*|toxic|adverse|side[- ]effects?|risks?)\b"),
        ("efficacy", r"(?i)\b(?:efficacy|effective\w*|efficien\w*|performance|success\w*)\b"),
    ])
});

static P_VALUE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bp\s*(?:<=|<|≤|=)\s*(\d*\.\d+)").expect("p-value pattern"));

static PERCENT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?\s*%").expect("percent pattern"));

/// Populates `semantic_tags` and `chunk_category` in place.
pub fn tag(chunk: &mut Chunk) {
    let tags = tags_for(&chunk.text, chunk.section.as_deref());
    chunk.chunk_category = category_for(&tags).to_string();
    chunk.semantic_tags = tags;
}

/// All tags the detectors produce for `text` under an optional section label.
pub fn tags_for(text: &str, section: Option<&str>) -> BTreeSet<String> {
    let mut tags = BTreeSet::new();

    for (tag, re) in STRUCTURAL.iter() {
        if re.is_match(text) {
            tags.insert((*tag).to_string());
        }
    }
    if let Some(label) = section.map(str::to_lowercase) {
        if STRUCTURAL_LABELS.contains(&label.as_str()) {
            tags.insert(label);
        }
    }

    for (tag, re) in CONTENT.iter() {
        if re.is_match(text) {
            tags.insert((*tag).to_string());
        }
    }

    if has_significant_p_value(text) || PERCENT.is_match(text) {
        tags.insert(WITH_METRICS.to_string());
    }

    let finding_like = FINDING_TAGS.iter().any(|t| tags.contains(*t));
    if finding_like && tags.contains(WITH_METRICS) {
        tags.insert(KEY_FINDING.to_string());
    }
    tags
}

/// The single highest-priority category among `tags`.
pub fn category_for(tags: &BTreeSet<String>) -> &'static str {
    CATEGORY_PRIORITY
        .iter()
        .find(|c| tags.contains(**c))
        .copied()
        .unwrap_or(GENERAL_CATEGORY)
}

fn has_significant_p_value(text: &str) -> bool {
    P_VALUE.captures_iter(text).any(|caps| {
        caps.get(1)
            .and_then(|m| {
                let raw = m.as_str();
                let normalized = if raw.starts_with('.') { format!("0{raw}") } else { raw.to_string() };
                normalized.parse::<f64>().ok()
            })
            .is_some_and(|p| p <= P_VALUE_CEILING)
    })
}
