//! Heuristic document-type detection.
//!
//! Each type has a signature: a phrase list and the number of distinct
//! phrases that must occur in the case-folded text. Signatures are checked
//! in priority order and the first satisfied one wins, even when a later
//! one matches more phrases. Chunk sizes depend on this decision, so the
//! order is fixed.

use tracing::debug;

use crate::types::DocType;

struct Signature {
    doc_type: DocType,
    phrases: &'static [&'static str],
    min_matches: usize,
}

impl Signature {
    fn matches(&self, folded: &str) -> usize {
        self.phrases.iter().filter(|p| folded.contains(*p)).count()
    }
}

const SIGNATURES: [Signature; 3] = [
    Signature {
        doc_type: DocType::MeetingMinutes,
        phrases: &["attendees", "agenda", "action item", "minutes of meeting", "next meeting", "decisions", "discussed"],
        min_matches: 2,
    },
    Signature {
        doc_type: DocType::ProgressReport,
        phrases: &["progress report", "completed", "in progress", "milestone", "status update", "blocked", "week of"],
        min_matches: 2,
    },
    Signature {
        doc_type: DocType::ResearchPaper,
        phrases: &["abstract", "introduction", "methodology", "results", "conclusion", "references", "hypothesis"],
        min_matches: 2,
    },
];

/// Labels `text` with the first satisfied signature, else `General`.
pub fn classify(text: &str) -> DocType {
    let folded = text.to_lowercase();
    let satisfied: Vec<DocType> = SIGNATURES
        .iter()
        .filter(|s| s.matches(&folded) >= s.min_matches)
        .map(|s| s.doc_type)
        .collect();
    match satisfied.as_slice() {
        [] => DocType::General,
        [only] => *only,
        [winner, rest @ ..] => {
            debug!(winner = %winner, also_matched = ?rest, "several type signatures matched; priority order decides");
            *winner
        }
    }
}

/// Number of signature phrases of `doc_type` present in `text`.
/// Always 0 for `General`, which has no signature.
pub fn signature_hits(text: &str, doc_type: DocType) -> usize {
    let folded = text.to_lowercase();
    SIGNATURES
        .iter()
        .find(|s| s.doc_type == doc_type)
        .map_or(0, |s| s.matches(&folded))
}
