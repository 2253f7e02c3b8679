//! Research papers: split along structural headers, or sliding windows
//! when the paper has none.

use regex::Regex;
use std::sync::LazyLock;

use super::{pack, units, window, Passage};
use crate::types::ChunkKind;

const HEADERS: &[(&str, &str)] = &[
    ("abstract", "abstract"),
    ("introduction", "introduction"),
    ("background", "introduction"),
    ("materials and methods", "methodology"),
    ("methodology", "methodology"),
    ("methods", "methodology"),
    ("results", "results"),
    ("discussion", "discussion"),
    ("conclusions", "conclusion"),
    ("conclusion", "conclusion"),
    ("references", "references"),
    ("appendix", "appendix"),
];

const MAX_HEADER_WORDS: usize = 6;

static NUMBERING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:\d+(?:\.\d+)*\.?|[ivx]+\.)\s*").expect("numbering pattern"));

fn header_label(line: &str) -> Option<&'static str> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.split_whitespace().count() > MAX_HEADER_WORDS {
        return None;
    }
    let lower = trimmed.to_lowercase();
    let stripped = NUMBERING.replace(&lower, "");
    let stripped = stripped.trim_start_matches('#').trim().trim_end_matches(':').trim();
    // "Results were mixed." is a sentence, not a header.
    if stripped.ends_with('.') {
        return None;
    }
    HEADERS
        .iter()
        .find(|(keyword, _)| stripped == *keyword || stripped.starts_with(&format!("{keyword} ")))
        .map(|(_, label)| *label)
}

pub(crate) fn split(text: &str, target: usize, overlap_percent: f32) -> Vec<Passage> {
    let mut sections: Vec<(Option<&'static str>, Vec<&str>)> = vec![(None, Vec::new())];
    let mut found_header = false;
    for line in text.lines() {
        match header_label(line) {
            Some(label) => {
                found_header = true;
                sections.push((Some(label), vec![line]));
            }
            None => {
                if let Some((_, lines)) = sections.last_mut() {
                    lines.push(line);
                }
            }
        }
    }

    let oversize = |t: &str| window::sliding(t, target, overlap_percent);
    if !found_header {
        return oversize(text)
            .into_iter()
            .map(|t| Passage::new(t, ChunkKind::SlidingWindow))
            .collect();
    }

    let mut passages = Vec::new();
    for (label, lines) in sections {
        for text in pack(units(&lines), target, &oversize) {
            passages.push(Passage {
                text,
                section: label.map(str::to_string),
                task_type: None,
                kind: ChunkKind::Semantic,
            });
        }
    }
    passages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_numbered_and_plain_headers() {
        assert_eq!(header_label("Abstract"), Some("abstract"));
        assert_eq!(header_label("2. Materials and Methods"), Some("methodology"));
        assert_eq!(header_label("IV. RESULTS:"), Some("results"));
        assert_eq!(header_label("Results were mixed."), None);
        assert_eq!(header_label("The results of the long experiment are described below in detail"), None);
    }
}
