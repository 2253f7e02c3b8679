//! Meeting minutes: one passage group per detected section.

use super::{pack, units, window, Passage};
use crate::types::ChunkKind;

const SECTION_HEADERS: &[(&str, &str)] = &[
    ("agenda", "Agenda"),
    ("attendees", "Attendees"),
    ("decision", "Decisions"),
    ("action item", "Action Items"),
    ("discussion", "Discussion"),
    ("next steps", "Next Steps"),
    ("follow up", "Follow Up"),
    ("follow-up", "Follow Up"),
];

fn section_header(line: &str) -> Option<&'static str> {
    let lower = line.trim().to_lowercase();
    let lower = lower.trim_start_matches('#').trim_start();
    SECTION_HEADERS
        .iter()
        .find(|(keyword, _)| lower.starts_with(keyword))
        .map(|(_, label)| *label)
}

pub(crate) fn split(text: &str, target: usize) -> Vec<Passage> {
    // Lines before the first header belong to an unlabelled section.
    let mut sections: Vec<(Option<&'static str>, Vec<&str>)> = vec![(None, Vec::new())];
    for line in text.lines() {
        match section_header(line) {
            Some(label) => sections.push((Some(label), vec![line])),
            None => {
                if let Some((_, lines)) = sections.last_mut() {
                    lines.push(line);
                }
            }
        }
    }

    let mut passages = Vec::new();
    for (label, lines) in sections {
        for text in pack(units(&lines), target, &|t| window::fixed(t, target)) {
            passages.push(Passage {
                text,
                section: label.map(str::to_string),
                task_type: None,
                kind: ChunkKind::StructuredSection,
            });
        }
    }
    passages
}
