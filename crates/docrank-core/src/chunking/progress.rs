//! Progress reports: passages grouped by task-status bucket.

use super::{pack, units, window, Passage};
use crate::tokenize::contains_at_word_start;
use crate::types::{ChunkKind, TaskStatus};

const STATUS_KEYWORDS: &[(TaskStatus, &[&str])] = &[
    (TaskStatus::Completed, &["completed", "done", "finished"]),
    (TaskStatus::InProgress, &["in progress", "in-progress", "working on", "underway"]),
    (TaskStatus::Upcoming, &["upcoming", "next", "planned", "milestone"]),
    (TaskStatus::Blocked, &["blocked", "impediment", "challenge", "issue"]),
];

/// A line switches the bucket when it names a status and carries a colon,
/// e.g. "Completed tasks:" or "Blocked: waiting on reagents".
fn status_of(line: &str) -> Option<TaskStatus> {
    if !line.contains(':') {
        return None;
    }
    let lower = line.to_lowercase();
    STATUS_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| contains_at_word_start(&lower, k)))
        .map(|(status, _)| *status)
}

pub(crate) fn split(text: &str, target: usize) -> Vec<Passage> {
    let mut runs: Vec<(Option<TaskStatus>, Vec<&str>)> = vec![(None, Vec::new())];
    for line in text.lines() {
        let status = status_of(line);
        let switch = status.is_some_and(|s| runs.last().map(|(current, _)| *current) != Some(Some(s)));
        if switch {
            runs.push((status, Vec::new()));
        }
        if let Some((_, lines)) = runs.last_mut() {
            lines.push(line);
        }
    }

    let mut passages = Vec::new();
    for (task_type, lines) in runs {
        for text in pack(units(&lines), target, &|t| window::fixed(t, target)) {
            passages.push(Passage { text, section: None, task_type, kind: ChunkKind::TaskBased });
        }
    }
    passages
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_needs_a_colon() {
        assert_eq!(status_of("Completed tasks:"), Some(TaskStatus::Completed));
        assert_eq!(status_of("In Progress: assay work"), Some(TaskStatus::InProgress));
        assert_eq!(status_of("We completed the run"), None);
    }

    #[test]
    fn same_bucket_lines_stay_in_one_run() {
        let text = "Completed:\n- cloning\nDone: sequencing\nBlocked:\n- reagent delay";
        let passages = split(text, 500);
        assert_eq!(passages.len(), 2);
        assert_eq!(passages[0].task_type, Some(TaskStatus::Completed));
        assert!(passages[0].text.contains("sequencing"));
        assert_eq!(passages[1].task_type, Some(TaskStatus::Blocked));
    }
}
