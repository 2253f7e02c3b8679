use docrank_core::chunking::{chunk_id, Chunker, ChunkingConfig};
use docrank_core::types::{ChunkKind, DocType, Document, DocumentMetadata, TaskStatus};

fn doc(source: &str, text: &str) -> Document {
    Document::new(source, text, DocumentMetadata::default())
}

fn words(prefix: &str, n: usize) -> String {
    (0..n).map(|i| format!("{prefix}{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn meeting_scenario_keeps_action_items() {
    let d = doc("standup.txt", "Attendees: A, B. Action items: finalize budget.");
    assert_eq!(d.doc_type, DocType::MeetingMinutes);
    let chunks = Chunker::default().chunk(&d);
    assert!(!chunks.is_empty());
    assert!(chunks.iter().any(|c| c.text.contains("Action items")));
    assert!(chunks.iter().all(|c| c.kind == ChunkKind::StructuredSection));
}

#[test]
fn oversized_bullet_is_never_split() {
    let long_bullet = format!("- {}", words("item", 300));
    let text = format!("Attendees: Ann, Bo\nAgenda:\n{long_bullet}\n- short follow up item");
    let d = doc("board.txt", &text);
    assert_eq!(d.doc_type, DocType::MeetingMinutes);

    let chunks = Chunker::default().chunk(&d);
    assert!(chunks.iter().any(|c| c.text.contains(&long_bullet)), "the bullet survives in one chunk");
    let agenda: Vec<_> = chunks.iter().filter(|c| c.section.as_deref() == Some("Agenda")).collect();
    assert!(agenda.len() >= 2);
}

#[test]
fn empty_document_yields_no_chunks() {
    let chunks = Chunker::default().chunk(&doc("blank.txt", "  \n\t\n"));
    assert!(chunks.is_empty());
}

#[test]
fn research_sections_follow_headers() {
    let text = "Abstract\nWe study delivery.\n\nMethods\nWe used an assay.\n\nResults\nWe found gains.\n\nConclusion\nIt works.";
    let d = doc("paper.txt", text);
    assert_eq!(d.doc_type, DocType::ResearchPaper);

    let chunks = Chunker::default().chunk(&d);
    let sections: Vec<_> = chunks.iter().map(|c| c.section.as_deref()).collect();
    assert_eq!(sections, vec![Some("abstract"), Some("methodology"), Some("results"), Some("conclusion")]);
    assert!(chunks.iter().all(|c| c.kind == ChunkKind::Semantic));
    assert!(chunks[1].text.starts_with("Methods"));
}

#[test]
fn research_without_headers_uses_overlapping_windows() {
    let text = format!("This abstract reports results and a conclusion. {}", words("w", 2000));
    let d = doc("preprint.txt", &text);
    assert_eq!(d.doc_type, DocType::ResearchPaper);

    let chunks = Chunker::default().chunk(&d);
    assert!(chunks.len() >= 3);
    assert!(chunks.iter().all(|c| c.kind == ChunkKind::SlidingWindow));
    // 1000 tokens -> 750 words per window, about 12% shared with the next
    let first: Vec<&str> = chunks[0].text.split_whitespace().collect();
    let second: Vec<&str> = chunks[1].text.split_whitespace().collect();
    assert_eq!(first.len(), 750);
    let at = first.iter().position(|w| *w == second[0]).expect("second window starts inside the first");
    let shared = first.len() - at;
    assert!((80..=100).contains(&shared), "shared {shared} words");
    assert_eq!(&first[at..], &second[..shared]);
}

#[test]
fn progress_reports_bucket_by_status() {
    let text = "Progress report for the week of May 3\nCompleted:\n- vector cloning\nIn progress:\n- animal study\nBlocked:\n- reagent shortage";
    let d = doc("weekly.txt", text);
    assert_eq!(d.doc_type, DocType::ProgressReport);

    let chunks = Chunker::default().chunk(&d);
    let buckets: Vec<_> = chunks.iter().map(|c| c.task_type).collect();
    assert_eq!(
        buckets,
        vec![None, Some(TaskStatus::Completed), Some(TaskStatus::InProgress), Some(TaskStatus::Blocked)]
    );
    assert!(chunks[3].text.contains("reagent shortage"));
}

#[test]
fn general_windows_drop_nothing() {
    let text = words("lorem", 1000);
    let d = doc("notes.txt", &text);
    assert_eq!(d.doc_type, DocType::General);

    let chunks = Chunker::default().chunk(&d);
    assert_eq!(chunks.len(), 3, "500 tokens -> 375 words per window");
    let joined = chunks.iter().map(|c| c.text.as_str()).collect::<Vec<_>>().join(" ");
    assert_eq!(joined, text);
    assert!(chunks.iter().all(|c| c.kind == ChunkKind::FixedWindow && !c.text.trim().is_empty()));
}

#[test]
fn ids_order_and_links() {
    let config = ChunkingConfig { general_target_tokens: 20, ..ChunkingConfig::default() };
    let mut d = doc("memo.txt", &words("x", 40));
    d.metadata.title = Some("Memo".into());

    let chunks = Chunker::new(config).chunk(&d);
    assert_eq!(chunks.len(), 3);
    for (i, c) in chunks.iter().enumerate() {
        assert_eq!(c.id, chunk_id("memo.txt", i));
        assert_eq!(c.ordinal, i);
        assert_eq!(c.total_chunks, 3);
        assert_eq!(c.source_file, "memo.txt");
        assert_eq!(c.metadata.title.as_deref(), Some("Memo"));
    }
    assert_eq!(chunks[0].prev_id, None);
    assert_eq!(chunks[1].prev_id.as_deref(), Some("memo.txt:0"));
    assert_eq!(chunks[1].next_id.as_deref(), Some("memo.txt:2"));
    assert_eq!(chunks[2].next_id, None);
}
