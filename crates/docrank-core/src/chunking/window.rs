//! Word windows used as the fallback strategy and for oversized paragraphs.

use crate::tokenize::words_for_tokens;

/// Back-to-back windows of about `target_tokens`, no overlap.
pub fn fixed(text: &str, target_tokens: usize) -> Vec<String> {
    sliding(text, target_tokens, 0.0)
}

/// Windows of about `target_tokens` where each window repeats the last
/// `overlap_percent` of the previous one. Every word lands in at least one
/// window.
pub fn sliding(text: &str, target_tokens: usize, overlap_percent: f32) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }
    let per_chunk = words_for_tokens(target_tokens);
    let overlap = ((per_chunk as f32 * overlap_percent.max(0.0)) as usize).min(per_chunk - 1);
    let step = per_chunk - overlap;

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < words.len() {
        let end = (start + per_chunk).min(words.len());
        chunks.push(words[start..end].join(" "));
        if end >= words.len() {
            break;
        }
        start += step;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: usize) -> String {
        (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn fixed_windows_cover_text_without_overlap() {
        // 40 tokens -> 30 words per window
        let windows = fixed(&numbered(70), 40);
        assert_eq!(windows.len(), 3);
        assert!(windows[0].ends_with("w29"));
        assert!(windows[1].starts_with("w30"));
        assert!(windows[2].ends_with("w69"));
    }

    #[test]
    fn sliding_windows_repeat_the_tail() {
        // 40 tokens -> 30 words, 10% overlap -> 3 words shared
        let windows = sliding(&numbered(60), 40, 0.10);
        assert_eq!(windows.len(), 3);
        assert!(windows[1].starts_with("w27 w28 w29 w30"));
    }
}
