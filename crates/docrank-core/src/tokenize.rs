//! Normalized token stream shared by the lexical index, the classifier,
//! the rewriter and the hashed embedder.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Function words removed from every token stream.
pub const STOP_WORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "by", "for", "from", "has", "he", "in", "is", "it", "its", "of", "on",
    "that", "the", "to", "was", "will", "with", "or", "but", "not", "this", "these", "they", "them", "their", "there",
    "then", "than", "so", "if", "when", "where", "why", "how", "what", "which", "who", "whom", "whose", "can", "could",
    "should", "would", "may", "might", "must", "shall", "do", "does", "did", "have", "had", "having", "were", "been",
];

// Internal hyphens stay inside the token: "gene-editing", "crispr-cas9".
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+(?:-\w+)*").expect("token pattern"));

static STOP_SET: LazyLock<HashSet<&'static str>> = LazyLock::new(|| STOP_WORDS.iter().copied().collect());

pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

/// Lower-cased, stopword-free tokens with consecutive repeats collapsed.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let mut tokens: Vec<String> = Vec::new();
    for m in TOKEN_RE.find_iter(&lowered) {
        let token = m.as_str();
        if is_stop_word(token) || tokens.last().is_some_and(|prev| prev == token) {
            continue;
        }
        tokens.push(token.to_string());
    }
    tokens
}

/// Lower-cased words in order, stopwords kept.
pub fn words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    TOKEN_RE.find_iter(&lowered).map(|m| m.as_str().to_string()).collect()
}

/// True when `needle` occurs in `haystack` at the start of a word, so
/// "issue" matches "issues" but not "tissue". Both sides lower-case.
pub fn contains_at_word_start(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(at, _)| {
        haystack[..at].chars().next_back().map_or(true, |c| !c.is_alphanumeric())
    })
}

/// Rough model-token estimate (~0.75 words per token).
pub fn count_tokens(text: &str) -> usize {
    let word_count = text.split_whitespace().count();
    (word_count as f32 / 0.75) as usize
}

/// Inverse of [`count_tokens`]: how many words fit in `tokens`.
pub fn words_for_tokens(tokens: usize) -> usize {
    ((tokens as f32 * 0.75) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_keep_stopwords() {
        assert_eq!(words("How was it done?"), vec!["how", "was", "it", "done"]);
    }

    #[test]
    fn word_start_matching() {
        assert!(contains_at_word_start("open issues: 3", "issue"));
        assert!(!contains_at_word_start("tissue: liver", "issue"));
        assert!(contains_at_word_start("issue", "issue"));
    }

    #[test]
    fn token_estimate_round_trips_roughly() {
        let text = "word ".repeat(225);
        assert_eq!(count_tokens(&text), 300);
        assert_eq!(words_for_tokens(300), 225);
        assert_eq!(words_for_tokens(0), 1);
    }
}
