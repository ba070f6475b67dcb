//! Key-concept extraction from question text.
//!
//! A pure function with no failure mode: quoted terms, capitalized runs,
//! and synthetic markers for the analytical verbs a question uses.

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Analytical verbs that signal what an answer is required to do.
pub const ANALYTICAL_VERBS: &[&str] = &[
    "discuss",
    "analyze",
    "examine",
    "evaluate",
    "compare",
    "contrast",
    "explain",
    "describe",
    "assess",
    "critically",
];

/// Interrogative and instruction words excluded from keyword matching.
pub const STOP_WORDS: &[&str] = &[
    "what", "where", "when", "which", "whom", "whose", "discuss", "analyze", "examine",
    "evaluate", "explain", "describe",
];

static QUOTED_TERM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]+)""#).expect("valid regex"));

static CAPITALIZED_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Z][a-z]+(?:\s[A-Z][a-z]+)*\b").expect("valid regex"));

static WORD_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\w{4,}\b").expect("valid regex"));

fn push_unique(concepts: &mut Vec<String>, seen: &mut HashSet<String>, value: String) {
    if seen.insert(value.clone()) {
        concepts.push(value);
    }
}

/// Extract the ordered set of key concepts from a question.
///
/// 1. Double-quoted substrings (quote marks stripped) — concepts the
///    question names explicitly.
/// 2. Maximal runs of capitalized words longer than 2 characters — proper
///    nouns and named concepts.
/// 3. A synthetic `"<verb>_required"` marker for each analytical verb that
///    occurs (case-insensitively) in the question.
///
/// Duplicates are dropped, first-seen order preserved, dedup is
/// case-sensitive.
pub fn extract_key_concepts(question_text: &str) -> Vec<String> {
    let mut concepts = Vec::new();
    let mut seen = HashSet::new();

    for cap in QUOTED_TERM.captures_iter(question_text) {
        push_unique(&mut concepts, &mut seen, cap[1].to_string());
    }

    for m in CAPITALIZED_RUN.find_iter(question_text) {
        if m.as_str().len() > 2 {
            push_unique(&mut concepts, &mut seen, m.as_str().to_string());
        }
    }

    let lower = question_text.to_lowercase();
    for verb in ANALYTICAL_VERBS {
        if lower.contains(verb) {
            push_unique(&mut concepts, &mut seen, format!("{verb}_required"));
        }
    }

    concepts
}

/// Tokenize a question into lowercase keywords of length >= 4, excluding
/// the interrogative/instruction stop-list. Shared by the heuristic
/// scorer's coverage signal and the retrieval query builder.
pub fn question_keywords(question_text: &str) -> Vec<String> {
    let lower = question_text.to_lowercase();
    WORD_TOKEN
        .find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .filter(|w| !STOP_WORDS.contains(&w.as_str()))
        .collect()
}
