//! Deterministic heuristic rubric scorer.
//!
//! The fallback path used whenever the AI path is unavailable, slow, or
//! invalid. Scores are accumulated from named, bounded contributions over
//! surface linguistic signals of the answer text, so every point can be
//! audited and the same input always produces the same output. The
//! contribution constants are a fixed contract, reproduced as observed.

use regex::Regex;
use std::sync::LazyLock;

use crate::concepts::question_keywords;
use crate::model::{ComponentScores, Feedback, RubricScores, ScoringInputs};

static LEAD_IN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(in\s|as\s|the\s|with\s|this\s|it\s|india)").expect("valid regex"));

static CONCLUSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(conclude|therefore|hence|thus|in\s+conclusion|in\s+sum|to\s+summarize|way\s+forward)\b")
        .expect("valid regex")
});

static TRANSITIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(firstly|secondly|thirdly|furthermore|however|moreover|additionally|on\s+the\s+other\s+hand|in\s+contrast)\b")
        .expect("valid regex")
});

static SUBHEADING_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[A-Z][^.!?\n]+:\s*\n").expect("valid regex"));

static NUMERIC_DATA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\d{4}|\d+\s*(%|percent|crore|lakh|billion|trillion|million)")
        .expect("valid regex")
});

static LEGAL_CITATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(article\s*\d+|section\s*\d+|act\s*(of\s*)?\d{4}|amendment|constitution|IPC|CrPC|CPC)\b")
        .expect("valid regex")
});

static CASE_LAW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(case|court|judgment|ruling|verdict|supreme\s+court|high\s+court|bench)\b")
        .expect("valid regex")
});

static COMMITTEE_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(committee|commission|report|recommendation|NITI|Planning)")
        .expect("valid regex")
});

static SCHEME_REF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(scheme|programme|mission|yojana|abhiyan|initiative)\b")
        .expect("valid regex")
});

/// Surface linguistic signals of an answer, computed once per evaluation.
#[derive(Debug, Clone)]
pub struct TextSignals {
    pub word_count: usize,
    pub sentence_count: usize,
    pub avg_sentence_len: f64,
    pub paragraph_count: usize,
    pub has_lead_in: bool,
    pub has_conclusion: bool,
    pub has_transitions: bool,
    pub has_subheadings: bool,
    pub starts_capitalized: bool,
    pub ends_with_punctuation: bool,
    pub punctuation_density_ok: bool,
    pub has_numeric_data: bool,
    pub has_legal_citation: bool,
    pub has_case_law: bool,
    pub has_committee_ref: bool,
    pub has_scheme_ref: bool,
}

impl TextSignals {
    pub fn compute(answer_text: &str) -> Self {
        let trimmed = answer_text.trim();
        let word_count = trimmed.split_whitespace().count();
        let sentence_count = trimmed
            .split(['.', '!', '?'])
            .filter(|s| !s.trim().is_empty())
            .count();
        let avg_sentence_len = if sentence_count > 0 {
            word_count as f64 / sentence_count as f64
        } else {
            0.0
        };
        let paragraph_count = trimmed
            .split("\n\n")
            .filter(|p| !p.trim().is_empty())
            .count();

        let punctuation_count = trimmed
            .chars()
            .filter(|c| matches!(c, '.' | '!' | '?' | ',' | ';' | ':'))
            .count();

        Self {
            word_count,
            sentence_count,
            avg_sentence_len,
            paragraph_count,
            has_lead_in: LEAD_IN.is_match(trimmed),
            has_conclusion: CONCLUSION.is_match(answer_text),
            has_transitions: TRANSITIONS.is_match(answer_text),
            has_subheadings: SUBHEADING_LINE.is_match(answer_text),
            starts_capitalized: trimmed.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
            ends_with_punctuation: trimmed.ends_with(['.', '!', '?']),
            punctuation_density_ok: punctuation_count as f64 > word_count as f64 / 20.0,
            has_numeric_data: NUMERIC_DATA.is_match(answer_text),
            has_legal_citation: LEGAL_CITATION.is_match(answer_text),
            has_case_law: CASE_LAW.is_match(answer_text),
            has_committee_ref: COMMITTEE_REF.is_match(answer_text),
            has_scheme_ref: SCHEME_REF.is_match(answer_text),
        }
    }
}

/// Fraction of the question's keywords (length >= 4, stop-list excluded)
/// that occur case-insensitively in the answer. A fraction rather than a
/// raw count, so short and long answers remain comparable. Questions with
/// no usable keywords score a neutral 0.5.
pub fn keyword_coverage(question_text: &str, answer_text: &str) -> f64 {
    let keywords = question_keywords(question_text);
    if keywords.is_empty() {
        return 0.5;
    }
    let answer_lower = answer_text.to_lowercase();
    let matched = keywords
        .iter()
        .filter(|kw| answer_lower.contains(kw.as_str()))
        .count();
    matched as f64 / keywords.len() as f64
}

fn flag(value: bool, points: f64) -> f64 {
    if value {
        points
    } else {
        0.0
    }
}

/// Score an answer deterministically from its surface signals.
///
/// Every contribution is named and bounded; the same inputs always produce
/// byte-identical scores and feedback. Performs no I/O and cannot fail.
pub fn score(inputs: &ScoringInputs<'_>) -> RubricScores {
    let signals = TextSignals::compute(inputs.answer_text);
    let coverage = keyword_coverage(inputs.question_text, inputs.answer_text);

    let content = 3.0
        + coverage * 3.0
        + (signals.word_count as f64 / 150.0).min(2.0)
        + flag(signals.has_numeric_data, 1.0)
        + flag(signals.has_legal_citation, 1.0);

    let structure = 2.0
        + flag(signals.has_lead_in, 2.0)
        + flag(signals.has_conclusion, 2.0)
        + flag(signals.has_transitions, 1.5)
        + flag(signals.has_subheadings, 1.0)
        + (signals.paragraph_count as f64 / 3.0).min(1.5);

    let sentence_variety = if signals.avg_sentence_len > 8.0 && signals.avg_sentence_len < 25.0 {
        2.0
    } else {
        1.0
    };
    let language = 4.0
        + flag(signals.starts_capitalized, 1.0)
        + flag(signals.ends_with_punctuation, 1.0)
        + flag(signals.punctuation_density_ok, 1.0)
        + sentence_variety
        + flag(signals.sentence_count > 5, 1.0);

    let evidence = flag(signals.has_numeric_data, 2.5)
        + flag(signals.has_legal_citation, 2.5)
        + flag(signals.has_case_law, 2.0)
        + flag(signals.has_committee_ref, 1.5)
        + flag(signals.has_scheme_ref, 1.5);

    let components = ComponentScores::clamped(content, structure, language, evidence);
    let feedback = build_feedback(&signals, coverage);

    RubricScores::from_components(components, feedback)
}

/// Feedback templated from the same flags that drove the score, so the
/// prose is always consistent with the numbers.
fn build_feedback(signals: &TextSignals, coverage: f64) -> Feedback {
    let content = vec![
        if coverage > 0.5 {
            "Good coverage of key concepts from the question".to_string()
        } else {
            "Try to address more concepts mentioned in the question".to_string()
        },
        if signals.word_count < 150 {
            "Consider expanding your answer with more analysis".to_string()
        } else {
            "Adequate word count".to_string()
        },
        if signals.has_numeric_data {
            "Good use of data and statistics".to_string()
        } else {
            "Add more data points to strengthen your answer".to_string()
        },
    ];

    let structure = vec![
        if signals.has_lead_in {
            "Strong introduction that sets context".to_string()
        } else {
            "Add a clear introduction to set the context".to_string()
        },
        if signals.has_conclusion {
            "Effective conclusion with way forward".to_string()
        } else {
            "Include a summarizing conclusion with way forward".to_string()
        },
        if signals.has_transitions {
            "Good use of transition words".to_string()
        } else {
            "Use transition words for better logical flow".to_string()
        },
    ];

    let language = vec![
        if signals.avg_sentence_len > 10.0 && signals.avg_sentence_len < 22.0 {
            "Good sentence structure and variety".to_string()
        } else {
            "Work on sentence length variety".to_string()
        },
        "Maintain formal academic tone throughout".to_string(),
        if signals.punctuation_density_ok {
            "Good punctuation usage".to_string()
        } else {
            "Pay attention to punctuation".to_string()
        },
    ];

    let evidence = vec![
        if signals.has_legal_citation {
            "Good reference to legal provisions".to_string()
        } else {
            "Include relevant Articles/Acts/Laws".to_string()
        },
        if signals.has_case_law {
            "Good use of case law".to_string()
        } else {
            "Add relevant case studies or judgments".to_string()
        },
        if signals.has_committee_ref {
            "Good reference to committee reports".to_string()
        } else {
            "Cite relevant committee reports".to_string()
        },
    ];

    let suggestions = vec![
        "Practice writing under timed conditions".to_string(),
        "Review model answers for similar topics".to_string(),
        "Focus on the weak areas identified above".to_string(),
        "Review the syllabus to ensure comprehensive coverage".to_string(),
    ];

    let mut key_points_missed = Vec::new();
    if !signals.has_numeric_data {
        key_points_missed.push("Statistical data and figures".to_string());
    }
    if !signals.has_legal_citation {
        key_points_missed.push("Constitutional/Legal provisions".to_string());
    }
    if !signals.has_case_law {
        key_points_missed.push("Relevant case studies".to_string());
    }
    if !signals.has_conclusion {
        key_points_missed.push("Way forward section".to_string());
    }

    Feedback {
        content,
        structure,
        language,
        evidence,
        suggestions,
        key_points_missed,
    }
}
