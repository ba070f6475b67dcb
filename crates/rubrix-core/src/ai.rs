//! Prompt construction and strict parsing of AI scorer output.

use serde::Deserialize;

use crate::error::EvalError;
use crate::model::{ComponentScores, Feedback, RubricScores, ScoringInputs};

/// Build the single examiner prompt shared by every backend in the chain.
/// The prompt pins the rubric, its weights, and a JSON-only response schema.
pub fn build_evaluation_prompt(inputs: &ScoringInputs<'_>, word_limit: Option<u32>) -> String {
    let concepts = if inputs.concepts.is_empty() {
        "General exam topics".to_string()
    } else {
        inputs.concepts.join(", ")
    };

    let reference_section = if inputs.reference_context.is_empty() {
        String::new()
    } else {
        format!(
            "**REFERENCE MATERIAL FOR FACTUAL VERIFICATION:**\n{}\n\n",
            inputs.reference_context
        )
    };

    let word_count = inputs.answer_text.split_whitespace().count();
    let word_count_line = match word_limit {
        Some(limit) => format!("{word_count} / {limit} required"),
        None => word_count.to_string(),
    };

    format!(
        r#"You are a senior exam examiner. Evaluate this answer for question: "{question}"

**RUBRIC:**
- Content (40%): Keyword coverage, factual accuracy, depth of analysis, integration with current affairs
- Structure (30%): Introduction, body paragraphs, conclusion, logical flow, direct answer to question
- Language (20%): Grammar, sentence complexity, word choice, readability, formal academic tone
- Evidence (10%): Case studies, statistics, committee reports, Acts/Articles, court judgments

**KEY CONCEPTS TO COVER:** {concepts}

{reference_section}**STUDENT'S ANSWER:**
"{answer}"

**WORD COUNT:** {word_count_line}

**EVALUATION INSTRUCTIONS:**
1. Score each rubric category 0-10
2. Identify specific strengths and weaknesses
3. Check factual accuracy against reference material if provided
4. Note which key concepts were covered vs missed
5. Provide actionable improvement suggestions

**RETURN JSON ONLY:**
{{
  "content": <0-10>,
  "structure": <0-10>,
  "language": <0-10>,
  "evidence": <0-10>,
  "content_feedback": ["specific feedback 1", "specific feedback 2"],
  "structure_feedback": ["specific feedback 1", "specific feedback 2"],
  "language_feedback": ["specific feedback 1"],
  "evidence_feedback": ["specific feedback 1"],
  "suggestions": ["actionable suggestion 1", "actionable suggestion 2"],
  "key_points_missed": ["missed point 1", "missed point 2"]
}}"#,
        question = inputs.question_text,
        answer = inputs.answer_text,
    )
}

/// The JSON document the examiner prompt asks for. The four scores are
/// required; a response missing any of them is a scorer failure, never a
/// silently defaulted middle grade. Feedback arrays may be omitted.
#[derive(Debug, Deserialize)]
struct AiScorePayload {
    content: f64,
    structure: f64,
    language: f64,
    evidence: f64,
    #[serde(default)]
    content_feedback: Vec<String>,
    #[serde(default)]
    structure_feedback: Vec<String>,
    #[serde(default)]
    language_feedback: Vec<String>,
    #[serde(default)]
    evidence_feedback: Vec<String>,
    #[serde(default)]
    suggestions: Vec<String>,
    #[serde(default)]
    key_points_missed: Vec<String>,
}

/// Slice out the outermost JSON object from a completion that may wrap it
/// in prose or markdown fences. First `{` to last `}`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

fn or_default(lines: Vec<String>, fallback: &str) -> Vec<String> {
    if lines.is_empty() {
        vec![fallback.to_string()]
    } else {
        lines
    }
}

/// Parse a backend completion into rubric scores.
///
/// Scores are clamped to [0, 10] and the totals are always recomputed here
/// rather than trusted from the model.
pub fn parse_ai_response(completion: &str) -> Result<RubricScores, EvalError> {
    let json = extract_json_object(completion).ok_or_else(|| {
        EvalError::MalformedResponse("completion contains no JSON object".to_string())
    })?;

    let payload: AiScorePayload = serde_json::from_str(json)
        .map_err(|e| EvalError::MalformedResponse(format!("invalid score payload: {e}")))?;

    let components = ComponentScores::clamped(
        payload.content,
        payload.structure,
        payload.language,
        payload.evidence,
    );

    let feedback = Feedback {
        content: or_default(payload.content_feedback, "Good coverage of topic"),
        structure: or_default(payload.structure_feedback, "Well-organized answer"),
        language: or_default(payload.language_feedback, "Clear language"),
        evidence: or_default(payload.evidence_feedback, "Consider adding more examples"),
        suggestions: or_default(payload.suggestions, "Continue practicing"),
        key_points_missed: payload.key_points_missed,
    };

    Ok(RubricScores::from_components(components, feedback))
}
