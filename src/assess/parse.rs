//! Lenient decoding of the model's JSON reply into a [`RawAssessment`].

use super::RawAssessment;
use crate::error::VerifyError;
use serde_json::{Map, Value};

const FENCE: &str = "```";

/// Decoded reply plus the model's own (untrusted) overall estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedAssessment {
    pub assessment: RawAssessment,
    pub reported_overall: Option<u32>,
}

/// Remove a surrounding Markdown code fence, if any.
///
/// A fenced reply loses its opening line (which may carry a language tag)
/// and everything from the last closing fence onward. A single-line reply
/// loses the opening fence and any alphabetic tag glued to it.
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_fence) = trimmed.strip_prefix(FENCE) else {
        return trimmed;
    };

    let body = match after_fence.split_once('\n') {
        Some((_, rest)) => rest,
        None => after_fence
            .trim_start_matches('`')
            .trim_start_matches(|c: char| c.is_ascii_alphabetic()),
    };
    let body = match body.rfind(FENCE) {
        Some(end) => &body[..end],
        None => body,
    };
    body.trim()
}

pub fn parse_model_response(text: &str) -> Result<ParsedAssessment, VerifyError> {
    let json = strip_code_fence(text);
    let value: Value =
        serde_json::from_str(json).map_err(|e| VerifyError::ModelResponse(e.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(VerifyError::ModelResponse(format!(
            "expected a JSON object, got {}",
            kind_name(&value)
        )));
    };

    Ok(ParsedAssessment {
        assessment: RawAssessment {
            code_quality: score_field(&obj, "code_quality").unwrap_or(0),
            complexity: score_field(&obj, "complexity").unwrap_or(0),
            best_practices: score_field(&obj, "best_practices").unwrap_or(0),
            originality: score_field(&obj, "originality").unwrap_or(0),
            evidence_summary: obj
                .get("evidence_summary")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .trim()
                .to_string(),
            strengths: string_list(&obj, "strengths"),
            weaknesses: string_list(&obj, "weaknesses"),
        },
        reported_overall: score_field(&obj, "overall_score"),
    })
}

fn score_field(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    obj.get(key).and_then(coerce_score)
}

/// Integers as-is, floats rounded, numeric strings parsed; clamped to 0..=100.
pub fn coerce_score(value: &Value) -> Option<u32> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let clamped = n.round().clamp(0.0, 100.0) as u32;
    Some(clamped)
}

fn string_list(obj: &Map<String, Value>, key: &str) -> Vec<String> {
    obj.get(key)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
