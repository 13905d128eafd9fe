// ✨ Remote Question Generation - Gemini text call + strict normalization
// The remote model is an opaque text-returning function; everything it
// sends back goes through extract-then-parse-then-validate before any
// question reaches a caller. Failures here never block the static list

use anyhow::{bail, Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::env;
use tracing::debug;

use crate::error::GenerationError;
use crate::houses::House;
use crate::quiz::QuizQuestion;

const DEFAULT_MODEL: &str = "gemini-1.5-flash";
const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

const SYSTEM_INSTRUCTIONS: &str = r#"You are an assistant that generates Hogwarts house sorting quiz questions.
Return 4-5 multiple-choice questions that help differentiate between the core traits of the four houses:
- Gryffindor: courage, bold action, chivalry
- Ravenclaw: intellect, curiosity, creativity
- Hufflepuff: loyalty, patience, kindness, fairness
- Slytherin: ambition, resourcefulness, strategic thinking
Each question must have exactly 4 options, each subtly aligned with one house without naming the house directly.
Respond ONLY with JSON in this shape:
{
  "questions": [
    {"id": "string", "question": "string", "options": ["A","B","C","D"], "houseHints": {"gryffindor": #, "ravenclaw": #, "hufflepuff": #, "slytherin": #}}
  ]
}
Ensure ids are snake_case concise keywords. Do not include explanations outside JSON."#;

// ============================================================================
// RESULT
// ============================================================================

/// Validated question batch plus the raw model text for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationResult {
    pub questions: Vec<QuizQuestion>,
    pub raw_model_text: String,
}

// ============================================================================
// RESPONSE PARSING
// ============================================================================

/// Extract the JSON object embedded in free text: everything from the
/// first '{' to the last '}', tolerating commentary around it
fn extract_json(raw: &str) -> Result<&str, GenerationError> {
    let first = raw.find('{');
    let last = raw.rfind('}');

    match (first, last) {
        (Some(first), Some(last)) if last > first => Ok(&raw[first..=last]),
        _ => Err(GenerationError::InvalidResponseFormat(
            "no JSON object delimiters".to_string(),
        )),
    }
}

fn normalize_options(value: Option<&Value>) -> Vec<String> {
    let Some(Value::Array(items)) = value else {
        return Vec::new();
    };

    // Every element must be a string, or the whole list is rejected
    if !items.iter().all(Value::is_string) {
        return Vec::new();
    }

    items
        .iter()
        .filter_map(Value::as_str)
        .take(4)
        .map(str::to_string)
        .collect()
}

fn normalize_hints(value: Option<&Value>) -> Option<HashMap<House, f64>> {
    let Some(Value::Object(map)) = value else {
        return None;
    };

    // Every value must be numeric, or the hints are dropped entirely
    if !map.values().all(Value::is_number) {
        return None;
    }

    let hints: HashMap<House, f64> = map
        .iter()
        .filter_map(|(key, weight)| {
            Some((House::parse(key)?, weight.as_f64()?))
        })
        .collect();

    if hints.is_empty() {
        None
    } else {
        Some(hints)
    }
}

/// Normalize one raw question. Missing id falls back to `q_<index+1>`,
/// a non-string question becomes a placeholder; option problems leave an
/// empty list so the caller's exactly-4 filter discards the question
fn normalize_question(raw: &Value, index: usize) -> QuizQuestion {
    let id = raw
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| format!("q_{}", index + 1));

    let question = raw
        .get("question")
        .and_then(Value::as_str)
        .map(|q| q.trim().to_string())
        .unwrap_or_else(|| "Untitled question".to_string());

    QuizQuestion {
        id,
        question,
        options: normalize_options(raw.get("options")),
        house_hints: normalize_hints(raw.get("houseHints")),
    }
}

/// Parse and validate a raw model response into a question batch.
///
/// Fails with `InvalidResponseFormat` when no JSON object can be found or
/// parsed, or when it lacks a `questions` array; with `NoValidQuestions`
/// when normalization discards every entry
pub fn parse_generated(raw: &str) -> Result<GenerationResult, GenerationError> {
    let candidate = extract_json(raw)?;

    let parsed: Value = serde_json::from_str(candidate)
        .map_err(|e| GenerationError::InvalidResponseFormat(e.to_string()))?;

    let Some(Value::Array(raw_questions)) = parsed.get("questions") else {
        return Err(GenerationError::InvalidResponseFormat(
            "missing questions array".to_string(),
        ));
    };

    let questions: Vec<QuizQuestion> = raw_questions
        .iter()
        .enumerate()
        .map(|(idx, q)| normalize_question(q, idx))
        .filter(|q| q.options.len() == 4)
        .collect();

    if questions.is_empty() {
        return Err(GenerationError::NoValidQuestions);
    }

    Ok(GenerationResult {
        questions,
        raw_model_text: raw.to_string(),
    })
}

// ============================================================================
// GEMINI CLIENT
// ============================================================================

/// Synchronous client for the Gemini generateContent REST endpoint.
/// No timeout beyond the network stack's defaults; callers retry
/// explicitly or fall back to the static list
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: reqwest::blocking::Client,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        GeminiClient {
            api_key: api_key.to_string(),
            model: DEFAULT_MODEL.to_string(),
            client: reqwest::blocking::Client::new(),
        }
    }

    /// Read the API key from GEMINI_API_KEY
    pub fn from_env() -> Result<Self> {
        match env::var("GEMINI_API_KEY") {
            Ok(key) if !key.is_empty() => Ok(Self::new(&key)),
            _ => bail!("Missing GEMINI_API_KEY. Add it to your environment."),
        }
    }

    /// Request a freshly generated question batch, validated before return
    pub fn generate_questions(
        &self,
        personality_focus: Option<&str>,
    ) -> Result<GenerationResult> {
        let user_prompt = format!(
            "Generate sorting quiz questions. Personality focus (optional): {}.",
            personality_focus.unwrap_or("general")
        );

        let body = serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": SYSTEM_INSTRUCTIONS },
                    { "text": user_prompt },
                ]
            }]
        });

        let url = format!(
            "{API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let response: Value = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .context("Generation request failed")?
            .error_for_status()
            .context("Generation request rejected")?
            .json()
            .context("Generation response was not JSON")?;

        let text = collect_response_text(&response);
        debug!(chars = text.len(), "Received model response");

        let result = parse_generated(&text)?;
        debug!(questions = result.questions.len(), "Validated question batch");

        Ok(result)
    }
}

/// Concatenate the text parts of the first candidate
fn collect_response_text(response: &Value) -> String {
    response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default()
}

// ============================================================================
// TESTS
// ============================================================================
