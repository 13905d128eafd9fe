// 📜 Quiz Question Source - static fallback list and hint-weight scoring
// The static list has zero latency and zero failure modes; the generated
// path lives in generation.rs and callers fall back here on any failure

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::houses::{House, HouseScores};

// ============================================================================
// QUESTION & SUBMISSION
// ============================================================================

/// One multiple-choice prompt. Immutable once produced; always carries
/// exactly 4 options (enforced by the static list and by generation-time
/// normalization)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: String,
    pub question: String,
    pub options: Vec<String>,

    /// Relative per-house weights attached by the generator; the static
    /// list carries none
    #[serde(rename = "houseHints", skip_serializing_if = "Option::is_none")]
    pub house_hints: Option<HashMap<House, f64>>,
}

impl QuizQuestion {
    pub fn new(id: &str, question: &str, options: [&str; 4]) -> Self {
        QuizQuestion {
            id: id.to_string(),
            question: question.to_string(),
            options: options.iter().map(|o| o.to_string()).collect(),
            house_hints: None,
        }
    }
}

/// One quiz attempt: chosen option text per question id, plus optional
/// free-text self-description. Consumed immediately by the classifier,
/// never persisted verbatim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizSubmission {
    pub answers: HashMap<String, String>,
    pub personality_text: String,
    pub timestamp: DateTime<Utc>,
}

impl QuizSubmission {
    pub fn new(answers: HashMap<String, String>, personality_text: &str) -> Self {
        QuizSubmission {
            answers,
            personality_text: personality_text.trim().to_string(),
            timestamp: Utc::now(),
        }
    }
}

// ============================================================================
// STATIC QUESTION LIST
// ============================================================================

/// The fixed 4-question ceremony, always available
pub fn static_questions() -> Vec<QuizQuestion> {
    vec![
        QuizQuestion::new(
            "courage",
            "When faced with danger, what is your first instinct?",
            [
                "Face it head-on with bravery",
                "Analyze the situation carefully first",
                "Help others to safety first",
                "Find a strategic advantage",
            ],
        ),
        QuizQuestion::new(
            "values",
            "What quality do you value most in others?",
            [
                "Courage and determination",
                "Intelligence and wisdom",
                "Loyalty and kindness",
                "Ambition and cunning",
            ],
        ),
        QuizQuestion::new(
            "free_time",
            "How do you prefer to spend your free time?",
            [
                "Seeking adventure and excitement",
                "Reading and learning new things",
                "Spending time with friends and family",
                "Working toward your goals",
            ],
        ),
        QuizQuestion::new(
            "fear",
            "What would you fear most?",
            [
                "Being seen as a coward",
                "Being ignorant or foolish",
                "Being alone or unloved",
                "Being powerless or weak",
            ],
        ),
    ]
}

// ============================================================================
// HINT-WEIGHT SCORING
// ============================================================================

/// Accumulate house-hint weights across answered questions.
///
/// A question contributes only when the chosen answer is one of its own
/// option strings and it carries hint weights; unmatched answers and
/// hint-less questions add nothing. Returns the four running totals and
/// picks no winner - that is the caller's job (see `HouseScores::leader`)
pub fn score_houses(
    answers: &HashMap<String, String>,
    questions: &[QuizQuestion],
) -> HouseScores {
    let mut scores = HouseScores::new();

    for question in questions {
        let Some(answer) = answers.get(&question.id) else {
            continue;
        };
        let Some(hints) = &question.house_hints else {
            continue;
        };
        if !question.options.iter().any(|o| o == answer) {
            continue;
        }

        for (&house, &weight) in hints {
            scores.add(house, weight);
        }
    }

    scores
}

// ============================================================================
// TESTS
// ============================================================================
