//! Core data models for the fund query router

use crate::error::RouterError;
use crate::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound on question length, in characters
pub const MAX_QUESTION_CHARS: usize = 2000;

/// Text used when the external service produced no answer at all
pub const NO_RESPONSE_SENTINEL: &str = "No response generated";

//
// ================= Question =================
//

/// A validated end-user question (1..=2000 characters, not blank)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Question(String);

impl Question {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();

        if text.trim().is_empty() {
            return Err(RouterError::ValidationError(
                "question must not be empty".to_string(),
            ));
        }

        let chars = text.chars().count();
        if chars > MAX_QUESTION_CHARS {
            return Err(RouterError::ValidationError(format!(
                "question is {} characters, limit is {}",
                chars, MAX_QUESTION_CHARS
            )));
        }

        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form for log lines
    pub fn preview(&self) -> String {
        self.0.chars().take(100).collect()
    }
}

impl AsRef<str> for Question {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Question {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

//
// ================= Intent =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    MetadataQuery,
    CalculationRequired,
    ComparisonRequired,
    DocumentSearch,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::MetadataQuery => "METADATA_QUERY",
            Intent::CalculationRequired => "CALCULATION_REQUIRED",
            Intent::ComparisonRequired => "COMPARISON_REQUIRED",
            Intent::DocumentSearch => "DOCUMENT_SEARCH",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//
// ================= Answer =================
//

/// Uniform answer shape handed back to callers.
///
/// `text` is never empty: a missing answer is reported as
/// [`NO_RESPONSE_SENTINEL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedAnswer {
    pub text: String,
    pub images: Vec<String>,
}

impl NormalizedAnswer {
    pub fn new(text: String, images: Vec<String>) -> Self {
        let text = if text.is_empty() {
            NO_RESPONSE_SENTINEL.to_string()
        } else {
            text
        };
        Self { text, images }
    }

    /// True when the upstream service produced no text
    pub fn is_no_answer(&self) -> bool {
        self.text == NO_RESPONSE_SENTINEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_question_bounds() {
        assert!(Question::new("a").is_ok());
        assert!(Question::new("x".repeat(MAX_QUESTION_CHARS)).is_ok());

        let too_long = Question::new("x".repeat(MAX_QUESTION_CHARS + 1));
        assert!(matches!(too_long, Err(RouterError::ValidationError(_))));
    }

    #[test]
    fn test_question_rejects_blank() {
        assert!(matches!(Question::new(""), Err(RouterError::ValidationError(_))));
        assert!(matches!(
            Question::new("   \n\t"),
            Err(RouterError::ValidationError(_))
        ));
    }

    #[test]
    fn test_question_counts_characters_not_bytes() {
        // 2000 two-byte characters is within the limit
        let text = "é".repeat(MAX_QUESTION_CHARS);
        assert!(text.len() > MAX_QUESTION_CHARS);
        assert!(Question::new(text).is_ok());
    }

    #[test]
    fn test_preview_truncates() {
        let q = Question::new("q".repeat(500)).unwrap();
        assert_eq!(q.preview().len(), 100);
    }

    #[test]
    fn test_intent_wire_names() {
        let json = serde_json::to_string(&Intent::CalculationRequired).unwrap();
        assert_eq!(json, "\"CALCULATION_REQUIRED\"");
        assert_eq!(Intent::MetadataQuery.to_string(), "METADATA_QUERY");
    }

    #[test]
    fn test_empty_answer_becomes_sentinel() {
        let answer = NormalizedAnswer::new(String::new(), vec![]);
        assert_eq!(answer.text, NO_RESPONSE_SENTINEL);
        assert!(answer.is_no_answer());
    }
}
