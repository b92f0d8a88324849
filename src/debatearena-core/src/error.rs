//! Error types for the debate system.

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DebateError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid debate script: {0}")]
    InvalidScript(#[from] ScriptViolation),

    #[error("{provider} returned HTTP {status}: {body}")]
    ApiStatus {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("OpenAI API error: {0}")]
    OpenAIError(#[from] async_openai::error::OpenAIError),

    #[error("{0} returned no voices")]
    NoVoices(&'static str),
}

impl DebateError {
    /// Only a non-conforming script is worth re-prompting for.
    pub fn is_retryable(&self) -> bool {
        matches!(self, DebateError::InvalidScript(_))
    }
}

/// Why a completion was rejected as a debate script.
#[derive(Error, Debug)]
pub enum ScriptViolation {
    #[error("response is not a valid script object: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("expected {expected} turns, got {actual}")]
    WrongTurnCount { expected: usize, actual: usize },

    #[error("turn {index} speaker must be {expected}, got {actual}")]
    WrongSpeaker {
        index: usize,
        expected: &'static str,
        actual: String,
    },

    #[error("turn {index} text cannot be empty")]
    EmptyText { index: usize },
}

/// Pipeline stage an upstream failure happened in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    ScriptGeneration,
    SpeechSynthesis,
    VoiceListing,
}

impl Stage {
    pub fn label(&self) -> &'static str {
        match self {
            Stage::ScriptGeneration => "Debate generation",
            Stage::SpeechSynthesis => "TTS",
            Stage::VoiceListing => "Voices fetch",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A [`DebateError`] tagged with the stage that produced it.
#[derive(Error, Debug)]
#[error("{stage} failed: {source}")]
pub struct StageError {
    pub stage: Stage,
    #[source]
    pub source: DebateError,
}

impl StageError {
    pub fn new(stage: Stage, source: DebateError) -> Self {
        Self { stage, source }
    }

    /// Precondition failures are the caller's fault, everything else is upstream.
    pub fn is_invalid_request(&self) -> bool {
        matches!(self.source, DebateError::InvalidRequest(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_script_violations_are_retryable() {
        let violation = DebateError::from(ScriptViolation::EmptyText { index: 2 });
        assert!(violation.is_retryable());

        let status = DebateError::ApiStatus {
            provider: "xAI",
            status: 500,
            body: "boom".to_string(),
        };
        assert!(!status.is_retryable());
        assert!(!DebateError::ConfigError("Missing XAI_API_KEY".into()).is_retryable());
    }

    #[test]
    fn test_stage_error_display_names_stage() {
        let err = StageError::new(
            Stage::SpeechSynthesis,
            DebateError::ConfigError("Missing ELEVENLABS_API_KEY".into()),
        );
        assert_eq!(
            err.to_string(),
            "TTS failed: Configuration error: Missing ELEVENLABS_API_KEY"
        );
        assert!(!err.is_invalid_request());
    }

    #[test]
    fn test_wrong_speaker_message() {
        let violation = ScriptViolation::WrongSpeaker {
            index: 1,
            expected: "persona_b",
            actual: "persona_a".to_string(),
        };
        assert_eq!(
            violation.to_string(),
            "turn 1 speaker must be persona_b, got persona_a"
        );
    }
}
