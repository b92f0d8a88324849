//! Incoming debate requests and their precondition checks.

use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::DebateError;
use crate::speaker::Speaker;

pub const TOPIC_CHARS: RangeInclusive<usize> = 3..=300;
pub const PERSONA_CHARS: RangeInclusive<usize> = 2..=80;
pub const VOICE_ID_CHARS: RangeInclusive<usize> = 2..=100;
pub const TURN_COUNT: RangeInclusive<u32> = 2..=20;
pub const DEFAULT_TURN_COUNT: u32 = 6;

fn default_turns() -> u32 {
    DEFAULT_TURN_COUNT
}

/// What the caller asked to be debated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebateRequest {
    pub topic: String,
    pub persona_a: String,
    pub persona_b: String,
    #[serde(default = "default_turns")]
    pub turns: u32,
    #[serde(default)]
    pub persona_a_voice_id: Option<String>,
    #[serde(default)]
    pub persona_b_voice_id: Option<String>,
}

impl DebateRequest {
    pub fn new(
        topic: impl Into<String>,
        persona_a: impl Into<String>,
        persona_b: impl Into<String>,
        turns: u32,
    ) -> Self {
        Self {
            topic: topic.into(),
            persona_a: persona_a.into(),
            persona_b: persona_b.into(),
            turns,
            persona_a_voice_id: None,
            persona_b_voice_id: None,
        }
    }

    /// Set the voice used for every turn of one persona.
    pub fn with_voice(mut self, speaker: Speaker, voice_id: impl Into<String>) -> Self {
        match speaker {
            Speaker::PersonaA => self.persona_a_voice_id = Some(voice_id.into()),
            Speaker::PersonaB => self.persona_b_voice_id = Some(voice_id.into()),
        }
        self
    }

    /// Caller-supplied voice for a persona, if any.
    pub fn voice_for(&self, speaker: Speaker) -> Option<&str> {
        match speaker {
            Speaker::PersonaA => self.persona_a_voice_id.as_deref(),
            Speaker::PersonaB => self.persona_b_voice_id.as_deref(),
        }
    }

    pub fn turn_count(&self) -> usize {
        self.turns as usize
    }

    /// Check field bounds before any provider is contacted.
    pub fn validate(&self) -> Result<(), DebateError> {
        check_text("topic", &self.topic, &TOPIC_CHARS)?;
        check_text("persona_a", &self.persona_a, &PERSONA_CHARS)?;
        check_text("persona_b", &self.persona_b, &PERSONA_CHARS)?;

        if !TURN_COUNT.contains(&self.turns) {
            return Err(DebateError::InvalidRequest(format!(
                "turns must be between {} and {}, got {}",
                TURN_COUNT.start(),
                TURN_COUNT.end(),
                self.turns
            )));
        }

        if let Some(voice) = &self.persona_a_voice_id {
            check_text("persona_a_voice_id", voice, &VOICE_ID_CHARS)?;
        }
        if let Some(voice) = &self.persona_b_voice_id {
            check_text("persona_b_voice_id", voice, &VOICE_ID_CHARS)?;
        }

        Ok(())
    }
}

fn check_text(field: &str, value: &str, bounds: &RangeInclusive<usize>) -> Result<(), DebateError> {
    if value.trim().is_empty() {
        return Err(DebateError::InvalidRequest(format!(
            "{field} cannot be blank"
        )));
    }

    let len = value.chars().count();
    if !bounds.contains(&len) {
        return Err(DebateError::InvalidRequest(format!(
            "{field} must be {}-{} characters, got {len}",
            bounds.start(),
            bounds.end()
        )));
    }

    Ok(())
}
