//! Script generation: prompt the model, validate its JSON, re-prompt once.

use serde::Deserialize;

use crate::error::{DebateError, ScriptViolation};
use crate::llm::ChatCompletion;
use crate::orchestrator::{DebateCallback, DebateEvent};
use crate::prompt::{self, ScriptBrief};
use crate::request::DebateRequest;
use crate::speaker::{DebateScript, DebateTurn, Speaker};

/// The first attempt plus one corrective retry.
pub const MAX_SCRIPT_ATTEMPTS: u32 = 2;

#[derive(Deserialize)]
struct RawScript {
    turns: Vec<RawTurn>,
}

#[derive(Deserialize)]
struct RawTurn {
    speaker: String,
    text: String,
}

/// Parse a completion into a script of exactly `turns` alternating lines.
pub fn parse_script(raw: &str, turns: usize) -> Result<DebateScript, ScriptViolation> {
    let parsed: RawScript = serde_json::from_str(raw)?;

    if parsed.turns.len() != turns {
        return Err(ScriptViolation::WrongTurnCount {
            expected: turns,
            actual: parsed.turns.len(),
        });
    }

    let mut validated = Vec::with_capacity(turns);
    for (index, turn) in parsed.turns.into_iter().enumerate() {
        let expected = Speaker::for_turn(index);
        if turn.speaker != expected.as_str() {
            return Err(ScriptViolation::WrongSpeaker {
                index,
                expected: expected.as_str(),
                actual: turn.speaker,
            });
        }

        let text = turn.text.trim();
        if text.is_empty() {
            return Err(ScriptViolation::EmptyText { index });
        }

        validated.push(DebateTurn {
            speaker: expected,
            text: text.to_string(),
        });
    }

    Ok(DebateScript::new(validated))
}

/// Turns a [`DebateRequest`] into a validated [`DebateScript`].
pub struct ScriptGenerator<'a> {
    chat: &'a dyn ChatCompletion,
    callback: Option<&'a DebateCallback>,
}

impl<'a> ScriptGenerator<'a> {
    pub fn new(chat: &'a dyn ChatCompletion) -> Self {
        Self {
            chat,
            callback: None,
        }
    }

    pub fn with_callback(mut self, callback: Option<&'a DebateCallback>) -> Self {
        self.callback = callback;
        self
    }

    /// Generate the script.
    ///
    /// Only a [`ScriptViolation`] on the first attempt leads to a second
    /// request. Configuration and transport errors are returned as they occur.
    pub async fn generate(&self, request: &DebateRequest) -> Result<DebateScript, DebateError> {
        request.validate()?;

        let brief = ScriptBrief {
            topic: &request.topic,
            persona_a: &request.persona_a,
            persona_b: &request.persona_b,
            turns: request.turn_count(),
        };

        let mut attempt = 1;
        loop {
            self.emit(DebateEvent::ScriptAttempt { attempt });

            let user_prompt = prompt::script_prompt(&brief, attempt > 1);
            let content = self.chat.complete(prompt::SYSTEM_PROMPT, &user_prompt).await?;

            match parse_script(&content, brief.turns) {
                Ok(script) => {
                    tracing::info!(attempt, turns = script.len(), "debate script accepted");
                    self.emit(DebateEvent::ScriptReady {
                        turns: script.len(),
                    });
                    return Ok(script);
                }
                Err(violation) => {
                    tracing::warn!(attempt, %violation, "debate script rejected");
                    self.emit(DebateEvent::ScriptRejected {
                        attempt,
                        reason: violation.to_string(),
                    });

                    if attempt >= MAX_SCRIPT_ATTEMPTS {
                        return Err(DebateError::InvalidScript(violation));
                    }
                    attempt += 1;
                }
            }
        }
    }

    fn emit(&self, event: DebateEvent) {
        if let Some(callback) = self.callback {
            callback(event);
        }
    }
}
