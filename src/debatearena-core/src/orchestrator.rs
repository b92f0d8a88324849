//! Debate orchestration logic.
//!
//! Runs the pipeline for one request: script generation, per-turn speech
//! synthesis, then assembly. Nothing is kept between runs.

use std::sync::Arc;

use crate::assembler::{self, SynthesizedTurn};
use crate::config::Settings;
use crate::error::{DebateError, Stage, StageError};
use crate::llm::{ChatCompletion, OpenAiCompatibleChat};
use crate::request::DebateRequest;
use crate::script::ScriptGenerator;
use crate::speaker::{DebateScript, Speaker};
use crate::tts::{ElevenLabsClient, SpeechSynthesizer, Voice};

/// Callback for debate events.
pub type DebateCallback = Box<dyn Fn(DebateEvent) + Send + Sync>;

/// Events emitted during a debate.
#[derive(Debug, Clone)]
pub enum DebateEvent {
    /// A script request is about to be sent.
    ScriptAttempt { attempt: u32 },
    /// The model's reply did not form a valid script.
    ScriptRejected { attempt: u32, reason: String },
    /// A script passed validation.
    ScriptReady { turns: usize },
    /// Audio for one turn came back.
    TurnSynthesized {
        index: usize,
        speaker: Speaker,
        voice_id: String,
        bytes: usize,
    },
    /// The debate has concluded.
    DebateEnd,
}

/// Finished debate for one request.
#[derive(Debug, Clone)]
pub struct DebateOutcome {
    pub topic: String,
    pub turns: Vec<SynthesizedTurn>,
}

/// Drives the chat and speech providers for debate requests.
pub struct DebateOrchestrator {
    chat: Arc<dyn ChatCompletion>,
    speech: Arc<dyn SpeechSynthesizer>,
    default_voice_id: Option<String>,
    callback: Option<DebateCallback>,
}

impl DebateOrchestrator {
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        speech: Arc<dyn SpeechSynthesizer>,
        default_voice_id: Option<String>,
    ) -> Self {
        Self {
            chat,
            speech,
            default_voice_id,
            callback: None,
        }
    }

    /// Wire up the real providers described by `settings`.
    pub fn from_settings(settings: &Settings) -> Result<Self, DebateError> {
        let chat = OpenAiCompatibleChat::from_settings(settings)?;
        let speech = ElevenLabsClient::from_settings(settings)?;
        Ok(Self::new(
            Arc::new(chat),
            Arc::new(speech),
            settings.default_voice_id.clone(),
        ))
    }

    /// Set a callback for debate events.
    pub fn with_callback(mut self, callback: DebateCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// Run the full debate.
    ///
    /// Any failure aborts the whole run; turns synthesized before the failure
    /// are discarded.
    pub async fn run(&self, request: &DebateRequest) -> Result<DebateOutcome, StageError> {
        // The generator checks request preconditions before contacting the provider.
        let script = ScriptGenerator::new(self.chat.as_ref())
            .with_callback(self.callback.as_ref())
            .generate(request)
            .await
            .map_err(|e| StageError::new(Stage::ScriptGeneration, e))?;

        let turns = self
            .synthesize_script(request, script)
            .await
            .map_err(|e| StageError::new(Stage::SpeechSynthesis, e))?;

        self.emit_event(DebateEvent::DebateEnd);
        Ok(DebateOutcome {
            topic: request.topic.clone(),
            turns,
        })
    }

    /// Synthesize every turn in order, one request at a time.
    async fn synthesize_script(
        &self,
        request: &DebateRequest,
        script: DebateScript,
    ) -> Result<Vec<SynthesizedTurn>, DebateError> {
        let persona_a_voice = self.resolve_voice(request, Speaker::PersonaA)?;
        let persona_b_voice = self.resolve_voice(request, Speaker::PersonaB)?;

        let mut audio = Vec::with_capacity(script.len());
        for (index, turn) in script.turns().iter().enumerate() {
            let voice_id = match turn.speaker {
                Speaker::PersonaA => persona_a_voice,
                Speaker::PersonaB => persona_b_voice,
            };

            let clip = self.speech.synthesize(&turn.text, voice_id).await.map_err(|e| {
                tracing::warn!(index, voice_id, error = %e, "speech synthesis failed");
                e
            })?;

            self.emit_event(DebateEvent::TurnSynthesized {
                index,
                speaker: turn.speaker,
                voice_id: voice_id.to_string(),
                bytes: clip.bytes.len(),
            });
            audio.push(clip);
        }

        Ok(assembler::assemble(script, audio))
    }

    /// The request's voice for a persona, else the configured default.
    fn resolve_voice<'r>(
        &'r self,
        request: &'r DebateRequest,
        speaker: Speaker,
    ) -> Result<&'r str, DebateError> {
        request
            .voice_for(speaker)
            .or(self.default_voice_id.as_deref())
            .ok_or_else(|| {
                DebateError::ConfigError(format!(
                    "No voice ID for {}; set ELEVENLABS_VOICE_ID or pass {}_voice_id",
                    speaker.as_str(),
                    speaker.as_str()
                ))
            })
    }

    /// List voices offered by the speech provider. An empty list is an error.
    pub async fn voices(&self) -> Result<Vec<Voice>, StageError> {
        let voices = self
            .speech
            .voices()
            .await
            .map_err(|e| StageError::new(Stage::VoiceListing, e))?;

        if voices.is_empty() {
            return Err(StageError::new(
                Stage::VoiceListing,
                DebateError::NoVoices("ElevenLabs"),
            ));
        }

        Ok(voices)
    }

    /// Emit an event if a callback is registered.
    fn emit_event(&self, event: DebateEvent) {
        if let Some(ref callback) = self.callback {
            callback(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tts::{AudioFormat, SpeechAudio};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedChat {
        replies: Mutex<Vec<String>>,
        calls: Mutex<usize>,
    }

    impl FixedChat {
        fn new(replies: Vec<String>) -> Self {
            Self {
                replies: Mutex::new(replies),
                calls: Mutex::new(0),
            }
        }
    }

    #[async_trait]
    impl ChatCompletion for FixedChat {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, DebateError> {
            *self.calls.lock().unwrap() += 1;
            let mut replies = self.replies.lock().unwrap();
            Ok(replies.remove(0))
        }
    }

    /// Returns the text bytes as "audio" and remembers which voice was used.
    #[derive(Default)]
    struct EchoSpeech {
        used_voices: Mutex<Vec<String>>,
        fail_on_call: Option<usize>,
        voices: Vec<Voice>,
    }

    #[async_trait]
    impl SpeechSynthesizer for EchoSpeech {
        async fn synthesize(&self, text: &str, voice_id: &str) -> Result<SpeechAudio, DebateError> {
            let mut used = self.used_voices.lock().unwrap();
            if self.fail_on_call == Some(used.len()) {
                return Err(DebateError::ApiStatus {
                    provider: "ElevenLabs",
                    status: 429,
                    body: "quota".into(),
                });
            }
            used.push(voice_id.to_string());
            Ok(SpeechAudio {
                bytes: format!("{voice_id}:{text}").into_bytes(),
                format: AudioFormat::Mp3,
            })
        }

        async fn voices(&self) -> Result<Vec<Voice>, DebateError> {
            Ok(self.voices.clone())
        }
    }

    fn script_json(turns: usize) -> String {
        let turns: Vec<serde_json::Value> = (0..turns)
            .map(|i| serde_json::json!({"speaker": Speaker::for_turn(i).as_str(), "text": format!("Line {i}")}))
            .collect();
        serde_json::json!({ "turns": turns }).to_string()
    }

    fn request(turns: u32) -> DebateRequest {
        DebateRequest::new("Should cities ban cars from downtown?", "Scientist", "Economist", turns)
    }

    #[tokio::test]
    async fn test_run_alternates_and_uses_default_voice() {
        let speech = Arc::new(EchoSpeech::default());
        let orchestrator = DebateOrchestrator::new(
            Arc::new(FixedChat::new(vec![script_json(4)])),
            speech.clone(),
            Some("default-voice".into()),
        );

        let outcome = orchestrator.run(&request(4)).await.unwrap();
        assert_eq!(outcome.topic, "Should cities ban cars from downtown?");
        assert_eq!(outcome.turns.len(), 4);
        for (i, turn) in outcome.turns.iter().enumerate() {
            assert_eq!(turn.speaker, Speaker::for_turn(i));
            assert_eq!(turn.audio.bytes, format!("default-voice:Line {i}").into_bytes());
        }
    }

    #[tokio::test]
    async fn test_persona_voice_overrides_default() {
        let speech = Arc::new(EchoSpeech::default());
        let orchestrator = DebateOrchestrator::new(
            Arc::new(FixedChat::new(vec![script_json(4)])),
            speech.clone(),
            Some("default-voice".into()),
        );

        let req = request(4).with_voice(Speaker::PersonaB, "voice-b");
        orchestrator.run(&req).await.unwrap();

        let used = speech.used_voices.lock().unwrap();
        assert_eq!(
            *used,
            vec!["default-voice", "voice-b", "default-voice", "voice-b"]
        );
    }

    #[tokio::test]
    async fn test_missing_voice_fails_in_synthesis_stage() {
        let speech = Arc::new(EchoSpeech::default());
        let orchestrator = DebateOrchestrator::new(
            Arc::new(FixedChat::new(vec![script_json(2)])),
            speech.clone(),
            None,
        );

        let err = orchestrator.run(&request(2)).await.unwrap_err();
        assert_eq!(err.stage, Stage::SpeechSynthesis);
        assert!(matches!(err.source, DebateError::ConfigError(_)));
        assert!(speech.used_voices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_synthesis_failure_discards_earlier_turns() {
        let speech = Arc::new(EchoSpeech {
            fail_on_call: Some(2),
            ..Default::default()
        });
        let orchestrator = DebateOrchestrator::new(
            Arc::new(FixedChat::new(vec![script_json(4)])),
            speech.clone(),
            Some("v".into()),
        );

        let err = orchestrator.run(&request(4)).await.unwrap_err();
        assert_eq!(err.stage, Stage::SpeechSynthesis);
        assert!(err.to_string().starts_with("TTS failed:"));
        assert_eq!(speech.used_voices.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_invalid_scripts_skip_synthesis() {
        let chat = Arc::new(FixedChat::new(vec!["{}".into(), "nope".into()]));
        let speech = Arc::new(EchoSpeech::default());
        let orchestrator = DebateOrchestrator::new(chat.clone(), speech.clone(), Some("v".into()));

        let err = orchestrator.run(&request(2)).await.unwrap_err();
        assert_eq!(err.stage, Stage::ScriptGeneration);
        assert!(err.to_string().starts_with("Debate generation failed:"));
        assert_eq!(*chat.calls.lock().unwrap(), 2);
        assert!(speech.used_voices.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_request_is_flagged() {
        let chat = Arc::new(FixedChat::new(vec![]));
        let orchestrator =
            DebateOrchestrator::new(chat.clone(), Arc::new(EchoSpeech::default()), None);

        let err = orchestrator.run(&request(40)).await.unwrap_err();
        assert!(err.is_invalid_request());
        assert_eq!(*chat.calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_empty_voice_list_is_error() {
        let orchestrator = DebateOrchestrator::new(
            Arc::new(FixedChat::new(vec![])),
            Arc::new(EchoSpeech::default()),
            None,
        );

        let err = orchestrator.voices().await.unwrap_err();
        assert_eq!(err.stage, Stage::VoiceListing);
        assert!(matches!(err.source, DebateError::NoVoices(_)));
    }

    #[tokio::test]
    async fn test_events_follow_pipeline() {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let orchestrator = DebateOrchestrator::new(
            Arc::new(FixedChat::new(vec![script_json(2)])),
            Arc::new(EchoSpeech::default()),
            Some("v".into()),
        )
        .with_callback(Box::new(move |event| sink.lock().unwrap().push(event)));

        orchestrator.run(&request(2)).await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(events.len(), 5);
        assert!(matches!(events[2], DebateEvent::TurnSynthesized { index: 0, .. }));
        assert!(matches!(events[4], DebateEvent::DebateEnd));
    }
}
