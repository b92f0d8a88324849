//! DebateArena Core Library
//!
//! Turns a topic and two personas into a validated, alternating debate
//! script through a chat-completion provider, then voices each turn with a
//! text-to-speech provider.

pub mod assembler;
pub mod config;
pub mod error;
pub mod llm;
pub mod orchestrator;
pub mod prompt;
pub mod request;
pub mod script;
pub mod speaker;
pub mod tts;

pub use assembler::{assemble, SynthesizedTurn};
pub use config::{LlmProvider, Settings};
pub use error::{DebateError, ScriptViolation, Stage, StageError};
pub use llm::{ChatCompletion, OpenAiCompatibleChat};
pub use orchestrator::{DebateCallback, DebateEvent, DebateOrchestrator, DebateOutcome};
pub use request::DebateRequest;
pub use script::{parse_script, ScriptGenerator, MAX_SCRIPT_ATTEMPTS};
pub use speaker::{DebateScript, DebateTurn, Speaker};
pub use tts::{AudioFormat, ElevenLabsClient, SpeechAudio, SpeechSynthesizer, Voice};
