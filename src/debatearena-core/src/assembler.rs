//! Joins a script with its synthesized audio.

use crate::speaker::{DebateScript, Speaker};
use crate::tts::SpeechAudio;

/// A script line together with its audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesizedTurn {
    pub speaker: Speaker,
    pub text: String,
    pub audio: SpeechAudio,
}

/// Pair each turn with the audio at the same index, preserving order.
///
/// `audio` must hold one entry per turn.
pub fn assemble(script: DebateScript, audio: Vec<SpeechAudio>) -> Vec<SynthesizedTurn> {
    debug_assert_eq!(script.len(), audio.len());

    script
        .into_turns()
        .into_iter()
        .zip(audio)
        .map(|(turn, audio)| SynthesizedTurn {
            speaker: turn.speaker,
            text: turn.text,
            audio,
        })
        .collect()
}
