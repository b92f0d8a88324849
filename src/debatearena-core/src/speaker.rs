//! Debate sides and the turns they speak.

use serde::{Deserialize, Serialize};

/// Which persona delivers a turn.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    /// Opens the debate and speaks on every even turn.
    PersonaA,
    /// Speaks on every odd turn.
    PersonaB,
}

impl Speaker {
    /// The speaker expected at a zero-based turn index.
    pub fn for_turn(index: usize) -> Self {
        if index % 2 == 0 {
            Speaker::PersonaA
        } else {
            Speaker::PersonaB
        }
    }

    /// Wire label, also used inside prompts.
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::PersonaA => "persona_a",
            Speaker::PersonaB => "persona_b",
        }
    }
}

/// One validated line of the script.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebateTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// An ordered script whose speakers alternate starting with persona A.
///
/// Only produced by [`crate::script::parse_script`], so the length and
/// alternation are already checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DebateScript {
    turns: Vec<DebateTurn>,
}

impl DebateScript {
    pub(crate) fn new(turns: Vec<DebateTurn>) -> Self {
        Self { turns }
    }

    pub fn turns(&self) -> &[DebateTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn into_turns(self) -> Vec<DebateTurn> {
        self.turns
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_turn_alternates_from_persona_a() {
        let order: Vec<Speaker> = (0..4).map(Speaker::for_turn).collect();
        assert_eq!(
            order,
            vec![
                Speaker::PersonaA,
                Speaker::PersonaB,
                Speaker::PersonaA,
                Speaker::PersonaB
            ]
        );
    }

    #[test]
    fn test_speaker_serde_labels() {
        assert_eq!(
            serde_json::to_string(&Speaker::PersonaB).unwrap(),
            "\"persona_b\""
        );
        let parsed: Speaker = serde_json::from_str("\"persona_a\"").unwrap();
        assert_eq!(parsed, Speaker::PersonaA);
        assert_eq!(parsed.as_str(), "persona_a");
    }
}
