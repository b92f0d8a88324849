//! Prompt text sent to the script-writing model.

use crate::speaker::Speaker;

pub const SYSTEM_PROMPT: &str =
    "You are a debate script generator. Always return strict JSON only.";

const RETRY_INSTRUCTION: &str =
    "Your previous response was invalid. Return only valid JSON with the required shape.";

/// Inputs the script prompt is built from.
#[derive(Debug, Clone, Copy)]
pub struct ScriptBrief<'a> {
    pub topic: &'a str,
    pub persona_a: &'a str,
    pub persona_b: &'a str,
    pub turns: usize,
}

/// Build the user instruction; `retry` appends the corrective sentence.
pub fn script_prompt(brief: &ScriptBrief<'_>, retry: bool) -> String {
    let mut prompt = format!(
        "Create a debate script as strict JSON. \
         Topic: {topic}. Persona A: {a}. Persona B: {b}. \
         Total turns: {turns}. Speakers must alternate strictly starting with {first}. \
         Return JSON object with key 'turns', containing a list of objects \
         with keys 'speaker' and 'text'. \
         Speaker values must be exactly '{first}' or '{second}'. No markdown, no extra keys.",
        topic = brief.topic,
        a = brief.persona_a,
        b = brief.persona_b,
        turns = brief.turns,
        first = Speaker::PersonaA.as_str(),
        second = Speaker::PersonaB.as_str(),
    );

    if retry {
        prompt.push(' ');
        prompt.push_str(RETRY_INSTRUCTION);
    }

    prompt
}
