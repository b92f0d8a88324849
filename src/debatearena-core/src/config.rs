//! Process settings resolved from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::error::DebateError;

pub const DEFAULT_VOICE_ID: &str = "21m00Tcm4TlvDq8ikWAM";
pub const DEFAULT_TTS_MODEL_ID: &str = "eleven_multilingual_v2";
pub const ELEVENLABS_API_BASE: &str = "https://api.elevenlabs.io";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_TIMEOUT_SECS: u64 = 45;
pub const DEFAULT_ALLOWED_ORIGINS: &[&str] = &["http://localhost:5173", "http://127.0.0.1:5173"];

/// Chat-completion provider selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    Xai,
    OpenRouter,
}

impl LlmProvider {
    pub fn display_name(&self) -> &'static str {
        match self {
            LlmProvider::Xai => "xAI",
            LlmProvider::OpenRouter => "OpenRouter",
        }
    }

    pub fn api_base(&self) -> &'static str {
        match self {
            LlmProvider::Xai => "https://api.x.ai/v1",
            LlmProvider::OpenRouter => "https://openrouter.ai/api/v1",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            LlmProvider::Xai => "grok-4-fast-non-reasoning",
            LlmProvider::OpenRouter => "x-ai/grok-4-fast:free",
        }
    }

    /// Environment variable holding this provider's bearer credential.
    pub fn key_var(&self) -> &'static str {
        match self {
            LlmProvider::Xai => "XAI_API_KEY",
            LlmProvider::OpenRouter => "OPENROUTER_API_KEY",
        }
    }
}

/// Immutable configuration for one server process.
#[derive(Debug, Clone)]
pub struct Settings {
    pub llm_provider: LlmProvider,
    pub llm_model: String,
    pub llm_api_base: String,
    pub llm_temperature: f32,
    pub xai_api_key: Option<String>,
    pub openrouter_api_key: Option<String>,
    pub elevenlabs_api_key: Option<String>,
    pub elevenlabs_api_base: String,
    pub elevenlabs_model_id: String,
    pub default_voice_id: Option<String>,
    pub upstream_timeout: Duration,
    pub allowed_origins: Vec<String>,
}

impl Settings {
    /// Read settings from the process environment.
    pub fn from_env() -> Result<Self, DebateError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve settings through an arbitrary variable lookup.
    ///
    /// Empty or whitespace-only values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, DebateError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut llm_model = var("LLM_MODEL");
        let llm_provider = match var("LLM_PROVIDER").as_deref() {
            None | Some("xai") => LlmProvider::Xai,
            Some("openrouter") => LlmProvider::OpenRouter,
            // Older deployments put the model name in LLM_PROVIDER.
            Some(other) => {
                if llm_model.is_none() {
                    llm_model = Some(other.to_string());
                }
                LlmProvider::Xai
            }
        };

        let llm_model = llm_model.unwrap_or_else(|| llm_provider.default_model().to_string());
        let llm_api_base = var("LLM_API_BASE").unwrap_or_else(|| llm_provider.api_base().to_string());

        let llm_temperature = parse_var(&var, "LLM_TEMPERATURE")?.unwrap_or(DEFAULT_TEMPERATURE);
        let timeout_secs = parse_var(&var, "UPSTREAM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);
        if timeout_secs == 0 {
            return Err(DebateError::ConfigError(
                "UPSTREAM_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        let allowed_origins: Vec<String> = match var("CORS_ALLOWED_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_ALLOWED_ORIGINS.iter().map(|o| o.to_string()).collect(),
        };

        // Credentialed CORS cannot answer with a wildcard origin.
        if allowed_origins.iter().any(|origin| origin == "*") {
            return Err(DebateError::ConfigError(
                "CORS_ALLOWED_ORIGINS cannot contain '*'; list explicit origins".to_string(),
            ));
        }

        Ok(Self {
            llm_provider,
            llm_model,
            llm_api_base,
            llm_temperature,
            xai_api_key: var("XAI_API_KEY"),
            openrouter_api_key: var("OPENROUTER_API_KEY"),
            elevenlabs_api_key: var("ELEVENLABS_API_KEY"),
            elevenlabs_api_base: var("ELEVENLABS_API_BASE")
                .unwrap_or_else(|| ELEVENLABS_API_BASE.to_string()),
            elevenlabs_model_id: var("ELEVENLABS_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_TTS_MODEL_ID.to_string()),
            default_voice_id: Some(
                var("ELEVENLABS_VOICE_ID").unwrap_or_else(|| DEFAULT_VOICE_ID.to_string()),
            ),
            upstream_timeout: Duration::from_secs(timeout_secs),
            allowed_origins,
        })
    }

    /// Credential for the selected chat-completion provider.
    pub fn llm_api_key(&self) -> Option<&str> {
        match self.llm_provider {
            LlmProvider::Xai => self.xai_api_key.as_deref(),
            LlmProvider::OpenRouter => self.openrouter_api_key.as_deref(),
        }
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>, DebateError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| DebateError::ConfigError(format!("Invalid {key} '{raw}': {e}")))
        })
        .transpose()
}
