//! Text-to-speech through the ElevenLabs HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::error::DebateError;

const PROVIDER: &str = "ElevenLabs";
const OUTPUT_FORMAT: &str = "mp3_44100_128";

/// Encoding of synthesized audio.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    Mp3,
}

impl AudioFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
        }
    }
}

/// Encoded audio exactly as the provider returned it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

/// A selectable synthesis voice.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voice {
    pub voice_id: String,
    pub name: String,
}

/// A text-to-speech provider.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize one line with the given voice. Single attempt.
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<SpeechAudio, DebateError>;

    /// List the voices the provider offers.
    async fn voices(&self) -> Result<Vec<Voice>, DebateError>;
}

/// ElevenLabs text-to-speech client.
pub struct ElevenLabsClient {
    http: reqwest::Client,
    api_base: String,
    api_key: Option<String>,
    model_id: String,
}

impl ElevenLabsClient {
    pub fn new(
        api_base: impl Into<String>,
        api_key: Option<String>,
        model_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, DebateError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| DebateError::ConfigError(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            api_base: api_base.into(),
            api_key,
            model_id: model_id.into(),
        })
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, DebateError> {
        Self::new(
            &settings.elevenlabs_api_base,
            settings.elevenlabs_api_key.clone(),
            &settings.elevenlabs_model_id,
            settings.upstream_timeout,
        )
    }

    fn api_key(&self) -> Result<&str, DebateError> {
        self.api_key
            .as_deref()
            .ok_or_else(|| DebateError::ConfigError("Missing ELEVENLABS_API_KEY".to_string()))
    }

    /// Append path segments to the API base; each segment is percent-encoded.
    fn url(&self, segments: &[&str]) -> Result<reqwest::Url, DebateError> {
        let mut url = reqwest::Url::parse(&self.api_base).map_err(|e| {
            DebateError::ConfigError(format!("Invalid ElevenLabs API base '{}': {}", self.api_base, e))
        })?;

        url.path_segments_mut()
            .map_err(|_| {
                DebateError::ConfigError(format!(
                    "ElevenLabs API base '{}' cannot take a path",
                    self.api_base
                ))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }
}

#[derive(Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    output_format: &'a str,
}

/// ElevenLabs wraps the list in `{"voices": [...]}`; a bare array is accepted too.
#[derive(Deserialize)]
#[serde(untagged)]
enum VoicesPayload {
    Wrapped { voices: Vec<Voice> },
    Bare(Vec<Voice>),
}

impl VoicesPayload {
    fn into_voices(self) -> Vec<Voice> {
        match self {
            VoicesPayload::Wrapped { voices } | VoicesPayload::Bare(voices) => voices,
        }
    }
}

async fn ensure_success(response: reqwest::Response) -> Result<reqwest::Response, DebateError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!(status = status.as_u16(), "ElevenLabs request rejected");
    Err(DebateError::ApiStatus {
        provider: PROVIDER,
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsClient {
    async fn synthesize(&self, text: &str, voice_id: &str) -> Result<SpeechAudio, DebateError> {
        let api_key = self.api_key()?;
        if voice_id.trim().is_empty() {
            return Err(DebateError::ConfigError("Voice ID cannot be empty".to_string()));
        }

        let body = SpeechRequest {
            text,
            model_id: &self.model_id,
            output_format: OUTPUT_FORMAT,
        };

        let response = self
            .http
            .post(self.url(&["v1", "text-to-speech", voice_id])?)
            .header("xi-api-key", api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&body)
            .send()
            .await?;

        let bytes = ensure_success(response).await?.bytes().await?.to_vec();
        tracing::debug!(voice_id, bytes = bytes.len(), "synthesized speech");

        Ok(SpeechAudio {
            bytes,
            format: AudioFormat::Mp3,
        })
    }

    async fn voices(&self) -> Result<Vec<Voice>, DebateError> {
        let api_key = self.api_key()?;

        let response = self
            .http
            .get(self.url(&["v1", "voices"])?)
            .header("xi-api-key", api_key)
            .send()
            .await?;

        let payload: VoicesPayload = ensure_success(response).await?.json().await?;
        Ok(payload.into_voices())
    }
}
