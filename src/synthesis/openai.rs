//! OpenAI text-to-speech.

use super::SpeechService;
use crate::error::{Result, VaaniError};
use crate::language::Language;
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// OpenAI speech endpoint producing MP3.
pub struct OpenAiSpeech {
    client: OpenAIClient,
    model: SpeechModel,
    voice: Voice,
}

impl OpenAiSpeech {
    pub fn new(model: &str, voice: &str) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: parse_model(model)?,
            voice: parse_voice(voice)?,
        })
    }
}

fn parse_model(model: &str) -> Result<SpeechModel> {
    match model.trim() {
        "" => Err(VaaniError::Config("Speech model is empty".to_string())),
        "tts-1" => Ok(SpeechModel::Tts1),
        "tts-1-hd" => Ok(SpeechModel::Tts1Hd),
        other => Ok(SpeechModel::Other(other.to_string())),
    }
}

fn parse_voice(voice: &str) -> Result<Voice> {
    match voice.trim().to_lowercase().as_str() {
        "alloy" => Ok(Voice::Alloy),
        "echo" => Ok(Voice::Echo),
        "fable" => Ok(Voice::Fable),
        "onyx" => Ok(Voice::Onyx),
        "nova" => Ok(Voice::Nova),
        "shimmer" => Ok(Voice::Shimmer),
        _ => Err(VaaniError::Config(format!(
            "Unknown voice: {} (expected alloy, echo, fable, onyx, nova or shimmer)",
            voice
        ))),
    }
}

#[async_trait]
impl SpeechService for OpenAiSpeech {
    /// The TTS model detects the language from the text itself.
    #[instrument(skip(self, text, _language), fields(chars = text.chars().count()))]
    async fn synthesize(&self, text: &str, _language: Language) -> Result<Vec<u8>> {
        let request = CreateSpeechRequestArgs::default()
            .input(text)
            .model(self.model.clone())
            .voice(self.voice.clone())
            .response_format(SpeechResponseFormat::Mp3)
            .build()
            .map_err(|e| VaaniError::Synthesis(format!("Failed to build request: {}", e)))?;

        let response = self
            .client
            .audio()
            .speech(request)
            .await
            .map_err(|e| VaaniError::OpenAI(format!("Speech API error: {}", e)))?;

        debug!("Received {} bytes of audio", response.bytes.len());
        Ok(response.bytes.to_vec())
    }
}
