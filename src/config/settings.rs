//! Configuration settings for Vaani.

use crate::retry::RetryPolicy;
use crate::transcription::SegmentationConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Settings {
    pub general: GeneralSettings,
    pub transcription: TranscriptionSettings,
    pub translation: TranslationSettings,
    pub chat: ChatSettings,
    pub synthesis: SynthesisSettings,
    pub prompts: PromptSettings,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralSettings {
    /// Directory where transcripts, translations, logs and audio are written.
    pub data_dir: String,
    /// Directory for downloads and intermediate audio.
    pub temp_dir: String,
}

impl Default for GeneralSettings {
    fn default() -> Self {
        Self {
            data_dir: "~/.vaani".to_string(),
            temp_dir: "/tmp/vaani".to_string(),
        }
    }
}

/// Speech recognition settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionSettings {
    /// Primary recognition model (word-level timestamps).
    pub model: String,
    /// Fallback hosted audio model (plain text per window).
    pub fallback_model: String,
    /// Spoken language of the source media (ISO 639-1).
    pub language: String,
    /// Upload limit of the recognition service, in bytes.
    pub max_upload_bytes: u64,
    /// Chunk length used when compressed audio still exceeds the upload limit.
    pub chunk_duration_seconds: u32,
    /// Window length for the fallback recognizer.
    pub fallback_chunk_seconds: u32,
    /// Pause-based segmentation thresholds.
    pub segmentation: SegmentationConfig,
}

impl Default for TranscriptionSettings {
    fn default() -> Self {
        Self {
            model: "whisper-1".to_string(),
            fallback_model: "gpt-4o-transcribe".to_string(),
            language: "en".to_string(),
            max_upload_bytes: 24 * 1024 * 1024,
            chunk_duration_seconds: 600,
            fallback_chunk_seconds: 30,
            segmentation: SegmentationConfig::default(),
        }
    }
}

/// Translation backend.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    /// Google Cloud Translation (v2 REST).
    #[default]
    Google,
    /// Hosted chat model in JSON mode.
    Openai,
}

impl std::str::FromStr for TranslationProvider {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" => Ok(TranslationProvider::Google),
            "openai" | "chat" => Ok(TranslationProvider::Openai),
            _ => Err(format!("Unknown translation provider: {}", s)),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationProvider::Google => write!(f, "google"),
            TranslationProvider::Openai => write!(f, "openai"),
        }
    }
}

/// Translation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationSettings {
    pub provider: TranslationProvider,
    /// Chat model used by the `openai` provider.
    pub model: String,
    /// Language of the transcript text (ISO 639-1).
    pub source_language: String,
    /// Character limit per translation request.
    pub max_batch_chars: usize,
    /// Segment limit per translation request.
    pub max_batch_segments: usize,
    /// Per-batch retry policy.
    pub retry: RetryPolicy,
}

impl Default for TranslationSettings {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::Google,
            model: "gpt-4o-mini".to_string(),
            source_language: "en".to_string(),
            max_batch_chars: 5_000,
            max_batch_segments: 128,
            retry: RetryPolicy::default(),
        }
    }
}

/// Conversational Q&A settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    pub model: String,
    /// Prior turns included in each prompt.
    pub history_turns: usize,
    /// Leading segments included as context.
    pub max_context_segments: usize,
    pub temperature: f32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            history_turns: 5,
            max_context_segments: 30,
            temperature: 0.7,
        }
    }
}

/// Speech synthesis settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisSettings {
    pub model: String,
    pub voice: String,
    /// Silence inserted between consecutive clips.
    pub silence_ms: u64,
    /// Per-segment retry policy.
    pub retry: RetryPolicy,
}

impl Default for SynthesisSettings {
    fn default() -> Self {
        Self {
            model: "tts-1".to_string(),
            voice: "alloy".to_string(),
            silence_ms: 500,
            retry: RetryPolicy {
                max_retries: 1,
                ..RetryPolicy::default()
            },
        }
    }
}

/// Prompt customization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct PromptSettings {
    /// Directory for custom prompts (overrides defaults).
    pub custom_dir: Option<String>,
    /// Custom variables available in all prompts as {{variable_name}}.
    pub variables: std::collections::HashMap<String, String>,
}

impl Settings {
    /// Load settings from the default configuration file.
    pub fn load() -> crate::error::Result<Self> {
        Self::load_from(None)
    }

    /// Load settings from a specific path, or default location if None.
    pub fn load_from(path: Option<&PathBuf>) -> crate::error::Result<Self> {
        let config_path = match path {
            Some(p) => p.clone(),
            None => Self::default_config_path(),
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let settings: Settings = toml::from_str(&content)?;
            Ok(settings)
        } else {
            Ok(Settings::default())
        }
    }

    /// Save settings to the default configuration file.
    pub fn save(&self) -> crate::error::Result<()> {
        self.save_to(&Self::default_config_path())
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> crate::error::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::error::VaaniError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get the default configuration file path.
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("vaani")
            .join("config.toml")
    }

    /// Expand shell variables in paths (e.g., ~).
    pub fn expand_path(path: &str) -> PathBuf {
        PathBuf::from(shellexpand::tilde(path).to_string())
    }

    /// Get the expanded data directory path.
    pub fn data_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.data_dir)
    }

    /// Get the expanded temp directory path.
    pub fn temp_dir(&self) -> PathBuf {
        Self::expand_path(&self.general.temp_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [translation]
            provider = "openai"
            max_batch_chars = 1200

            [chat]
            history_turns = 2
            "#,
        )
        .unwrap();

        assert_eq!(settings.translation.provider, TranslationProvider::Openai);
        assert_eq!(settings.translation.max_batch_chars, 1200);
        assert_eq!(settings.translation.max_batch_segments, 128);
        assert_eq!(settings.chat.history_turns, 2);
        assert_eq!(settings.synthesis.silence_ms, 500);
        assert_eq!(settings.transcription.model, "whisper-1");
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut settings = Settings::default();
        settings.synthesis.voice = "nova".to_string();
        settings.save_to(&path).unwrap();

        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.synthesis.voice, "nova");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let loaded = Settings::load_from(Some(&path)).unwrap();
        assert_eq!(loaded.general.data_dir, "~/.vaani");
    }

    #[test]
    fn test_provider_parse() {
        assert_eq!("Google".parse::<TranslationProvider>().unwrap(), TranslationProvider::Google);
        assert_eq!("chat".parse::<TranslationProvider>().unwrap(), TranslationProvider::Openai);
        assert!("deepl".parse::<TranslationProvider>().is_err());
    }
}
