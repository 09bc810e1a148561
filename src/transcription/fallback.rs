//! Fallback recognizer: a hosted audio model transcribing fixed windows.
//!
//! The model returns plain text without timestamps, so the audio is cut into
//! short windows and each window becomes one segment spanning its bounds.

use super::chunks::{assemble_chunks, cumulative_offsets, ChunkTranscript};
use super::models::TranscriptSegment;
use super::SpeechRecognizer;
use crate::audio::{probe_duration, split_audio};
use crate::error::{Result, VaaniError};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info, instrument};

/// Plain-text recognizer over fixed-length windows.
pub struct ChunkedModelRecognizer {
    client: OpenAIClient,
    model: String,
    language: Option<String>,
    prompt: String,
    window_seconds: u32,
}

impl ChunkedModelRecognizer {
    pub fn new(
        model: &str,
        language: Option<&str>,
        prompt: &str,
        window_seconds: u32,
    ) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            language: language.map(|s| s.to_string()),
            prompt: prompt.to_string(),
            window_seconds: window_seconds.max(1),
        })
    }

    /// Transcribe one window to plain text.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn transcribe_window(&self, audio_path: &Path) -> Result<String> {
        let file_bytes = tokio::fs::read(audio_path).await?;

        let mut request_builder = CreateTranscriptionRequestArgs::default();
        request_builder
            .file(AudioInput::from_vec_u8(
                audio_path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("audio.mp3")
                    .to_string(),
                file_bytes,
            ))
            .model(&self.model)
            .prompt(&self.prompt)
            .response_format(AudioResponseFormat::Json);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder.build().map_err(|e| {
            VaaniError::Recognition(format!("Failed to build request: {}", e))
        })?;

        let response = self
            .client
            .audio()
            .transcribe(request)
            .await
            .map_err(|e| VaaniError::OpenAI(format!("{} API error: {}", self.model, e)))?;

        Ok(response.text.trim().to_string())
    }
}

/// One segment per window, skipping windows with no speech.
fn window_segments(text: String, duration: f64) -> Vec<TranscriptSegment> {
    if text.is_empty() || duration <= 0.0 {
        Vec::new()
    } else {
        vec![TranscriptSegment::new(0.0, duration, text)]
    }
}

#[async_trait]
impl SpeechRecognizer for ChunkedModelRecognizer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn recognize(&self, audio_path: &Path) -> Result<Vec<TranscriptSegment>> {
        let temp_dir = tempfile::tempdir()?;
        let windows = split_audio(audio_path, temp_dir.path(), self.window_seconds).await?;
        info!("Transcribing {} window(s) with {}", windows.len(), self.model);

        let mut durations = Vec::with_capacity(windows.len());
        for window in &windows {
            durations.push(probe_duration(window).await?);
        }
        let offsets = cumulative_offsets(&durations);

        let mut chunks = Vec::with_capacity(windows.len());
        for (idx, window) in windows.iter().enumerate() {
            let text = self.transcribe_window(window).await.map_err(|e| {
                VaaniError::Recognition(format!(
                    "window {} at {:.0}s failed: {}",
                    idx, offsets[idx], e
                ))
            })?;
            debug!("Window {}: {} chars", idx, text.len());

            chunks.push(ChunkTranscript {
                offset: offsets[idx],
                duration: durations[idx],
                segments: window_segments(text, durations[idx]),
            });
        }

        Ok(assemble_chunks(chunks))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_segments() {
        let segs = window_segments("namaste".to_string(), 30.0);
        assert_eq!(segs, vec![TranscriptSegment::new(0.0, 30.0, "namaste")]);
        assert!(window_segments(String::new(), 30.0).is_empty());
        assert!(window_segments("x".to_string(), 0.0).is_empty());
    }
}
