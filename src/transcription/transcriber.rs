//! The Transcriber: upload preparation, chunked recognition and fallback.

use super::chunks::{assemble_chunks, cumulative_offsets, ChunkTranscript};
use super::fallback::ChunkedModelRecognizer;
use super::models::{validate_segments, TranscriptDocument, TranscriptSegment};
use super::segmenter::Segmenter;
use super::whisper::WhisperRecognizer;
use super::SpeechRecognizer;
use crate::audio::{compress_for_recognition, probe_duration, split_audio};
use crate::audio_source::MediaMetadata;
use crate::config::{Prompts, TranscriptionSettings};
use crate::error::{Result, VaaniError};
use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// Produces a [`TranscriptDocument`] from a local audio file.
pub struct Transcriber {
    primary: Box<dyn SpeechRecognizer>,
    fallback: Option<Box<dyn SpeechRecognizer>>,
    language: String,
    max_upload_bytes: u64,
    chunk_duration_seconds: u32,
}

impl Transcriber {
    pub fn new(
        primary: Box<dyn SpeechRecognizer>,
        fallback: Option<Box<dyn SpeechRecognizer>>,
    ) -> Self {
        let defaults = TranscriptionSettings::default();
        Self {
            primary,
            fallback,
            language: defaults.language,
            max_upload_bytes: defaults.max_upload_bytes,
            chunk_duration_seconds: defaults.chunk_duration_seconds,
        }
    }

    /// Build the Whisper + chunked-model pair from settings.
    pub fn from_settings(settings: &TranscriptionSettings, prompts: &Prompts) -> Result<Self> {
        let language = Some(settings.language.as_str()).filter(|l| !l.is_empty());

        let primary = WhisperRecognizer::new(
            &settings.model,
            language,
            Segmenter::new(settings.segmentation.clone()),
        )?;

        let fallback = if settings.fallback_model.is_empty() {
            None
        } else {
            Some(Box::new(ChunkedModelRecognizer::new(
                &settings.fallback_model,
                language,
                &prompts.transcription.fallback,
                settings.fallback_chunk_seconds,
            )?) as Box<dyn SpeechRecognizer>)
        };

        Ok(Self::new(Box::new(primary), fallback)
            .with_language(&settings.language)
            .with_limits(settings.max_upload_bytes, settings.chunk_duration_seconds))
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = language.to_string();
        self
    }

    pub fn with_limits(mut self, max_upload_bytes: u64, chunk_duration_seconds: u32) -> Self {
        self.max_upload_bytes = max_upload_bytes;
        self.chunk_duration_seconds = chunk_duration_seconds.max(1);
        self
    }

    /// Transcribe `audio_path`.
    ///
    /// The primary recognizer handles the whole input; if it fails at any
    /// chunk, the whole input is redone with the fallback. No partial
    /// document is ever returned.
    #[instrument(skip(self, media), fields(media_id = %media.id))]
    pub async fn transcribe(
        &self,
        audio_path: &Path,
        media: &MediaMetadata,
    ) -> Result<TranscriptDocument> {
        let work_dir = tempfile::tempdir()?;
        let chunks = self.prepare_upload(audio_path, work_dir.path()).await?;

        let (recognizer, segments) = match self.recognize_all(self.primary.as_ref(), &chunks).await {
            Ok(segments) => (self.primary.name().to_string(), segments),
            Err(primary_err) => {
                let Some(fallback) = &self.fallback else {
                    return Err(VaaniError::Recognition(format!(
                        "{} failed: {}",
                        self.primary.name(),
                        primary_err
                    )));
                };
                warn!(
                    "{} failed ({}), retrying with {}",
                    self.primary.name(),
                    primary_err,
                    fallback.name()
                );
                match self.recognize_all(fallback.as_ref(), &chunks).await {
                    Ok(segments) => (fallback.name().to_string(), segments),
                    Err(fallback_err) => {
                        return Err(VaaniError::Recognition(format!(
                            "{} failed: {}; {} failed: {}",
                            self.primary.name(),
                            primary_err,
                            fallback.name(),
                            fallback_err
                        )));
                    }
                }
            }
        };

        validate_segments(&segments)?;

        let duration_seconds = match media.duration_seconds {
            Some(d) if d > 0.0 => d,
            _ => probe_duration(audio_path)
                .await
                .unwrap_or_else(|_| segments.last().map(|s| s.end).unwrap_or(0.0)),
        };

        info!("Transcribed {} segments with {}", segments.len(), recognizer);

        Ok(TranscriptDocument {
            media_id: media.id.clone(),
            title: media.title.clone(),
            source_url: Some(media.source_url.clone()),
            language: self.language.clone(),
            duration_seconds,
            recognizer,
            created_at: Utc::now(),
            segments,
        })
    }

    /// Compress and split the input so every upload fits the service limit.
    async fn prepare_upload(&self, audio_path: &Path, work_dir: &Path) -> Result<Vec<PathBuf>> {
        let size = std::fs::metadata(audio_path)?.len();
        if size <= self.max_upload_bytes {
            return Ok(vec![audio_path.to_path_buf()]);
        }

        info!(
            "Audio is {:.1} MiB, compressing for upload",
            size as f64 / (1024.0 * 1024.0)
        );
        let compressed = work_dir.join("compressed.mp3");
        compress_for_recognition(audio_path, &compressed).await?;

        let compressed_size = std::fs::metadata(&compressed)?.len();
        if compressed_size <= self.max_upload_bytes {
            return Ok(vec![compressed]);
        }

        info!("Still over the upload limit, splitting into chunks");
        split_audio(&compressed, &work_dir.join("chunks"), self.chunk_duration_seconds).await
    }

    /// Recognize each chunk in order and assemble one timeline.
    async fn recognize_all(
        &self,
        recognizer: &dyn SpeechRecognizer,
        chunks: &[PathBuf],
    ) -> Result<Vec<TranscriptSegment>> {
        if let [single] = chunks {
            return recognizer.recognize(single).await;
        }

        let mut durations = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            durations.push(probe_duration(chunk).await?);
        }
        let offsets = cumulative_offsets(&durations);

        let mut results = Vec::with_capacity(chunks.len());
        for (idx, chunk) in chunks.iter().enumerate() {
            info!("Recognizing chunk {}/{}", idx + 1, chunks.len());
            let segments = recognizer.recognize(chunk).await.map_err(|e| {
                VaaniError::Recognition(format!(
                    "chunk {} at {:.0}s failed: {}",
                    idx, offsets[idx], e
                ))
            })?;
            results.push(ChunkTranscript {
                offset: offsets[idx],
                duration: durations[idx],
                segments,
            });
        }

        Ok(assemble_chunks(results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio_source::SourceType;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    struct FixedRecognizer {
        name: &'static str,
        result: Option<Vec<TranscriptSegment>>,
        calls: Arc<AtomicU32>,
    }

    #[async_trait]
    impl SpeechRecognizer for FixedRecognizer {
        fn name(&self) -> &str {
            self.name
        }

        async fn recognize(&self, _audio_path: &Path) -> Result<Vec<TranscriptSegment>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result
                .clone()
                .ok_or_else(|| VaaniError::OpenAI("quota exceeded".to_string()))
        }
    }

    fn recognizer(
        name: &'static str,
        result: Option<Vec<TranscriptSegment>>,
    ) -> (Box<dyn SpeechRecognizer>, Arc<AtomicU32>) {
        let calls = Arc::new(AtomicU32::new(0));
        let boxed = Box::new(FixedRecognizer {
            name,
            result,
            calls: calls.clone(),
        });
        (boxed, calls)
    }

    fn media() -> MediaMetadata {
        MediaMetadata {
            id: "abc".to_string(),
            title: "A talk".to_string(),
            duration_seconds: Some(12.0),
            source_type: SourceType::Local,
            source_url: "/tmp/a.mp3".to_string(),
            channel: None,
        }
    }

    fn small_audio() -> tempfile::NamedTempFile {
        let file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        std::fs::write(file.path(), b"ID3 fake audio").unwrap();
        file
    }

    #[tokio::test]
    async fn test_primary_success() {
        let audio = small_audio();
        let (primary, primary_calls) = recognizer(
            "primary",
            Some(vec![
                TranscriptSegment::new(0.0, 2.5, "hello"),
                TranscriptSegment::new(3.0, 5.0, "world"),
            ]),
        );
        let (fallback, fallback_calls) = recognizer("fallback", None);

        let doc = Transcriber::new(primary, Some(fallback))
            .transcribe(audio.path(), &media())
            .await
            .unwrap();

        assert_eq!(doc.recognizer, "primary");
        assert_eq!(doc.segments.len(), 2);
        assert_eq!(doc.duration_seconds, 12.0);
        assert_eq!(doc.media_id, "abc");
        assert_eq!(primary_calls.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_on_primary_failure() {
        let audio = small_audio();
        let (primary, _) = recognizer("primary", None);
        let (fallback, fallback_calls) = recognizer(
            "fallback",
            Some(vec![TranscriptSegment::new(0.0, 30.0, "from the fallback")]),
        );

        let doc = Transcriber::new(primary, Some(fallback))
            .transcribe(audio.path(), &media())
            .await
            .unwrap();

        assert_eq!(doc.recognizer, "fallback");
        assert_eq!(doc.segments[0].text, "from the fallback");
        assert_eq!(fallback_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_both_failing_is_terminal() {
        let audio = small_audio();
        let (primary, _) = recognizer("primary", None);
        let (fallback, _) = recognizer("fallback", None);

        let err = Transcriber::new(primary, Some(fallback))
            .transcribe(audio.path(), &media())
            .await
            .unwrap_err();

        assert!(matches!(err, VaaniError::Recognition(_)));
        let msg = err.to_string();
        assert!(msg.contains("primary") && msg.contains("fallback"));
    }

    #[tokio::test]
    async fn test_invalid_segments_rejected() {
        let audio = small_audio();
        let (primary, _) = recognizer(
            "primary",
            Some(vec![
                TranscriptSegment::new(5.0, 6.0, "late"),
                TranscriptSegment::new(1.0, 2.0, "early"),
            ]),
        );

        let err = Transcriber::new(primary, None)
            .transcribe(audio.path(), &media())
            .await
            .unwrap_err();
        assert!(matches!(err, VaaniError::Recognition(_)));
    }

    #[tokio::test]
    async fn test_empty_recognition_is_valid() {
        let audio = small_audio();
        let (primary, _) = recognizer("primary", Some(Vec::new()));

        let doc = Transcriber::new(primary, None)
            .transcribe(audio.path(), &media())
            .await
            .unwrap();
        assert!(doc.segments.is_empty());
    }
}
