//! Media sources for Vaani.
//!
//! Resolves user input (a video URL or a local file) into media metadata and
//! a local audio file ready for transcription.

mod local;
mod remote;

pub use local::LocalSource;
pub use remote::RemoteSource;

use crate::error::{Result, VaaniError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Type of media source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceType {
    /// Any URL yt-dlp can fetch.
    Remote,
    Local,
}

impl std::fmt::Display for SourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceType::Remote => write!(f, "remote"),
            SourceType::Local => write!(f, "local"),
        }
    }
}

/// Metadata about a media item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Stable identifier (video id, or a slug for other media).
    pub id: String,
    pub title: String,
    /// Duration in seconds (if known).
    pub duration_seconds: Option<f64>,
    pub source_type: SourceType,
    /// URL or absolute path of the media.
    pub source_url: String,
    /// Channel or uploader name (if available).
    pub channel: Option<String>,
}

/// A provider of media metadata.
#[async_trait]
pub trait AudioSource: Send + Sync {
    fn source_type(&self) -> SourceType;

    /// Resolve metadata for `input`.
    async fn fetch_media(&self, input: &str) -> Result<MediaMetadata>;

    /// Check if this source can handle the given input.
    fn can_handle(&self, input: &str) -> bool;
}

/// Detect the appropriate audio source for the given input.
pub fn detect_source(input: &str) -> Option<Box<dyn AudioSource>> {
    let remote = RemoteSource::new();
    if remote.can_handle(input) {
        return Some(Box::new(remote));
    }

    let local = LocalSource::new();
    if local.can_handle(input) {
        return Some(Box::new(local));
    }

    None
}

/// Resolve metadata for a URL or local path.
pub async fn fetch(input: &str) -> Result<MediaMetadata> {
    let source = detect_source(input).ok_or_else(|| {
        VaaniError::Download(format!(
            "Unsupported input (expected an http(s) URL or an existing media file): {}",
            input
        ))
    })?;
    source.fetch_media(input).await
}

/// Produce a local audio file for `media` inside `output_dir`.
///
/// Remote media is downloaded; local audio files are used in place and local
/// video files have their audio track extracted.
pub async fn fetch_audio(media: &MediaMetadata, output_dir: &Path) -> Result<PathBuf> {
    match media.source_type {
        SourceType::Remote => {
            crate::audio::download_audio(&media.source_url, &media.id, output_dir).await
        }
        SourceType::Local => {
            let path = PathBuf::from(&media.source_url);
            if LocalSource::is_audio_file(&path) {
                return Ok(path);
            }
            std::fs::create_dir_all(output_dir)?;
            let dest = output_dir.join(format!("{}.mp3", media.id));
            crate::audio::compress_for_recognition(&path, &dest)
                .await
                .map_err(|e| match e {
                    VaaniError::Recognition(msg) => {
                        VaaniError::Download(format!("Audio extraction failed: {}", msg))
                    }
                    other => other,
                })?;
            Ok(dest)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_source() {
        let remote = detect_source("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(remote.source_type(), SourceType::Remote);

        let file = tempfile::Builder::new().suffix(".mp3").tempfile().unwrap();
        let local = detect_source(file.path().to_str().unwrap()).unwrap();
        assert_eq!(local.source_type(), SourceType::Local);

        assert!(detect_source("ftp://example.com/a.mp3").is_none());
        assert!(detect_source("/definitely/not/here.txt").is_none());
    }

    #[tokio::test]
    async fn test_fetch_rejects_unsupported_input() {
        let err = fetch("not a url").await.unwrap_err();
        assert!(matches!(err, VaaniError::Download(_)));
    }

    #[tokio::test]
    async fn test_fetch_audio_uses_local_audio_in_place() {
        let file = tempfile::Builder::new().suffix(".wav").tempfile().unwrap();
        let media = MediaMetadata {
            id: "clip".to_string(),
            title: "clip".to_string(),
            duration_seconds: None,
            source_type: SourceType::Local,
            source_url: file.path().to_string_lossy().to_string(),
            channel: None,
        };
        let out = tempfile::tempdir().unwrap();

        let path = fetch_audio(&media, out.path()).await.unwrap();
        assert_eq!(path, file.path());
    }
}
