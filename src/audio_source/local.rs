//! Local file source implementation.
//!
//! Supports both audio and video files.

use super::{AudioSource, MediaMetadata, SourceType};
use crate::audio::probe_duration;
use crate::error::{Result, VaaniError};
use crate::store::slugify;
use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

/// Supported audio file extensions.
const AUDIO_EXTENSIONS: &[&str] = &[
    "mp3", "wav", "flac", "aac", "ogg", "opus", "m4a", "wma", "aiff",
];

/// Supported video file extensions (audio will be extracted).
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "webm", "flv", "wmv", "m4v", "mpeg", "mpg", "3gp",
];

fn has_extension(path: &Path, known: &[&str]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| known.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Local audio or video file.
pub struct LocalSource;

impl LocalSource {
    pub fn new() -> Self {
        Self
    }

    pub fn is_audio_file(path: &Path) -> bool {
        has_extension(path, AUDIO_EXTENSIONS)
    }

    pub fn is_video_file(path: &Path) -> bool {
        has_extension(path, VIDEO_EXTENSIONS)
    }

    fn is_media_file(path: &Path) -> bool {
        Self::is_audio_file(path) || Self::is_video_file(path)
    }
}

impl Default for LocalSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSource for LocalSource {
    fn source_type(&self) -> SourceType {
        SourceType::Local
    }

    async fn fetch_media(&self, input: &str) -> Result<MediaMetadata> {
        let path = Path::new(input);

        if !path.is_file() {
            return Err(VaaniError::Download(format!("File not found: {}", input)));
        }

        if !Self::is_media_file(path) {
            return Err(VaaniError::InvalidInput(format!(
                "Not a recognized audio or video file: {}",
                input
            )));
        }

        // Duration is informational; a failed probe is not fatal here.
        let duration = match probe_duration(path).await {
            Ok(d) => Some(d),
            Err(e) => {
                debug!("Could not probe {}: {}", input, e);
                None
            }
        };

        let title = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown")
            .to_string();

        let absolute = path
            .canonicalize()
            .unwrap_or_else(|_| path.to_path_buf());

        Ok(MediaMetadata {
            id: slugify(&title),
            title,
            duration_seconds: duration,
            source_type: SourceType::Local,
            source_url: absolute.to_string_lossy().to_string(),
            channel: None,
        })
    }

    fn can_handle(&self, input: &str) -> bool {
        let path = Path::new(input);
        path.is_file() && Self::is_media_file(path)
    }
}
