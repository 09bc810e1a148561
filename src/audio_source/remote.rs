//! Remote media via yt-dlp.

use super::{AudioSource, MediaMetadata, SourceType};
use crate::error::{Result, VaaniError};
use crate::store::slugify;
use async_trait::async_trait;
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;
use url::Url;

fn youtube_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?:youtube\.com/watch\?(?:.*&)?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)([a-zA-Z0-9_-]{11})",
        )
        .expect("youtube id pattern is valid")
    })
}

/// Media reachable over http(s) and supported by yt-dlp.
pub struct RemoteSource;

impl RemoteSource {
    pub fn new() -> Self {
        Self
    }

    /// Extract the 11-character YouTube video id, if `input` is a YouTube URL.
    pub fn youtube_id(input: &str) -> Option<String> {
        youtube_id_regex()
            .captures(input.trim())
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    }

    /// Build metadata from yt-dlp's `--dump-json` output.
    fn parse_metadata(url: &str, json: &serde_json::Value) -> MediaMetadata {
        let title = json["title"]
            .as_str()
            .unwrap_or("Unknown Title")
            .to_string();

        let id = Self::youtube_id(url).unwrap_or_else(|| slugify(&title));

        MediaMetadata {
            id,
            title,
            duration_seconds: json["duration"].as_f64(),
            source_type: SourceType::Remote,
            source_url: url.to_string(),
            channel: json["channel"]
                .as_str()
                .or_else(|| json["uploader"].as_str())
                .map(|s| s.to_string()),
        }
    }
}

impl Default for RemoteSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioSource for RemoteSource {
    fn source_type(&self) -> SourceType {
        SourceType::Remote
    }

    async fn fetch_media(&self, input: &str) -> Result<MediaMetadata> {
        let url = input.trim();
        if !self.can_handle(url) {
            return Err(VaaniError::Download(format!("Unsupported URL: {}", url)));
        }

        debug!("Fetching metadata for {}", url);

        let output = tokio::process::Command::new("yt-dlp")
            .args([
                "--dump-json",
                "--no-download",
                "--no-playlist",
                "--no-warnings",
                url,
            ])
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    VaaniError::ToolNotFound("yt-dlp".to_string())
                } else {
                    VaaniError::Download(format!("Failed to run yt-dlp: {}", e))
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VaaniError::Download(format!(
                "Media unavailable at {}: {}",
                url,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        // playlists print one object per line; the first entry is the media
        let first = stdout.lines().find(|l| !l.trim().is_empty()).unwrap_or("");
        let json: serde_json::Value = serde_json::from_str(first).map_err(|e| {
            VaaniError::Download(format!("Failed to parse yt-dlp output: {}", e))
        })?;

        Ok(Self::parse_metadata(url, &json))
    }

    fn can_handle(&self, input: &str) -> bool {
        Url::parse(input.trim())
            .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some())
            .unwrap_or(false)
    }
}
