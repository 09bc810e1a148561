//! Audio extraction from remote media via yt-dlp.

use crate::error::{Result, VaaniError};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument};

/// Downloads the best available audio track of `url` and saves it as MP3.
///
/// If `<media_id>.mp3` already exists in `output_dir` it is reused.
#[instrument(skip(output_dir), fields(media_id = %media_id))]
pub async fn download_audio(url: &str, media_id: &str, output_dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target_path = output_dir.join(format!("{}.mp3", media_id));

    if target_path.exists() {
        info!("Using cached audio file");
        return Ok(target_path);
    }

    info!("Downloading audio from {}", url);

    let template = output_dir.join(format!("{}.%(ext)s", media_id));

    let result = Command::new("yt-dlp")
        .arg("--format").arg("bestaudio/best")
        .arg("--extract-audio")
        .arg("--audio-format").arg("mp3")
        .arg("--audio-quality").arg("0")
        .arg("--output").arg(&template)
        .arg("--no-playlist")
        .arg("--quiet")
        .arg("--no-warnings")
        .arg(url)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VaaniError::ToolNotFound("yt-dlp".into()));
        }
        Err(e) => {
            return Err(VaaniError::Download(format!("yt-dlp execution failed: {e}")));
        }
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(VaaniError::Download(format!("yt-dlp failed: {}", stderr.trim())));
    }

    let downloaded = find_audio_file(output_dir, media_id)?;

    if downloaded != target_path {
        normalize_to_mp3(&downloaded, &target_path).await?;
        let _ = std::fs::remove_file(&downloaded);
    }

    Ok(target_path)
}

/// Locates a downloaded audio file by media ID.
fn find_audio_file(dir: &Path, media_id: &str) -> Result<PathBuf> {
    for ext in &["mp3", "opus", "m4a", "webm", "ogg", "flac", "wav"] {
        let candidate = dir.join(format!("{}.{}", media_id, ext));
        if candidate.exists() {
            return Ok(candidate);
        }
    }

    let entries = std::fs::read_dir(dir)
        .map_err(|e| VaaniError::Download(format!("Cannot read directory: {e}")))?;

    for entry in entries.flatten() {
        let name = entry.file_name();
        if name.to_string_lossy().starts_with(media_id) {
            return Ok(entry.path());
        }
    }

    Err(VaaniError::Download("Audio file not found after download".into()))
}

/// Converts an audio file to MP3 using ffmpeg.
async fn normalize_to_mp3(source: &Path, dest: &Path) -> Result<()> {
    debug!("Converting {:?} to MP3", source);

    let result = Command::new("ffmpeg")
        .arg("-i").arg(source)
        .arg("-vn")
        .arg("-codec:a").arg("libmp3lame")
        .arg("-qscale:a").arg("2")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .arg(dest)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(VaaniError::Download(format!("ffmpeg conversion failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VaaniError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(VaaniError::Download(format!("ffmpeg error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_audio_file_prefers_known_extensions() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc123.m4a"), b"x").unwrap();
        std::fs::write(dir.path().join("abc123.part.tmp"), b"x").unwrap();

        let found = find_audio_file(dir.path(), "abc123").unwrap();
        assert_eq!(found, dir.path().join("abc123.m4a"));
    }

    #[test]
    fn test_find_audio_file_scans_prefix() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("abc123.mka"), b"x").unwrap();

        let found = find_audio_file(dir.path(), "abc123").unwrap();
        assert_eq!(found, dir.path().join("abc123.mka"));
    }

    #[test]
    fn test_find_audio_file_missing() {
        let dir = tempfile::tempdir().unwrap();
        let err = find_audio_file(dir.path(), "nothing").unwrap_err();
        assert!(matches!(err, VaaniError::Download(_)));
    }
}
