//! ffmpeg/ffprobe wrappers: probing, compression, splitting, silence and concatenation.

use crate::error::{Result, VaaniError};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Sample rate of generated silence; matches the synthesis service's MP3 output.
const SILENCE_SAMPLE_RATE: u32 = 24_000;

/// Runs ffmpeg with `args`, mapping failures through `on_error`.
async fn run_ffmpeg<I, S>(args: I, on_error: fn(String) -> VaaniError) -> Result<()>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let result = Command::new("ffmpeg")
        .arg("-y")
        .arg("-loglevel").arg("error")
        .args(args)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await;

    match result {
        Ok(out) if out.status.success() => Ok(()),
        Ok(out) => {
            let err = String::from_utf8_lossy(&out.stderr);
            Err(on_error(format!("ffmpeg failed: {}", err.trim())))
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VaaniError::ToolNotFound("ffmpeg".into()))
        }
        Err(e) => Err(on_error(format!("ffmpeg error: {e}"))),
    }
}

/// Queries the duration of an audio file using ffprobe with JSON output.
pub async fn probe_duration(path: &Path) -> Result<f64> {
    let result = Command::new("ffprobe")
        .arg("-v").arg("quiet")
        .arg("-print_format").arg("json")
        .arg("-show_format")
        .arg(path)
        .output()
        .await;

    let output = match result {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(VaaniError::ToolNotFound("ffprobe".into()));
        }
        Err(e) => {
            return Err(VaaniError::ToolFailed(format!("ffprobe failed: {e}")));
        }
    };

    if !output.status.success() {
        return Err(VaaniError::ToolFailed(format!(
            "ffprobe could not read {}",
            path.display()
        )));
    }

    let json_str = String::from_utf8_lossy(&output.stdout);
    parse_ffprobe_duration(&json_str)
}

fn parse_ffprobe_duration(json_str: &str) -> Result<f64> {
    let parsed: serde_json::Value = serde_json::from_str(json_str)
        .map_err(|_| VaaniError::ToolFailed("Invalid ffprobe output".into()))?;

    parsed["format"]["duration"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| VaaniError::ToolFailed("Could not determine audio duration".into()))
}

/// Re-encodes audio as mono 16 kHz low-bitrate MP3, which is plenty for speech.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn compress_for_recognition(source: &Path, dest: &Path) -> Result<()> {
    debug!("Compressing audio for recognition");
    run_ffmpeg(
        [
            OsStr::new("-i"), source.as_os_str(),
            OsStr::new("-vn"),
            OsStr::new("-ac"), OsStr::new("1"),
            OsStr::new("-ar"), OsStr::new("16000"),
            OsStr::new("-codec:a"), OsStr::new("libmp3lame"),
            OsStr::new("-b:a"), OsStr::new("32k"),
            dest.as_os_str(),
        ],
        VaaniError::Recognition,
    )
    .await
}

/// Splits a long audio file into sequential chunks of about `chunk_seconds`.
///
/// Returns the chunk paths in playback order. Audio no longer than one chunk
/// comes back as a single entry pointing at `source`.
#[instrument(skip_all, fields(source = %source.display()))]
pub async fn split_audio(
    source: &Path,
    output_dir: &Path,
    chunk_seconds: u32,
) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(output_dir)?;

    let total_duration = probe_duration(source).await?;
    info!("Total audio duration: {:.1}s", total_duration);

    let chunk_len = chunk_seconds.max(1) as f64;

    if total_duration <= chunk_len {
        return Ok(vec![source.to_path_buf()]);
    }

    let base_name = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("audio");

    let mut chunks = Vec::new();
    let mut offset = 0.0;
    let mut idx = 0u32;

    while offset < total_duration {
        let chunk_path = output_dir.join(format!("{}_{:04}.mp3", base_name, idx));
        let length = chunk_len.min(total_duration - offset);

        extract_segment(source, &chunk_path, offset, length).await?;

        debug!("Created chunk {} at offset {:.1}s", idx, offset);
        chunks.push(chunk_path);

        offset += chunk_len;
        idx += 1;
    }

    info!("Created {} audio chunks", chunks.len());
    Ok(chunks)
}

/// Extracts a time window from an audio file.
async fn extract_segment(source: &Path, dest: &Path, start: f64, length: f64) -> Result<()> {
    let start = format!("{:.3}", start);
    let length = format!("{:.3}", length);

    let copied = run_ffmpeg(
        [
            OsStr::new("-ss"), OsStr::new(&start),
            OsStr::new("-i"), source.as_os_str(),
            OsStr::new("-t"), OsStr::new(&length),
            OsStr::new("-c"), OsStr::new("copy"),
            dest.as_os_str(),
        ],
        VaaniError::ToolFailed,
    )
    .await;

    match copied {
        Ok(()) if dest.exists() => return Ok(()),
        Err(VaaniError::ToolNotFound(tool)) => return Err(VaaniError::ToolNotFound(tool)),
        _ => warn!("Stream copy failed, re-encoding chunk"),
    }

    run_ffmpeg(
        [
            OsStr::new("-ss"), OsStr::new(&start),
            OsStr::new("-i"), source.as_os_str(),
            OsStr::new("-t"), OsStr::new(&length),
            OsStr::new("-codec:a"), OsStr::new("libmp3lame"),
            OsStr::new("-qscale:a"), OsStr::new("2"),
            dest.as_os_str(),
        ],
        VaaniError::ToolFailed,
    )
    .await
}

/// Writes `seconds` of mono silence as MP3.
pub async fn generate_silence(dest: &Path, seconds: f64) -> Result<()> {
    let source = format!("anullsrc=r={}:cl=mono", SILENCE_SAMPLE_RATE);
    let duration = format!("{:.3}", seconds.max(0.0));

    run_ffmpeg(
        [
            OsStr::new("-f"), OsStr::new("lavfi"),
            OsStr::new("-i"), OsStr::new(&source),
            OsStr::new("-t"), OsStr::new(&duration),
            OsStr::new("-codec:a"), OsStr::new("libmp3lame"),
            OsStr::new("-qscale:a"), OsStr::new("9"),
            dest.as_os_str(),
        ],
        VaaniError::Synthesis,
    )
    .await
}

/// Concatenates clips in order into one MP3 at `dest`.
#[instrument(skip_all, fields(clips = clips.len()))]
pub async fn concat_clips(clips: &[PathBuf], dest: &Path) -> Result<()> {
    if clips.is_empty() {
        return Err(VaaniError::Synthesis("No clips to concatenate".into()));
    }

    let list_file = tempfile::Builder::new()
        .prefix("concat_")
        .suffix(".txt")
        .tempfile()?;
    std::fs::write(list_file.path(), concat_list(clips))?;

    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }

    run_ffmpeg(
        [
            OsStr::new("-f"), OsStr::new("concat"),
            OsStr::new("-safe"), OsStr::new("0"),
            OsStr::new("-i"), list_file.path().as_os_str(),
            OsStr::new("-ar"), OsStr::new("24000"),
            OsStr::new("-ac"), OsStr::new("1"),
            OsStr::new("-codec:a"), OsStr::new("libmp3lame"),
            OsStr::new("-qscale:a"), OsStr::new("4"),
            dest.as_os_str(),
        ],
        VaaniError::Synthesis,
    )
    .await
}

/// Builds an ffmpeg concat-demuxer list.
fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|p| format!("file '{}'\n", p.display().to_string().replace('\'', "'\\''")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ffprobe_duration() {
        let json = r#"{"format": {"filename": "a.mp3", "duration": "12.345000"}}"#;
        assert!((parse_ffprobe_duration(json).unwrap() - 12.345).abs() < 1e-9);
    }

    #[test]
    fn test_parse_ffprobe_duration_missing() {
        assert!(parse_ffprobe_duration(r#"{"format": {}}"#).is_err());
        assert!(parse_ffprobe_duration("not json").is_err());
    }

    #[test]
    fn test_concat_list_escapes_quotes() {
        let clips = vec![PathBuf::from("/tmp/a.mp3"), PathBuf::from("/tmp/it's.mp3")];
        let list = concat_list(&clips);
        assert_eq!(list, "file '/tmp/a.mp3'\nfile '/tmp/it'\\''s.mp3'\n");
    }

    #[tokio::test]
    async fn test_concat_rejects_empty() {
        let dir = tempfile::tempdir().unwrap();
        let err = concat_clips(&[], &dir.path().join("out.mp3")).await.unwrap_err();
        assert!(matches!(err, VaaniError::Synthesis(_)));
    }
}
