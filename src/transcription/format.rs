//! Transcript and translation export (JSON, SRT, WebVTT).

use super::TranscriptDocument;
use crate::translation::TranslatedDocument;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputFormat {
    Json,
    Srt,
    Vtt,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(OutputFormat::Json),
            "srt" => Ok(OutputFormat::Srt),
            "vtt" | "webvtt" => Ok(OutputFormat::Vtt),
            _ => Err(format!("Unknown format: {}. Use json, srt, or vtt.", s)),
        }
    }
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Srt => "srt",
            OutputFormat::Vtt => "vtt",
        }
    }
}

/// One timed subtitle entry.
struct Cue<'a> {
    start: f64,
    end: f64,
    lines: Vec<&'a str>,
}

/// Format a transcript for output.
pub fn format_transcript(doc: &TranscriptDocument, format: OutputFormat) -> String {
    let cues = doc
        .segments
        .iter()
        .map(|s| Cue {
            start: s.start,
            end: s.end,
            lines: vec![s.text.as_str()],
        })
        .collect::<Vec<_>>();

    match format {
        OutputFormat::Json => to_json(doc),
        OutputFormat::Srt => format_srt(&cues),
        OutputFormat::Vtt => format_vtt(&cues),
    }
}

/// Format a translation for output, optionally with the original line under
/// each translated line.
pub fn format_translation(
    doc: &TranslatedDocument,
    format: OutputFormat,
    include_original: bool,
) -> String {
    let cues = doc
        .segments
        .iter()
        .map(|s| {
            let mut lines = vec![s.translated_text.as_str()];
            if include_original {
                lines.push(s.original_text.as_str());
            }
            Cue {
                start: s.start,
                end: s.end,
                lines,
            }
        })
        .collect::<Vec<_>>();

    match format {
        OutputFormat::Json => to_json(doc),
        OutputFormat::Srt => format_srt(&cues),
        OutputFormat::Vtt => format_vtt(&cues),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
}

/// Format as SRT (SubRip).
fn format_srt(cues: &[Cue]) -> String {
    let mut output = String::new();

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_clock(cue.start, ','),
            format_clock(cue.end, ',')
        ));
        output.push_str(&cue.lines.join("\n"));
        output.push_str("\n\n");
    }

    output
}

/// Format as WebVTT.
fn format_vtt(cues: &[Cue]) -> String {
    let mut output = String::from("WEBVTT\n\n");

    for (i, cue) in cues.iter().enumerate() {
        output.push_str(&format!("{}\n", i + 1));
        output.push_str(&format!(
            "{} --> {}\n",
            format_clock(cue.start, '.'),
            format_clock(cue.end, '.')
        ));
        output.push_str(&cue.lines.join("\n"));
        output.push_str("\n\n");
    }

    output
}

/// `HH:MM:SS<sep>mmm`, the subtitle clock format.
fn format_clock(seconds: f64, separator: char) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let ms = total_ms % 1000;

    format!("{:02}:{:02}:{:02}{}{:03}", hours, minutes, secs, separator, ms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::Language;
    use crate::transcription::TranscriptSegment;
    use crate::translation::TranslatedSegment;
    use chrono::Utc;

    fn sample_transcript() -> TranscriptDocument {
        TranscriptDocument {
            media_id: "test123".to_string(),
            title: "Sample".to_string(),
            source_url: None,
            language: "en".to_string(),
            duration_seconds: 5.0,
            recognizer: "whisper-1".to_string(),
            created_at: Utc::now(),
            segments: vec![
                TranscriptSegment::new(0.0, 2.5, "Hello world."),
                TranscriptSegment::new(2.5, 5.0, "This is a test."),
            ],
        }
    }

    fn sample_translation() -> TranslatedDocument {
        TranslatedDocument {
            media_id: "test123".to_string(),
            title: "Sample".to_string(),
            source_language: "en".to_string(),
            target_language: Language::Hindi,
            created_at: Utc::now(),
            segments: vec![TranslatedSegment {
                start: 0.0,
                end: 2.5,
                original_text: "Hello world.".to_string(),
                translated_text: "नमस्ते दुनिया।".to_string(),
            }],
        }
    }

    #[test]
    fn test_format_json() {
        let json = format_transcript(&sample_transcript(), OutputFormat::Json);
        assert!(json.contains("\"media_id\": \"test123\""));
        assert!(json.contains("Hello world."));
    }

    #[test]
    fn test_format_srt() {
        let srt = format_transcript(&sample_transcript(), OutputFormat::Srt);
        assert!(srt.contains("1\n00:00:00,000 --> 00:00:02,500\nHello world.\n\n"));
        assert!(srt.contains("2\n00:00:02,500 --> 00:00:05,000"));
    }

    #[test]
    fn test_format_vtt() {
        let vtt = format_transcript(&sample_transcript(), OutputFormat::Vtt);
        assert!(vtt.starts_with("WEBVTT"));
        assert!(vtt.contains("00:00:00.000 --> 00:00:02.500"));
    }

    #[test]
    fn test_translation_with_original() {
        let doc = sample_translation();
        let srt = format_translation(&doc, OutputFormat::Srt, true);
        assert!(srt.contains("नमस्ते दुनिया।\nHello world.\n\n"));

        let plain = format_translation(&doc, OutputFormat::Vtt, false);
        assert!(!plain.contains("Hello world."));

        let json = format_translation(&doc, OutputFormat::Json, false);
        assert!(json.contains("\"target_language\": \"hindi\""));
    }

    #[test]
    fn test_parse_format() {
        assert_eq!("json".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("SRT".parse::<OutputFormat>().unwrap(), OutputFormat::Srt);
        assert_eq!("webvtt".parse::<OutputFormat>().unwrap(), OutputFormat::Vtt);
        assert!("docx".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_clock() {
        assert_eq!(format_clock(0.0, ','), "00:00:00,000");
        assert_eq!(format_clock(61.5, ','), "00:01:01,500");
        assert_eq!(format_clock(3661.123, '.'), "01:01:01.123");
    }
}
