//! Data models for transcription.

use crate::error::{Result, VaaniError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single recognized word with timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedWord {
    /// The word text.
    pub word: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
}

impl TimedWord {
    pub fn new(word: impl Into<String>, start: f64, end: f64) -> Self {
        Self {
            word: word.into(),
            start,
            end,
        }
    }
}

/// A time-bounded span of transcript text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Transcribed text content.
    pub text: String,
}

impl TranscriptSegment {
    /// Create a new transcript segment.
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    /// Duration of this segment in seconds.
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// The output of one transcription run.
///
/// Written once; a later run for the same media supersedes the file rather
/// than editing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptDocument {
    /// Media identifier (video id or file stem).
    pub media_id: String,
    /// Human-readable title of the media.
    pub title: String,
    /// Where the media came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    /// Spoken language (ISO 639-1).
    pub language: String,
    /// Total duration in seconds.
    pub duration_seconds: f64,
    /// Name of the recognizer that produced the segments.
    pub recognizer: String,
    pub created_at: DateTime<Utc>,
    /// Segments ordered by start time.
    pub segments: Vec<TranscriptSegment>,
}

impl TranscriptDocument {
    /// Full transcript text (concatenated segments).
    pub fn full_text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Format the transcript with timestamps for display.
    pub fn format_with_timestamps(&self) -> String {
        self.segments
            .iter()
            .map(|s| {
                format!(
                    "[{} - {}] {}",
                    format_timestamp(s.start),
                    format_timestamp(s.end),
                    s.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Checks that every segment has `start < end` and that starts never decrease.
pub fn validate_segments(segments: &[TranscriptSegment]) -> Result<()> {
    let mut previous_start = f64::NEG_INFINITY;

    for (i, segment) in segments.iter().enumerate() {
        if !segment.start.is_finite() || !segment.end.is_finite() {
            return Err(VaaniError::Recognition(format!(
                "segment {} has a non-finite timestamp",
                i
            )));
        }
        if segment.start >= segment.end {
            return Err(VaaniError::Recognition(format!(
                "segment {} has start {:.3} >= end {:.3}",
                i, segment.start, segment.end
            )));
        }
        if segment.start < previous_start {
            return Err(VaaniError::Recognition(format!(
                "segment {} starts before segment {}",
                i,
                i - 1
            )));
        }
        previous_start = segment.start;
    }

    Ok(())
}

/// Format seconds as MM:SS or HH:MM:SS.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = seconds as u32;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let secs = total_seconds % 60;

    if hours > 0 {
        format!("{:02}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{:02}:{:02}", minutes, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn document(segments: Vec<TranscriptSegment>) -> TranscriptDocument {
        TranscriptDocument {
            media_id: "test_video".to_string(),
            title: "Test".to_string(),
            source_url: None,
            language: "en".to_string(),
            duration_seconds: 10.0,
            recognizer: "test".to_string(),
            created_at: Utc::now(),
            segments,
        }
    }

    #[test]
    fn test_full_text() {
        let doc = document(vec![
            TranscriptSegment::new(0.0, 5.0, "Hello world"),
            TranscriptSegment::new(5.0, 10.0, "This is a test"),
        ]);
        assert_eq!(doc.full_text(), "Hello world This is a test");
        assert_eq!(
            doc.format_with_timestamps(),
            "[00:00 - 00:05] Hello world\n[00:05 - 00:10] This is a test"
        );
    }

    #[test]
    fn test_format_timestamp() {
        assert_eq!(format_timestamp(0.0), "00:00");
        assert_eq!(format_timestamp(65.0), "01:05");
        assert_eq!(format_timestamp(3665.0), "01:01:05");
    }

    #[test]
    fn test_validate_accepts_ordered() {
        let segments = vec![
            TranscriptSegment::new(0.0, 1.0, "a"),
            TranscriptSegment::new(1.0, 2.0, "b"),
            TranscriptSegment::new(1.0, 3.0, "c"),
        ];
        assert!(validate_segments(&segments).is_ok());
    }

    #[test]
    fn test_validate_rejects_inverted_and_unsorted() {
        assert!(validate_segments(&[TranscriptSegment::new(2.0, 2.0, "a")]).is_err());
        assert!(validate_segments(&[
            TranscriptSegment::new(3.0, 4.0, "a"),
            TranscriptSegment::new(1.0, 2.0, "b"),
        ])
        .is_err());
        assert!(validate_segments(&[TranscriptSegment::new(f64::NAN, 1.0, "a")]).is_err());
    }

    #[test]
    fn test_document_json_shape() {
        let doc = document(vec![TranscriptSegment::new(0.0, 2.5, "hello")]);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["segments"][0]["start"], 0.0);
        assert_eq!(json["segments"][0]["end"], 2.5);
        assert_eq!(json["segments"][0]["text"], "hello");
        assert!(json.get("source_url").is_none());
    }
}
