//! Transcription module for Vaani.
//!
//! Turns a local audio file into a time-aligned [`TranscriptDocument`].
//!
//! # Recognizers
//!
//! - **Whisper** (primary): word-level timestamps, grouped into utterances by
//!   pause detection in [`Segmenter`].
//! - **Chunked model** (fallback): a hosted audio model that returns plain
//!   text; audio is cut into short windows, one segment per window.

mod chunks;
mod fallback;
mod format;
mod models;
mod segmenter;
mod transcriber;
mod whisper;

pub use chunks::{assemble_chunks, cumulative_offsets, ChunkTranscript};
pub use fallback::ChunkedModelRecognizer;
pub use format::{format_transcript, format_translation, OutputFormat};
pub use models::{
    format_timestamp, validate_segments, TimedWord, TranscriptDocument, TranscriptSegment,
};
pub use segmenter::{normalize, SegmentationConfig, Segmenter};
pub use transcriber::Transcriber;
pub use whisper::WhisperRecognizer;

use crate::error::Result;
use async_trait::async_trait;
use std::path::Path;

/// A speech recognition service.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Name recorded in the transcript document.
    fn name(&self) -> &str;

    /// Recognize one audio file that fits the service's upload limit.
    ///
    /// Returned segments are relative to the start of the file.
    async fn recognize(&self, audio_path: &Path) -> Result<Vec<TranscriptSegment>>;
}
