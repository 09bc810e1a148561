//! Primary recognizer: OpenAI Whisper with word-level timestamps.

use super::models::{TimedWord, TranscriptSegment};
use super::segmenter::Segmenter;
use super::SpeechRecognizer;
use crate::error::{Result, VaaniError};
use crate::openai::{create_client, OpenAIClient};
use async_openai::types::{
    AudioInput, AudioResponseFormat, CreateTranscriptionRequestArgs,
    CreateTranscriptionResponseVerboseJson, TimestampGranularity,
};
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, instrument, warn};

/// OpenAI Whisper-based recognizer.
pub struct WhisperRecognizer {
    client: OpenAIClient,
    model: String,
    language: Option<String>,
    segmenter: Segmenter,
}

impl WhisperRecognizer {
    /// Create a recognizer for `model` using the given segmenter.
    pub fn new(model: &str, language: Option<&str>, segmenter: Segmenter) -> Result<Self> {
        Ok(Self {
            client: create_client()?,
            model: model.to_string(),
            language: language.map(|s| s.to_string()),
            segmenter,
        })
    }

    /// Request word-level timestamps for a single file.
    #[instrument(skip(self), fields(audio_path = %audio_path.display()))]
    async fn recognize_words(&self, audio_path: &Path) -> Result<Vec<TimedWord>> {
        debug!("Transcribing audio file with word-level timestamps");

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
            .response_format(AudioResponseFormat::VerboseJson)
            .timestamp_granularities(vec![TimestampGranularity::Word]);

        if let Some(lang) = &self.language {
            request_builder.language(lang);
        }

        let request = request_builder.build().map_err(|e| {
            VaaniError::Recognition(format!("Failed to build request: {}", e))
        })?;

        let response = self
            .client
            .audio()
            .transcribe_verbose_json(request)
            .await
            .map_err(|e| VaaniError::OpenAI(format!("Whisper API error: {}", e)))?;

        let words = words_from_response(response);
        debug!("Transcribed {} words", words.len());
        Ok(words)
    }
}

/// Extract timed words, approximating them from segments when the service
/// returned none.
fn words_from_response(response: CreateTranscriptionResponseVerboseJson) -> Vec<TimedWord> {
    if let Some(words) = response.words.filter(|w| !w.is_empty()) {
        let words = words
            .into_iter()
            .map(|w| TimedWord::new(w.word, w.start as f64, w.end as f64))
            .collect();
        return punctuate_words(words, &response.text);
    }

    warn!("No word-level timestamps returned, falling back to segment-level");

    match response.segments {
        Some(segments) if !segments.is_empty() => segments
            .iter()
            .flat_map(|s| spread_words(&s.text, s.start as f64, s.end as f64))
            .collect(),
        _ => spread_words(&response.text, 0.0, response.duration as f64),
    }
}

/// How far ahead in the text a timed word is looked up before it is left as is.
const ALIGN_LOOKAHEAD: usize = 3;

/// Word timestamps come back without punctuation; the full text has it.
/// Replaces each timed word with the matching token from `text`, so sentence
/// ends survive into segmentation.
fn punctuate_words(mut words: Vec<TimedWord>, text: &str) -> Vec<TimedWord> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let mut cursor = 0;

    for word in &mut words {
        let key = bare(&word.word);
        if key.is_empty() {
            continue;
        }
        let window = cursor..tokens.len().min(cursor + ALIGN_LOOKAHEAD);
        if let Some(i) = window.into_iter().find(|&i| bare(tokens[i]) == key) {
            word.word = tokens[i].to_string();
            cursor = i + 1;
        }
    }

    words
}

/// Lowercased word with surrounding punctuation removed.
fn bare(word: &str) -> String {
    word.trim_matches(|c: char| {
        c.is_ascii_punctuation() || matches!(c, '।' | '॥' | '“' | '”' | '‘' | '’' | '…' | '¿' | '¡')
    })
    .to_lowercase()
}

/// Evenly distributes the words of `text` over `[start, end]`.
fn spread_words(text: &str, start: f64, end: f64) -> Vec<TimedWord> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let word_duration = (end - start).max(0.0) / words.len() as f64;
    words
        .into_iter()
        .enumerate()
        .map(|(i, word)| {
            TimedWord::new(
                word,
                start + i as f64 * word_duration,
                start + (i + 1) as f64 * word_duration,
            )
        })
        .collect()
}

#[async_trait]
impl SpeechRecognizer for WhisperRecognizer {
    fn name(&self) -> &str {
        &self.model
    }

    async fn recognize(&self, audio_path: &Path) -> Result<Vec<TranscriptSegment>> {
        let words = self.recognize_words(audio_path).await?;
        Ok(self.segmenter.segment(&words))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spread_words() {
        let words = spread_words("one two three four", 10.0, 12.0);
        assert_eq!(words.len(), 4);
        assert_eq!(words[0].start, 10.0);
        assert!((words[1].start - 10.5).abs() < 1e-9);
        assert!((words[3].end - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_spread_words_empty() {
        assert!(spread_words("   ", 0.0, 1.0).is_empty());
    }

    #[test]
    fn test_words_from_response_prefers_word_timestamps() {
        let response: CreateTranscriptionResponseVerboseJson = serde_json::from_value(
            serde_json::json!({
                "language": "english",
                "duration": 2.0,
                "text": "hello there",
                "words": [
                    {"word": "hello", "start": 0.0, "end": 0.5},
                    {"word": "there", "start": 0.6, "end": 1.0}
                ]
            }),
        )
        .unwrap();

        let words = words_from_response(response);
        assert_eq!(words.len(), 2);
        assert_eq!(words[1].word, "there");
    }

    #[test]
    fn test_punctuation_restored_from_text() {
        let text = "Welcome to this lecture on the monsoon. Today we will study rainfall.";
        let words: Vec<_> = text
            .split_whitespace()
            .enumerate()
            .map(|(i, w)| {
                serde_json::json!({
                    "word": w.trim_end_matches('.'),
                    "start": i as f64 * 0.4,
                    "end": i as f64 * 0.4 + 0.35
                })
            })
            .collect();
        let response: CreateTranscriptionResponseVerboseJson = serde_json::from_value(
            serde_json::json!({
                "language": "english",
                "duration": 5.0,
                "text": text,
                "words": words
            }),
        )
        .unwrap();

        let segments = Segmenter::default().segment(&words_from_response(response));
        let texts: Vec<&str> = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(
            texts,
            vec![
                "Welcome to this lecture on the monsoon.",
                "Today we will study rainfall."
            ]
        );
    }

    #[test]
    fn test_punctuate_words_skips_unmatched() {
        let words = vec![
            TimedWord::new("well", 0.0, 0.2),
            TimedWord::new("known", 0.2, 0.4),
            TimedWord::new("fact", 0.4, 0.6),
        ];
        let words = punctuate_words(words, "A well-known fact!");
        let texts: Vec<&str> = words.iter().map(|w| w.word.as_str()).collect();
        assert_eq!(texts, vec!["well", "known", "fact!"]);
    }

    #[test]
    fn test_punctuate_words_hindi_danda() {
        let words = vec![
            TimedWord::new("बारिश", 0.0, 0.5),
            TimedWord::new("हुई", 0.5, 1.0),
        ];
        let words = punctuate_words(words, "बारिश हुई।");
        assert_eq!(words[1].word, "हुई।");
    }

    #[test]
    fn test_words_from_response_falls_back_to_text() {
        let response: CreateTranscriptionResponseVerboseJson = serde_json::from_value(
            serde_json::json!({
                "language": "english",
                "duration": 4.0,
                "text": "a b"
            }),
        )
        .unwrap();

        let words = words_from_response(response);
        assert_eq!(words.len(), 2);
        assert!((words[1].start - 2.0).abs() < 1e-9);
    }
}
