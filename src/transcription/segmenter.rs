//! Pause-based segmentation of word-level recognition output.

use super::models::{TimedWord, TranscriptSegment};
use serde::{Deserialize, Serialize};

/// Smallest span given to a segment whose end does not exceed its start.
pub(crate) const MIN_SEGMENT_SPAN: f64 = 0.05;

/// Characters that end a sentence (Latin punctuation and the Devanagari danda).
const SENTENCE_TERMINATORS: [char; 4] = ['.', '?', '!', '।'];

/// Thresholds controlling how words are grouped into segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    /// A silence longer than this starts a new segment.
    pub pause_threshold_seconds: f64,
    /// Minimum text length before sentence punctuation closes a segment.
    pub sentence_min_chars: usize,
    /// Segments shorter than this are merged into their successor.
    pub min_segment_seconds: f64,
    /// Largest gap bridged when merging a short segment.
    pub max_merge_gap_seconds: f64,
    /// Upper bound on a segment's span.
    pub max_segment_seconds: f64,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            pause_threshold_seconds: 1.0,
            sentence_min_chars: 30,
            min_segment_seconds: 1.5,
            max_merge_gap_seconds: 2.0,
            max_segment_seconds: 30.0,
        }
    }
}

/// Groups timed words into utterance segments.
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmentationConfig,
}

struct OpenSegment {
    start: f64,
    end: f64,
    text: String,
}

impl OpenSegment {
    fn close(self) -> TranscriptSegment {
        TranscriptSegment::new(self.start, self.end, self.text)
    }
}

impl Segmenter {
    pub fn new(config: SegmentationConfig) -> Self {
        Self { config }
    }

    /// Segments `words`, returning segments sorted by start with `start < end`.
    pub fn segment(&self, words: &[TimedWord]) -> Vec<TranscriptSegment> {
        let split = self.split_on_pauses(words);
        let merged = self.merge_short(split);
        normalize(merged)
    }

    fn split_on_pauses(&self, words: &[TimedWord]) -> Vec<TranscriptSegment> {
        let mut segments = Vec::new();
        let mut current: Option<OpenSegment> = None;

        for word in words {
            let token = word.word.trim();
            if token.is_empty() {
                continue;
            }

            if let Some(open) = &current {
                let gap = word.start - open.end;
                let span = word.end - open.start;
                if gap > self.config.pause_threshold_seconds
                    || span > self.config.max_segment_seconds
                {
                    if let Some(done) = current.take() {
                        segments.push(done.close());
                    }
                }
            }

            let open = current.get_or_insert_with(|| OpenSegment {
                start: word.start,
                end: word.end,
                text: String::new(),
            });
            if !open.text.is_empty() {
                open.text.push(' ');
            }
            open.text.push_str(token);
            open.end = open.end.max(word.end);

            let ends_sentence = token.ends_with(SENTENCE_TERMINATORS);
            if ends_sentence && open.text.chars().count() >= self.config.sentence_min_chars {
                if let Some(done) = current.take() {
                    segments.push(done.close());
                }
            }
        }

        if let Some(done) = current {
            segments.push(done.close());
        }

        segments
    }

    fn merge_short(&self, segments: Vec<TranscriptSegment>) -> Vec<TranscriptSegment> {
        let mut merged: Vec<TranscriptSegment> = Vec::with_capacity(segments.len());

        for segment in segments {
            if let Some(last) = merged.last_mut() {
                let gap = segment.start - last.end;
                let span = segment.end.max(last.end) - last.start;
                if last.duration() < self.config.min_segment_seconds
                    && gap <= self.config.max_merge_gap_seconds
                    && span <= self.config.max_segment_seconds
                {
                    last.end = last.end.max(segment.end);
                    last.text.push(' ');
                    last.text.push_str(&segment.text);
                    continue;
                }
            }
            merged.push(segment);
        }

        merged
    }
}

/// Drops empty segments, widens non-positive spans and sorts by start.
pub fn normalize(segments: Vec<TranscriptSegment>) -> Vec<TranscriptSegment> {
    let mut out: Vec<TranscriptSegment> = segments
        .into_iter()
        .filter(|s| s.start.is_finite() && s.end.is_finite())
        .filter_map(|mut s| {
            let text = s.text.trim();
            if text.is_empty() {
                return None;
            }
            s.text = text.to_string();
            s.start = s.start.max(0.0);
            if s.end <= s.start {
                s.end = s.start + MIN_SEGMENT_SPAN;
            }
            Some(s)
        })
        .collect();

    // stable: equal starts keep recognition order
    out.sort_by(|a, b| a.start.total_cmp(&b.start));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::validate_segments;

    fn words(entries: &[(&str, f64, f64)]) -> Vec<TimedWord> {
        entries
            .iter()
            .map(|(w, s, e)| TimedWord::new(*w, *s, *e))
            .collect()
    }

    fn texts(segments: &[TranscriptSegment]) -> Vec<&str> {
        segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_splits_on_long_pause() {
        let segmenter = Segmenter::default();
        let input = words(&[
            ("Good", 0.0, 0.4),
            ("morning", 0.5, 1.0),
            ("everyone", 1.1, 2.0),
            ("today", 4.0, 4.5),
            ("we", 4.6, 4.8),
            ("begin", 4.9, 5.8),
        ]);

        let segments = segmenter.segment(&input);
        assert_eq!(texts(&segments), vec!["Good morning everyone", "today we begin"]);
        assert_eq!(segments[0].start, 0.0);
        assert_eq!(segments[0].end, 2.0);
        assert_eq!(segments[1].start, 4.0);
    }

    #[test]
    fn test_short_segment_merged_into_next() {
        let segmenter = Segmenter::default();
        // "Hi" is short and followed by a 1.2s pause: split, then merged back.
        let input = words(&[
            ("Hi", 0.0, 0.3),
            ("welcome", 1.5, 2.0),
            ("to", 2.1, 2.2),
            ("the", 2.3, 2.4),
            ("course", 2.5, 3.2),
        ]);

        let segments = segmenter.segment(&input);
        assert_eq!(texts(&segments), vec!["Hi welcome to the course"]);
        assert_eq!(segments[0].end, 3.2);
    }

    #[test]
    fn test_short_segment_kept_when_gap_too_wide() {
        let segmenter = Segmenter::default();
        let input = words(&[("Hi", 0.0, 0.3), ("later", 5.0, 7.0)]);

        let segments = segmenter.segment(&input);
        assert_eq!(texts(&segments), vec!["Hi", "later"]);
    }

    #[test]
    fn test_sentence_end_closes_long_enough_segment() {
        let segmenter = Segmenter::default();
        let input = words(&[
            ("This", 0.0, 0.3),
            ("sentence", 0.3, 0.8),
            ("is", 0.8, 0.9),
            ("long", 0.9, 1.2),
            ("enough", 1.2, 1.6),
            ("to", 1.6, 1.7),
            ("close.", 1.7, 2.2),
            ("Next", 2.3, 2.6),
            ("one", 2.6, 3.0),
        ]);

        let segments = segmenter.segment(&input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "This sentence is long enough to close.");
        assert_eq!(segments[1].text, "Next one");
    }

    #[test]
    fn test_short_sentence_does_not_close() {
        let segmenter = Segmenter::default();
        let input = words(&[("Yes.", 0.0, 0.5), ("Right", 0.6, 1.0)]);

        let segments = segmenter.segment(&input);
        assert_eq!(texts(&segments), vec!["Yes. Right"]);
    }

    #[test]
    fn test_danda_terminates_sentence() {
        let config = SegmentationConfig {
            sentence_min_chars: 5,
            min_segment_seconds: 0.0,
            ..Default::default()
        };
        let segmenter = Segmenter::new(config);
        let input = words(&[("नमस्ते", 0.0, 0.5), ("दोस्तों।", 0.5, 1.0), ("आज", 1.1, 1.4)]);

        let segments = segmenter.segment(&input);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[1].text, "आज");
    }

    #[test]
    fn test_max_span_forces_split() {
        let config = SegmentationConfig {
            max_segment_seconds: 2.0,
            min_segment_seconds: 0.0,
            ..Default::default()
        };
        let segmenter = Segmenter::new(config);
        let input: Vec<TimedWord> = (0..10)
            .map(|i| TimedWord::new("la", i as f64 * 0.5, i as f64 * 0.5 + 0.4))
            .collect();

        let segments = segmenter.segment(&input);
        assert!(segments.len() > 1);
        for s in &segments {
            assert!(s.duration() <= 2.0 + 1e-9);
        }
    }

    #[test]
    fn test_output_is_valid_for_messy_input() {
        let segmenter = Segmenter::default();
        let input = words(&[
            ("", 0.0, 0.1),
            ("zero", 1.0, 1.0),
            ("back", 0.5, 0.6),
            ("  ", 3.0, 3.2),
            ("tail", 9.0, 8.0),
        ]);

        let segments = segmenter.segment(&input);
        assert!(!segments.is_empty());
        assert!(validate_segments(&segments).is_ok());
        assert!(segments.iter().all(|s| !s.text.trim().is_empty()));
    }

    #[test]
    fn test_empty_input() {
        assert!(Segmenter::default().segment(&[]).is_empty());
    }

    #[test]
    fn test_normalize_sorts_and_widens() {
        let segments = normalize(vec![
            TranscriptSegment::new(5.0, 5.0, "b"),
            TranscriptSegment::new(1.0, 2.0, "a"),
            TranscriptSegment::new(3.0, 4.0, "   "),
        ]);
        assert_eq!(texts(&segments), vec!["a", "b"]);
        assert!((segments[1].end - (5.0 + MIN_SEGMENT_SPAN)).abs() < 1e-9);
    }
}
