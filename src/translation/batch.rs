//! Grouping segments into translation requests.

use std::ops::Range;

/// Splits `texts` into contiguous index ranges for translation requests.
///
/// A batch holds at most `max_segments` texts and at most `max_chars`
/// characters. A segment is never split: one longer than `max_chars` is sent
/// in a batch of its own.
pub fn plan_batches(texts: &[String], max_chars: usize, max_segments: usize) -> Vec<Range<usize>> {
    let max_segments = max_segments.max(1);
    let mut batches = Vec::new();
    let mut start = 0;
    let mut chars = 0;

    for (i, text) in texts.iter().enumerate() {
        let len = text.chars().count();
        let count = i - start;

        if count > 0 && (chars + len > max_chars || count >= max_segments) {
            batches.push(start..i);
            start = i;
            chars = 0;
        }
        chars += len;
    }

    if start < texts.len() {
        batches.push(start..texts.len());
    }

    batches
}
