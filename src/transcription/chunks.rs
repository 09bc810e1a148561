//! Re-assembly of per-chunk recognition results into one timeline.

use super::models::TranscriptSegment;
use super::segmenter::MIN_SEGMENT_SPAN;

/// Recognition output for one sequential chunk of a longer recording.
#[derive(Debug, Clone)]
pub struct ChunkTranscript {
    /// Position of the chunk within the full recording, in seconds.
    pub offset: f64,
    /// Measured length of the chunk, in seconds.
    pub duration: f64,
    /// Segments with timestamps relative to the chunk start.
    pub segments: Vec<TranscriptSegment>,
}

/// Start offset of each chunk given the measured chunk durations.
pub fn cumulative_offsets(durations: &[f64]) -> Vec<f64> {
    durations
        .iter()
        .scan(0.0, |acc, d| {
            let offset = *acc;
            *acc += d.max(0.0);
            Some(offset)
        })
        .collect()
}

/// Shifts each chunk's segments by its offset and concatenates them in order.
///
/// Segments are first clamped into their chunk's `[0, duration]` window, so
/// timestamps never spill into the neighbouring chunk and every segment of a
/// later chunk starts after every segment of an earlier one. No segment is
/// dropped.
pub fn assemble_chunks(chunks: Vec<ChunkTranscript>) -> Vec<TranscriptSegment> {
    let total: usize = chunks.iter().map(|c| c.segments.len()).sum();
    let mut out = Vec::with_capacity(total);

    for chunk in chunks {
        let duration = chunk.duration.max(MIN_SEGMENT_SPAN);
        let latest_start = duration - MIN_SEGMENT_SPAN;

        for segment in chunk.segments {
            let start = segment.start.max(0.0).min(latest_start);
            let end = segment.end.min(duration).max(start + MIN_SEGMENT_SPAN);

            out.push(TranscriptSegment::new(
                chunk.offset + start,
                chunk.offset + end,
                segment.text,
            ));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcription::validate_segments;

    fn seg(start: f64, end: f64, text: &str) -> TranscriptSegment {
        TranscriptSegment::new(start, end, text)
    }

    #[test]
    fn test_cumulative_offsets() {
        assert_eq!(cumulative_offsets(&[600.0, 600.0, 123.5]), vec![0.0, 600.0, 1200.0]);
        assert!(cumulative_offsets(&[]).is_empty());
    }

    #[test]
    fn test_assemble_preserves_count_and_order() {
        let durations = [10.0, 10.0, 7.5];
        let offsets = cumulative_offsets(&durations);
        let per_chunk = vec![
            vec![seg(0.0, 4.0, "a"), seg(4.5, 9.9, "b")],
            vec![seg(0.2, 3.0, "c")],
            vec![seg(0.0, 2.0, "d"), seg(2.0, 5.0, "e"), seg(5.5, 7.5, "f")],
        ];
        let expected: usize = per_chunk.iter().map(Vec::len).sum();

        let chunks = per_chunk
            .into_iter()
            .enumerate()
            .map(|(i, segments)| ChunkTranscript {
                offset: offsets[i],
                duration: durations[i],
                segments,
            })
            .collect();

        let assembled = assemble_chunks(chunks);
        assert_eq!(assembled.len(), expected);
        assert!(validate_segments(&assembled).is_ok());
        assert!((assembled[2].start - 10.2).abs() < 1e-9);
        assert!((assembled[3].start - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_boundary_is_strictly_increasing_when_segments_overrun() {
        // Recognizers sometimes report times past the end of the clip.
        let chunks = vec![
            ChunkTranscript {
                offset: 0.0,
                duration: 5.0,
                segments: vec![seg(1.0, 2.0, "a"), seg(5.0, 6.5, "overrun")],
            },
            ChunkTranscript {
                offset: 5.0,
                duration: 5.0,
                segments: vec![seg(0.0, 1.0, "b")],
            },
        ];

        let assembled = assemble_chunks(chunks);
        assert_eq!(assembled.len(), 3);
        assert!(assembled[1].start < assembled[2].start);
        assert!(assembled[1].end <= 5.0 + 1e-9);
        assert!(validate_segments(&assembled).is_ok());
    }
}
