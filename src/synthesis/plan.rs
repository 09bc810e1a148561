//! Ordering of speech clips and silences in the final track.

use std::path::PathBuf;

/// What synthesis produced for one segment.
#[derive(Debug, Clone, PartialEq)]
pub enum SegmentOutcome {
    /// A clip was written to `path` and lasts `seconds`.
    Clip { path: PathBuf, seconds: f64 },
    /// Synthesis failed; the segment's window lasted `seconds`.
    Failed { seconds: f64 },
}

/// One entry of the output track.
#[derive(Debug, Clone, PartialEq)]
pub enum PlanItem {
    Speech { path: PathBuf, seconds: f64 },
    Silence { seconds: f64 },
}

impl PlanItem {
    pub fn seconds(&self) -> f64 {
        match self {
            PlanItem::Speech { seconds, .. } | PlanItem::Silence { seconds } => *seconds,
        }
    }
}

/// Ordered items to concatenate.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClipPlan {
    items: Vec<PlanItem>,
}

impl ClipPlan {
    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Length of the concatenated track.
    pub fn expected_duration(&self) -> f64 {
        self.items.iter().map(PlanItem::seconds).sum()
    }
}

/// Lay out `outcomes` in segment order with `gap_seconds` of silence between
/// consecutive segments (none before the first or after the last). A failed
/// segment becomes silence of its own duration.
pub fn build_plan(outcomes: Vec<SegmentOutcome>, gap_seconds: f64) -> ClipPlan {
    let gap = gap_seconds.max(0.0);
    let mut items = Vec::with_capacity(outcomes.len() * 2);

    for (i, outcome) in outcomes.into_iter().enumerate() {
        if i > 0 {
            items.push(PlanItem::Silence { seconds: gap });
        }
        items.push(match outcome {
            SegmentOutcome::Clip { path, seconds } => PlanItem::Speech { path, seconds },
            SegmentOutcome::Failed { seconds } => PlanItem::Silence {
                seconds: seconds.max(0.0),
            },
        });
    }

    ClipPlan { items }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(name: &str, seconds: f64) -> SegmentOutcome {
        SegmentOutcome::Clip {
            path: PathBuf::from(name),
            seconds,
        }
    }

    #[test]
    fn test_gaps_between_segments_only() {
        let plan = build_plan(vec![clip("a", 1.0), clip("b", 2.0), clip("c", 3.0)], 0.5);

        assert_eq!(plan.items().len(), 5);
        assert!(matches!(plan.items()[0], PlanItem::Speech { .. }));
        assert_eq!(plan.items()[1], PlanItem::Silence { seconds: 0.5 });
        assert!(matches!(plan.items()[4], PlanItem::Speech { .. }));
        assert!((plan.expected_duration() - (6.0 + 2.0 * 0.5)).abs() < 1e-9);
    }

    #[test]
    fn test_failed_segment_becomes_silence() {
        let plan = build_plan(
            vec![clip("a", 1.0), SegmentOutcome::Failed { seconds: 4.0 }, clip("c", 1.0)],
            0.5,
        );

        assert_eq!(plan.items()[2], PlanItem::Silence { seconds: 4.0 });
        assert!((plan.expected_duration() - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_and_empty() {
        let single = build_plan(vec![clip("a", 2.0)], 0.5);
        assert_eq!(single.items().len(), 1);
        assert_eq!(single.expected_duration(), 2.0);

        assert!(build_plan(Vec::new(), 0.5).is_empty());
    }
}
