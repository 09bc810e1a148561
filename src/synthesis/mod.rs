//! Speech synthesis of translated transcripts.
//!
//! Each translated segment is voiced separately, a fixed silence is placed
//! between consecutive clips and everything is concatenated into one MP3.
//! A segment that cannot be voiced is replaced by silence of the same length
//! instead of failing the run.

mod openai;
mod plan;

pub use openai::OpenAiSpeech;
pub use plan::{build_plan, ClipPlan, PlanItem, SegmentOutcome};

use crate::audio::{concat_clips, generate_silence, probe_duration};
use crate::config::SynthesisSettings;
use crate::error::{Result, VaaniError};
use crate::language::Language;
use crate::retry::{retry, RetryPolicy};
use crate::translation::TranslatedSegment;
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// A text-to-speech service.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Voice `text`, returning encoded MP3 bytes.
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>>;
}

/// Summary of a synthesis run.
#[derive(Debug, Clone, Serialize)]
pub struct SynthesisReport {
    pub output: PathBuf,
    pub segments: usize,
    /// Indices of segments replaced by silence.
    pub degraded: Vec<usize>,
    /// Planned length of the output track in seconds.
    pub expected_duration: f64,
}

/// Voices translated segments into a single audio file.
pub struct SpeechSynthesizer {
    service: Box<dyn SpeechService>,
    silence_seconds: f64,
    retry: RetryPolicy,
}

impl SpeechSynthesizer {
    pub fn new(service: Box<dyn SpeechService>) -> Self {
        let defaults = SynthesisSettings::default();
        Self {
            service,
            silence_seconds: defaults.silence_ms as f64 / 1000.0,
            retry: defaults.retry,
        }
    }

    pub fn from_settings(settings: &SynthesisSettings) -> Result<Self> {
        let service = OpenAiSpeech::new(&settings.model, &settings.voice)?;
        Ok(Self::new(Box::new(service))
            .with_silence_ms(settings.silence_ms)
            .with_retry(settings.retry.clone()))
    }

    pub fn with_silence_ms(mut self, silence_ms: u64) -> Self {
        self.silence_seconds = silence_ms as f64 / 1000.0;
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Voice every segment and write the concatenated track to `output`.
    ///
    /// `output` is only replaced once the whole track has been rendered.
    #[instrument(skip(self, segments), fields(segments = segments.len(), lang = %language))]
    pub async fn synthesize(
        &self,
        segments: &[TranslatedSegment],
        language: Language,
        output: &Path,
    ) -> Result<SynthesisReport> {
        if segments.is_empty() {
            return Err(VaaniError::InvalidInput(
                "No translated segments to synthesize".to_string(),
            ));
        }

        let work_dir = tempfile::tempdir()?;
        let clips = self.collect_clips(segments, language, work_dir.path()).await?;

        let mut outcomes = Vec::with_capacity(segments.len());
        let mut degraded = Vec::new();
        for (idx, (segment, clip)) in segments.iter().zip(clips).enumerate() {
            let outcome = match clip {
                Some(path) => measure_clip(idx, path).await?,
                None => None,
            };
            outcomes.push(outcome.unwrap_or_else(|| {
                degraded.push(idx);
                SegmentOutcome::Failed {
                    seconds: segment.end - segment.start,
                }
            }));
        }

        if degraded.len() == segments.len() {
            warn!("Every segment failed; the output will be silent");
        }

        let plan = build_plan(outcomes, self.silence_seconds);
        render_plan(&plan, work_dir.path(), output).await?;

        info!(
            "Wrote {} ({:.1}s, {} degraded segment(s))",
            output.display(),
            plan.expected_duration(),
            degraded.len()
        );

        Ok(SynthesisReport {
            output: output.to_path_buf(),
            segments: segments.len(),
            degraded,
            expected_duration: plan.expected_duration(),
        })
    }

    /// Voice each segment in order, writing clips into `dir`.
    ///
    /// A segment whose synthesis keeps failing yields `None`; only I/O
    /// errors on `dir` abort.
    async fn collect_clips(
        &self,
        segments: &[TranslatedSegment],
        language: Language,
        dir: &Path,
    ) -> Result<Vec<Option<PathBuf>>> {
        let mut clips = Vec::with_capacity(segments.len());

        for (idx, segment) in segments.iter().enumerate() {
            let text = segment.translated_text.trim();
            if text.is_empty() {
                warn!("Segment {} has no translated text, using silence", idx);
                clips.push(None);
                continue;
            }

            let label = format!("speech segment {}", idx);
            let result = retry(&self.retry, &label, |_| async move {
                let bytes = self.service.synthesize(text, language).await?;
                if bytes.is_empty() {
                    return Err(VaaniError::Synthesis("empty audio".to_string()));
                }
                Ok(bytes)
            })
            .await;

            match result {
                Ok(bytes) => {
                    let path = dir.join(format!("clip_{:05}.mp3", idx));
                    tokio::fs::write(&path, bytes).await?;
                    clips.push(Some(path));
                }
                Err(e) => {
                    warn!("Segment {} failed, using silence: {}", idx, e);
                    clips.push(None);
                }
            }
        }

        Ok(clips)
    }
}

/// Measure a clip; an unreadable clip counts as a failed segment.
async fn measure_clip(idx: usize, path: PathBuf) -> Result<Option<SegmentOutcome>> {
    match probe_duration(&path).await {
        Ok(seconds) => Ok(Some(SegmentOutcome::Clip { path, seconds })),
        Err(VaaniError::ToolNotFound(tool)) => Err(VaaniError::ToolNotFound(tool)),
        Err(e) => {
            warn!("Segment {} produced unreadable audio: {}", idx, e);
            Ok(None)
        }
    }
}

/// Generate the silences, concatenate, and move the result into place.
async fn render_plan(plan: &ClipPlan, work_dir: &Path, output: &Path) -> Result<()> {
    let mut silences: HashMap<u64, PathBuf> = HashMap::new();
    let mut files = Vec::with_capacity(plan.items().len());

    for item in plan.items() {
        match item {
            PlanItem::Speech { path, .. } => files.push(path.clone()),
            PlanItem::Silence { seconds } => {
                let ms = (seconds * 1000.0).round() as u64;
                if ms == 0 {
                    continue;
                }
                if let Some(path) = silences.get(&ms) {
                    files.push(path.clone());
                    continue;
                }
                let path = work_dir.join(format!("silence_{}ms.mp3", ms));
                generate_silence(&path, ms as f64 / 1000.0).await?;
                silences.insert(ms, path.clone());
                files.push(path);
            }
        }
    }

    let rendered = work_dir.join("rendered.mp3");
    concat_clips(&files, &rendered).await?;

    if let Some(parent) = output.parent() {
        std::fs::create_dir_all(parent)?;
    }
    // rename fails across filesystems, and the work dir is usually on /tmp
    if std::fs::rename(&rendered, output).is_err() {
        std::fs::copy(&rendered, output)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    /// Fails for texts containing "bad"; fails the first call for "flaky".
    struct FakeSpeech {
        flaky_failed: Mutex<bool>,
    }

    impl FakeSpeech {
        fn new() -> Self {
            Self {
                flaky_failed: Mutex::new(false),
            }
        }
    }

    #[async_trait]
    impl SpeechService for FakeSpeech {
        async fn synthesize(&self, text: &str, _language: Language) -> Result<Vec<u8>> {
            if text.contains("bad") {
                return Err(VaaniError::OpenAI("content rejected".to_string()));
            }
            if text.contains("flaky") {
                let mut failed = self.flaky_failed.lock().unwrap();
                if !*failed {
                    *failed = true;
                    return Err(VaaniError::OpenAI("timeout".to_string()));
                }
            }
            Ok(text.as_bytes().to_vec())
        }
    }

    fn segment(start: f64, end: f64, text: &str) -> TranslatedSegment {
        TranslatedSegment {
            start,
            end,
            original_text: "src".to_string(),
            translated_text: text.to_string(),
        }
    }

    fn synthesizer(max_retries: u32) -> SpeechSynthesizer {
        SpeechSynthesizer::new(Box::new(FakeSpeech::new())).with_retry(RetryPolicy {
            max_retries,
            base_delay_ms: 1,
            max_delay_ms: 1,
        })
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = synthesizer(0)
            .synthesize(&[], Language::Hindi, &dir.path().join("out.mp3"))
            .await
            .unwrap_err();
        assert!(matches!(err, VaaniError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_collect_clips_degrades_failed_segments() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![
            segment(0.0, 1.0, "नमस्ते"),
            segment(1.0, 2.0, "bad words"),
            segment(2.0, 3.0, "   "),
            segment(3.0, 4.0, "धन्यवाद"),
        ];

        let clips = synthesizer(1)
            .collect_clips(&segments, Language::Hindi, dir.path())
            .await
            .unwrap();

        assert_eq!(clips.len(), 4);
        assert!(clips[0].is_some());
        assert!(clips[1].is_none());
        assert!(clips[2].is_none());
        let last = clips[3].as_ref().unwrap();
        assert_eq!(std::fs::read(last).unwrap(), "धन्यवाद".as_bytes());
    }

    #[tokio::test]
    async fn test_collect_clips_retries_transient_failure() {
        let dir = tempfile::tempdir().unwrap();
        let segments = vec![segment(0.0, 1.0, "flaky line")];

        let without_retry = synthesizer(0)
            .collect_clips(&segments, Language::Tamil, dir.path())
            .await
            .unwrap();
        assert!(without_retry[0].is_none());

        let with_retry = synthesizer(1)
            .collect_clips(&segments, Language::Tamil, dir.path())
            .await
            .unwrap();
        assert!(with_retry[0].is_some());
    }

    #[test]
    fn test_plan_duration_matches_clips_and_gaps() {
        let outcomes = vec![
            SegmentOutcome::Clip {
                path: PathBuf::from("a.mp3"),
                seconds: 1.2,
            },
            SegmentOutcome::Failed { seconds: 2.0 },
            SegmentOutcome::Clip {
                path: PathBuf::from("c.mp3"),
                seconds: 0.8,
            },
        ];
        let plan = build_plan(outcomes, 0.5);
        assert!((plan.expected_duration() - (1.2 + 2.0 + 0.8 + 2.0 * 0.5)).abs() < 1e-9);
    }
}
