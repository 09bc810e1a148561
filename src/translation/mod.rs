//! Translation of transcripts into Indian languages.
//!
//! Segments are grouped into batches under the service's size limits,
//! translated batch by batch, and re-attached to their original timestamps
//! by position.

mod batch;
mod chat;
mod google;

pub use batch::plan_batches;
pub use chat::ChatTranslate;
pub use google::{GoogleTranslate, API_KEY_VAR as GOOGLE_API_KEY_VAR};

use crate::chat::OpenAiChat;
use crate::config::{Prompts, TranslationProvider, TranslationSettings};
use crate::error::{Result, VaaniError};
use crate::language::Language;
use crate::retry::{retry, RetryPolicy};
use crate::transcription::TranscriptDocument;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// A transcript segment with its translation, sharing the same time window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranslatedSegment {
    pub start: f64,
    pub end: f64,
    pub original_text: String,
    pub translated_text: String,
}

/// A translated transcript, one segment per source segment in the same order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslatedDocument {
    pub media_id: String,
    pub title: String,
    pub source_language: String,
    pub target_language: Language,
    pub created_at: DateTime<Utc>,
    pub segments: Vec<TranslatedSegment>,
}

/// A machine translation service.
#[async_trait]
pub trait TranslationService: Send + Sync {
    fn name(&self) -> &str;

    /// Translate `texts`, returning one translation per input in order.
    async fn translate_batch(
        &self,
        texts: &[String],
        source: &str,
        target: Language,
    ) -> Result<Vec<String>>;
}

/// Translates whole documents through a [`TranslationService`].
pub struct Translator {
    service: Box<dyn TranslationService>,
    source_language: String,
    max_batch_chars: usize,
    max_batch_segments: usize,
    retry: RetryPolicy,
}

impl Translator {
    pub fn new(service: Box<dyn TranslationService>) -> Self {
        let defaults = TranslationSettings::default();
        Self {
            service,
            source_language: defaults.source_language,
            max_batch_chars: defaults.max_batch_chars,
            max_batch_segments: defaults.max_batch_segments,
            retry: defaults.retry,
        }
    }

    /// Build the configured provider.
    pub fn from_settings(settings: &TranslationSettings, prompts: &Prompts) -> Result<Self> {
        let service: Box<dyn TranslationService> = match settings.provider {
            TranslationProvider::Google => Box::new(GoogleTranslate::from_env()?),
            TranslationProvider::Openai => {
                let backend = OpenAiChat::new(&settings.model, 0.0)?.with_json_mode();
                Box::new(ChatTranslate::new(Box::new(backend), prompts.clone()))
            }
        };

        Ok(Self {
            service,
            source_language: settings.source_language.clone(),
            max_batch_chars: settings.max_batch_chars.max(1),
            max_batch_segments: settings.max_batch_segments.max(1),
            retry: settings.retry.clone(),
        })
    }

    pub fn with_batch_limits(mut self, max_chars: usize, max_segments: usize) -> Self {
        self.max_batch_chars = max_chars.max(1);
        self.max_batch_segments = max_segments.max(1);
        self
    }

    pub fn with_retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    /// Translate every segment of `doc` into `target`.
    ///
    /// Any batch that still fails after its retries fails the whole document;
    /// no partial result is returned.
    #[instrument(skip(self, doc), fields(media_id = %doc.media_id, lang = %target))]
    pub async fn translate(
        &self,
        doc: &TranscriptDocument,
        target: Language,
    ) -> Result<TranslatedDocument> {
        let texts: Vec<String> = doc.segments.iter().map(|s| s.text.clone()).collect();
        let batches = plan_batches(&texts, self.max_batch_chars, self.max_batch_segments);

        info!(
            "Translating {} segments in {} batch(es) with {}",
            texts.len(),
            batches.len(),
            self.service.name()
        );

        let mut translated: Vec<String> = Vec::with_capacity(texts.len());

        for (batch_idx, range) in batches.into_iter().enumerate() {
            let batch = &texts[range];
            let label = format!("translation batch {}", batch_idx);

            let result = retry(&self.retry, &label, |_| async move {
                let out = self
                    .service
                    .translate_batch(batch, &self.source_language, target)
                    .await?;
                check_batch(batch, &out)?;
                Ok(out)
            })
            .await
            .map_err(|e| VaaniError::Translation {
                batch: batch_idx,
                message: e.to_string(),
            })?;

            debug!("Batch {} done ({} segments)", batch_idx, result.len());
            translated.extend(result);
        }

        let segments = doc
            .segments
            .iter()
            .zip(translated)
            .map(|(source, translated_text)| TranslatedSegment {
                start: source.start,
                end: source.end,
                original_text: source.text.clone(),
                translated_text,
            })
            .collect();

        Ok(TranslatedDocument {
            media_id: doc.media_id.clone(),
            title: doc.title.clone(),
            source_language: self.source_language.clone(),
            target_language: target,
            created_at: Utc::now(),
            segments,
        })
    }
}

/// A batch reply must have one non-empty translation per non-empty input.
fn check_batch(inputs: &[String], outputs: &[String]) -> Result<()> {
    if inputs.len() != outputs.len() {
        return Err(VaaniError::Service(format!(
            "expected {} translations, got {}",
            inputs.len(),
            outputs.len()
        )));
    }

    for (i, (input, output)) in inputs.iter().zip(outputs).enumerate() {
        if !input.trim().is_empty() && output.trim().is_empty() {
            return Err(VaaniError::Service(format!("empty translation for line {}", i)));
        }
    }

    Ok(())
}
