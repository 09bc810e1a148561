//! Pipeline coordination for Vaani.
//!
//! Runs Fetcher -> Transcriber -> Translator -> {Q&A, Synthesizer}. Each stage
//! reads the file the previous stage wrote and writes its own; a failing stage
//! never touches earlier artifacts, so it can be retried on its own.

use crate::audio_source::{fetch, fetch_audio, MediaMetadata};
use crate::chat::{OpenAiChat, QaSession};
use crate::config::{Prompts, Settings};
use crate::error::{Result, VaaniError};
use crate::language::Language;
use crate::store::Workspace;
use crate::synthesis::{SpeechSynthesizer, SynthesisReport};
use crate::transcription::{TranscriptDocument, Transcriber};
use crate::translation::{TranslatedDocument, Translator};
use std::path::{Path, PathBuf};
use tracing::{info, instrument, warn};

/// A document together with the file it was saved to.
#[derive(Debug, Clone)]
pub struct Saved<T> {
    pub path: PathBuf,
    pub document: T,
}

/// Result of a full `run`.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub media: MediaMetadata,
    pub transcript: PathBuf,
    pub translation: PathBuf,
    pub speech: SynthesisReport,
}

/// Builds each stage from settings and wires their files together.
pub struct Pipeline {
    settings: Settings,
    prompts: Prompts,
    workspace: Workspace,
    temp_dir: PathBuf,
}

impl Pipeline {
    pub fn new(settings: Settings) -> Result<Self> {
        let prompts = Prompts::load(
            settings.prompts.custom_dir.as_deref(),
            Some(&settings.prompts.variables),
        )?;

        let workspace = Workspace::new(settings.data_dir());
        std::fs::create_dir_all(workspace.root())?;

        let temp_dir = settings.temp_dir();
        std::fs::create_dir_all(&temp_dir)?;

        Ok(Self {
            settings,
            prompts,
            workspace,
            temp_dir,
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    /// Fetch `input` (URL or local file), transcribe it and save the transcript.
    #[instrument(skip(self), fields(input = %input))]
    pub async fn transcribe(&self, input: &str) -> Result<Saved<TranscriptDocument>> {
        let (media, saved) = self.transcribe_media(input).await?;
        info!("Transcribed '{}' ({} segments)", media.title, saved.document.segments.len());
        Ok(saved)
    }

    async fn transcribe_media(
        &self,
        input: &str,
    ) -> Result<(MediaMetadata, Saved<TranscriptDocument>)> {
        // Build first so a missing key fails before anything is downloaded.
        let transcriber = Transcriber::from_settings(&self.settings.transcription, &self.prompts)?;

        eprintln!("  Fetching metadata...");
        let media = fetch(input).await?;
        eprintln!("  Title: {}", media.title);

        eprintln!("  Fetching audio...");
        let audio_path = fetch_audio(&media, &self.temp_dir).await?;

        eprintln!("  Transcribing...");
        let result = transcriber.transcribe(&audio_path, &media).await;

        // Downloads and extracted tracks live in the temp dir; local audio is used in place.
        if audio_path.starts_with(&self.temp_dir) {
            if let Err(e) = std::fs::remove_file(&audio_path) {
                warn!("Failed to clean up audio file: {}", e);
            }
        }

        let document = result?;
        let path = self.workspace.save_transcript(&document)?;
        eprintln!(
            "  Transcription complete ({} segments)",
            document.segments.len()
        );

        Ok((media, Saved { path, document }))
    }

    /// Translate a saved transcript (the newest one when `transcript` is None).
    #[instrument(skip(self), fields(lang = %language))]
    pub async fn translate(
        &self,
        transcript: Option<&Path>,
        language: Language,
    ) -> Result<Saved<TranslatedDocument>> {
        let path = self.resolve_transcript(transcript)?;
        let source = self.workspace.load_transcript(&path)?;
        let translator = Translator::from_settings(&self.settings.translation, &self.prompts)?;

        let document = translator.translate(&source, language).await?;
        let path = self.workspace.save_translation(&document)?;
        info!("Saved translation to {}", path.display());

        Ok(Saved { path, document })
    }

    /// Open a Q&A session on a saved translation.
    pub fn open_session(
        &self,
        translation: Option<&Path>,
        language: Option<Language>,
    ) -> Result<QaSession> {
        let path = self.resolve_translation(translation, language)?;
        let document = self.workspace.load_translation(&path)?;
        let log_path = self
            .workspace
            .interactions_path(&document.title, document.target_language);

        let chat = &self.settings.chat;
        let backend = OpenAiChat::new(&chat.model, chat.temperature)?;
        Ok(
            QaSession::open(Box::new(backend), self.prompts.clone(), document, &log_path)?
                .with_limits(chat.history_turns, chat.max_context_segments),
        )
    }

    /// Ask one question about a saved translation; the exchange is logged.
    pub async fn ask(
        &self,
        translation: Option<&Path>,
        language: Option<Language>,
        question: &str,
    ) -> Result<String> {
        let mut session = self.open_session(translation, language)?;
        session.ask(question).await
    }

    /// Voice a saved translation into `speech_<lang>_<slug>.mp3`.
    #[instrument(skip(self))]
    pub async fn synthesize(
        &self,
        translation: Option<&Path>,
        language: Option<Language>,
    ) -> Result<SynthesisReport> {
        let path = self.resolve_translation(translation, language)?;
        let document = self.workspace.load_translation(&path)?;
        self.synthesize_document(&document).await
    }

    async fn synthesize_document(&self, document: &TranslatedDocument) -> Result<SynthesisReport> {
        let synthesizer = SpeechSynthesizer::from_settings(&self.settings.synthesis)?;
        let output = self
            .workspace
            .speech_path(&document.title, document.target_language);

        eprintln!("  Synthesizing {} segments...", document.segments.len());
        synthesizer
            .synthesize(&document.segments, document.target_language, &output)
            .await
    }

    /// Fetch, transcribe, translate and voice `input` in one go.
    #[instrument(skip(self), fields(input = %input, lang = %language))]
    pub async fn run(&self, input: &str, language: Language) -> Result<RunReport> {
        let (media, transcript) = self.transcribe_media(input).await?;

        eprintln!("  Translating to {}...", language.label());
        let translator = Translator::from_settings(&self.settings.translation, &self.prompts)?;
        let document = translator.translate(&transcript.document, language).await?;
        let translation = self.workspace.save_translation(&document)?;

        let speech = self.synthesize_document(&document).await?;

        Ok(RunReport {
            media,
            transcript: transcript.path,
            translation,
            speech,
        })
    }

    /// The given transcript path, or the newest saved transcript.
    pub fn resolve_transcript(&self, path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => existing(p),
            None => self.workspace.latest_transcript()?.ok_or_else(|| {
                VaaniError::InvalidInput(
                    "No transcript found. Run 'vaani transcribe <url>' first.".to_string(),
                )
            }),
        }
    }

    /// The given translation path, or the newest saved translation (optionally
    /// for one language).
    pub fn resolve_translation(
        &self,
        path: Option<&Path>,
        language: Option<Language>,
    ) -> Result<PathBuf> {
        match path {
            Some(p) => existing(p),
            None => self.workspace.latest_translation(language)?.ok_or_else(|| {
                let which = language
                    .map(|l| format!("{} translation", l.label()))
                    .unwrap_or_else(|| "translation".to_string());
                VaaniError::InvalidInput(format!(
                    "No {} found. Run 'vaani translate --language <language>' first.",
                    which
                ))
            }),
        }
    }
}

fn existing(path: &Path) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path.to_path_buf())
    } else {
        Err(VaaniError::InvalidInput(format!(
            "File not found: {}",
            path.display()
        )))
    }
}
