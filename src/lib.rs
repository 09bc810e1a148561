//! Vaani - video transcription, translation, Q&A and speech
//!
//! A CLI tool that turns a video into a transcript, translates it into an
//! Indian language, answers questions about it and reads it back aloud.
//!
//! The name "Vaani" is the Sanskrit word for "voice" or "speech."
//!
//! # Overview
//!
//! Data flows strictly forward, one stage at a time:
//!
//! ```text
//! fetch -> transcribe -> translate -> { ask, synthesize }
//! ```
//!
//! Each stage writes a file into the data directory that the next stage reads.
//!
//! # Architecture
//!
//! - `config` - Settings and prompt templates
//! - `audio_source` - Media metadata (remote URLs, local files)
//! - `audio` - yt-dlp and ffmpeg wrappers
//! - `transcription` - Speech recognition and segmentation
//! - `translation` - Batched translation into Indian languages
//! - `chat` - Question answering with an interaction log
//! - `synthesis` - Text-to-speech and concatenation
//! - `store` - Flat-file artifacts
//! - `pipeline` - Stage coordination
//!
//! # Example
//!
//! ```rust,no_run
//! use vaani::config::Settings;
//! use vaani::language::Language;
//! use vaani::pipeline::Pipeline;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pipeline = Pipeline::new(Settings::load()?)?;
//!
//!     let report = pipeline
//!         .run("https://www.youtube.com/watch?v=dQw4w9WgXcQ", Language::Hindi)
//!         .await?;
//!     println!("Audio written to {}", report.speech.output.display());
//!
//!     Ok(())
//! }
//! ```

pub mod audio;
pub mod audio_source;
pub mod chat;
pub mod cli;
pub mod config;
pub mod error;
pub mod language;
pub mod openai;
pub mod pipeline;
pub mod retry;
pub mod store;
pub mod synthesis;
pub mod transcription;
pub mod translation;

pub use error::{Result, VaaniError};
