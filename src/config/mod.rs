//! Configuration module for Vaani.
//!
//! Handles loading and managing application settings and prompt templates.

mod prompts;
mod settings;

pub use prompts::{Prompts, QaPrompts, TranscriptionPrompts, TranslationPrompts};
pub use settings::{
    ChatSettings, GeneralSettings, PromptSettings, Settings, SynthesisSettings,
    TranscriptionSettings, TranslationProvider, TranslationSettings,
};
