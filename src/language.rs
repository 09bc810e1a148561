//! Supported target languages.

use crate::error::VaaniError;
use serde::{Deserialize, Serialize};

/// Indian languages a transcript can be translated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Hindi,
    Bengali,
    Telugu,
    Marathi,
    Tamil,
    Urdu,
    Gujarati,
    Kannada,
    Odia,
    Punjabi,
    Malayalam,
    Assamese,
}

impl Language {
    /// Every supported language, in menu order.
    pub fn all() -> &'static [Language] {
        &[
            Language::Hindi,
            Language::Bengali,
            Language::Telugu,
            Language::Marathi,
            Language::Tamil,
            Language::Urdu,
            Language::Gujarati,
            Language::Kannada,
            Language::Odia,
            Language::Punjabi,
            Language::Malayalam,
            Language::Assamese,
        ]
    }

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Language::Hindi => "hi",
            Language::Bengali => "bn",
            Language::Telugu => "te",
            Language::Marathi => "mr",
            Language::Tamil => "ta",
            Language::Urdu => "ur",
            Language::Gujarati => "gu",
            Language::Kannada => "kn",
            Language::Odia => "or",
            Language::Punjabi => "pa",
            Language::Malayalam => "ml",
            Language::Assamese => "as",
        }
    }

    /// Lowercase English name, as used in file names and config.
    pub fn name(&self) -> &'static str {
        match self {
            Language::Hindi => "hindi",
            Language::Bengali => "bengali",
            Language::Telugu => "telugu",
            Language::Marathi => "marathi",
            Language::Tamil => "tamil",
            Language::Urdu => "urdu",
            Language::Gujarati => "gujarati",
            Language::Kannada => "kannada",
            Language::Odia => "odia",
            Language::Punjabi => "punjabi",
            Language::Malayalam => "malayalam",
            Language::Assamese => "assamese",
        }
    }

    /// English name for prompts and menus.
    pub fn label(&self) -> &'static str {
        match self {
            Language::Hindi => "Hindi",
            Language::Bengali => "Bengali",
            Language::Telugu => "Telugu",
            Language::Marathi => "Marathi",
            Language::Tamil => "Tamil",
            Language::Urdu => "Urdu",
            Language::Gujarati => "Gujarati",
            Language::Kannada => "Kannada",
            Language::Odia => "Odia",
            Language::Punjabi => "Punjabi",
            Language::Malayalam => "Malayalam",
            Language::Assamese => "Assamese",
        }
    }
}

impl std::str::FromStr for Language {
    type Err = VaaniError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        Language::all()
            .iter()
            .find(|l| l.name() == needle || l.code() == needle)
            .copied()
            .ok_or_else(|| VaaniError::UnsupportedLanguage(s.to_string()))
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
