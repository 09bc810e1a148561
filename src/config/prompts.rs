//! Prompt templates for Vaani.
//!
//! Prompts can be customized by placing TOML files in the custom prompts directory.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Collection of all prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
#[derive(Default)]
pub struct Prompts {
    pub qa: QaPrompts,
    pub translation: TranslationPrompts,
    pub transcription: TranscriptionPrompts,
    /// Custom variables from config, available in all prompts.
    #[serde(skip)]
    pub variables: std::collections::HashMap<String, String>,
}

/// Prompts for question answering over a translated transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QaPrompts {
    pub system: String,
    pub user: String,
}

impl Default for QaPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a helpful assistant for analyzing and discussing translated video content.

Guidelines:
- Answer using the provided bilingual transcript (original and {{language}} translation)
- Cite timestamps in [MM:SS] form when they help
- Answer in the language the user asks in, unless asked otherwise
- If the transcript does not cover the question, say so plainly
- Be concise and relevant"#
                .to_string(),

            user: r#"Video: {{title}}

Transcript excerpts:
{{context}}

Question: {{question}}"#
                .to_string(),
        }
    }
}

/// Prompts for chat-model translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationPrompts {
    pub system: String,
    pub user: String,
}

impl Default for TranslationPrompts {
    fn default() -> Self {
        Self {
            system: r#"You are a professional translator. Translate each input line from {{source}} into {{target}}.

Rules:
- Translate every line; never merge, split, drop or reorder lines
- Keep names, numbers and technical terms accurate
- Output only the translation, no notes
- Respond with a JSON object: {"translations": ["...", "..."]} with exactly one entry per input line"#
                .to_string(),

            user: r#"Translate these {{count}} lines:
{{lines}}"#
                .to_string(),
        }
    }
}

/// Prompts for the fallback transcription model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranscriptionPrompts {
    pub fallback: String,
}

impl Default for TranscriptionPrompts {
    fn default() -> Self {
        Self {
            fallback: "Transcribe this audio cleanly with no additional text or comments.".to_string(),
        }
    }
}

impl Prompts {
    /// Load prompts from the default location, with optional custom directory and variables.
    pub fn load(
        custom_dir: Option<&str>,
        custom_variables: Option<&std::collections::HashMap<String, String>>,
    ) -> crate::error::Result<Self> {
        let mut prompts = Prompts::default();

        if let Some(vars) = custom_variables {
            prompts.variables = vars.clone();
        }

        if let Some(dir) = custom_dir {
            let custom_path = PathBuf::from(shellexpand::tilde(dir).to_string());

            let qa_path = custom_path.join("qa.toml");
            if qa_path.exists() {
                let content = std::fs::read_to_string(&qa_path)?;
                prompts.qa = toml::from_str(&content)?;
            }

            let translation_path = custom_path.join("translation.toml");
            if translation_path.exists() {
                let content = std::fs::read_to_string(&translation_path)?;
                prompts.translation = toml::from_str(&content)?;
            }

            let transcription_path = custom_path.join("transcription.toml");
            if transcription_path.exists() {
                let content = std::fs::read_to_string(&transcription_path)?;
                prompts.transcription = toml::from_str(&content)?;
            }
        }

        Ok(prompts)
    }

    /// Render a prompt template with the given variables.
    pub fn render(template: &str, vars: &std::collections::HashMap<String, String>) -> String {
        let mut result = template.to_string();
        for (key, value) in vars {
            result = result.replace(&format!("{{{{{}}}}}", key), value);
        }
        result
    }

    /// Render a prompt template with both provided variables and custom config variables.
    /// Provided variables take precedence over custom config variables.
    pub fn render_with_custom(
        &self,
        template: &str,
        vars: &std::collections::HashMap<String, String>,
    ) -> String {
        let mut merged = self.variables.clone();
        for (key, value) in vars {
            merged.insert(key.clone(), value.clone());
        }
        Self::render(template, &merged)
    }
}
