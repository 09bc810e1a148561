//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools and credentials are available before
//! starting a stage that would otherwise fail midway.

use crate::config::{Settings, TranslationProvider};
use crate::error::{Result, VaaniError};
use crate::translation::GOOGLE_API_KEY_VAR;
use std::process::Command;

/// Stages with external requirements.
#[derive(Debug, Clone, Copy)]
pub enum Operation {
    /// Download, probe and recognize.
    Transcribe,
    /// Call the configured translation provider.
    Translate,
    /// Call the chat model.
    Ask,
    /// Synthesize and concatenate audio.
    Speak,
    /// Everything above except Q&A.
    Run,
}

/// Run pre-flight checks for `operation`.
pub fn check(operation: Operation, settings: &Settings) -> Result<()> {
    match operation {
        Operation::Transcribe => {
            check_openai_key()?;
            check_tool("yt-dlp")?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Translate => check_translation_key(settings)?,
        Operation::Ask => check_openai_key()?,
        Operation::Speak => {
            check_openai_key()?;
            check_tool("ffmpeg")?;
            check_tool("ffprobe")?;
        }
        Operation::Run => {
            check(Operation::Transcribe, settings)?;
            check_translation_key(settings)?;
        }
    }
    Ok(())
}

fn check_translation_key(settings: &Settings) -> Result<()> {
    match settings.translation.provider {
        TranslationProvider::Google => check_env_key(GOOGLE_API_KEY_VAR, "AIza..."),
        TranslationProvider::Openai => check_openai_key(),
    }
}

fn check_openai_key() -> Result<()> {
    check_env_key("OPENAI_API_KEY", "sk-...")
}

fn check_env_key(var: &str, example: &str) -> Result<()> {
    match std::env::var(var) {
        Ok(key) if !key.is_empty() => Ok(()),
        Ok(_) => Err(VaaniError::Config(format!(
            "{} is empty. Set it with: export {}='{}'",
            var, var, example
        ))),
        Err(_) => Err(VaaniError::Config(format!(
            "{} not set. Set it with: export {}='{}'",
            var, var, example
        ))),
    }
}

/// Check if an external tool is available.
pub fn check_tool(name: &str) -> Result<()> {
    // ffmpeg/ffprobe use -version (single dash), others use --version
    let version_arg = match name {
        "ffmpeg" | "ffprobe" => "-version",
        _ => "--version",
    };
    match Command::new(name).arg(version_arg).output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(VaaniError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(VaaniError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(VaaniError::ToolNotFound(format!("{}: {}", name, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tool() {
        let err = check_tool("vaani-no-such-tool").unwrap_err();
        assert!(matches!(err, VaaniError::ToolNotFound(_)));
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let var = "VAANI_PREFLIGHT_TEST_KEY";
        std::env::set_var(var, "");
        let err = check_env_key(var, "x").unwrap_err();
        assert!(err.to_string().contains("is empty"));
        std::env::remove_var(var);
        assert!(check_env_key(var, "x").unwrap_err().to_string().contains("not set"));
    }
}
