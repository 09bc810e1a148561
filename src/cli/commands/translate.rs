//! Translate command implementation.

use super::{parse_language, preflight_or_hint};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the translate command.
pub async fn run_translate(language: &str, transcript: Option<&str>, settings: Settings) -> Result<()> {
    let language = parse_language(language)?;
    preflight_or_hint(Operation::Translate, &settings)?;

    let provider = settings.translation.provider;
    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner(&format!("Translating into {} via {}...", language.label(), provider));
    let result = pipeline.translate(transcript.map(Path::new), language).await;
    spinner.finish_and_clear();

    match result {
        Ok(saved) => {
            Output::success(&format!(
                "Translated '{}' into {} ({} segments)",
                saved.document.title,
                language.label(),
                saved.document.segments.len()
            ));
            Output::kv("Saved to", &saved.path.display().to_string());
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Translation failed: {}", e));
            Output::info("The transcript is unchanged; re-run this command to retry.");
            Err(e.into())
        }
    }
}
