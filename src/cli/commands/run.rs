//! Run command: the whole pipeline for one input.

use super::{parse_language, preflight_or_hint};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

/// Transcribe, translate and voice `input`.
pub async fn run_pipeline(input: &str, language: &str, settings: Settings) -> Result<()> {
    let language = parse_language(language)?;
    preflight_or_hint(Operation::Run, &settings)?;

    Output::info(&format!("Processing: {} -> {}", input, language.label()));
    let pipeline = Pipeline::new(settings)?;

    match pipeline.run(input, language).await {
        Ok(report) => {
            Output::success(&format!("Finished '{}'", report.media.title));
            Output::kv("Transcript", &report.transcript.display().to_string());
            Output::kv("Translation", &report.translation.display().to_string());
            super::speak::print_report(&report.speech);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Pipeline failed: {}", e));
            Output::info("Files from completed stages are kept; re-run the failed stage on its own.");
            Err(e.into())
        }
    }
}
