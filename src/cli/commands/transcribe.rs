//! Transcribe command implementation.

use super::preflight_or_hint;
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;

const PREVIEW_LINES: usize = 5;

/// Run the transcribe command.
pub async fn run_transcribe(input: &str, settings: Settings) -> Result<()> {
    preflight_or_hint(Operation::Transcribe, &settings)?;

    Output::info(&format!("Processing: {}", input));
    let pipeline = Pipeline::new(settings)?;

    match pipeline.transcribe(input).await {
        Ok(saved) => {
            let doc = &saved.document;
            Output::success(&format!(
                "Transcribed '{}' ({} segments)",
                doc.title,
                doc.segments.len()
            ));
            Output::kv("Recognizer", &doc.recognizer);
            Output::kv("Duration", &crate::cli::format_duration(doc.duration_seconds));
            Output::kv("Saved to", &saved.path.display().to_string());

            let preview = doc.format_with_timestamps();
            if !preview.is_empty() {
                println!();
                for line in preview.lines().take(PREVIEW_LINES) {
                    println!("  {}", line);
                }
                if doc.segments.len() > PREVIEW_LINES {
                    println!("  ...");
                }
            }
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Transcription failed: {}", e));
            Err(e.into())
        }
    }
}
