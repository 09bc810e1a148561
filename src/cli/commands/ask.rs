//! Ask command implementation.

use super::{parse_optional_language, preflight_or_hint};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use anyhow::Result;
use std::path::Path;

/// Run the ask command.
pub async fn run_ask(
    question: &str,
    translation: Option<&str>,
    language: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let language = parse_optional_language(language)?;
    preflight_or_hint(Operation::Ask, &settings)?;

    let pipeline = Pipeline::new(settings)?;

    let spinner = Output::spinner("Thinking...");
    let result = pipeline
        .ask(translation.map(Path::new), language, question)
        .await;
    spinner.finish_and_clear();

    match result {
        Ok(answer) => {
            Output::answer(&answer);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Failed to answer: {}", e));
            Err(e.into())
        }
    }
}
