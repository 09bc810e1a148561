//! Speak command implementation.

use super::{parse_optional_language, preflight_or_hint};
use crate::cli::preflight::Operation;
use crate::cli::{format_duration, Output};
use crate::config::Settings;
use crate::pipeline::Pipeline;
use crate::synthesis::SynthesisReport;
use anyhow::Result;
use std::path::Path;

/// Run the speak command.
pub async fn run_speak(
    translation: Option<&str>,
    language: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let language = parse_optional_language(language)?;
    preflight_or_hint(Operation::Speak, &settings)?;

    let pipeline = Pipeline::new(settings)?;

    match pipeline.synthesize(translation.map(Path::new), language).await {
        Ok(report) => {
            print_report(&report);
            Ok(())
        }
        Err(e) => {
            Output::error(&format!("Speech synthesis failed: {}", e));
            Err(e.into())
        }
    }
}

pub(super) fn print_report(report: &SynthesisReport) {
    Output::success(&format!("Wrote {}", report.output.display()));
    Output::kv("Segments", &report.segments.to_string());
    Output::kv("Length", &format_duration(report.expected_duration));
    if !report.degraded.is_empty() {
        let indices: Vec<String> = report.degraded.iter().map(|i| i.to_string()).collect();
        Output::warning(&format!(
            "{} segment(s) replaced by silence: {}",
            report.degraded.len(),
            indices.join(", ")
        ));
    }
}
