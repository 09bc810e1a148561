//! Export command implementation.

use crate::cli::Output;
use crate::store::read_json;
use crate::transcription::{format_transcript, format_translation, OutputFormat, TranscriptDocument};
use crate::translation::TranslatedDocument;
use anyhow::Result;
use std::path::Path;

/// A saved document of either stage.
enum Exportable {
    Transcript(TranscriptDocument),
    Translation(TranslatedDocument),
}

impl Exportable {
    /// Translations are recognized by their `target_language` field.
    fn load(path: &Path) -> Result<Self> {
        let value: serde_json::Value = read_json(path)?;
        if value.get("target_language").is_some() {
            Ok(Exportable::Translation(serde_json::from_value(value)?))
        } else {
            Ok(Exportable::Transcript(serde_json::from_value(value)?))
        }
    }

    fn title(&self) -> &str {
        match self {
            Exportable::Transcript(doc) => &doc.title,
            Exportable::Translation(doc) => &doc.title,
        }
    }

    fn segment_count(&self) -> usize {
        match self {
            Exportable::Transcript(doc) => doc.segments.len(),
            Exportable::Translation(doc) => doc.segments.len(),
        }
    }

    fn render(&self, format: OutputFormat, bilingual: bool) -> String {
        match self {
            Exportable::Transcript(doc) => format_transcript(doc, format),
            Exportable::Translation(doc) => format_translation(doc, format, bilingual),
        }
    }
}

/// Run the export command.
pub fn run_export(file: &str, output: Option<String>, format: &str, bilingual: bool) -> Result<()> {
    let output_format: OutputFormat = format.parse().map_err(|e: String| anyhow::anyhow!(e))?;

    let path = Path::new(file);
    if !path.is_file() {
        Output::error(&format!("File not found: {}", file));
        Output::info("Use 'vaani list' to see saved files.");
        return Err(anyhow::anyhow!("File not found: {}", file));
    }

    let document = Exportable::load(path)?;
    let rendered = document.render(output_format, bilingual);

    match output {
        Some(dest) if dest != "-" => {
            std::fs::write(&dest, &rendered)?;
            Output::success(&format!(
                "Exported '{}' to {} ({} segments)",
                document.title(),
                dest,
                document.segment_count()
            ));
        }
        _ => println!("{}", rendered),
    }

    Ok(())
}
