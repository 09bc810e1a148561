//! CLI command implementations.

mod ask;
mod chat;
mod config;
mod doctor;
mod export;
mod init;
mod languages;
mod list;
mod run;
mod serve;
mod speak;
mod transcribe;
mod translate;

pub use ask::run_ask;
pub use chat::run_chat;
pub use config::run_config;
pub use doctor::run_doctor;
pub use export::run_export;
pub use init::run_init;
pub use languages::run_languages;
pub use list::run_list;
pub use run::run_pipeline;
pub use serve::run_serve;
pub use speak::run_speak;
pub use transcribe::run_transcribe;
pub use translate::run_translate;

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::language::Language;

/// Fail early, pointing at `vaani doctor`, when a stage cannot run.
fn preflight_or_hint(operation: Operation, settings: &Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(operation, settings) {
        Output::error(&e.to_string());
        Output::info("Run 'vaani doctor' for detailed diagnostics.");
        return Err(e.into());
    }
    Ok(())
}

fn parse_language(value: &str) -> anyhow::Result<Language> {
    value.parse::<Language>().map_err(|e| {
        Output::error(&e.to_string());
        Output::info("Run 'vaani languages' to see the supported languages.");
        e.into()
    })
}

fn parse_optional_language(value: Option<&str>) -> anyhow::Result<Option<Language>> {
    value.map(parse_language).transpose()
}
