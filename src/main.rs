//! Vaani CLI entry point.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vaani::cli::{commands, Cli, Commands};
use vaani::config::Settings;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("vaani={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    match &cli.command {
        Commands::Init => commands::run_init(&settings)?,

        Commands::Doctor => commands::run_doctor(&settings)?,

        Commands::Transcribe { input } => commands::run_transcribe(input, settings).await?,

        Commands::Translate {
            language,
            transcript,
        } => commands::run_translate(language, transcript.as_deref(), settings).await?,

        Commands::Ask {
            question,
            translation,
            language,
        } => {
            commands::run_ask(question, translation.as_deref(), language.as_deref(), settings)
                .await?
        }

        Commands::Chat {
            translation,
            language,
        } => commands::run_chat(translation.as_deref(), language.as_deref(), settings).await?,

        Commands::Speak {
            translation,
            language,
        } => commands::run_speak(translation.as_deref(), language.as_deref(), settings).await?,

        Commands::Run { input, language } => {
            commands::run_pipeline(input, language, settings).await?
        }

        Commands::List => commands::run_list(&settings)?,

        Commands::Languages => commands::run_languages(),

        Commands::Export {
            file,
            output,
            format,
            bilingual,
        } => commands::run_export(file, output.clone(), format, *bilingual)?,

        Commands::Serve { host, port } => commands::run_serve(host, *port, settings).await?,

        Commands::Config { action } => commands::run_config(action, settings, config_path)?,
    }

    Ok(())
}
