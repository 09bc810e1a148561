//! CLI module for Vaani.

pub mod commands;
mod output;
pub mod preflight;

pub use output::{format_duration, Output};

use clap::{Parser, Subcommand};

/// Vaani - video transcription, Indian-language translation, Q&A and speech
///
/// Transcribes a video, translates the transcript into an Indian language,
/// answers questions about it and voices the translation.
#[derive(Parser, Debug)]
#[command(name = "vaani")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize Vaani and verify system requirements
    Init,

    /// Check system requirements and configuration
    Doctor,

    /// Transcribe a video URL or local audio/video file
    Transcribe {
        /// Video URL, or local audio/video file path
        input: String,
    },

    /// Translate a saved transcript into an Indian language
    Translate {
        /// Target language (name or code, e.g. "hindi" or "hi")
        #[arg(short, long)]
        language: String,

        /// Transcript file (newest transcript if omitted)
        #[arg(short, long)]
        transcript: Option<String>,
    },

    /// Ask a question about a translated transcript
    Ask {
        /// The question to ask
        question: String,

        /// Translation file (newest translation if omitted)
        #[arg(short, long)]
        translation: Option<String>,

        /// Pick the newest translation in this language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Start an interactive Q&A session
    Chat {
        /// Translation file (newest translation if omitted)
        #[arg(short, long)]
        translation: Option<String>,

        /// Pick the newest translation in this language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Voice a translated transcript into a single MP3
    Speak {
        /// Translation file (newest translation if omitted)
        #[arg(short, long)]
        translation: Option<String>,

        /// Pick the newest translation in this language
        #[arg(short, long)]
        language: Option<String>,
    },

    /// Transcribe, translate and voice in one go
    Run {
        /// Video URL, or local audio/video file path
        input: String,

        /// Target language (name or code)
        #[arg(short, long)]
        language: String,
    },

    /// List saved transcripts, translations, logs and audio
    List,

    /// List supported target languages
    Languages,

    /// Export a transcript or translation as JSON, SRT or VTT
    Export {
        /// Transcript or translation file
        file: String,

        /// Output file (stdout if not specified)
        #[arg(short, long)]
        output: Option<String>,

        /// Output format (json, srt, vtt)
        #[arg(long, default_value = "json")]
        format: String,

        /// Include the original text under each translated cue
        #[arg(long)]
        bilingual: bool,
    },

    /// Start HTTP API server for a presentation shell
    Serve {
        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Port to bind to
        #[arg(short, long, default_value = "3000")]
        port: u16,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Open configuration file in editor
    Edit,

    /// Show configuration file path
    Path,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_translate() {
        let cli = Cli::try_parse_from(["vaani", "translate", "--language", "hi"]).unwrap();
        match cli.command {
            Commands::Translate { language, transcript } => {
                assert_eq!(language, "hi");
                assert!(transcript.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_run_requires_language() {
        assert!(Cli::try_parse_from(["vaani", "run", "https://youtu.be/x"]).is_err());
    }

    #[test]
    fn test_global_flags() {
        let cli = Cli::try_parse_from(["vaani", "-vv", "list", "--config", "/tmp/c.toml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config.as_deref(), Some("/tmp/c.toml"));
    }
}
