//! Init command - interactive first-run setup.

use crate::cli::Output;
use crate::config::{Settings, TranslationProvider};
use crate::translation::{GoogleTranslate, GOOGLE_API_KEY_VAR};
use console::style;
use std::io::{self, Write};

/// Run the init command for first-time setup.
pub fn run_init(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Vaani Setup");
    println!();

    println!("{}", style("Step 1: Checking prerequisites").bold().cyan());
    println!();

    let missing: Vec<&str> = ["yt-dlp", "ffmpeg", "ffprobe"]
        .into_iter()
        .filter(|tool| crate::cli::preflight::check_tool(tool).is_err())
        .collect();

    if missing.is_empty() {
        Output::success("All required tools are installed!");
    } else {
        Output::warning("Some tools are missing. Please install them:");
        println!();
        for tool in &missing {
            println!("  {} {} - not found", style("✗").red(), style(tool).bold());
            println!("    {} {}", style("→").dim(), style(install_hint(tool)).dim());
        }
        println!();

        if !prompt_continue("Continue anyway?")? {
            Output::info("Setup cancelled. Install the missing tools and run 'vaani init' again.");
            return Ok(());
        }
    }

    println!();
    println!("{}", style("Step 2: Checking API keys").bold().cyan());
    println!();

    let mut keys = vec![(
        "OPENAI_API_KEY",
        "speech recognition, Q&A and speech synthesis",
        crate::openai::is_api_key_configured(),
    )];
    if settings.translation.provider == TranslationProvider::Google {
        keys.push((
            GOOGLE_API_KEY_VAR,
            "translation",
            GoogleTranslate::is_api_key_configured(),
        ));
    }

    for (var, purpose, configured) in keys {
        if configured {
            Output::success(&format!("{} is configured", var));
            continue;
        }
        Output::warning(&format!("{} is not set (needed for {}).", var, purpose));
        println!("  {}", style(format!("export {}='...'", var)).green());
        println!();
        if !prompt_continue(&format!("Continue without {}?", var))? {
            Output::info("Setup cancelled. Set your API keys and run 'vaani init' again.");
            return Ok(());
        }
    }

    println!();
    println!("{}", style("Step 3: Setting up directories").bold().cyan());
    println!();

    for (label, dir) in [("Data", settings.data_dir()), ("Temp", settings.temp_dir())] {
        if dir.exists() {
            Output::info(&format!("{} directory exists: {}", label, dir.display()));
        } else {
            std::fs::create_dir_all(&dir)?;
            Output::success(&format!("Created {} directory: {}", label.to_lowercase(), dir.display()));
        }
    }

    println!();
    println!("{}", style("Step 4: Configuration file").bold().cyan());
    println!();

    let config_path = Settings::default_config_path();
    if config_path.exists() {
        Output::info(&format!("Config file exists: {}", config_path.display()));
    } else if prompt_continue("Create default configuration file?")? {
        settings.save_to(&config_path)?;
        Output::success(&format!("Created config file: {}", config_path.display()));
        println!("  Edit your config with: {}", style("vaani config edit").green());
    } else {
        Output::info("Skipped config file creation. Using defaults.");
    }

    println!();
    println!("{}", style("Setup Complete!").bold().green());
    println!();
    println!("Next steps:");
    println!("  {} Transcribe a video", style("vaani transcribe <url>").cyan());
    println!("  {} Translate it", style("vaani translate --language hindi").cyan());
    println!("  {} Ask about it", style("vaani ask \"<question>\"").cyan());
    println!("  {} Hear it", style("vaani speak").cyan());

    Ok(())
}

/// Platform-specific install hint.
fn install_hint(tool: &str) -> &'static str {
    match tool {
        "yt-dlp" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install yt-dlp"
            } else if cfg!(target_os = "linux") {
                "Install with: pip install yt-dlp"
            } else {
                "Install from: https://github.com/yt-dlp/yt-dlp"
            }
        }
        "ffmpeg" | "ffprobe" => {
            if cfg!(target_os = "macos") {
                "Install with: brew install ffmpeg"
            } else if cfg!(target_os = "linux") {
                "Install with: sudo apt install ffmpeg"
            } else {
                "Install from: https://ffmpeg.org/download.html"
            }
        }
        _ => "Check the documentation for installation instructions",
    }
}

/// Prompt user for yes/no confirmation.
fn prompt_continue(message: &str) -> io::Result<bool> {
    print!("{} {} {} ", style("?").cyan(), message, style("[y/N]").dim());
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;

    Ok(matches!(input.trim().to_lowercase().as_str(), "y" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_install_hints_name_the_tool() {
        assert!(install_hint("yt-dlp").contains("yt-dlp"));
        assert!(install_hint("ffprobe").contains("ffmpeg"));
    }
}
