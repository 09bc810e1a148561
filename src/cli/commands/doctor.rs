//! Doctor command - verify system requirements and configuration.

use crate::cli::Output;
use crate::config::{Settings, TranslationProvider};
use crate::store::{ArtifactKind, Workspace};
use crate::translation::GOOGLE_API_KEY_VAR;
use console::style;
use std::process::Command;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

fn print_section(title: &str, checks: &[CheckResult]) {
    println!("{}", style(title).bold());
    for check in checks {
        check.print();
    }
    println!();
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Vaani Doctor");
    println!();

    let mut checks = Vec::new();

    let tools = vec![
        check_tool("yt-dlp", &["--version"], install_hint_ytdlp()),
        check_tool("ffmpeg", &["-version"], install_hint_ffmpeg()),
        check_tool("ffprobe", &["-version"], install_hint_ffmpeg()),
    ];
    print_section("External Tools", &tools);
    checks.extend(tools);

    let keys = check_api_keys(settings);
    print_section("API Keys", &keys);
    checks.extend(keys);

    let storage = check_storage(settings);
    print_section("Storage", &storage);
    checks.extend(storage);

    let config = vec![check_config_file()];
    print_section("Configuration", &config);
    checks.extend(config);

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Vaani.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Vaani is ready to use.");
    }

    Ok(())
}

fn check_tool(name: &str, args: &[&str], hint: &str) -> CheckResult {
    match Command::new(name).args(args).output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .chars()
                .take(50)
                .collect::<String>();
            CheckResult::ok(name, &version)
        }
        Ok(_) => CheckResult::error(name, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(name, "not found", hint)
        }
        Err(e) => CheckResult::error(name, &format!("error: {}", e), hint),
    }
}

fn check_api_keys(settings: &Settings) -> Vec<CheckResult> {
    let google_required = settings.translation.provider == TranslationProvider::Google;
    vec![
        check_key(std::env::var("OPENAI_API_KEY").ok(), "OPENAI_API_KEY", true),
        check_key(std::env::var(GOOGLE_API_KEY_VAR).ok(), GOOGLE_API_KEY_VAR, google_required),
    ]
}

/// A missing key is an error only when the configured stages need it.
fn check_key(value: Option<String>, var: &str, required: bool) -> CheckResult {
    let hint = format!("Set with: export {}='...'", var);
    match value {
        Some(key) if key.len() > 12 => {
            let masked: String = key.chars().take(4).collect();
            CheckResult::ok(var, &format!("configured ({}...)", masked))
        }
        Some(key) if !key.is_empty() => {
            CheckResult::warning(var, "set but looks too short", &hint)
        }
        _ if required => CheckResult::error(var, "not set", &hint),
        _ => CheckResult::warning(var, "not set (not needed by current config)", &hint),
    }
}

fn check_storage(settings: &Settings) -> Vec<CheckResult> {
    let data_dir = settings.data_dir();
    if !data_dir.exists() {
        return vec![CheckResult::warning(
            "Data directory",
            &format!("{} (will be created)", data_dir.display()),
            "Directory will be created on first use",
        )];
    }

    let mut results = vec![CheckResult::ok("Data directory", &data_dir.display().to_string())];
    match Workspace::new(&data_dir).list() {
        Ok(artifacts) => {
            let count = |kind: ArtifactKind| artifacts.iter().filter(|a| a.kind == kind).count();
            results.push(CheckResult::ok(
                "Artifacts",
                &format!(
                    "{} transcript(s), {} translation(s), {} audio file(s)",
                    count(ArtifactKind::Transcript),
                    count(ArtifactKind::Translation),
                    count(ArtifactKind::Speech)
                ),
            ));
        }
        Err(e) => results.push(CheckResult::error(
            "Artifacts",
            &format!("cannot read data directory: {}", e),
            "Check the directory permissions",
        )),
    }
    results
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &config_path.display().to_string())
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: vaani init (or vaani config edit)",
        )
    }
}

fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}

fn install_hint_ffmpeg() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install ffmpeg"
    } else if cfg!(target_os = "linux") {
        "Install with: sudo apt install ffmpeg (or your package manager)"
    } else {
        "Install from: https://ffmpeg.org/download.html"
    }
}
