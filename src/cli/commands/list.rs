//! List command implementation.

use crate::cli::Output;
use crate::config::Settings;
use crate::store::Workspace;
use anyhow::Result;
use std::time::SystemTime;

/// Run the list command.
pub fn run_list(settings: &Settings) -> Result<()> {
    let workspace = Workspace::new(settings.data_dir());
    let artifacts = workspace.list()?;

    if artifacts.is_empty() {
        Output::info("Nothing saved yet. Use 'vaani transcribe <input>' to start.");
        return Ok(());
    }

    Output::header(&format!("Saved Files ({})", artifacts.len()));
    Output::kv("Directory", &workspace.root().display().to_string());
    println!();

    let now = SystemTime::now();
    for artifact in &artifacts {
        let name = artifact
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let age = now
            .duration_since(artifact.modified)
            .map(|d| format!("{} ago", format_age(d.as_secs())))
            .unwrap_or_else(|_| "just now".to_string());
        Output::artifact(&artifact.kind.to_string(), &name, artifact.size_bytes, &age);
    }

    Ok(())
}

fn format_age(seconds: u64) -> String {
    match seconds {
        0..=59 => format!("{}s", seconds),
        60..=3599 => format!("{}m", seconds / 60),
        3600..=86_399 => format!("{}h", seconds / 3600),
        _ => format!("{}d", seconds / 86_400),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(5), "5s");
        assert_eq!(format_age(125), "2m");
        assert_eq!(format_age(7200), "2h");
        assert_eq!(format_age(200_000), "2d");
    }
}
