//! Interactive Q&A command.

use super::{parse_optional_language, preflight_or_hint};
use crate::cli::preflight::Operation;
use crate::cli::Output;
use crate::config::Settings;
use crate::pipeline::Pipeline;
use console::style;
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Run the interactive chat command.
pub async fn run_chat(
    translation: Option<&str>,
    language: Option<&str>,
    settings: Settings,
) -> anyhow::Result<()> {
    let language = parse_optional_language(language)?;
    preflight_or_hint(Operation::Ask, &settings)?;

    let pipeline = Pipeline::new(settings)?;
    let mut session = pipeline.open_session(translation.map(Path::new), language)?;

    let doc = session.document();
    println!("\n{}", style("Vaani Chat").bold().cyan());
    Output::kv("Video", &doc.title);
    Output::kv("Language", doc.target_language.label());
    if !session.log().is_empty() {
        Output::kv("Previous turns", &session.log().len().to_string());
    }
    println!(
        "{}\n",
        style("Type your questions, or '/exit' to quit. Use '/history' to show past turns.").dim()
    );

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", style("You:").green().bold());
        stdout.flush()?;

        let mut input = String::new();
        if stdin.lock().read_line(&mut input)? == 0 {
            break;
        }

        let input = match parse_line(&input) {
            ReplInput::Empty => continue,
            ReplInput::Exit => {
                Output::info("Goodbye!");
                break;
            }
            ReplInput::History => {
                for turn in session.log().turns() {
                    println!(
                        "{} {}\n{} {}\n",
                        style("Q:").green(),
                        turn.question,
                        style("A:").cyan(),
                        turn.answer
                    );
                }
                continue;
            }
            ReplInput::Unknown(command) => {
                Output::warning(&format!(
                    "Unknown command '{}'. Commands: /history, /exit, /quit",
                    command
                ));
                continue;
            }
            ReplInput::Question(question) => question,
        };

        match session.ask(input).await {
            Ok(answer) => println!("\n{} {}\n", style("Vaani:").cyan().bold(), answer),
            // Not fatal: the log is unchanged and the question can be asked again.
            Err(e) => Output::error(&format!("Error: {}", e)),
        }
    }

    Ok(())
}

/// One line typed at the chat prompt. Commands start with `/` so any plain
/// text, including "exit" or "history", can be asked as a question.
#[derive(Debug, PartialEq)]
enum ReplInput<'a> {
    Empty,
    Exit,
    History,
    Unknown(&'a str),
    Question(&'a str),
}

fn parse_line(line: &str) -> ReplInput<'_> {
    let line = line.trim();
    if line.is_empty() {
        return ReplInput::Empty;
    }
    match line.strip_prefix('/') {
        Some(command) => match command.to_ascii_lowercase().as_str() {
            "exit" | "quit" => ReplInput::Exit,
            "history" => ReplInput::History,
            _ => ReplInput::Unknown(line),
        },
        None => ReplInput::Question(line),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_words_are_questions() {
        assert_eq!(parse_line("exit\n"), ReplInput::Question("exit"));
        assert_eq!(parse_line(" history "), ReplInput::Question("history"));
        assert_eq!(parse_line("quit"), ReplInput::Question("quit"));
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(parse_line("/exit"), ReplInput::Exit);
        assert_eq!(parse_line("/QUIT\n"), ReplInput::Exit);
        assert_eq!(parse_line("/history"), ReplInput::History);
        assert_eq!(parse_line("/help"), ReplInput::Unknown("/help"));
        assert_eq!(parse_line("   \n"), ReplInput::Empty);
    }
}
