//! Languages command implementation.

use crate::cli::Output;
use crate::language::Language;

/// List supported target languages.
pub fn run_languages() {
    Output::header("Supported Languages");
    for language in Language::all() {
        Output::list_item(&format!("{:<10} ({})", language.label(), language.code()));
    }
}
