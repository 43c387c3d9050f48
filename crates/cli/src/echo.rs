use owo_colors::OwoColorize;
use vertito_core::{ChunkStatus, Prepared, SelectionStrategy, TranslatedArticle};

use crate::VERSION;

/// Print a styled banner for verbose mode
pub fn print_banner() {
    eprintln!("\n{} {} {}", "Vertito".bold().bright_blue(), "v".dimmed(), VERSION.dimmed());
    eprintln!("{}", "Extract, chunk and translate articles\n".dimmed());
}

/// Print a styled step message
pub fn print_step(step: usize, total: usize, message: &str) {
    eprintln!("{} {}", format!("[{}/{}]", step, total).dimmed(), message.bright_cyan());
}

/// Print a success message
pub fn print_success(message: &str) {
    eprintln!("{} {}", "✓".green(), message.bright_green());
}

/// Print an info message
pub fn print_info(message: &str) {
    eprintln!("{} {}", "ℹ".blue(), message.bright_blue());
}

/// Print a warning message
pub fn print_warning(message: &str) {
    eprintln!("{} {}", "⚠".yellow(), message.bright_yellow());
}

/// Print an error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red(), message.bright_red());
}

fn print_field(label: &str, value: impl std::fmt::Display) {
    eprintln!("  {} {}", format!("{}:", label).dimmed(), value.to_string().bright_white());
}

/// Print how the text was selected and how it was chunked
pub fn print_preparation(prepared: &Prepared, budget: usize) {
    match prepared.selection.as_ref().map(|s| &s.strategy) {
        Some(SelectionStrategy::Candidate { selector, score }) => {
            print_field("Selected", format!("{} ({:.1})", selector, score));
        }
        Some(SelectionStrategy::Fallback { root, score }) => {
            print_field("Selected", format!("<{}> fallback ({:.1})", root, score));
        }
        Some(SelectionStrategy::FlatText) => print_field("Selected", "flat page text"),
        None => print_field("Selected", "plain text input"),
    }
    print_field("Characters", prepared.text.chars().count());
    print_field("Segments", prepared.document.len());
    print_field("Chunks", format!("{} (budget {})", prepared.chunks.len(), budget));

    let oversized = prepared.chunks.iter().filter(|c| c.is_oversized(budget)).count();
    if oversized > 0 {
        print_warning(&format!("{} chunk(s) exceed the budget", oversized));
    }
    eprintln!();
}

/// Print per-status chunk counts for a finished run
pub fn print_transform_summary(article: &TranslatedArticle) {
    eprintln!("\n{}", "═".repeat(60).dimmed());
    eprintln!("{}", "Transform Details".bold().cyan());
    eprintln!("{}", "═".repeat(60).dimmed());
    print_field("Mode", article.mode);
    print_field("Target", &article.target_language);
    print_field("Succeeded", article.count(ChunkStatus::Success));
    print_field("Fallback used", article.count(ChunkStatus::FallbackUsed));
    print_field("Passed through", article.count(ChunkStatus::FailedPassthrough));
    eprintln!();
}

/// Format file size for display
pub fn format_size(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = 1024 * KB;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }
}
