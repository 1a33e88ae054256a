//! Terminal output for fs-strip.

use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

/// Per-file and run-level status lines
pub struct Status;

impl Status {
    /// A file was re-encoded and written to `target`.
    pub fn cleaned(
        path: &Path,
        target: &Path,
        (width, height): (u32, u32),
        before: u64,
        after: u64,
    ) {
        println!(
            "{} {} {} {} {}",
            "✓".green(),
            path.display(),
            "->".dimmed(),
            target.display(),
            format!("({}x{}, {})", width, height, size_change(before, after)).dimmed()
        );
    }

    /// A file was rejected; `code` is the stable error code.
    pub fn rejected(path: &Path, code: &str, message: &str) {
        eprintln!("{} {} [{}] {}", "✗".red(), path.display(), code.yellow(), message);
    }

    /// Print an error that ends the run
    pub fn error(message: impl Display) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Print a section header
    pub fn header(message: &str) {
        println!();
        println!("{}", message.bold());
        println!("{}", "─".repeat(message.chars().count()));
    }
}

/// Progress bar for a batch of files; hidden when `quiet`.
pub fn file_progress(total: u64, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(total);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} images ({eta})")
    {
        pb.set_style(style.progress_chars("█▓░"));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Human-readable byte count
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// `before -> after` with the relative change, e.g. `2.00 KB -> 1.00 KB (-50%)`.
pub fn size_change(before: u64, after: u64) -> String {
    let sizes = format!("{} -> {}", format_size(before), format_size(after));
    if before == 0 {
        return sizes;
    }

    let percent = (after as f64 - before as f64) / before as f64 * 100.0;
    format!("{} ({:+.0}%)", sizes, percent)
}

/// `3 images`, `1 image`
pub fn images(count: usize) -> String {
    if count == 1 {
        "1 image".to_string()
    } else {
        format!("{} images", count)
    }
}
