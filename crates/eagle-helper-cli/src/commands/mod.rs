pub mod completions;
pub mod doctor;
pub mod init;
pub mod internal;
pub mod man_pages;
pub mod walk;

use eagle_helper_core::I18n;
use eagle_helper_schema::ManifestError;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_MANIFEST_ERROR: u8 = 2;

/// Prefix `main` keys on to pick [`EXIT_MANIFEST_ERROR`].
pub const MANIFEST_ERROR_PREFIX: &str = "manifest error:";

pub fn json_pretty(value: &impl serde::Serialize) -> Result<String, String> {
    serde_json::to_string_pretty(value).map_err(|e| format!("JSON serialization failed: {e}"))
}

pub fn manifest_error(e: &ManifestError) -> String {
    format!("{MANIFEST_ERROR_PREFIX} {e}")
}

/// Save strings translated during this run. Called on every way out of
/// the process, `clap::Error::exit` included.
pub fn persist_strings(i18n: &mut I18n) {
    match i18n.persist() {
        Ok(true) => tracing::debug!("saved translated strings for {}", i18n.language()),
        Ok(false) => {}
        Err(e) => tracing::warn!("could not save translated strings: {e}"),
    }
}

/// Print a clap error and exit, keeping what was translated so far.
pub fn exit_with(i18n: &mut I18n, err: &clap::Error) -> ! {
    persist_strings(i18n);
    err.exit()
}

/// A spinner on stderr. Hidden automatically when stderr is not a terminal.
pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner:.cyan} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]);
    pb.set_style(style);
    pb.set_message(msg.to_owned());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

fn finished_style() -> ProgressStyle {
    ProgressStyle::with_template("{msg}").unwrap_or_else(|_| ProgressStyle::default_spinner())
}

pub fn spin_ok(pb: &ProgressBar, msg: &str) {
    pb.set_style(finished_style());
    pb.finish_with_message(format!("✓ {msg}"));
}

pub fn spin_fail(pb: &ProgressBar, msg: &str) {
    pb.set_style(finished_style());
    pb.finish_with_message(format!("✗ {msg}"));
}

/// Color a doctor check status for terminal output.
pub fn colorize_status(status: &str) -> String {
    use console::Style;
    match status {
        "pass" => Style::new().green().apply_to("✓").to_string(),
        "fail" => Style::new().red().bold().apply_to("✗").to_string(),
        "warn" => Style::new().yellow().apply_to("⚠").to_string(),
        _ => Style::new().dim().apply_to("ℹ").to_string(),
    }
}

/// Split a comma-separated flag value, dropping blanks.
pub fn split_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
        .collect()
}
