use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", (secs / 60.0).floor(), secs % 60.0)
    }
}

pub fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

/// Switch a spinner to a percentage bar.
pub fn as_percent_bar(pb: &ProgressBar) {
    pb.set_length(100);
    pb.set_style(
        ProgressStyle::default_bar()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg} [{bar:30.cyan/blue}] {pos:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
}

pub fn done_line(msg: impl std::fmt::Display, elapsed: Option<Duration>) -> String {
    let timing = elapsed
        .map(|d| format!(" {}", style(format!("[{}]", format_duration(d))).dim()))
        .unwrap_or_default();
    format!("{} {}{}", style("✓").green().bold(), msg, timing)
}

pub fn cached_line(msg: impl std::fmt::Display) -> String {
    format!("{} {} {}", style("✓").green().bold(), msg, style("(cached)").dim())
}

pub fn error_line(msg: impl std::fmt::Display) -> String {
    format!("{} {}", style("Error:").red().bold(), msg)
}

pub fn rule() -> String {
    style("─".repeat(60)).dim().to_string()
}

pub fn heading(title: &str) -> String {
    format!("\n{}\n{}", style(title).cyan().bold(), rule())
}
