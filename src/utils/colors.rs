/// ANSI color helper utilities for terminal output.
pub const RESET: &str = "\x1b[0m";

pub const GREY: &str = "\x1b[90m";

pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";

pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

/// Grey out placeholders such as `--` or an empty cell.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

/// Drift color: any difference → red, none → green.
pub fn color_for_drift(diff: f64, tolerance: f64) -> &'static str {
    if diff.abs() > tolerance { RED } else { GREEN }
}
