//! One-line status messages and labeled fields.
//!
//! Success and hint lines go to stdout with the report they annotate.
//! Errors and warnings go to stderr so `--json` output stays parseable.

use super::colors::SemanticStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    Error,
    Warn,
    Hint,
}

impl Status {
    fn mark(self) -> String {
        match self {
            Status::Success => "✓".success(),
            Status::Error => "✗".error(),
            Status::Warn => "⚠".warning(),
            Status::Hint => "→".muted(),
        }
    }
}

fn status_line(status: Status, msg: &str) -> String {
    let body = if status == Status::Hint {
        msg.muted()
    } else {
        msg.to_string()
    };
    format!("{} {body}", status.mark())
}

pub fn print_success(msg: &str) {
    println!("{}", status_line(Status::Success, msg));
}

pub fn print_error(msg: &str) {
    eprintln!("{}", status_line(Status::Error, msg));
}

pub fn print_warn(msg: &str) {
    eprintln!("{}", status_line(Status::Warn, msg));
}

pub fn print_hint(msg: &str) {
    println!("{}", status_line(Status::Hint, msg));
}

/// Prints an indented `key: value` row under a section header.
pub fn print_labeled(key: &str, value: &str) {
    println!("  {}: {value}", key.muted());
}

pub fn print_spacer() {
    println!();
}
