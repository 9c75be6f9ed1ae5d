//! Terminal notifier: the CLI's stand-in for the web UI's toast stack.
//!
//! Core components report outcomes exclusively through `Notifier`; here
//! each notice becomes one stderr line so it never interleaves with
//! machine-readable stdout.

use std::io::{IsTerminal, Write, stderr};

use owo_colors::OwoColorize;

use mediactl_core::{Notice, Notifier, Severity};

pub struct TermNotifier {
    color: bool,
    quiet: bool,
}

impl TermNotifier {
    pub fn new(color: bool, quiet: bool) -> Self {
        let color = color && stderr().is_terminal();
        Self { color, quiet }
    }

    fn tag(&self, severity: Severity) -> String {
        let plain = match severity {
            Severity::Info => "info",
            Severity::Success => "ok",
            Severity::Warning => "warn",
            Severity::Error => "error",
        };
        if !self.color {
            return plain.to_string();
        }
        match severity {
            Severity::Info => plain.cyan().to_string(),
            Severity::Success => plain.green().to_string(),
            Severity::Warning => plain.yellow().to_string(),
            Severity::Error => plain.red().bold().to_string(),
        }
    }
}

impl Notifier for TermNotifier {
    fn notify(&self, notice: Notice) {
        if self.quiet && notice.severity != Severity::Error {
            return;
        }

        let mut err = stderr().lock();
        let _ = writeln!(
            err,
            "{}: {}: {}",
            self.tag(notice.severity),
            notice.title,
            notice.message
        );
        if let Some(url) = notice.help_url {
            let _ = writeln!(err, "  see: {url}");
        }
    }
}
