//! Terminal reporting for the charex CLI.
//!
//! Status lines use a right-aligned verb column on stderr, so stdout stays
//! free for the text tree and JSON. The printer also knows how to report
//! the things charex produces: recovered diagnostics, paint order, and
//! what an extraction wrote.

use std::io::{self, IsTerminal, Write};
use std::path::Path;

use crate::container::NodeId;
use crate::validation::{Diagnostic, Severity, ValidationResult};

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

const VERB_WIDTH: usize = 12;

/// How a status line is coloured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tone {
    Progress,
    Note,
    Warn,
}

impl Tone {
    fn ansi(self) -> &'static str {
        match self {
            Tone::Progress => GREEN,
            Tone::Note => CYAN,
            Tone::Warn => YELLOW,
        }
    }
}

/// Status printer. Colour is on when stderr is a terminal.
pub struct Printer {
    color: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self::new()
    }
}

impl Printer {
    pub fn new() -> Self {
        Self::with_color(io::stderr().is_terminal())
    }

    pub fn with_color(color: bool) -> Self {
        Self { color }
    }

    /// Work in progress, e.g. "     Reading hero.chrx".
    pub fn status(&self, verb: &str, message: &str) {
        self.emit(&self.line(Tone::Progress, verb, message));
    }

    /// A finished step.
    pub fn success(&self, verb: &str, message: &str) {
        self.emit(&self.line(Tone::Progress, verb, message));
    }

    pub fn info(&self, verb: &str, message: &str) {
        self.emit(&self.line(Tone::Note, verb, message));
    }

    pub fn warning(&self, verb: &str, message: &str) {
        self.emit(&self.line(Tone::Warn, verb, message));
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color {
            format!("{DIM}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    /// Report every diagnostic, then one summary line if there were any.
    pub fn diagnostics(&self, result: &ValidationResult) {
        for d in result.iter() {
            self.emit(&self.diagnostic(d));
        }
        if let Some(summary) = self.diagnostic_summary(result) {
            self.emit(&summary);
        }
    }

    /// Back-to-front order of a composite.
    pub fn paint_order(&self, order: &[NodeId]) {
        self.emit(&self.line(Tone::Note, "Order", &format_order(order)));
    }

    /// What an extraction wrote into `dir`.
    pub fn wrote(&self, dir: &Path, textures: usize, sprites: usize) {
        let message = format!(
            "{}, {} to {}",
            plural(textures, "texture", "textures"),
            plural(sprites, "sprite", "sprites"),
            display_path(dir)
        );
        self.emit(&self.line(Tone::Progress, "Wrote", &message));
    }

    fn diagnostic(&self, d: &Diagnostic) -> String {
        let label = d.severity.to_string();
        let label = match (self.color, d.severity) {
            (false, _) => label,
            (true, Severity::Error) => format!("{BOLD}{RED}{label}{RESET}"),
            (true, Severity::Warning) => format!("{BOLD}{YELLOW}{label}{RESET}"),
        };
        let subject = d
            .subject
            .as_deref()
            .map(|s| format!(" {}", self.dim(s)))
            .unwrap_or_default();

        let mut out = format!("  {}[{}]{}: {}", label, d.code, subject, d.message);
        if let Some(help) = &d.help {
            out.push_str(&format!("\n    help: {}", help));
        }
        out
    }

    fn diagnostic_summary(&self, result: &ValidationResult) -> Option<String> {
        let errors = result.error_count();
        let warnings = result.warning_count();
        let warned = plural(warnings, "warning", "warnings");

        if errors > 0 {
            let failed = plural(errors, "failed entry", "failed entries");
            Some(self.line(Tone::Warn, "Recovered", &format!("{}, {}", failed, warned)))
        } else if warnings > 0 {
            Some(self.line(Tone::Note, "Checked", &warned))
        } else {
            None
        }
    }

    fn line(&self, tone: Tone, verb: &str, message: &str) -> String {
        if self.color {
            format!("{BOLD}{}{verb:>VERB_WIDTH$}{RESET} {message}", tone.ansi())
        } else {
            format!("{verb:>VERB_WIDTH$} {message}")
        }
    }

    fn emit(&self, text: &str) {
        let _ = writeln!(io::stderr().lock(), "{text}");
    }
}

fn format_order(order: &[NodeId]) -> String {
    if order.is_empty() {
        return "nothing painted".to_string();
    }
    let ids: Vec<String> = order.iter().map(|id| id.to_string()).collect();
    format!("{} (back to front)", ids.join(" < "))
}

/// Pluralize a count: `plural(1, "sprite", "sprites")` gives "1 sprite".
pub fn plural(n: usize, singular: &str, pluralized: &str) -> String {
    if n == 1 {
        format!("{} {}", n, singular)
    } else {
        format!("{} {}", n, pluralized)
    }
}

/// Return a relative display path when possible, absolute otherwise.
pub fn display_path(path: &Path) -> String {
    if let Ok(cwd) = std::env::current_dir() {
        if let Ok(relative) = path.strip_prefix(&cwd) {
            let s = relative.display().to_string();
            if s.is_empty() {
                return ".".to_string();
            }
            return s;
        }
    }
    path.display().to_string()
}
