use std::fmt;

use colored::Colorize;
use rust_decimal::Decimal;

/// Message categories used by the CLI output helpers.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Warning,
    Error,
    Section,
}

/// Output styling; `plain` disables colour for pipes and screen readers.
#[derive(Clone, Copy, Debug, Default)]
pub struct Output {
    pub plain: bool,
}

impl Output {
    pub fn new(plain: bool) -> Self {
        Self { plain }
    }

    fn style(&self, kind: MessageKind, message: impl fmt::Display) -> String {
        let text = message.to_string();
        let base = match kind {
            MessageKind::Section => format!("=== {} ===", text.trim()),
            MessageKind::Info => text,
            MessageKind::Warning => format!("WARNING: {text}"),
            MessageKind::Error => format!("ERROR: {text}"),
        };
        if self.plain {
            return base;
        }
        match kind {
            MessageKind::Section => base.bold().to_string(),
            MessageKind::Warning => base.bright_yellow().to_string(),
            MessageKind::Error => base.bright_red().to_string(),
            MessageKind::Info => base,
        }
    }

    pub fn section(&self, title: impl fmt::Display) {
        println!("{}", self.style(MessageKind::Section, title));
    }

    pub fn line(&self, text: impl fmt::Display) {
        println!("{}", self.style(MessageKind::Info, text));
    }

    pub fn warning(&self, message: impl fmt::Display) {
        eprintln!("{}", self.style(MessageKind::Warning, message));
    }

    pub fn error(&self, message: impl fmt::Display) {
        eprintln!("{}", self.style(MessageKind::Error, message));
    }

    /// Signed amount, green when positive and red when negative.
    pub fn signed(&self, value: Decimal) -> String {
        let text = format!("{:>12}", amount(value));
        if self.plain || value.is_zero() {
            text
        } else if value.is_sign_negative() {
            text.red().to_string()
        } else {
            text.green().to_string()
        }
    }
}

/// Two-decimal rendering used in every table.
pub fn amount(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}
