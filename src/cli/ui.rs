use std::io::{stderr, stdout, Write};

use crossterm::{
    execute,
    style::{Color as CtColor, Print, ResetColor, SetForegroundColor},
};
use figlet_rs::FIGfont;

use crate::error::SwitchError;

/// Colours are on unless NO_COLOR is set (`--no-color` sets it too)
pub fn colors_enabled() -> bool {
    std::env::var_os("NO_COLOR").is_none()
}

fn emit<W: Write>(mut out: W, color: CtColor, prefix: &str, message: &str) {
    if colors_enabled() {
        let _ = execute!(
            out,
            SetForegroundColor(color),
            Print(prefix),
            Print(message),
            Print("\n"),
            ResetColor
        );
    } else {
        let _ = writeln!(out, "{}{}", prefix, message);
    }
}

/// ASCII art shown above the help text
pub fn ascii_banner() -> String {
    let Ok(font) = FIGfont::standard() else {
        return String::new();
    };
    let banner = font
        .convert("NPM SWITCH")
        .map(|figure| figure.to_string())
        .unwrap_or_default();
    banner
}

/// Print success message
pub fn print_success(message: &str) {
    emit(stdout(), CtColor::Green, "✅ ", message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    emit(stdout(), CtColor::Yellow, "⚠️  ", message);
}

/// Print info message
pub fn print_info(message: &str) {
    emit(stdout(), CtColor::Blue, "ℹ️  ", message);
}

/// Print error message
pub fn print_error(error: &SwitchError) {
    emit(stderr(), CtColor::Red, "❌ ", &error.to_string());
}

/// Print a snapshot with its header line
pub fn print_snapshot(name: &str, content: &str) {
    emit(stdout(), CtColor::Cyan, "", &format!("\n===== {} =====", name));
    println!("{}", content);
}
