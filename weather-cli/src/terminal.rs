use std::io::{self, Write};

use weather_core::{DisplayFields, DisplaySurface};

/// Prints widget output to the terminal.
#[derive(Debug, Default)]
pub struct TerminalDisplay;

pub fn print_fields(fields: &DisplayFields) {
    println!("{}", fields.city);
    println!("  {}  {} [{}]", fields.temperature, fields.description, fields.icon.asset_path());
    println!("  Sunrise: {}", fields.sunrise);
    println!("  Sunset: {}", fields.sunset);
}

impl DisplaySurface for TerminalDisplay {
    fn render(&self, fields: &DisplayFields) {
        print_fields(fields);
    }

    fn show_error(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    // scrollback keeps old banners; nothing to dismiss
    fn hide_error(&self) {}

    // the interactive loop offers suggestions through a select prompt
    fn render_suggestions(&self, _suggestions: &[String]) {}

    fn render_clock(&self, text: &str) {
        let mut out = io::stdout().lock();
        let _ = write!(out, "\r{text}");
        let _ = out.flush();
    }
}
