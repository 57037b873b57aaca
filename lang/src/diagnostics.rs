//! Diagnostic rendering for all compiler phases.
//!
//! Errors are printed to stderr in a fixed layout: an `ERROR` banner, the
//! source location, the offending line with the lexeme highlighted, and a
//! marker row underneath. Related locations use a blue `-` marker and a
//! `HINT` banner. Every report is also recorded so the driver can replay
//! the diagnostics in a machine-readable format.

#[cfg(test)]
mod tests;

use crate::lexer::token::{Position, Token};

const RED: &str = "\x1b[31m";
const BLUE: &str = "\x1b[34m";
const WHITE: &str = "\x1b[37m";
const BLACK: &str = "\x1b[30m";
const BG_RED: &str = "\x1b[41m";
const BG_BLUE: &str = "\x1b[44m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Hint,
}

/// A recorded report, independent of the text rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub position: Option<Position>,
}

pub struct Reporter<'src> {
    path: String,
    source: &'src str,
    color: bool,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Reporter<'src> {
    pub fn new(path: impl Into<String>, source: &'src str) -> Self {
        Self {
            path: path.into(),
            source,
            color: true,
            diagnostics: Vec::new(),
        }
    }

    pub fn set_color(&mut self, enabled: bool) {
        self.color = enabled;
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Plain `ERROR` banner without a source location
    pub fn error_message(&mut self, message: &str) {
        self.record(Severity::Error, message, None);
        self.print_banner("ERROR", message, RED, BG_RED);
    }

    /// Error with a caret marker under the token's lexeme
    pub fn error_at(&mut self, message: &str, token: &Token) {
        self.error_at_span(message, token.position, token.lexeme_length());
    }

    /// Error with a caret marker of an explicit width
    pub fn error_at_span(&mut self, message: &str, position: Position, length: usize) {
        self.record(Severity::Error, message, Some(position));
        self.print_banner("ERROR", message, RED, BG_RED);
        self.print_source_arrow(position);
        self.print_marked_line(position, length, RED, '^');
    }

    /// `HINT` banner without a source location
    pub fn hint(&mut self, message: &str) {
        self.record(Severity::Hint, message, None);
        self.print_banner("HINT", message, RED, BG_RED);
    }

    /// Related prior location: blue `-` marker plus a `HINT` banner
    pub fn related_at(&mut self, message: &str, token: &Token) {
        self.record(Severity::Hint, message, Some(token.position));
        self.print_source_arrow(token.position);
        self.print_marked_line(token.position, token.lexeme_length(), BLUE, '-');
        self.print_banner("HINT", message, BLUE, BG_BLUE);
    }

    fn record(&mut self, severity: Severity, message: &str, position: Option<Position>) {
        self.diagnostics.push(Diagnostic {
            severity,
            message: message.to_string(),
            position,
        });
    }

    fn print_banner(&self, label: &str, message: &str, color: &str, background: &str) {
        let pad = if label == "ERROR" { "   " } else { "    " };
        if self.color {
            eprintln!(
                "{}{}{}{}{}{}{}{}{}{}",
                background, BLACK, BOLD, label, RESET, pad, color, BOLD, message, RESET
            );
        } else {
            eprintln!("{}{}{}", label, pad, message);
        }
    }

    fn print_source_arrow(&self, position: Position) {
        if self.color {
            eprintln!(
                "{}      → {}:{}:{}{}",
                WHITE, self.path, position.line, position.column, RESET
            );
        } else {
            eprintln!("      → {}:{}:{}", self.path, position.line, position.column);
        }
    }

    fn print_marked_line(&self, position: Position, length: usize, color: &str, icon: char) {
        let line = line_at(self.source, position.index);
        let marked = self.mark_lexeme(&line, position.column, length, color);
        eprintln!("{:5} | {}", position.line, marked);

        let marker = marker(position.column, length, icon);
        if self.color {
            eprintln!("      | {}{}{}", color, marker, RESET);
        } else {
            eprintln!("      | {}", marker);
        }
    }

    /// Re-render the line with the marked lexeme colored
    fn mark_lexeme(&self, line: &str, column: u32, length: usize, color: &str) -> String {
        if !self.color {
            return line.to_string();
        }

        let chars: Vec<char> = line.chars().collect();
        let before_end = (column as usize).saturating_sub(1).min(chars.len());
        let lexeme_end = (before_end + length).min(chars.len());

        let before: String = chars[..before_end].iter().collect();
        let lexeme: String = chars[before_end..lexeme_end].iter().collect();
        let after: String = chars[lexeme_end..].iter().collect();

        format!("{}{}{}{}{}{}", before, color, BOLD, lexeme, RESET, after)
    }
}

/// Marker row: spaces up to the column, then a run of the marker icon
fn marker(column: u32, length: usize, icon: char) -> String {
    let mut marker = String::new();
    for _ in 1..column {
        marker.push(' ');
    }
    for _ in 0..length {
        marker.push(icon);
    }
    marker
}

/// The full source line containing the given character offset
fn line_at(source: &str, index: usize) -> String {
    let chars: Vec<char> = source.chars().collect();
    let clamped = index.min(chars.len());

    let mut start = clamped;
    while start > 0 && chars[start - 1] != '\n' {
        start -= 1;
    }

    let mut end = clamped;
    while end < chars.len() && chars[end] != '\n' {
        end += 1;
    }

    chars[start..end].iter().collect()
}
