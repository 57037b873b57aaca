use super::*;
use crate::lexer::token::TokenKind;

fn token(kind: TokenKind, lexeme: &str, index: usize, line: u32, column: u32) -> Token {
    Token::new(kind, lexeme.to_string(), Position::new(index, line, column))
}

#[test]
fn line_at_finds_the_enclosing_line() {
    let source = "let x = 1;\ndebug y;\n";
    // 'y' sits at character offset 17
    assert_eq!(line_at(source, 17), "debug y;");
    assert_eq!(line_at(source, 0), "let x = 1;");
    assert_eq!(line_at(source, 9), "let x = 1;");
}

#[test]
fn line_at_clamps_past_the_end() {
    assert_eq!(line_at("debug x", 100), "debug x");
    assert_eq!(line_at("", 0), "");
}

#[test]
fn marker_pads_to_the_column() {
    assert_eq!(marker(1, 3, '^'), "^^^");
    assert_eq!(marker(3, 2, '^'), "  ^^");
    assert_eq!(marker(5, 1, '-'), "    -");
}

#[test]
fn reporter_records_error_positions() {
    let mut reporter = Reporter::new("test.bz", "debug y;");
    reporter.set_color(false);

    let bad = token(TokenKind::Identifier, "y", 6, 1, 7);
    reporter.error_at("Undeclared identifier", &bad);

    let diagnostics = reporter.diagnostics();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].severity, Severity::Error);
    assert_eq!(diagnostics[0].message, "Undeclared identifier");
    assert_eq!(diagnostics[0].position, Some(Position::new(6, 1, 7)));
    assert_eq!(reporter.error_count(), 1);
}

#[test]
fn reporter_records_hints_and_related_locations() {
    let source = "let a;\nlet a;";
    let mut reporter = Reporter::new("test.bz", source);
    reporter.set_color(false);

    let second = token(TokenKind::Identifier, "a", 11, 2, 5);
    let first = token(TokenKind::Identifier, "a", 4, 1, 5);
    reporter.error_at("Already declared", &second);
    reporter.related_at("Declared here", &first);
    reporter.hint("Shadowing is only allowed across scopes");

    assert_eq!(reporter.error_count(), 1);
    let diagnostics = reporter.diagnostics();
    assert_eq!(diagnostics.len(), 3);
    assert_eq!(diagnostics[1].severity, Severity::Hint);
    assert_eq!(diagnostics[1].position, Some(Position::new(4, 1, 5)));
    assert_eq!(diagnostics[2].position, None);
}

#[test]
fn banner_messages_have_no_position() {
    let mut reporter = Reporter::new("test.bz", "");
    reporter.set_color(false);
    reporter.error_message("Scanning phase failed");

    let diagnostics = reporter.diagnostics();
    assert_eq!(diagnostics[0].position, None);
    assert_eq!(diagnostics[0].severity, Severity::Error);
}

#[test]
fn mark_lexeme_is_plain_without_color() {
    let mut reporter = Reporter::new("test.bz", "let x = 1;");
    reporter.set_color(false);
    assert_eq!(reporter.mark_lexeme("let x = 1;", 5, 1, RED), "let x = 1;");

    reporter.set_color(true);
    let marked = reporter.mark_lexeme("let x = 1;", 5, 1, RED);
    assert!(marked.starts_with("let "));
    assert!(marked.contains(RED));
    assert!(marked.contains(RESET));
    assert!(marked.ends_with(" = 1;"));
}

#[test]
fn mark_lexeme_clamps_out_of_bounds_spans() {
    let mut reporter = Reporter::new("test.bz", "x");
    reporter.set_color(true);
    // A marker wider than the line must not panic
    let marked = reporter.mark_lexeme("x", 1, 10, RED);
    assert!(marked.contains('x'));
}
