//! Machine-readable diagnostics output for the `--json` mode.
//!
//! The collected diagnostics are replayed as a single JSON object on
//! stdout so editors and CI systems do not have to parse the human
//! rendering on stderr.

use breeze_lang::diagnostics::{Diagnostic, Reporter, Severity};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct JsonDiagnostic {
    pub severity: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub column: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    #[serde(rename = "type")]
    pub output_type: &'static str,
    pub errors: u32,
    pub diagnostics: Vec<JsonDiagnostic>,
}

fn severity_label(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "error",
        Severity::Hint => "hint",
    }
}

fn to_json_diagnostic(diagnostic: &Diagnostic) -> JsonDiagnostic {
    JsonDiagnostic {
        severity: severity_label(diagnostic.severity),
        message: diagnostic.message.clone(),
        line: diagnostic.position.map(|p| p.line),
        column: diagnostic.position.map(|p| p.column),
    }
}

pub fn diagnostics_json(reporter: &Reporter) -> String {
    let output = JsonOutput {
        output_type: "diagnostics",
        errors: reporter.error_count() as u32,
        diagnostics: reporter.diagnostics().iter().map(to_json_diagnostic).collect(),
    };

    serde_json::to_string(&output).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;
    use breeze_lang::lexer::Position;

    #[test]
    fn severity_labels() {
        assert_eq!(severity_label(Severity::Error), "error");
        assert_eq!(severity_label(Severity::Hint), "hint");
    }

    #[test]
    fn json_diagnostic_serialization() {
        let diagnostic = Diagnostic {
            severity: Severity::Error,
            message: "Undeclared identifier".to_string(),
            position: Some(Position::new(6, 1, 7)),
        };
        let json = serde_json::to_string(&to_json_diagnostic(&diagnostic)).unwrap();
        assert!(json.contains(r#""severity":"error""#));
        assert!(json.contains(r#""message":"Undeclared identifier""#));
        assert!(json.contains(r#""line":1"#));
        assert!(json.contains(r#""column":7"#));
    }

    #[test]
    fn json_diagnostic_omits_missing_position() {
        let diagnostic = Diagnostic {
            severity: Severity::Error,
            message: "Scanning phase failed".to_string(),
            position: None,
        };
        let json = serde_json::to_string(&to_json_diagnostic(&diagnostic)).unwrap();
        assert!(!json.contains(r#""line""#));
        assert!(!json.contains(r#""column""#));
    }

    #[test]
    fn diagnostics_json_shape() {
        let mut reporter = Reporter::new("test.bz", "debug a;");
        reporter.set_color(false);
        reporter.error_message("Scanning phase failed");

        let json = diagnostics_json(&reporter);
        assert!(json.contains(r#""type":"diagnostics""#));
        assert!(json.contains(r#""errors":1"#));
        assert!(json.contains(r#""message":"Scanning phase failed""#));
    }
}
