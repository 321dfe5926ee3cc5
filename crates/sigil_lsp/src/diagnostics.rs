//! Translate compiler errors into `textDocument/publishDiagnostics` payloads.

use serde_json::{json, Value};

use crate::compiler::{CompilerStack, SourceLocation};
use crate::protocol::Range;

/// The notification params for one URI. Diagnostics replace whatever was
/// published for that URI before.
pub fn publish_params(stack: &CompilerStack, uri: &str, uri_of_unit: impl Fn(&str) -> String) -> Value {
    let mut diagnostics = Vec::new();

    for error in stack.errors() {
        let mut diagnostic = json!({
            "source": "sigil",
            "severity": error.kind.severity(),
            "message": error.message,
            "range": location_range(stack, &error.location).to_json(),
        });
        if let Some(code) = error.code {
            diagnostic["code"] = json!(code);
        }
        if !error.secondary.is_empty() {
            let related: Vec<Value> = error
                .secondary
                .iter()
                .map(|secondary| {
                    let unit = secondary.location.source_name.as_deref().unwrap_or("");
                    json!({
                        "message": secondary.message,
                        "location": {
                            "uri": uri_of_unit(unit),
                            "range": location_range(stack, &secondary.location).to_json(),
                        }
                    })
                })
                .collect();
            diagnostic["relatedInformation"] = json!(related);
        }
        diagnostics.push(diagnostic);
    }

    json!({
        "uri": uri,
        "diagnostics": diagnostics,
    })
}

/// Translate a byte-offset location through its unit's character stream.
pub fn location_range(stack: &CompilerStack, location: &SourceLocation) -> Range {
    let stream = location
        .source_name
        .as_deref()
        .and_then(|name| stack.char_stream(name));
    match stream {
        Some(stream) => stream.range_of(location.start as usize, location.end as usize),
        None => Range::new(
            crate::protocol::Position::new(0, 0),
            crate::protocol::Position::new(0, 0),
        ),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn stack_of(source: &str) -> CompilerStack {
        let mut stack = CompilerStack::new(vec![("/a.sgl".to_string(), source.to_string())]);
        stack.analyze();
        stack
    }

    fn params_of(source: &str) -> Value {
        publish_params(&stack_of(source), "file:///a.sgl", |unit| {
            format!("file://{}", unit)
        })
    }

    #[test]
    fn test_clean_source_publishes_empty_array() {
        let params = params_of("contract C { uint x; }");
        assert_eq!(params["uri"], "file:///a.sgl");
        assert_eq!(params["diagnostics"].as_array().unwrap().len(), 0);
    }

    #[test]
    fn test_error_diagnostic_shape() {
        let params = params_of("function f() { missing = 1; }");
        let diags = params["diagnostics"].as_array().unwrap();
        assert_eq!(diags.len(), 1);
        let d = &diags[0];
        assert_eq!(d["source"], "sigil");
        assert_eq!(d["severity"], 1);
        assert!(d["message"].as_str().unwrap().contains("missing"));
        assert!(d["range"]["start"]["line"].is_number());
        assert_eq!(d["code"], 2001);
    }

    #[test]
    fn test_warning_severity() {
        let params = params_of("function f() { uint dead = 1; }");
        let diags = params["diagnostics"].as_array().unwrap();
        assert_eq!(diags[0]["severity"], 2);
    }

    #[test]
    fn test_related_information_for_duplicates() {
        let params = params_of("contract C { uint x; uint x; }");
        let diags = params["diagnostics"].as_array().unwrap();
        let dup = diags
            .iter()
            .find(|d| d["code"] == 2002)
            .expect("duplicate diagnostic");
        let related = dup["relatedInformation"].as_array().unwrap();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0]["location"]["uri"], "file:///a.sgl");
        // The secondary range points at the first `x`.
        assert_eq!(related[0]["location"]["range"]["start"]["character"], 18);
    }

    #[test]
    fn test_range_is_line_column() {
        let params = params_of("contract C {\n  broken broken broken;\n}");
        let diags = params["diagnostics"].as_array().unwrap();
        assert!(!diags.is_empty());
        assert_eq!(diags[0]["range"]["start"]["line"], 1);
    }
}
