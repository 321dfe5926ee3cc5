//! JSON-RPC 2.0 envelope types and LSP wire shapes.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// A JSON-RPC request or notification (no `id`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    pub jsonrpc: String,
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// A JSON-RPC response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

/// A JSON-RPC error object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Response {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(id: Value, code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".into(),
            id,
            result: None,
            error: Some(ResponseError {
                code: code as i32,
                message: message.into(),
                data: None,
            }),
        }
    }
}

/// JSON-RPC / LSP error codes used by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    ParseError = -32700,
    InvalidRequest = -32600,
    MethodNotFound = -32601,
    InvalidParams = -32602,
    InternalError = -32603,
    ServerNotInitialized = -32002,
}

/// Position in a document: 0-based line and UTF-8 byte column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    pub line: u32,
    pub character: u32,
}

impl Position {
    pub fn new(line: u32, character: u32) -> Self {
        Self { line, character }
    }
}

/// A half-open range in a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    pub fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    pub fn to_json(&self) -> Value {
        json!({
            "start": { "line": self.start.line, "character": self.start.character },
            "end": { "line": self.end.line, "character": self.end.character },
        })
    }
}

/// Extract `textDocument.uri` from request params.
pub fn extract_uri(params: &Value) -> Option<&str> {
    params.get("textDocument")?.get("uri")?.as_str()
}

/// Extract `position` from request params.
pub fn extract_position(params: &Value) -> Option<Position> {
    let position = params.get("position")?;
    Some(Position {
        line: position.get("line")?.as_u64()? as u32,
        character: position.get("character")?.as_u64()? as u32,
    })
}

/// Extract a range object (`{start, end}`) from a JSON value.
pub fn extract_range(value: &Value) -> Option<Range> {
    let point = |v: &Value| -> Option<Position> {
        Some(Position {
            line: v.get("line")?.as_u64()? as u32,
            character: v.get("character")?.as_u64()? as u32,
        })
    };
    Some(Range {
        start: point(value.get("start")?)?,
        end: point(value.get("end")?)?,
    })
}

/// The `initialize` result: advertised capabilities and server info.
pub fn server_capabilities() -> Value {
    json!({
        "capabilities": {
            "positionEncoding": "utf-8",
            "textDocumentSync": {
                "openClose": true,
                "change": 2
            },
            "hoverProvider": true,
            "definitionProvider": true,
            "implementationProvider": true,
            "documentHighlightProvider": true,
            "referencesProvider": true,
            "semanticTokensProvider": {
                "legend": {
                    "tokenTypes": crate::semantic_tokens::TOKEN_TYPES,
                    "tokenModifiers": []
                },
                "full": true
            }
        },
        "serverInfo": {
            "name": "sigil-lsp",
            "version": env!("CARGO_PKG_VERSION")
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
