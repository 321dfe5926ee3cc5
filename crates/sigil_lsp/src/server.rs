//! The language server: lifecycle, method dispatch, and request handlers.
//!
//! Single-threaded and synchronous: `run` dequeues one message at a time and
//! handles it to completion, so replies and notifications leave in arrival
//! order. The compiler façade, the VFS and the settings object are owned
//! here and touched from no other thread.

use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use sigil_ast::NodeId;

use crate::charstream;
use crate::compiler::{uri_to_source_unit_name, CompilerStack, SourceLocation};
use crate::diagnostics;
use crate::goto;
use crate::hover;
use crate::locator::locate_node;
use crate::protocol::{
    extract_position, extract_range, extract_uri, server_capabilities, ErrorCode, Position,
    Request,
};
use crate::references::{self, HighlightKind};
use crate::semantic_tokens;
use crate::transport::Transport;
use crate::vfs::Vfs;

/// Where the server is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Starting,
    Initialized,
    Running,
    ShutdownRequested,
    Exited,
}

/// Client trace setting from `initialize`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceLevel {
    Off,
    Messages,
    Verbose,
}

/// A handler failure. Failures never kill the dispatch loop.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("invalid parameters: {0}")]
    InvalidParams(&'static str),
}

/// The method set the dispatcher accepts; anything else is MethodNotFound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Method {
    Initialize,
    Initialized,
    Shutdown,
    Exit,
    CancelRequest,
    DidOpen,
    DidChange,
    DidClose,
    DidChangeConfiguration,
    Definition,
    Implementation,
    Hover,
    DocumentHighlight,
    References,
    SemanticTokensFull,
}

impl Method {
    fn from_name(name: &str) -> Option<Method> {
        let method = match name {
            "initialize" => Method::Initialize,
            "initialized" => Method::Initialized,
            "shutdown" => Method::Shutdown,
            "exit" => Method::Exit,
            "$/cancelRequest" | "cancelRequest" => Method::CancelRequest,
            "textDocument/didOpen" => Method::DidOpen,
            "textDocument/didChange" => Method::DidChange,
            "textDocument/didClose" => Method::DidClose,
            "workspace/didChangeConfiguration" => Method::DidChangeConfiguration,
            "textDocument/definition" => Method::Definition,
            "textDocument/implementation" => Method::Implementation,
            "textDocument/hover" => Method::Hover,
            "textDocument/documentHighlight" => Method::DocumentHighlight,
            "textDocument/references" => Method::References,
            "textDocument/semanticTokens/full" => Method::SemanticTokensFull,
            _ => return None,
        };
        Some(method)
    }
}

/// The Sigil language server, managing one client over one transport.
pub struct LanguageServer<T: Transport> {
    transport: T,
    vfs: Vfs,
    compiler: Option<CompilerStack>,
    state: ServerState,
    trace: TraceLevel,
    settings: Value,
    root_path: String,
    shutdown_requested: bool,
    exit_requested: bool,
}

impl<T: Transport> LanguageServer<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            vfs: Vfs::new(uri_to_source_unit_name),
            compiler: None,
            state: ServerState::Starting,
            trace: TraceLevel::Off,
            settings: Value::Null,
            root_path: "/".into(),
            shutdown_requested: false,
            exit_requested: false,
        }
    }

    pub fn state(&self) -> ServerState {
        self.state
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn vfs(&self) -> &Vfs {
        &self.vfs
    }

    /// The client-supplied settings object, if any.
    pub fn settings(&self) -> &Value {
        &self.settings
    }

    pub fn root_path(&self) -> &str {
        &self.root_path
    }

    /// Loop over incoming messages until `exit` or transport closure.
    ///
    /// Returns whether shutdown was requested beforehand: `true` maps to
    /// process exit code 0, `false` to 1.
    pub fn run(&mut self) -> bool {
        info!("language server entering dispatch loop");
        while !self.exit_requested && !self.transport.closed() {
            let Some(message) = self.transport.receive() else {
                continue;
            };
            self.handle_message(message);
        }
        self.state = ServerState::Exited;
        info!(clean = self.shutdown_requested, "language server exiting");
        self.shutdown_requested
    }

    // ---- Dispatch ----

    fn handle_message(&mut self, message: Value) {
        if self.trace == TraceLevel::Verbose {
            debug!(%message, "incoming message");
        }
        let fallback_id = message.get("id").cloned().unwrap_or(Value::Null);

        let request: Request = match serde_json::from_value(message) {
            Ok(request) => request,
            Err(err) => {
                warn!(%err, "malformed JSON-RPC message");
                if !fallback_id.is_null() {
                    self.transport
                        .error(fallback_id, ErrorCode::InvalidRequest, "malformed message");
                }
                return;
            }
        };
        let id = request.id.unwrap_or(Value::Null);
        let is_request = !id.is_null();
        let params = request.params;

        let Some(method) = Method::from_name(&request.method) else {
            debug!(method = %request.method, "unknown method");
            self.transport.error(
                id,
                ErrorCode::MethodNotFound,
                &format!("Unknown method {}", request.method),
            );
            return;
        };
        let method_name = request.method;

        // Lifecycle gating. Only `initialize` is served before the
        // handshake; after `shutdown` only `exit` is honored.
        match self.state {
            ServerState::Starting | ServerState::Exited => {
                if !matches!(
                    method,
                    Method::Initialize | Method::Exit | Method::CancelRequest
                ) {
                    if is_request {
                        self.transport.error(
                            id,
                            ErrorCode::ServerNotInitialized,
                            "server not initialized",
                        );
                    }
                    return;
                }
            }
            ServerState::ShutdownRequested => {
                if !matches!(method, Method::Exit | Method::CancelRequest) {
                    if is_request {
                        self.transport
                            .error(id, ErrorCode::InvalidRequest, "shutdown in progress");
                    }
                    return;
                }
            }
            ServerState::Initialized | ServerState::Running => {}
        }

        if let Err(err) = self.dispatch(method, id.clone(), &params) {
            debug!(method = %method_name, error = %err, "handler rejected message");
            if is_request {
                self.transport
                    .error(id, ErrorCode::InvalidParams, &err.to_string());
            }
        }
    }

    fn dispatch(&mut self, method: Method, id: Value, params: &Value) -> Result<(), ServerError> {
        match method {
            Method::Initialize => self.handle_initialize(id, params),
            Method::Initialized => {
                self.state = ServerState::Running;
                Ok(())
            }
            Method::Shutdown => {
                self.shutdown_requested = true;
                self.state = ServerState::ShutdownRequested;
                self.transport.reply(id, Value::Null);
                Ok(())
            }
            Method::Exit => {
                self.exit_requested = true;
                Ok(())
            }
            // Every request is synchronous; there is nothing to cancel.
            Method::CancelRequest => Ok(()),
            Method::DidOpen => self.handle_did_open(params),
            Method::DidChange => self.handle_did_change(params),
            // The VFS keeps the buffer for cross-file queries.
            Method::DidClose => Ok(()),
            Method::DidChangeConfiguration => {
                if let Some(settings) = params.get("settings") {
                    if settings.is_object() {
                        self.settings = settings.clone();
                    }
                }
                Ok(())
            }
            Method::Definition | Method::Implementation => self.handle_goto_definition(id, params),
            Method::Hover => self.handle_hover(id, params),
            Method::DocumentHighlight => self.handle_document_highlight(id, params),
            Method::References => self.handle_references(id, params),
            Method::SemanticTokensFull => self.handle_semantic_tokens(id, params),
        }
    }

    // ---- Lifecycle handlers ----

    fn handle_initialize(&mut self, id: Value, params: &Value) -> Result<(), ServerError> {
        if let Some(uri) = params.get("rootUri").and_then(|v| v.as_str()) {
            self.root_path = uri.to_string();
        } else if let Some(path) = params.get("rootPath").and_then(|v| v.as_str()) {
            self.root_path = path.to_string();
        }

        if let Some(trace) = params.get("trace").and_then(|v| v.as_str()) {
            self.trace = match trace {
                "messages" => TraceLevel::Messages,
                "verbose" => TraceLevel::Verbose,
                _ => TraceLevel::Off,
            };
        }

        if let Some(options) = params.get("initializationOptions") {
            if options.is_object() {
                self.settings = options.clone();
            }
        }

        info!(root = %self.root_path, "initialized");
        self.state = ServerState::Initialized;
        self.transport.reply(id, server_capabilities());
        Ok(())
    }

    // ---- Document sync handlers ----

    fn handle_did_open(&mut self, params: &Value) -> Result<(), ServerError> {
        let document = params
            .get("textDocument")
            .ok_or(ServerError::InvalidParams("missing textDocument"))?;
        let uri = document
            .get("uri")
            .and_then(|v| v.as_str())
            .ok_or(ServerError::InvalidParams("missing textDocument.uri"))?;
        let text = document
            .get("text")
            .and_then(|v| v.as_str())
            .ok_or(ServerError::InvalidParams("missing textDocument.text"))?;

        self.vfs.set_source(uri, text.to_string());
        self.compile_and_publish(uri);
        Ok(())
    }

    fn handle_did_change(&mut self, params: &Value) -> Result<(), ServerError> {
        let uri = extract_uri(params)
            .ok_or(ServerError::InvalidParams("missing textDocument.uri"))?
            .to_string();
        let changes = params
            .get("contentChanges")
            .and_then(|v| v.as_array())
            .ok_or(ServerError::InvalidParams("missing contentChanges"))?;

        for change in changes {
            if !change.is_object() {
                // Broken client; skip silently.
                continue;
            }
            if !self.vfs.contains(&uri) {
                continue;
            }
            let Some(text) = change.get("text").and_then(|v| v.as_str()) else {
                continue;
            };
            match change.get("range") {
                Some(range_value) if range_value.is_object() => {
                    let Some(range) = extract_range(range_value) else {
                        continue;
                    };
                    let Some(buffer) = self.vfs.get_source(&uri) else {
                        continue;
                    };
                    // Half-open range: the replaced count is end - start.
                    // An edit with unmappable positions is dropped whole.
                    match charstream::apply_change(buffer, range, text) {
                        Some(edited) => self.vfs.set_source(&uri, edited),
                        None => warn!(%uri, "dropping edit with out-of-range position"),
                    }
                }
                _ => {
                    // Full content update.
                    self.vfs.set_source(&uri, text.to_string());
                }
            }
        }

        if !changes.is_empty() {
            self.compile_and_publish(&uri);
        }
        Ok(())
    }

    // ---- Compilation ----

    /// Build a fresh compiler stack from the current VFS contents and drive
    /// it to analysis. Every previous handle is invalidated.
    fn compile(&mut self, uri: &str) -> bool {
        if !self.vfs.contains(uri) {
            warn!(%uri, "compile requested for unknown document");
            return false;
        }
        let mut stack =
            CompilerStack::new(self.vfs.iter().map(|(name, text)| (name, text.to_string())));
        stack.analyze();
        self.compiler = Some(stack);
        true
    }

    fn compile_and_publish(&mut self, uri: &str) {
        if !self.compile(uri) {
            return;
        }
        let Some(stack) = self.compiler.as_ref() else {
            return;
        };
        let vfs = &self.vfs;
        let params = diagnostics::publish_params(stack, uri, |unit| {
            vfs.uri_for(unit).unwrap_or(unit).to_string()
        });
        self.transport
            .notify("textDocument/publishDiagnostics", params);
    }

    // ---- Query plumbing ----

    fn document_position(params: &Value) -> Result<(String, Position), ServerError> {
        let uri = extract_uri(params)
            .ok_or(ServerError::InvalidParams("missing textDocument.uri"))?
            .to_string();
        let position =
            extract_position(params).ok_or(ServerError::InvalidParams("missing position"))?;
        Ok((uri, position))
    }

    /// Resolve a document position to the AST node under the cursor.
    fn request_ast_node(&mut self, uri: &str, position: Position) -> Option<(String, NodeId)> {
        if self.compiler.is_none() && !self.compile(uri) {
            return None;
        }
        let stack = self.compiler.as_ref()?;
        let unit = self.vfs.path_to_source_unit_name(uri);
        let stream = stack.char_stream(&unit)?;
        let offset = stream.offset_of(position.line, position.character)?;
        let (arena, root) = stack.ast(&unit)?;
        let node = locate_node(arena, root, offset as u32)?;
        Some((unit, node))
    }

    fn location_to_json(&self, stack: &CompilerStack, location: &SourceLocation) -> Value {
        let unit = location.source_name.as_deref().unwrap_or("");
        let uri = self.vfs.uri_for(unit).unwrap_or(unit);
        json!({
            "uri": uri,
            "range": diagnostics::location_range(stack, location).to_json(),
        })
    }

    // ---- Query handlers ----

    fn handle_goto_definition(&mut self, id: Value, params: &Value) -> Result<(), ServerError> {
        let (uri, position) = Self::document_position(params)?;
        let Some((unit, node)) = self.request_ast_node(&uri, position) else {
            self.transport.reply(id, json!([]));
            return Ok(());
        };
        let Some(stack) = self.compiler.as_ref() else {
            self.transport.reply(id, json!([]));
            return Ok(());
        };
        let locations = goto::definition_locations(stack, &unit, node);
        let reply: Vec<Value> = locations
            .iter()
            .map(|location| self.location_to_json(stack, location))
            .collect();
        self.transport.reply(id, json!(reply));
        Ok(())
    }

    fn handle_hover(&mut self, id: Value, params: &Value) -> Result<(), ServerError> {
        let (uri, position) = Self::document_position(params)?;
        let Some((unit, node)) = self.request_ast_node(&uri, position) else {
            self.transport.reply(id, Value::Null);
            return Ok(());
        };
        let (Some((arena, _)), Some(stream)) = (
            self.compiler.as_ref().and_then(|s| s.ast(&unit)),
            self.compiler.as_ref().and_then(|s| s.char_stream(&unit)),
        ) else {
            self.transport.reply(id, Value::Null);
            return Ok(());
        };

        let Some(markdown) = hover::hover_markdown(arena, node) else {
            self.transport.reply(id, Value::Null);
            return Ok(());
        };
        let span = arena.node(node).span;
        let range = stream.range_of(span.start as usize, span.end as usize);
        self.transport.reply(
            id,
            json!({
                "range": range.to_json(),
                "contents": { "kind": "markdown", "value": markdown },
            }),
        );
        Ok(())
    }

    fn handle_document_highlight(&mut self, id: Value, params: &Value) -> Result<(), ServerError> {
        let (uri, position) = Self::document_position(params)?;
        let Some((unit, node)) = self.request_ast_node(&uri, position) else {
            self.transport.reply(id, json!([]));
            return Ok(());
        };
        let (Some((arena, root)), Some(stream)) = (
            self.compiler.as_ref().and_then(|s| s.ast(&unit)),
            self.compiler.as_ref().and_then(|s| s.char_stream(&unit)),
        ) else {
            self.transport.reply(id, json!([]));
            return Ok(());
        };

        let reply: Vec<Value> = references::semantic_highlight(arena, root, node)
            .into_iter()
            .map(|highlight| {
                let range = stream
                    .range_of(highlight.span.start as usize, highlight.span.end as usize);
                match highlight.kind {
                    HighlightKind::Unspecified => json!({ "range": range.to_json() }),
                    kind => json!({ "range": range.to_json(), "kind": kind as i32 }),
                }
            })
            .collect();
        self.transport.reply(id, json!(reply));
        Ok(())
    }

    fn handle_references(&mut self, id: Value, params: &Value) -> Result<(), ServerError> {
        let (uri, position) = Self::document_position(params)?;
        let Some((unit, node)) = self.request_ast_node(&uri, position) else {
            self.transport.reply(id, json!([]));
            return Ok(());
        };
        let Some(stack) = self.compiler.as_ref() else {
            self.transport.reply(id, json!([]));
            return Ok(());
        };
        let Some((arena, root)) = stack.ast(&unit) else {
            self.transport.reply(id, json!([]));
            return Ok(());
        };

        let locations: Vec<SourceLocation> = references::semantic_highlight(arena, root, node)
            .into_iter()
            .map(|highlight| SourceLocation::new(highlight.span, unit.clone()))
            .collect();
        let reply: Vec<Value> = locations
            .iter()
            .map(|location| self.location_to_json(stack, location))
            .collect();
        self.transport.reply(id, json!(reply));
        Ok(())
    }

    fn handle_semantic_tokens(&mut self, id: Value, params: &Value) -> Result<(), ServerError> {
        let uri = extract_uri(params)
            .ok_or(ServerError::InvalidParams("missing textDocument.uri"))?
            .to_string();
        if self.compiler.is_none() && !self.compile(&uri) {
            self.transport.reply(id, json!({ "data": [] }));
            return Ok(());
        }
        let unit = self.vfs.path_to_source_unit_name(&uri);
        let (Some((arena, root)), Some(stream)) = (
            self.compiler.as_ref().and_then(|s| s.ast(&unit)),
            self.compiler.as_ref().and_then(|s| s.char_stream(&unit)),
        ) else {
            self.transport.reply(id, json!({ "data": [] }));
            return Ok(());
        };
        let tokens = semantic_tokens::build(arena, root, stream);
        self.transport.reply(id, tokens);
        Ok(())
    }
}
