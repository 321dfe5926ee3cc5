//! The message transport the dispatcher runs on.
//!
//! The server only assumes a message-oriented carrier of JSON values; the
//! Content-Length framing used over stdio lives entirely in
//! [`StdioTransport`]. Tests drive the server through a scripted in-memory
//! implementation instead.

use std::io::{BufRead, Write};

use serde_json::{json, Value};
use tracing::{trace, warn};

use crate::protocol::{ErrorCode, Response};

/// A bidirectional JSON message channel.
pub trait Transport {
    /// True once the peer will produce no further messages.
    fn closed(&self) -> bool;

    /// Next incoming message, or `None` when nothing is available right now.
    fn receive(&mut self) -> Option<Value>;

    /// Fire-and-forget notification.
    fn notify(&mut self, method: &str, params: Value);

    /// Successful reply to a request.
    fn reply(&mut self, id: Value, result: Value);

    /// Error reply to a request.
    fn error(&mut self, id: Value, code: ErrorCode, message: &str);
}

/// `Content-Length`-framed transport over a reader/writer pair.
pub struct StdioTransport<R, W> {
    input: R,
    output: W,
    eof: bool,
}

impl StdioTransport<std::io::BufReader<std::io::Stdin>, std::io::Stdout> {
    /// The production transport: stdin/stdout.
    pub fn stdio() -> Self {
        StdioTransport::new(std::io::BufReader::new(std::io::stdin()), std::io::stdout())
    }
}

impl<R: BufRead, W: Write> StdioTransport<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            eof: false,
        }
    }

    /// Read the header block; returns the announced content length.
    fn read_headers(&mut self) -> Option<usize> {
        let mut content_length = None;
        loop {
            let mut line = String::new();
            match self.input.read_line(&mut line) {
                Ok(0) => {
                    self.eof = true;
                    return None;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!("transport read failed: {}", err);
                    self.eof = true;
                    return None;
                }
            }
            let line = line.trim();
            if line.is_empty() {
                return content_length;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().ok();
                }
                // Other headers (Content-Type, ...) are ignored.
            }
        }
    }

    fn send(&mut self, body: String) {
        trace!(%body, "sending message");
        let _ = write!(self.output, "Content-Length: {}\r\n\r\n{}", body.len(), body);
        let _ = self.output.flush();
    }
}

impl<R: BufRead, W: Write> Transport for StdioTransport<R, W> {
    fn closed(&self) -> bool {
        self.eof
    }

    fn receive(&mut self) -> Option<Value> {
        let length = self.read_headers()?;
        let mut body = vec![0u8; length];
        if let Err(err) = self.input.read_exact(&mut body) {
            warn!("transport read failed: {}", err);
            self.eof = true;
            return None;
        }
        match serde_json::from_slice(&body) {
            Ok(value) => {
                trace!(body = %String::from_utf8_lossy(&body), "received message");
                Some(value)
            }
            Err(err) => {
                warn!("discarding unparseable message: {}", err);
                None
            }
        }
    }

    fn notify(&mut self, method: &str, params: Value) {
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
        });
        self.send(body.to_string());
    }

    fn reply(&mut self, id: Value, result: Value) {
        let response = Response::success(id, result);
        self.send(serde_json::to_string(&response).unwrap_or_else(|_| "{}".into()));
    }

    fn error(&mut self, id: Value, code: ErrorCode, message: &str) {
        let response = Response::failure(id, code, message);
        self.send(serde_json::to_string(&response).unwrap_or_else(|_| "{}".into()));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
