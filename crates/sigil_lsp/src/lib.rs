//! Sigil LSP. Language Server Protocol implementation for IDE support.
//!
//! Provides:
//! - **Diagnostics** — pushed after every recompile, straight from the front-end
//! - **Go-to-definition / implementation** — identifier, path, member and import navigation
//! - **References / document highlight** — annotation-driven occurrence sets
//! - **Hover** — doc comments and resolved types as markdown
//! - **Semantic tokens** — delta-encoded full-document token stream
//! - **Protocol** — JSON-RPC 2.0 over a pluggable transport
//!
//! The dispatch loop is single-threaded and synchronous: one message is
//! handled to completion before the next is dequeued, so replies leave in
//! arrival order and no handler ever observes a half-applied edit.

pub mod charstream;
pub mod compiler;
pub mod diagnostics;
pub mod goto;
pub mod hover;
pub mod locator;
pub mod protocol;
pub mod references;
pub mod semantic_tokens;
pub mod server;
pub mod transport;
pub mod vfs;

pub use compiler::{CompilerError, CompilerStack, CompilerState, SourceLocation};
pub use protocol::{ErrorCode, Position, Range};
pub use references::{DocumentHighlight, HighlightKind};
pub use server::{LanguageServer, ServerState};
pub use transport::{StdioTransport, Transport};
pub use vfs::Vfs;
