//! Sigil CLI. The command-line entry point for the Sigil toolchain.
//!
//! Commands:
//!   sigil lsp                Run the language server over stdio
//!   sigil check <file>       Analyze a source file and print diagnostics

use std::env;
use std::fs;
use std::process;

use sigil_lsp::{CompilerStack, LanguageServer, StdioTransport};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        process::exit(0);
    }

    let result = match args[1].as_str() {
        "lsp" => cmd_lsp(),
        "check" => cmd_check(&args[2..]),
        "--version" | "-V" => {
            println!("sigil {}", VERSION);
            Ok(())
        }
        "--help" | "-h" | "help" => {
            print_usage();
            Ok(())
        }
        cmd => {
            eprintln!("error: unknown command '{}'", cmd);
            eprintln!("Run 'sigil --help' for usage.");
            Err(1)
        }
    };

    match result {
        Ok(()) => process::exit(0),
        Err(code) => process::exit(code),
    }
}

fn print_usage() {
    println!("sigil {} — the Sigil smart-contract language", VERSION);
    println!();
    println!("USAGE:");
    println!("    sigil <command> [arguments]");
    println!();
    println!("COMMANDS:");
    println!("    lsp                 Run the language server over stdio");
    println!("    check <file>        Analyze a source file and print diagnostics");
    println!();
    println!("OPTIONS:");
    println!("    --help, -h          Show this help");
    println!("    --version, -V       Show version");
}

// ---------------------------------------------------------------------------
// Command implementations
// ---------------------------------------------------------------------------

/// Run the language server. Logs go to stderr; stdout carries the protocol.
fn cmd_lsp() -> Result<(), i32> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut server = LanguageServer::new(StdioTransport::stdio());
    let clean = server.run();
    if clean {
        Ok(())
    } else {
        Err(1)
    }
}

fn cmd_check(args: &[String]) -> Result<(), i32> {
    let Some(path) = args.first() else {
        eprintln!("error: missing file argument");
        eprintln!("Usage: sigil check <file>");
        return Err(1);
    };

    let text = fs::read_to_string(path).map_err(|err| {
        eprintln!("error: cannot read '{}': {}", path, err);
        1
    })?;

    let mut stack = CompilerStack::new(vec![(path.clone(), text)]);
    stack.analyze();

    let mut failed = false;
    for error in stack.errors() {
        let range = sigil_lsp::diagnostics::location_range(&stack, &error.location);
        let severity = if error.kind.severity() == 1 {
            failed = true;
            "error"
        } else {
            "warning"
        };
        eprintln!(
            "{}:{}:{}: {}: {}",
            path,
            range.start.line + 1,
            range.start.character + 1,
            severity,
            error.message
        );
    }

    if failed {
        Err(1)
    } else {
        println!("{}: ok", path);
        Ok(())
    }
}
