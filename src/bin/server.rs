//! treekv Server Binary
//!
//! Serves clients over TCP and reads operator commands from stdin.
//! End of stdin shuts the server down.

use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;

use clap::Parser;
use treekv::console::ConsoleCommand;
use treekv::monitor::InterruptMonitor;
use treekv::network::Server;
use treekv::{Config, Engine};
use tracing_subscriber::{fmt, EnvFilter};

/// treekv Server
#[derive(Parser, Debug)]
#[command(name = "treekv-server")]
#[command(about = "Concurrent in-memory key-value store")]
#[command(version)]
struct Args {
    /// Listen address (host:port)
    #[arg(short, long, default_value = "127.0.0.1:8888")]
    listen: String,

    /// Maximum name/value length in bytes
    #[arg(short, long, default_value = "256")]
    max_len: usize,
}

fn main() {
    // Initialize tracing/logging
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,treekv=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    tracing::info!("treekv Server v{}", treekv::VERSION);
    tracing::info!("Listen address: {}", args.listen);

    let config = Config::builder()
        .listen_addr(&args.listen)
        .max_len(args.max_len)
        .build();

    let engine = match Engine::new(config) {
        Ok(e) => Arc::new(e),
        Err(e) => {
            tracing::error!("Failed to create engine: {}", e);
            std::process::exit(1);
        }
    };

    // Startup failures from here on are fatal: no retry.
    let monitor = match InterruptMonitor::start(Arc::clone(&engine)) {
        Ok(m) => m,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let server = match Server::bind(Arc::clone(&engine)) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let listener = thread::Builder::new()
        .name("listener".to_string())
        .spawn(move || {
            if let Err(e) = server.run() {
                tracing::error!("Server error: {}", e);
                std::process::exit(1);
            }
        });
    if let Err(e) = listener {
        tracing::error!("Failed to spawn listener: {}", e);
        std::process::exit(1);
    }

    run_console(&engine);

    tracing::info!("Console closed, shutting down");
    monitor.stop();
    engine.shutdown();

    // The listener thread is still blocked in accept; exiting ends it.
    tracing::info!("Server stopped");
}

/// Read operator commands until end of input
fn run_console(engine: &Engine) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to read console input: {}", e);
                break;
            }
        };

        let command = match ConsoleCommand::parse(&line) {
            Ok(command) => command,
            Err(_) => {
                eprintln!("ill-formed command");
                continue;
            }
        };
        if let Err(e) = command.apply(engine) {
            tracing::warn!("Console command failed: {}", e);
        }
    }
}
