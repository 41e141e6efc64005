//! DistKV - An In-Memory Key-Value Store
//!
//! This is the main entry point for the DistKV server. It parses the
//! command line, restores the snapshot, starts the TCP listener, and
//! handles graceful shutdown (save snapshot, then exit).

use distkv::commands::CommandHandler;
use distkv::connection::{handle_connection, ConnectionStats};
use distkv::storage::{snapshot, start_expiry_sweeper, StorageEngine};
use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Server configuration
struct Config {
    /// Port to listen on
    port: u16,
    /// Snapshot file path
    snapshot_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: distkv::DEFAULT_PORT,
            snapshot_path: PathBuf::from(distkv::DEFAULT_SNAPSHOT_PATH),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--snapshot" | "-s" => {
                    if i + 1 < args.len() {
                        config.snapshot_path = PathBuf::from(&args[i + 1]);
                        i += 2;
                    } else {
                        eprintln!("Error: --snapshot requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("DistKV version {}", distkv::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn print_help() {
    println!(
        r#"
DistKV - An In-Memory Key-Value Store

USAGE:
    distkv [OPTIONS]

OPTIONS:
    -p, --port <PORT>        Port to listen on (default: 6379)
    -s, --snapshot <FILE>    Snapshot file path (default: data/dump.rdb)
    -v, --version            Print version information
        --help               Print this help message

EXAMPLES:
    distkv                          # Start on 0.0.0.0:6379
    distkv --port 6380              # Start on port 6380
    distkv --snapshot /var/kv.rdb   # Persist to a custom path

CONNECTING:
    Any client that frames requests as text lines works:
    $ nc localhost 6379
    PING
    $4
    PONG
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
    ____  _     _   __ ____   __
   / __ \(_)___/ |_/ //_/ /  / /
  / / / / / ___/ __/ ,< / /  / /
 / /_/ / (__  ) /_/ /| / /__/ /
/_____/_/____/\__/_/ |_\___/_/

DistKV v{} - In-Memory Key-Value Store
──────────────────────────────────────────
Server started on {}
Ready to accept connections.

Use Ctrl+C to shutdown gracefully.
"#,
        distkv::VERSION,
        config.bind_address()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging
    let _subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    print_banner(&config);

    // Create the storage engine (shared across all connections)
    let storage = Arc::new(StorageEngine::new());

    // Restore the previous snapshot, if any
    match snapshot::load(&config.snapshot_path) {
        Ok(entries) => {
            let count = entries.len();
            storage.restore(entries);
            info!(keys = count, path = %config.snapshot_path.display(), "Snapshot restored");
        }
        Err(e) => {
            warn!(
                path = %config.snapshot_path.display(),
                error = %e,
                "No snapshot loaded, starting with an empty keyspace"
            );
        }
    }

    // Start the background expiry sweeper
    let sweeper = start_expiry_sweeper(Arc::clone(&storage));

    // Create connection statistics
    let stats = Arc::new(ConnectionStats::new());

    // Bind the TCP listener
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Main accept loop, raced against the shutdown signal. When the signal
    // wins, the loop future is dropped and the listening socket closes;
    // connections already in flight finish their current write.
    tokio::select! {
        _ = accept_loop(listener, Arc::clone(&storage), Arc::clone(&stats)) => {}
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping server...");
        }
    }

    sweeper.stop();

    // Save the keyspace before exiting
    match snapshot::save(&config.snapshot_path, &storage.snapshot()) {
        Ok(count) => {
            info!(keys = count, path = %config.snapshot_path.display(), "Snapshot saved")
        }
        Err(e) => error!(error = %e, "Failed to save snapshot"),
    }

    info!(
        connections = stats.connections_accepted.load(Ordering::Relaxed),
        commands = stats.commands_processed.load(Ordering::Relaxed),
        "Server shutdown complete"
    );
    Ok(())
}

/// Main loop that accepts incoming connections
async fn accept_loop(
    listener: TcpListener,
    storage: Arc<StorageEngine>,
    stats: Arc<ConnectionStats>,
) {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                // Each connection gets its own handler task
                let handler = CommandHandler::new(Arc::clone(&storage));
                let stats = Arc::clone(&stats);

                tokio::spawn(async move {
                    handle_connection(stream, addr, handler, stats).await;
                });
            }
            Err(e) => {
                error!("Failed to accept connection: {}", e);
            }
        }
    }
}

/// Resolves when SIGINT (Ctrl+C) or SIGTERM arrives.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler");
        tokio::select! {
            _ = signal::ctrl_c() => {}
            _ = term.recv() => {}
        }
    }

    #[cfg(not(unix))]
    {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    }
}
