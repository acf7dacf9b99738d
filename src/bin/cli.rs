//! logcask CLI
//!
//! Command-line interface for a single logcask store.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use logcask::log::LogRecovery;
use logcask::{Backend, CaskError, KvStore, Store};
use tracing_subscriber::{fmt, EnvFilter};

/// logcask CLI
#[derive(Parser, Debug)]
#[command(name = "logcask")]
#[command(about = "Bitcask-style log-structured key-value store")]
#[command(version)]
struct Args {
    /// Log file path, or ":memory:" for a throwaway in-memory store
    #[arg(short, long, default_value = "./logcask.db")]
    path: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Get a value by key
    Get {
        /// The key to get
        key: String,
    },

    /// Set a key-value pair, printing the previous value if any
    Put {
        /// The key to set
        key: String,

        /// The value to set
        value: String,
    },

    /// Delete a key, printing the value it held
    Del {
        /// The key to delete
        key: String,
    },

    /// List all live keys
    List,

    /// Scan the log and report record counts without modifying it
    Verify,
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,logcask=debug"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(CaskError::KeyNotFound) => {
            eprintln!("(not found)");
            ExitCode::from(1)
        }
        Err(e) => {
            tracing::error!("{}", e);
            ExitCode::from(2)
        }
    }
}

fn run(args: Args) -> logcask::Result<()> {
    let backend = Backend::parse(&args.path);

    if let Commands::Verify = args.command {
        let Backend::Log(path) = backend else {
            println!("in-memory store has no log to verify");
            return Ok(());
        };
        let result = LogRecovery::verify(&path)?;
        println!(
            "ok: {} records ({} tombstones), {} live keys, {} bytes",
            result.records_replayed, result.tombstones, result.live_keys, result.bytes
        );
        return Ok(());
    }

    let mut store = Store::open(backend)?;

    let outcome = match &args.command {
        Commands::Get { key } => store.get(key.as_bytes()).map(|v| print_value(&v)),
        Commands::Put { key, value } => store
            .put(key.as_bytes(), value.as_bytes())
            .map(|prev| {
                if let Some(prev) = prev {
                    print_value(&prev);
                }
            }),
        Commands::Del { key } => store.delete(key.as_bytes()).map(|v| print_value(&v)),
        Commands::List => {
            let mut keys = store.list_keys();
            keys.sort();
            for key in keys {
                print_value(&key);
            }
            Ok(())
        }
        Commands::Verify => Ok(()),
    };

    // Release the log even when the command failed.
    let closed = store.close();
    outcome?;
    closed
}

fn print_value(bytes: &[u8]) {
    println!("{}", String::from_utf8_lossy(bytes));
}
