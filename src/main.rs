//! Server properties daemon.
//!
//! Loads the config file, then serves `CONFIG` commands read line by line
//! from stdin, writing RESP replies to stdout.
//!
//! ```text
//! stdin line ──▶ dispatch ──▶ ConfigCommand ──▶ PropertiesStore
//!                                  │                 ▲
//! stdout ◀── RESP reply ◀──────────┘                 │
//!                                      config file ──┘ (startup)
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use server_properties::command::dispatch_line;
use server_properties::lifecycle;
use server_properties::observability::logging;

#[derive(Parser)]
#[command(name = "server-properties")]
#[command(about = "Typed server configuration with a CONFIG GET/SET command surface", long_about = None)]
struct Cli {
    /// Path to the config file (directive per line).
    #[arg(short, long, default_value = "redis.conf")]
    config: PathBuf,

    /// Print the effective settings as JSON and exit.
    #[arg(long)]
    print_config: bool,

    /// With --print-config, print the typed record including internal fields.
    #[arg(long, requires = "print_config")]
    full: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(logging::DEFAULT_FILTER)?;

    let runtime = lifecycle::bootstrap(&cli.config)?;

    if cli.print_config {
        let json = if cli.full {
            serde_json::to_string_pretty(&*runtime.store.current())?
        } else {
            serde_json::to_string_pretty(&*runtime.store.snapshot())?
        };
        println!("{}", json);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    tracing::info!("Reading commands from stdin");

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted, shutting down");
                break;
            }
        };

        let Some(line) = line else {
            break;
        };

        if let Some(reply) = dispatch_line(&runtime.config, &line) {
            stdout.write_all(&reply.encode()).await?;
            stdout.flush().await?;
        }
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
