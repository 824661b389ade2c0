mod api;
mod cli;
mod config;
mod context;
mod services;
mod session;
mod tui;

use anyhow::Result;
use clap::Parser;
use log::info;
use std::fs::{self, OpenOptions};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.is_interactive());
    info!("affinity-cli {}", env!("CARGO_PKG_VERSION"));

    cli::run(cli).await
}

/// Level used when `RUST_LOG` is unset. Batch output goes to stdout, so
/// stderr stays quiet below `warn`.
fn default_log_level(interactive: bool) -> &'static str {
    if interactive { "info" } else { "warn" }
}

/// The TUI owns the terminal, so interactive runs log to a file under the
/// cache directory. Batch commands log warnings and up to stderr.
fn init_logging(interactive: bool) {
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(default_log_level(interactive)),
    );
    builder.format_timestamp_millis();

    if interactive {
        let Some(dir) = dirs::cache_dir().map(|d| d.join("affinity-cli")) else {
            return;
        };
        let file = fs::create_dir_all(&dir).and_then(|_| {
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join("affinity-cli.log"))
        });
        match file {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            // Writing to stderr would corrupt the screen
            Err(_) => return,
        }
    }

    let _ = builder.try_init();
}
