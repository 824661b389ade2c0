//! Command line interface

pub mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use std::path::{Path, PathBuf};

use crate::api::{AffinityClient, CachedGateway};
use crate::config::Config;
use crate::context::AppContext;

#[derive(Parser)]
#[command(name = "affinity-cli", version, about = "Review and triage deals in an Affinity list")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Review deals one at a time (default)
    Queue,
    /// Print the profile × category review summary
    Summary(SummaryArgs),
    /// Dump raw list entries and field values as JSON
    Dump(DumpArgs),
    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Args)]
pub struct SummaryArgs {
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
    /// Write to a file instead of stdout
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Csv,
    Json,
}

#[derive(Args)]
pub struct DumpArgs {
    /// Number of list entries to fetch
    #[arg(long, short, default_value_t = 10)]
    pub limit: u32,
    /// Also dump the field values of this person
    #[arg(long, value_name = "PERSON_ID")]
    pub person: Option<i64>,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a starter config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the resolved config with the API key masked
    Show,
    /// Print the config file location
    Path,
}

impl Cli {
    /// Whether the command takes over the terminal
    pub fn is_interactive(&self) -> bool {
        matches!(self.command, None | Some(Commands::Queue))
    }

    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.config {
            Some(path) => Ok(path.clone()),
            None => Config::default_path(),
        }
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let path = cli.config_path()?;
    debug!("Using config file {}", path.display());

    match cli.command.unwrap_or(Commands::Queue) {
        Commands::Queue => commands::queue::handle_queue_command(&path).await,
        Commands::Summary(args) => commands::summary::handle_summary_command(&path, args).await,
        Commands::Dump(args) => commands::dump::handle_dump_command(&path, args).await,
        Commands::Config(cmd) => commands::config::handle_config_command(&path, cmd),
    }
}

/// Load and validate the config at `path`
pub fn load_context(path: &Path) -> Result<AppContext> {
    AppContext::from_config(Config::load(path)?)
}

pub fn build_client(config: &Config) -> Result<AffinityClient> {
    AffinityClient::new(&config.api.base_url, config.api_key()?, config.timeout())
}

pub fn build_gateway(ctx: &AppContext) -> Result<CachedGateway<AffinityClient>> {
    let client = build_client(&ctx.config)?;
    Ok(CachedGateway::new(client, ctx.config.cache_config()))
}
