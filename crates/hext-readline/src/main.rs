//! `hext`: the HEX T 1.0 assistant in the terminal.

mod commands;
mod helper;
mod logging;
mod render;
mod repl;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use hext_application::{BootstrapOptions, bootstrap};
use hext_core::config::GenerationMode;
use hext_infrastructure::HextPaths;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hext", version)]
#[command(about = "HEX T 1.0 - asistente conversacional con búsqueda web e imágenes", long_about = None)]
struct Cli {
    /// Use this config.toml instead of the one in the config directory
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Keep config, secrets, logs and images under this directory
    #[arg(long, value_name = "DIR")]
    home: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `hext_application=trace` (default: RUST_LOG or info)
    #[arg(long, value_name = "FILTER")]
    log_level: Option<String>,

    /// Start in `texto` or `imagen` mode
    #[arg(long)]
    mode: Option<GenerationMode>,

    /// Print replies only once they are complete
    #[arg(long)]
    no_stream: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let paths = HextPaths::new(cli.home.as_deref())?;
    let _log_guard = logging::init(&paths.logs_dir(), cli.log_level.as_deref())?;
    tracing::info!("[Bootstrap] hext {} starting", env!("CARGO_PKG_VERSION"));

    let options = BootstrapOptions {
        base_dir: cli.home,
        config_path: cli.config,
        mode: cli.mode,
        stream: cli.no_stream.then_some(false),
    };

    let context = match bootstrap(options) {
        Ok(context) => context,
        Err(err) => {
            tracing::error!("[Bootstrap] {:#}", err);
            eprintln!("{}", format!("Error: {err:#}").red());
            return Err(err);
        }
    };

    repl::run(context).await
}
