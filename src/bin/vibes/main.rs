//! vibes - play a vibraphone from the terminal
//!
//! Run with: cargo run --bin vibes -- [--config vibes.toml] [--device NAME]
//!
//! Logs go to a file (RUST_LOG sets the level) so they do not tear the UI.

mod app;
mod keys;
mod ui;

use std::{
    fs::File,
    path::{Path, PathBuf},
    sync::Mutex,
};

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr};
use tracing_subscriber::EnvFilter;
use vibraphone::{context::output_device_names, EngineConfig, OutputBackend, VoiceEngine};

#[derive(Parser, Debug)]
#[command(name = "vibes", version, about = "Play a vibraphone from the terminal")]
struct Cli {
    /// TOML file overriding envelope, tone and output settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Output device name (see --list-devices)
    #[arg(long)]
    device: Option<String>,

    /// Print the available output devices and exit
    #[arg(long)]
    list_devices: bool,

    /// Log destination
    #[arg(long, default_value = "vibes.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if cli.list_devices {
        for name in output_device_names()? {
            println!("{name}");
        }
        return Ok(());
    }

    init_logging(&cli.log_file)?;

    let mut config = match &cli.config {
        Some(path) => EngineConfig::from_toml_file(path)
            .wrap_err_with(|| format!("failed to load {}", path.display()))?,
        None => EngineConfig::default(),
    };
    if let Some(name) = cli.device {
        config.output.backend = OutputBackend::Device { name: Some(name) };
    }

    let engine = VoiceEngine::new(config).wrap_err("invalid configuration")?;
    app::run(engine)
}

fn init_logging(path: &Path) -> Result<()> {
    let file = File::create(path)
        .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}
