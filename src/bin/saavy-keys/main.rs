//! saavy-keys - play a synth from the computer keyboard, record takes to WAV
//!
//! Run with: cargo run -- [--config keys.json] [--output-dir takes/]

mod app;
mod ui;

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use saavy_keys::EngineConfig;

#[derive(Parser, Debug)]
#[command(name = "saavy-keys", version, about = "Terminal keyboard synth with take recording")]
struct Args {
    /// JSON engine configuration; missing fields take their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Directory rendered takes are written into
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Sample rate in Hz (falls back to the device rate if unsupported)
    #[arg(long)]
    sample_rate: Option<u32>,

    /// Starting octave of the lower keyboard row
    #[arg(long)]
    octave: Option<i32>,
}

fn load_config(args: &Args) -> EyreResult<EngineConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            serde_json::from_str(&text)
                .wrap_err_with(|| format!("failed to parse {}", path.display()))?
        }
        None => EngineConfig::default(),
    };

    if let Some(dir) = &args.output_dir {
        config.output_dir = dir.clone();
    }
    if let Some(rate) = args.sample_rate {
        config.sample_rate = rate;
    }
    if let Some(octave) = args.octave {
        config.base_octave = octave;
    }

    config.validate().wrap_err("invalid configuration")?;
    Ok(config)
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let config = load_config(&args)?;

    let saved = app::KeysApp::new(config).run()?;
    if let Some(path) = saved {
        println!("Saved take to {}", path.display());
    }
    Ok(())
}
