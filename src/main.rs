//! Reelsmith
//! A CLI tool that turns a text blob into a short-form vertical video:
//! an AI illustration and TTS narration per segment, composited into
//! captioned clips and concatenated with ffmpeg.

mod composer;
mod config;
mod error;
mod housekeeping;
mod menu;
mod pipeline;
mod providers;
mod renderer;
mod segmenter;
mod types;

use anyhow::{Context, Result};
use config::AppConfig;
use pipeline::Pipeline;
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};
use std::fs::OpenOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let debug_mode = args.contains(&"--debug".to_string());
    if debug_mode {
        let _ = WriteLogger::init(
            LevelFilter::Debug,
            LogConfig::default(),
            OpenOptions::new()
                .create(true)
                .append(true)
                .open("debug.log")?,
        );
        log::info!("Starting Reelsmith with debug logging");
    }

    renderer::check_dependencies()?;

    let config = AppConfig::load().context("Failed to load configuration")?;
    config
        .ensure_output_dir()
        .context("Failed to create output directory")?;

    let pipeline = Pipeline::new(config);
    menu::run(&pipeline).await
}
