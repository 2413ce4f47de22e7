//! Loam - a markdown blog compiler with responsive images.

mod assets;
mod cli;
mod config;
mod content;
mod core;
mod embed;
mod image;
mod logger;
mod markdown;
mod pipeline;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;
use core::EnvContext;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = SiteConfig::load(cli)?;

    // Environment is read exactly once; transforms receive it by reference
    let env = EnvContext::from_process(&config.site.token_env);

    match &cli.command {
        Commands::Build { .. } => {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(cli::build::build_site(&config, &env))
        }
    }
}
