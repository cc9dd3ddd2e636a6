//! # typer
//!
//! Headless run of the typing arcade. A simulated typist plays one session
//! against the procedural (or file-loaded) level catalogue; draw calls and
//! audio cues go to the log and a JSON report is printed at the end.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments and install the log filter on top of `RUST_LOG`.
//! 2. Load or generate the level catalogue and build the session.
//! 3. Pump frames until the frame limit, game over or the last level.

mod audio;
mod cli;
mod config;
mod driver;
mod error;
mod hud;
mod render;
mod session;
mod typist;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::Args;
use driver::Driver;

const CRATES: [&str; 4] = ["typer_app", "typer_loop", "typer_typing", "typer_entity"];

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    let mut filter = EnvFilter::from_default_env();
    for krate in CRATES {
        filter = filter.add_directive(format!("{krate}={level}").parse()?);
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(seed = args.seed, frames = args.frames, "typer starting");

    let mut driver = Driver::new(&args)?;
    let report = driver.run().await?;

    info!(
        score = report.score.points,
        level = report.level,
        health = report.health.current(),
        "typer finished"
    );
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
