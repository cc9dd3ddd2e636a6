//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;
use typer_typing::config::DEFAULT_SEED;

#[derive(Parser, Debug, Clone)]
#[command(name = "typer", about = "Headless typing arcade session played by a simulated typist")]
pub struct Args {
    /// Seed for level generation, word choice and the typist
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Frames to run before stopping (0 runs until game over)
    #[arg(long, default_value_t = 3600)]
    pub frames: u64,

    /// Frames per second
    #[arg(long, default_value_t = 60.0)]
    pub frame_rate: f64,

    /// JSON file with a list of levels (defaults to the procedural catalogue)
    #[arg(long)]
    pub levels: Option<PathBuf>,

    /// Level to start at
    #[arg(long, default_value_t = 1)]
    pub level: u32,

    /// Hits the player can take before game over
    #[arg(long, default_value_t = 4)]
    pub health: u32,

    /// Drill the home-row practice keys instead of real words
    #[arg(long)]
    pub practice: bool,

    /// Probability that the typist presses the intended key
    #[arg(long, default_value_t = 0.95)]
    pub accuracy: f64,

    /// Typist speed
    #[arg(long, default_value_t = 4.0)]
    pub keys_per_second: f64,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}
