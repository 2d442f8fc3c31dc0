use std::path::PathBuf;

use clap::Parser;

/// Stream one Gemini completion to the terminal
#[derive(Debug, Parser)]
#[command(name = "gembridge", about = "Stream a Gemini response to stdout")]
pub struct Args {
    /// Path to configuration file
    #[arg(short, long, default_value = "gembridge.toml", env = "GEMBRIDGE_CONFIG")]
    pub config: PathBuf,

    /// System instruction
    #[arg(short, long, default_value = "")]
    pub system: String,

    /// Model override, e.g. `gemini-2.5-pro:thinking`
    #[arg(short, long, env = "GEMBRIDGE_MODEL")]
    pub model: Option<String>,

    /// Prompt text
    pub prompt: String,
}
