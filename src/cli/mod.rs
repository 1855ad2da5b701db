// CLI module for circuit-relay
// Author: kelexine (https://github.com/kelexine)

use clap::Parser;

/// circuit-relay - Gemini relay for circuit schematics and electronics Q&A
#[derive(Parser, Debug)]
#[command(name = "circuit-relay", version, about, long_about = None)]
pub struct Args {
    /// Address to bind (overrides server.host)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (overrides server.port)
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Directory for debug copies of input/output images
    #[arg(long)]
    pub output_dir: Option<String>,

    /// Path to a TOML config file
    #[arg(long, env = "CIRCUIT_RELAY_CONFIG")]
    pub config: Option<String>,

    /// Print the effective configuration and exit
    #[arg(long)]
    pub print_config: bool,
}
