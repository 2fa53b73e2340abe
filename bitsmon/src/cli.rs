use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug, Default)]
#[command(name = "bitsmon")]
#[command(about = "Track block version signaling over a trailing window of the chain", long_about = None)]
pub struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config_path: Option<PathBuf>,

    /// Network preset (mainnet, testnet, regtest, litecoin); ignored when a config file is given
    #[arg(short, long)]
    pub network: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: String,

    /// Node RPC host
    #[arg(long)]
    pub rpc_host: Option<String>,

    /// Node RPC port
    #[arg(long)]
    pub rpc_port: Option<u16>,

    /// Node RPC username
    #[arg(long)]
    pub rpc_user: Option<String>,

    /// Node RPC password
    #[arg(long)]
    pub rpc_password: Option<String>,

    /// Blocks in the tally window
    #[arg(long)]
    pub window_size: Option<u64>,

    /// Blocks between difficulty retargets
    #[arg(long)]
    pub retarget_interval: Option<u64>,

    /// Tip polling interval (milliseconds)
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Block fetches kept in flight while scanning
    #[arg(long)]
    pub fetch_concurrency: Option<usize>,

    /// Scan the window, print one report and exit
    #[arg(long)]
    pub once: bool,
}

pub fn parse_args() -> Args {
    Args::parse()
}
