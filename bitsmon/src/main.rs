use bitsmon::{cli, ui, Config, Daemon};
use std::process;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments
    let args = cli::parse_args();

    // Initialize logging
    init_logging(&args);

    let config = match Config::resolve(&args) {
        Ok(config) => config,
        Err(e) => fail("Invalid configuration", e),
    };

    ui::print_banner(env!("CARGO_PKG_VERSION"), &config.network.network_id);
    ui::print_config_summary(&config);

    let daemon = match Daemon::new(config) {
        Ok(daemon) => daemon,
        Err(e) => fail("Failed to initialize monitor", e),
    };

    let result = if args.once {
        daemon.run_once().await.map(|_| ())
    } else {
        daemon.run().await
    };

    if let Err(e) = result {
        fail("Monitor error", e);
    }

    ui::print_status("✓", "bitsmon stopped", ui::StatusType::Success);
    info!("bitsmon stopped");
}

fn fail(context: &str, err: impl std::fmt::Display) -> ! {
    ui::print_status("✗", &format!("{}: {}", context, err), ui::StatusType::Error);
    error!("{}: {}", context, err);
    process::exit(1);
}

fn init_logging(args: &cli::Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();
}
