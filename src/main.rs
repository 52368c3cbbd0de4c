mod commands;
mod config;
mod constants;
mod errors;
mod fetcher;
mod results;
mod runner;
mod stats;

use config::RunConfig;
use config::parser::{Cli, Command};
use errors::Result;
use runner::BenchManager;
use std::process;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_from_args();

    let verbose = matches!(&cli.command, Command::Run(args) if args.verbose);
    init_logging(verbose);

    if let Err(e) = run(cli.command).await {
        error!("fetchbench failed: {}", e);
        process::exit(1);
    }
}

/// Main application logic
async fn run(command: Command) -> Result<()> {
    match command {
        Command::Run(args) => {
            // Configuration errors surface here, before any request is sent
            let config = RunConfig::from_run_args(args)?;

            info!("⏱️  fetchbench - HTTP Fetch Latency Benchmark");
            info!("Version: {}", env!("CARGO_PKG_VERSION"));
            config.print_summary();

            BenchManager::new(config).run_benchmark().await
        }
        Command::Report(args) => commands::report(&args),
        Command::Fuse(args) => commands::fuse(&args),
    }
}

/// Initialize logging based on verbosity
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive(
                    format!("fetchbench={}", level)
                        .parse()
                        .expect("Invalid filter directive"),
                )
                .add_directive("reqwest=warn".parse().expect("Invalid filter directive"))
                .add_directive("hyper=warn".parse().expect("Invalid filter directive"))
                .add_directive(
                    "hyper_util=warn"
                        .parse()
                        .expect("Invalid filter directive"),
                ),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    if verbose {
        info!("Verbose logging enabled");
    }
}
