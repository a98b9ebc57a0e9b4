use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod collectors;
mod config;
mod daemon;
mod error;
mod llm;
mod notification;
mod report;

fn log_filter(verbose: u8, configured: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }
    let level = match verbose {
        0 => configured,
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
}

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = match config::load_config_with_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose, &config.logging.level))
        .init();

    if let Err(e) = cli::handle_command(cli, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
