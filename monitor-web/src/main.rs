use clap::Parser;
use monitor_web::adapter::http::server::{shutdown_signal, start_http_server};
use monitor_web::cmd::*;
use monitor_web::config::{self, AppState};
use monitor_web::error::AppError;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    // step1. parse cli
    let cli = MonitorCli::parse();
    match cli.command {
        Commands::Run { config } => match run(&config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                tracing::error!("monitor server exit: {e}");
                eprintln!("monitor server exit: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run(path: &std::path::Path) -> Result<(), AppError> {
    let config = config::parse_config(path).await?;
    // error level
    let mut filter = tracing_subscriber::EnvFilter::from_default_env();
    if let Some(tracing) = &config.tracing {
        for x in tracing.filter.split(',').filter(|x| !x.trim().is_empty()) {
            let directive = x
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("tracing filter {x}: {e}")))?;
            filter = filter.add_directive(directive);
        }
    }
    tracing_subscriber::fmt().with_env_filter(filter).init();
    // step2. build state and start web
    let state = AppState::build(&config).await?;
    start_http_server(&config, state, shutdown_signal()).await
}
