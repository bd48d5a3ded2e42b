use std::error::Error;
use std::sync::Arc;

use clap::Parser;
use static_microserver::config::{AppState, Cli, Config};
use static_microserver::error::StartupError;
use static_microserver::{logger, server};

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    let cfg = Config::load(&cli)?;
    logger::init(&cfg.logging)?;
    let state = AppState::new(cfg)?;

    // Create the Tokio runtime, sizing the worker pool from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();

    if let Some(workers) = state.config.server.workers.filter(|&w| w > 0) {
        runtime_builder.worker_threads(workers);
    }

    let runtime = runtime_builder.build()?;
    runtime.block_on(async_main(state))
}

async fn async_main(state: AppState) -> Result<(), Box<dyn Error>> {
    let addr = state.addr;
    let listener = server::create_listener(addr, state.config.server.backlog)
        .map_err(|source| StartupError::Bind { addr, source })?;

    let local_addr = listener.local_addr()?;
    logger::log_server_start(&local_addr, &state);

    server::run(listener, Arc::new(state), server::shutdown_signal()).await;
    Ok(())
}
