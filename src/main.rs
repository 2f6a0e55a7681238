use std::sync::Arc;

use clap::Parser;

use diag_server::config::{AppState, Config};
use diag_server::diag::{ProcessStart, SystemResolver};
use diag_server::{logger, server};

/// Diagnostic HTTP server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Configuration file (TOML, extension optional; missing file means defaults)
    #[arg(short, long, default_value = "config")]
    config: String,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Taken before anything can serve a request
    let started = ProcessStart::now();

    let args = Args::parse();
    let cfg = Config::load_from(&args.config)?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg, started))
}

async fn async_main(cfg: Config, started: ProcessStart) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr)?;

    let state = Arc::new(AppState::new(cfg, started, SystemResolver::from_system_conf()));
    logger::log_server_start(&listener.local_addr()?, &state.config);

    let signals = Arc::new(server::SignalHandler::new());
    server::start_signal_handler(Arc::clone(&signals))?;

    server::run_server(listener, state, Arc::clone(&signals.shutdown)).await?;
    Ok(())
}
