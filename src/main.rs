use std::sync::atomic::AtomicUsize;
use std::sync::Arc;

mod config;
mod handler;
mod http;
mod logger;
mod page;
mod server;
mod storage;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Optional first argument: config file path without extension
    let config_path = std::env::args().nth(1).unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path)?;

    logger::init(&cfg)?;

    // Create Tokio runtime, sizing worker threads from configuration
    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    let addr = cfg.get_socket_addr()?;
    let listener = server::create_reusable_listener(addr, cfg.server.backlog)?;

    let client = reqwest::Client::builder()
        .user_agent(cfg.http.server_name.clone())
        .build()?;
    let gateway = Arc::new(storage::DropboxGateway::new(client, &cfg.dropbox));

    logger::log_server_start(&addr, &cfg);

    let state = Arc::new(config::AppState::new(cfg, gateway));
    let active_connections = Arc::new(AtomicUsize::new(0));

    let shutdown = Arc::new(tokio::sync::Notify::new());
    server::signal::start_signal_handler(Arc::clone(&shutdown))?;

    // Use LocalSet for spawn_local support
    let local = tokio::task::LocalSet::new();
    local
        .run_until(server::start_server_loop(
            listener,
            state,
            active_connections,
            shutdown,
        ))
        .await;

    Ok(())
}
