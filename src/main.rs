mod api;
mod config;
mod handler;
mod http;
mod logger;
mod routing;
mod server;

use routing::RouteTable;
use server::Server;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config".to_string());
    let cfg = config::Config::load_from(&config_path).inspect_err(|e| {
        logger::log_startup_failure(&format!("Invalid configuration: {e}"));
    })?;
    logger::init(&cfg)?;

    let mut runtime_builder = tokio::runtime::Builder::new_multi_thread();
    runtime_builder.enable_all();
    if let Some(workers) = cfg.server.workers {
        runtime_builder.worker_threads(workers);
    }
    let runtime = runtime_builder.build()?;

    runtime.block_on(async_main(cfg))
}

async fn async_main(cfg: config::Config) -> Result<(), Box<dyn std::error::Error>> {
    // Routes are fixed before the socket is bound
    let server = Server::new(cfg, RouteTable::standard());

    let listening = server.bind().inspect_err(|e| {
        logger::log_startup_failure(&format!("Server failed to start: {e}"));
    })?;

    let state = listening.state();
    logger::log_server_start(&listening.local_addr()?, &state.config, &state.routes);

    listening.run().await;
    Ok(())
}
