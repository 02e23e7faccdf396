use clap::Parser;
use item_server::Config;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_log_filter()));
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let addr = config.addr();
    let listener = TcpListener::bind(addr).await?;
    let port = listener.local_addr()?.port();

    info!(%addr, id_strategy = ?config.id_strategy, "item store listening");
    info!("local:        http://localhost:{port}");
    info!("health check: http://localhost:{port}/api/health");
    info!("item data:    http://localhost:{port}/api/data");
    info!("cors origin:  {}", config.frontend_url);

    item_server::run(listener, &config).await
}
