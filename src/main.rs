use makan_where::config::AppConfig;
use makan_where::server::start_server;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = AppConfig::from_env();
    start_server(config).await;
}
