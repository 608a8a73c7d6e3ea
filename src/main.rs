mod application;
mod domain;
mod infrastructure;
mod presentation;

use dotenv::dotenv;
use tracing_subscriber::EnvFilter;

use crate::infrastructure::AppContainer;
use crate::presentation::HttpServer;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let container = AppContainer::new()?;

    let port = std::env::var("PORT")
        .ok()
        .and_then(|value| value.parse::<u16>().ok());

    let server = HttpServer::new(container.ask_handler, container.upload_handler, port);

    tracing::info!("starting server on port {}", port.unwrap_or(3000));
    server.run().await
}
