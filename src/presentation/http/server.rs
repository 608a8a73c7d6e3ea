use axum::Router;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use crate::presentation::http::{
    handlers::{AskHandler, UploadHandler},
    routes::{ask_routes, health_routes, upload_routes},
};

pub struct HttpServer {
    ask_handler: Arc<AskHandler>,
    upload_handler: Arc<UploadHandler>,
    port: u16,
}

impl HttpServer {
    pub fn new(
        ask_handler: Arc<AskHandler>,
        upload_handler: Arc<UploadHandler>,
        port: Option<u16>,
    ) -> Self {
        Self {
            ask_handler,
            upload_handler,
            port: port.unwrap_or(3000),
        }
    }

    pub async fn run(self) -> Result<(), Box<dyn std::error::Error>> {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        let app = Router::new()
            .merge(health_routes())
            .merge(ask_routes(self.ask_handler))
            .merge(upload_routes(self.upload_handler))
            .layer(cors)
            .layer(RequestBodyLimitLayer::new(50 * 1024 * 1024)) // 50MB cap
            .layer(
                TraceLayer::new_for_http()
                    .on_request(
                        |request: &axum::http::Request<axum::body::Body>, _span: &tracing::Span| {
                            tracing::info!(
                                "Received request: {} {}",
                                request.method(),
                                request.uri()
                            );
                        },
                    )
                    .on_response(
                        |response: &axum::http::Response<axum::body::Body>,
                         latency: std::time::Duration,
                         _span: &tracing::Span| {
                            tracing::info!(
                                "Response: {} (took {} ms)",
                                response.status(),
                                latency.as_millis()
                            );
                        },
                    ),
            );

        let addr = SocketAddr::from(([0, 0, 0, 0], self.port));

        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, app).await?;

        Ok(())
    }
}
