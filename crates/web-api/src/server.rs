use crate::handlers;
use axum::{
    routing::{get, post},
    Router,
};
use hedgebot_hedge_engine::HedgeEngine;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub struct ApiServer {
    engine: Arc<HedgeEngine>,
}

impl ApiServer {
    #[must_use]
    pub const fn new(engine: Arc<HedgeEngine>) -> Self {
        Self { engine }
    }

    pub fn router(&self) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/health", get(handlers::health))
            .route("/api/hedges", get(handlers::list_hedges))
            .route("/api/hedges/evaluate", post(handlers::evaluate))
            .layer(cors)
            .layer(TraceLayer::new_for_http())
            .with_state(self.engine.clone())
    }

    /// Starts the web server listening on the specified address.
    ///
    /// # Errors
    /// Returns an error if the server fails to bind to the address or serve requests.
    pub async fn serve(self, addr: &str) -> anyhow::Result<()> {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        tracing::info!("Hedge API listening on {}", addr);

        axum::serve(listener, self.router()).await?;

        Ok(())
    }
}
