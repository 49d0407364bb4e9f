//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, limits, timeouts, CORS, request ID)
//! - Guard POST routes with the shared secret
//! - Bind server to listener and shut down gracefully

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::Request,
    middleware,
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{AuthConfig, LookupConfig};
use crate::http::auth::require_api_key;
use crate::http::handlers;
use crate::http::request::{request_id, MakeRequestUuid};
use crate::reload::Reloader;
use crate::store::LookupStore;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<LookupStore>,
    pub reloader: Reloader,
    pub auth: Arc<AuthConfig>,
}

impl AppState {
    pub fn new(reloader: Reloader, auth: AuthConfig) -> Self {
        Self {
            store: reloader.store().clone(),
            reloader,
            auth: Arc::new(auth),
        }
    }
}

/// HTTP server for the lookup service.
pub struct HttpServer {
    router: Router,
    config: LookupConfig,
}

impl HttpServer {
    /// Create a new HTTP server over an already loaded reloader/store pair.
    pub fn new(config: LookupConfig, reloader: Reloader) -> Self {
        let state = AppState::new(reloader, config.auth.clone());
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &LookupConfig, state: AppState) -> Router {
        let open = Router::new()
            .route("/health", get(handlers::health))
            .route("/lookup", get(handlers::lookup_query));

        let guarded = Router::new()
            .route("/lookup", post(handlers::lookup_body))
            .route("/reload", post(handlers::reload))
            .route_layer(middleware::from_fn_with_state(state.clone(), require_api_key));

        open.merge(guarded)
            .with_state(state)
            .layer(RequestBodyLimitLayer::new(config.limits.max_body_size))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(CorsLayer::permissive())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                tracing::info_span!(
                    "request",
                    request_id = %request_id(request),
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }))
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections until shutdown is signalled.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            auth_enabled = self.config.auth.enabled(),
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
