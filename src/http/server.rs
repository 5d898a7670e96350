//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with all handlers
//! - Wire up middleware (request ID, tracing, CORS, panics, timeout, body limit, metrics)
//! - Serve until the shutdown coordinator fires
//!
//! The request timeout only wraps the read-only routes. `/send-asset` is bounded
//! by the RPC and confirmation timeouts instead, so a client never gets a bare
//! 408 for a transfer that was in fact broadcast.

use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::any::Any;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::CorsLayer,
    limit::RequestBodyLimitLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::blockchain::BlockchainClient;
use crate::config::GatewayConfig;
use crate::http::handlers;
use crate::http::middleware::track_metrics;
use crate::lifecycle::shutdown;
use crate::lifecycle::Services;
use crate::naming::ResolutionDispatcher;
use crate::transfer::TransferOrchestrator;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: ResolutionDispatcher,
    /// `None` when transfers are disabled.
    pub transfers: Option<Arc<TransferOrchestrator>>,
    /// Networks reported by `/health`.
    pub networks: Arc<Vec<BlockchainClient>>,
}

impl AppState {
    pub fn new(dispatcher: ResolutionDispatcher) -> Self {
        Self {
            dispatcher,
            transfers: None,
            networks: Arc::new(Vec::new()),
        }
    }

    pub fn with_transfers(mut self, transfers: Arc<TransferOrchestrator>) -> Self {
        self.transfers = Some(transfers);
        self
    }
}

impl From<Services> for AppState {
    fn from(services: Services) -> Self {
        Self {
            dispatcher: services.dispatcher,
            transfers: services.transfers,
            networks: Arc::new(services.networks),
        }
    }
}

/// HTTP server for the gateway.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(config: &GatewayConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let reads = Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health))
            .route("/resolve-ens", post(handlers::resolve_ens))
            .route("/resolve-base", post(handlers::resolve_base))
            .route("/resolve", post(handlers::resolve))
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)));
        let transfers = Router::new().route("/send-asset", post(handlers::send_asset));

        let layers = ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                    request_id = %request_id,
                )
            }))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(CorsLayer::permissive())
            .layer(CatchPanicLayer::custom(handle_panic))
            .layer(RequestBodyLimitLayer::new(config.listener.max_body_size));

        reads
            .merge(transfers)
            .with_state(state)
            .layer(middleware::from_fn(track_metrics))
            .layer(layers)
    }

    /// The router, for serving on a custom transport.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown::wait_for(shutdown))
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let message = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %message, "Handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": "Something went wrong!" })),
    )
        .into_response()
}
