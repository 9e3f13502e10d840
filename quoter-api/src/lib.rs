use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub mod auth;
pub mod error;
pub mod export;
pub mod health;
pub mod history;
pub mod metrics;
pub mod middleware;
pub mod quotes;
pub mod state;

pub use state::{AppState, AuthConfig};

/// Full router. Serve it with `into_make_service_with_connect_info` so the
/// rate limiter can see client addresses.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics_handler))
        .merge(quotes::routes())
        .merge(history::routes())
        .merge(export::routes())
        .merge(auth::routes(state.clone()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::rate_limit_middleware,
        ))
        .with_state(state)
}
