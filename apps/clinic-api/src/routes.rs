//! Montagem do roteador e das camadas de borda

use axum::http::{header, Method};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use std::time::Duration;
use tower::limit::GlobalConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::auth::require_bearer;
use crate::config::AppConfig;
use crate::handlers::{self, appointments, auth, books, health, ledger, users};
use crate::AppState;

/// CORS único para todas as rotas, inclusive o preflight
fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(Duration::from_secs(86_400))
}

pub fn router(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .route("/users", get(users::list))
        .route(
            "/users/:id",
            get(users::get).put(users::update).delete(users::suspend),
        )
        .route("/appointments", get(appointments::list).post(appointments::create))
        .route(
            "/appointments/:id",
            get(appointments::get)
                .put(appointments::update)
                .delete(appointments::delete),
        )
        .route("/books", get(books::list).post(books::create))
        .route(
            "/books/:id",
            get(books::get).put(books::update).delete(books::delete),
        )
        .route("/transactions", post(ledger::record))
        .route("/transactions/:id", get(ledger::get))
        .route("/doctors/:id/wallet", get(ledger::wallet))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_bearer));

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/health", get(health::health));

    public
        .merge(protected)
        .fallback(handlers::not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer())
                .layer(CompressionLayer::new())
                .layer(TimeoutLayer::new(config.request_timeout))
                .layer(GlobalConcurrencyLimitLayer::new(config.max_concurrent_requests)),
        )
        .with_state(state)
}
