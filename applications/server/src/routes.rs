/// HTTP routing
use crate::{api, middleware, state::AppState};
use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, TraceLayer},
};

/// Build the full application router
pub fn create_router(app_state: AppState) -> Router {
    let auth_service = Arc::clone(&app_state.auth_service);

    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(api::health::health))
        .route("/leads", post(api::leads::create_lead))
        .route("/test/email", post(api::diagnostics::send_test_email))
        .route("/auth/register", post(api::auth::register))
        .route("/auth/login", post(api::auth::login));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(api::auth::me))
        .route("/brochure", get(api::brochure::download_brochure))
        .layer(axum_middleware::from_fn_with_state(
            auth_service,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/", get(api::health::banner))
        .nest("/api", public_routes.merge(protected_routes))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::default().include_headers(true)),
        )
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
