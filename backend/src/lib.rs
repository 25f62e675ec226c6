pub mod config;
pub mod db;
pub mod docs;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;
pub mod utils;

use axum::{
    http::Method,
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::state::AppState;

/// Builds the full application router. Split out of `main` so integration
/// tests can drive the same stack in-process.
pub fn build_router(state: AppState) -> Router {
    // No valid token required.
    let public_routes = Router::new()
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route("/api/auth/refresh", post(handlers::auth::refresh))
        .route("/api/auth/logout", post(handlers::auth::logout));

    let user_routes = Router::new()
        .route("/api/auth/abort", post(handlers::auth::abort_all_sessions))
        .route(
            "/api/users/me",
            get(handlers::users::me)
                .put(handlers::users::update_me)
                .delete(handlers::users::delete_me),
        )
        .route(
            "/api/forms",
            get(handlers::forms::list_forms).post(handlers::forms::create_form),
        )
        .route(
            "/api/forms/{id}",
            get(handlers::forms::get_form)
                .put(handlers::forms::update_form)
                .post(handlers::forms::form_to_review),
        )
        .route(
            "/api/forms/{id}/reviews",
            get(handlers::reviews::list_reviews).post(handlers::reviews::create_review),
        )
        .route(
            "/api/forms/{id}/reviews/{review_id}",
            get(handlers::reviews::get_review),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth,
        ));

    let admin_routes = Router::new()
        .route("/api/users", get(handlers::users::admin_list_users))
        .route(
            "/api/users/{id}",
            get(handlers::users::admin_get_user)
                .put(handlers::users::admin_update_user)
                .delete(handlers::users::admin_delete_user),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::auth_admin,
        ));

    Router::new()
        .merge(public_routes)
        .merge(user_routes)
        .merge(admin_routes)
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", docs::ApiDoc::openapi()),
        )
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum_middleware::from_fn(
                    middleware::logging::log_error_responses,
                ))
                .layer(
                    CorsLayer::new()
                        .allow_origin(Any)
                        .allow_methods([
                            Method::GET,
                            Method::POST,
                            Method::PUT,
                            Method::DELETE,
                            Method::OPTIONS,
                        ])
                        .allow_headers(Any)
                        .max_age(std::time::Duration::from_secs(24 * 60 * 60)),
                ),
        )
        .with_state(state)
}
