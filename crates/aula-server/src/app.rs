use crate::{AppConfig, permissions, routes};
use axum::{Extension, Router};
use http::{Method, header};
use protect_axum::GrantsLayer;
use sea_orm::DatabaseConnection;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub(crate) fn create_app(app_config: AppConfig, pool: DatabaseConnection) -> Router {
    // The clients are static single-page bundles served from anywhere, so
    // CORS stays wide open. Preflight OPTIONS is answered here; a wrong
    // method on a matched path gets 405 from the method router.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ORIGIN,
        ])
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .max_age(Duration::from_secs(3600));

    Router::new()
        .nest(
            "/api/v0",
            Router::new()
                .nest("/status", routes::status::create_router())
                .nest("/auth", routes::auth::create_router())
                .nest("/courses", routes::courses::create_router())
                .nest("/assignments", routes::assignments::create_router())
                .nest("/quizzes", routes::quizzes::create_router())
                .nest("/forum", routes::forum::create_router())
                .nest("/dashboard", routes::dashboard::create_router())
                .nest("/admin", routes::admin::create_router())
                .layer(cors),
        )
        .layer(
            // Router layers run bottom to top; ServiceBuilder layers run top
            // to bottom.
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(Extension(app_config))
                .layer(Extension(pool))
                .layer(GrantsLayer::with_extractor(permissions::extract)),
        )
        .with_state(())
}
