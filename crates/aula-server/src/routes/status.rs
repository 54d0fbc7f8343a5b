use crate::routes::envelope;
use axum::response::Response;
use axum::routing::get;
use axum::{Extension, Router};
use http::StatusCode;
use sea_orm::DatabaseConnection;
use serde_json::json;
use std::error::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route("/", get(get_status)).with_state(())
}

async fn get_status(Extension(conn): Extension<DatabaseConnection>) -> Response {
    match conn.ping().await {
        Ok(()) => envelope::success(json!({ "database": "ok" })),
        Err(error) => {
            tracing::error!(error = &error as &dyn Error, "database ping failed");
            envelope::error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable")
        }
    }
}
