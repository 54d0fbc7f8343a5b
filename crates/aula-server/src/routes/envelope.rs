//! The uniform response body every route answers with:
//! `{status, message?, data?, pagination?}`.

use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub(crate) struct Envelope<T: Serialize> {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub(crate) struct Pagination {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(page: u64, limit: u64, total: u64) -> Self {
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit.max(1)),
        }
    }
}

pub(crate) fn success<T: Serialize>(data: T) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            status: "success",
            message: None,
            data: Some(data),
            pagination: None,
        }),
    )
        .into_response()
}

pub(crate) fn success_message(message: impl Into<String>) -> Response {
    (
        StatusCode::OK,
        Json(Envelope::<()> {
            status: "success",
            message: Some(message.into()),
            data: None,
            pagination: None,
        }),
    )
        .into_response()
}

pub(crate) fn success_with<T: Serialize>(message: impl Into<String>, data: T) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            status: "success",
            message: Some(message.into()),
            data: Some(data),
            pagination: None,
        }),
    )
        .into_response()
}

pub(crate) fn paginated<T: Serialize>(data: T, pagination: Pagination) -> Response {
    (
        StatusCode::OK,
        Json(Envelope {
            status: "success",
            message: None,
            data: Some(data),
            pagination: Some(pagination),
        }),
    )
        .into_response()
}

pub(crate) fn error(status_code: StatusCode, message: impl Into<String>) -> Response {
    (
        status_code,
        Json(Envelope::<()> {
            status: "error",
            message: Some(message.into()),
            data: None,
            pagination: None,
        }),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(Pagination::new(2, 10, 15).total_pages, 2);
        assert_eq!(Pagination::new(1, 10, 30).total_pages, 3);
        assert_eq!(Pagination::new(1, 10, 0).total_pages, 0);
    }

    #[test]
    fn zero_limit_does_not_divide_by_zero() {
        assert_eq!(Pagination::new(1, 0, 5).total_pages, 5);
    }

    #[test]
    fn empty_fields_are_omitted_from_the_wire() {
        let body = serde_json::to_string(&Envelope::<()> {
            status: "success",
            message: None,
            data: None,
            pagination: None,
        })
        .unwrap();
        assert_eq!(body, r#"{"status":"success"}"#);
    }
}
