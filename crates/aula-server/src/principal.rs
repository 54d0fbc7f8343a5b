use crate::routes::envelope;
use aula_entity::user::{Model as User, Role};
use aula_entity::{student, teacher};
use axum::extract::{FromRequestParts, OptionalFromRequestParts};
use axum::response::{IntoResponse, Response};
use axum::{Extension, RequestPartsExt};
use axum_auth::AuthBearer;
use axum_extra::extract::Cached;
use http::StatusCode;
use http::request::Parts;
use sea_orm::DatabaseConnection;
use std::error::Error;

/// An extractor rejection carrying the uniform error envelope.
#[derive(Debug, Clone)]
pub(crate) struct Rejection(StatusCode, &'static str);

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        envelope::error(self.0, self.1)
    }
}

/// The resolved caller, shared across all extractors of one request.
#[derive(Clone)]
struct Session {
    user: User,
}

/// Any authenticated caller.
#[derive(Clone)]
pub(crate) struct ExtractPrincipal(pub User);

/// The caller's student record; fails with 403 for everyone else.
#[derive(Clone)]
pub(crate) struct ExtractStudent {
    pub user: User,
    pub student: student::Model,
}

/// The caller's teacher record; fails with 403 for everyone else.
#[derive(Clone)]
pub(crate) struct ExtractTeacher {
    pub user: User,
    pub teacher: teacher::Model,
}

/// An admin caller.
#[derive(Clone)]
pub(crate) struct ExtractAdmin(pub User);

impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Ok(AuthBearer(token)) = parts.extract::<AuthBearer>().await else {
            return Err(Rejection(StatusCode::UNAUTHORIZED, "no authentication token provided"));
        };

        let Extension::<DatabaseConnection>(conn) =
            parts.extract::<Extension<DatabaseConnection>>().await.map_err(|error| {
                tracing::error!(error = &error as &dyn Error, "database connection missing from request");
                Rejection(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            })?;

        let user = aula_db::auth_session::Query::find_user_by_token(&conn, &token)
            .await
            .map_err(|error| {
                tracing::error!(error = &error as &dyn Error, "error resolving session");
                Rejection(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            })?;

        match user {
            Some(user) => Ok(Self { user }),
            None => Err(Rejection(StatusCode::UNAUTHORIZED, "invalid or expired session")),
        }
    }
}

impl<S> FromRequestParts<S> for ExtractPrincipal
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        Ok(Self(session.user))
    }
}

impl<S> OptionalFromRequestParts<S> for ExtractPrincipal
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Option<Self>, Self::Rejection> {
        let Ok(session) = Cached::<Session>::from_request_parts(parts, state).await else {
            return Ok(None);
        };
        Ok(Some(Self(session.0.user)))
    }
}

impl<S> FromRequestParts<S> for ExtractStudent
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        let user = session.user;

        let Extension::<DatabaseConnection>(conn) =
            parts.extract::<Extension<DatabaseConnection>>().await.map_err(|error| {
                tracing::error!(error = &error as &dyn Error, "database connection missing from request");
                Rejection(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            })?;

        let student = aula_db::student::Query::find_by_user_id(&conn, user.id)
            .await
            .map_err(|error| {
                tracing::error!(error = &error as &dyn Error, "error loading student record");
                Rejection(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            })?;

        match student {
            Some(student) => Ok(Self { user, student }),
            None => Err(Rejection(StatusCode::FORBIDDEN, "only students may do this")),
        }
    }
}

impl<S> FromRequestParts<S> for ExtractTeacher
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        let user = session.user;

        let Extension::<DatabaseConnection>(conn) =
            parts.extract::<Extension<DatabaseConnection>>().await.map_err(|error| {
                tracing::error!(error = &error as &dyn Error, "database connection missing from request");
                Rejection(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            })?;

        let teacher = aula_db::teacher::Query::find_by_user_id(&conn, user.id)
            .await
            .map_err(|error| {
                tracing::error!(error = &error as &dyn Error, "error loading teacher record");
                Rejection(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            })?;

        match teacher {
            Some(teacher) => Ok(Self { user, teacher }),
            None => Err(Rejection(StatusCode::FORBIDDEN, "only teachers may do this")),
        }
    }
}

impl<S> FromRequestParts<S> for ExtractAdmin
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Cached::<Session>::from_request_parts(parts, state).await?.0;
        if session.user.role != Role::Admin {
            return Err(Rejection(StatusCode::FORBIDDEN, "administrator access required"));
        }
        Ok(Self(session.user))
    }
}
