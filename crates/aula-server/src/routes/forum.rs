use crate::permissions::Permission;
use crate::principal::ExtractPrincipal;
use crate::routes::envelope;
use aula_db::course;
use aula_db::forum::{post as forum_post, topic as forum_topic};
use axum::extract::{Path, Query};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use http::StatusCode;
use protect_axum::protect;
use sea_orm::{DatabaseConnection, DbErr};
use serde_derive::Deserialize;
use serde_json::json;
use thiserror::Error;

pub(crate) fn create_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/topics", get(list_topics).post(create_topic))
        .route("/posts", get(list_posts).post(create_post))
        .route("/replies", get(list_replies))
        .route("/posts/{post_id}/like", post(like_post))
        .with_state(())
}

#[derive(Error, Debug)]
pub(crate) enum ForumError {
    #[error("course not found")]
    CourseNotFound,

    #[error("topic not found")]
    TopicNotFound,

    #[error("post not found")]
    PostNotFound,

    #[error("you already liked this post")]
    AlreadyLiked,

    #[error("the field {0} is required")]
    MissingField(&'static str),

    #[error(transparent)]
    Db(#[from] DbErr),
}

impl IntoResponse for ForumError {
    fn into_response(self) -> Response {
        let status = match &self {
            ForumError::CourseNotFound | ForumError::TopicNotFound | ForumError::PostNotFound => {
                StatusCode::NOT_FOUND
            }
            ForumError::AlreadyLiked => StatusCode::CONFLICT,
            ForumError::MissingField(_) => StatusCode::BAD_REQUEST,
            ForumError::Db(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if let ForumError::Db(error) = &self {
            tracing::error!(error = error as &dyn std::error::Error, "database error in forum route");
            return envelope::error(status, "internal server error");
        }
        envelope::error(status, self.to_string())
    }
}

#[derive(Debug, Deserialize)]
struct TopicParams {
    course_id: Option<i32>,
}

async fn list_topics(
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<TopicParams>,
) -> Result<Response, ForumError> {
    let rows = forum_topic::Query::list(&conn, params.course_id).await?;
    Ok(envelope::success(rows))
}

#[derive(Debug, Deserialize)]
struct CreateTopicPayload {
    course_id: i32,
    title: String,
    content: String,
}

#[protect("Permission::Basic", ty = "Permission")]
async fn create_topic(
    ExtractPrincipal(user): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Json(payload): Json<CreateTopicPayload>,
) -> Result<Response, ForumError> {
    if payload.title.trim().is_empty() {
        return Err(ForumError::MissingField("title"));
    }
    if payload.content.trim().is_empty() {
        return Err(ForumError::MissingField("content"));
    }
    course::Query::find_by_id(&conn, payload.course_id)
        .await?
        .ok_or(ForumError::CourseNotFound)?;

    let topic = forum_topic::Mutation::create(&conn, payload.course_id, user.id, &payload.title, &payload.content)
        .await?;

    Ok(envelope::success_with("topic created", json!({ "topic_id": topic.id })))
}

#[derive(Debug, Deserialize)]
struct PostParams {
    topic_id: i32,
}

async fn list_posts(
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<PostParams>,
) -> Result<Response, ForumError> {
    let rows = forum_post::Query::list_for_topic(&conn, params.topic_id).await?;
    Ok(envelope::success(rows))
}

#[derive(Debug, Deserialize)]
struct CreatePostPayload {
    topic_id: i32,
    content: String,
    parent_id: Option<i32>,
}

#[protect("Permission::Basic", ty = "Permission")]
async fn create_post(
    ExtractPrincipal(user): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Json(payload): Json<CreatePostPayload>,
) -> Result<Response, ForumError> {
    if payload.content.trim().is_empty() {
        return Err(ForumError::MissingField("content"));
    }
    forum_topic::Query::find_by_id(&conn, payload.topic_id)
        .await?
        .ok_or(ForumError::TopicNotFound)?;
    if let Some(parent_id) = payload.parent_id {
        forum_post::Query::find_by_id(&conn, parent_id)
            .await?
            .ok_or(ForumError::PostNotFound)?;
    }

    let post = forum_post::Mutation::create(&conn, payload.topic_id, user.id, &payload.content, payload.parent_id)
        .await?;

    Ok(envelope::success_with("post created", json!({ "post_id": post.id })))
}

#[derive(Debug, Deserialize)]
struct ReplyParams {
    post_id: i32,
}

async fn list_replies(
    Extension(conn): Extension<DatabaseConnection>,
    Query(params): Query<ReplyParams>,
) -> Result<Response, ForumError> {
    let rows = forum_post::Query::list_replies(&conn, params.post_id).await?;
    Ok(envelope::success(rows))
}

#[protect("Permission::Basic", ty = "Permission")]
async fn like_post(
    ExtractPrincipal(user): ExtractPrincipal,
    Extension(conn): Extension<DatabaseConnection>,
    Path(post_id): Path<i32>,
) -> Result<Response, ForumError> {
    forum_post::Query::find_by_id(&conn, post_id)
        .await?
        .ok_or(ForumError::PostNotFound)?;
    if forum_post::Query::has_liked(&conn, post_id, user.id).await? {
        return Err(ForumError::AlreadyLiked);
    }

    forum_post::Mutation::like(&conn, post_id, user.id).await?;
    Ok(envelope::success_message("post liked"))
}
